//! Corpus loading, chunking, indexing and retrieval for LexQ
//!
//! This crate implements the startup half of the RAG pipeline
//! (load → split → embed/index) and the per-question retriever.

mod engine;
mod indexer;
mod loader;
mod splitter;
mod vector_store;

pub use engine::CorpusRetriever;
pub use indexer::{CorpusIndexer, IndexSummary, IndexingConfig};
pub use loader::{Page, PdfLoader};
pub use splitter::{Chunk, TextSplitter};
pub use vector_store::InMemoryVectorStore;

// Re-export core types for convenience
pub use lexq_core::{
    Embedder, Error, RagEngine, RagQuery, RagResult, Result, SearchConfig, SearchResult,
    VectorDocument, VectorStore,
};
