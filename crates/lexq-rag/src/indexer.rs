//! Corpus indexing: chunk, embed, store

use serde_json::json;
use std::sync::Arc;
use tracing::{debug, info};

use lexq_core::{Embedder, Result, VectorDocument, VectorStore};

use crate::loader::Page;
use crate::splitter::TextSplitter;

/// Configuration for corpus indexing
#[derive(Debug, Clone)]
pub struct IndexingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub batch_size: usize,
}

impl Default for IndexingConfig {
    fn default() -> Self {
        Self {
            chunk_size: 500,
            chunk_overlap: 50,
            batch_size: 16,
        }
    }
}

/// Summary of one indexing run
#[derive(Debug, Clone)]
pub struct IndexSummary {
    pub pages: usize,
    pub chunks_indexed: usize,
}

/// Builds the vector index from corpus pages
///
/// An explicit chunk → embed → store sequence: pages are split into
/// overlapping chunks, each batch is embedded via the external
/// embedding call, and the resulting (chunk, vector) pairs land in the
/// vector store. An embedding failure aborts the run; indexing happens
/// once at startup and a partial index must not serve queries.
pub struct CorpusIndexer<V: VectorStore, E: Embedder> {
    vector_store: Arc<V>,
    embedder: Arc<E>,
    splitter: TextSplitter,
    batch_size: usize,
}

impl<V: VectorStore, E: Embedder> CorpusIndexer<V, E> {
    /// Create a new corpus indexer with default configuration
    pub fn new(vector_store: Arc<V>, embedder: Arc<E>) -> Self {
        Self::with_config(vector_store, embedder, IndexingConfig::default())
    }

    /// Create with custom configuration
    pub fn with_config(vector_store: Arc<V>, embedder: Arc<E>, config: IndexingConfig) -> Self {
        Self {
            vector_store,
            embedder,
            splitter: TextSplitter::new(config.chunk_size, config.chunk_overlap),
            batch_size: config.batch_size,
        }
    }

    /// Index corpus pages into the vector store
    pub async fn index_pages(&self, title: &str, pages: &[Page]) -> Result<IndexSummary> {
        let chunks = self.splitter.split(pages);
        info!(
            pages = pages.len(),
            chunks = chunks.len(),
            model = self.embedder.model_id(),
            "embedding corpus chunks"
        );

        for batch in chunks.chunks(self.batch_size) {
            let texts: Vec<String> = batch.iter().map(|chunk| chunk.text.clone()).collect();
            let vectors = self.embedder.embed_batch(&texts).await?;

            let documents: Vec<VectorDocument> = batch
                .iter()
                .zip(vectors)
                .map(|(chunk, vector)| VectorDocument {
                    id: format!("chunk_{}", chunk.index),
                    content: chunk.text.clone(),
                    embedding: Some(vector),
                    metadata: json!({
                        "source": title,
                        "page": chunk.page,
                        "chunk_index": chunk.index,
                    }),
                    score: None,
                })
                .collect();

            self.vector_store.store_batch(documents).await?;
            debug!(batch = batch.len(), "stored embedded batch");
        }

        Ok(IndexSummary {
            pages: pages.len(),
            chunks_indexed: chunks.len(),
        })
    }
}
