//! Core traits and types for LexQ
//!
//! This crate defines the fundamental traits and types used across the
//! LexQ legal assistant. It provides capability-facing interfaces for
//! chat models, embedders, vector stores, and RAG engines, plus the
//! session-keyed conversation memory, making the system test-friendly
//! and extensible.

pub mod error;
pub mod llm;
pub mod rag;
pub mod session;
pub mod types;
pub mod vector_store;

pub use error::{Error, Result};
pub use llm::{ChatMessage, ChatModel, Embedder, GenerationConfig, GenerationResult, Role};
pub use rag::{RagEngine, RagQuery, RagResult};
pub use session::{SessionStore, Turn};
pub use types::RetryConfig;
pub use vector_store::{SearchConfig, SearchResult, VectorDocument, VectorStore};
