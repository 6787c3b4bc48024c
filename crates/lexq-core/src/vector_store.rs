//! Vector store trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::Result;

/// A chunk of corpus text stored alongside its embedding vector
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VectorDocument {
    pub id: String,
    pub content: String,
    pub embedding: Option<Vec<f32>>,
    pub metadata: serde_json::Value,
    pub score: Option<f32>,
}

/// Search result from a vector store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub documents: Vec<VectorDocument>,
    pub total: usize,
}

/// Configuration for vector search
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            top_k: 3,
            score_threshold: None,
        }
    }
}

/// Trait for vector stores
///
/// This trait defines the interface for similarity-searchable indexes of
/// (chunk, vector) pairs. The index is built once at startup and is
/// read-only for the rest of the process lifetime.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Initialize the vector store
    async fn connect(&mut self) -> Result<()>;

    /// Store a document
    async fn store(&self, document: VectorDocument) -> Result<String>;

    /// Store multiple documents in batch
    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>>;

    /// Search for the nearest documents to a query vector
    async fn search_by_vector(&self, vector: Vec<f32>, config: &SearchConfig)
        -> Result<SearchResult>;

    /// Get the total number of documents
    async fn count(&self) -> Result<usize>;

    /// Clear all documents from the store
    async fn clear(&self) -> Result<()>;

    /// Check if the vector store is ready for use
    fn is_connected(&self) -> bool;
}
