//! RAG (Retrieval-Augmented Generation) engine trait and types

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::{Result, VectorDocument};

/// Query for RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagQuery {
    pub query: String,
    pub top_k: usize,
    pub score_threshold: Option<f32>,
}

impl Default for RagQuery {
    fn default() -> Self {
        Self {
            query: String::new(),
            top_k: 3,
            score_threshold: None,
        }
    }
}

/// Result from RAG retrieval
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagResult {
    pub documents: Vec<VectorDocument>,
    pub context: String,
}

/// Trait for RAG engines
///
/// Given a question, a RAG engine embeds it with the same embedding
/// function used for indexing and returns the nearest chunks together
/// with a context block ready to drop into a prompt. An empty index
/// yields an empty context, never an error.
#[async_trait]
pub trait RagEngine: Send + Sync {
    /// Retrieve relevant chunks for a query
    async fn retrieve(&self, query: &RagQuery) -> Result<RagResult>;

    /// Build a context block from retrieved chunks
    fn build_context(&self, documents: &[VectorDocument]) -> String;

    /// Check if the RAG engine is ready
    fn is_ready(&self) -> bool;
}
