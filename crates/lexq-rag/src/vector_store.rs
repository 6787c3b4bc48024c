//! In-memory vector store with on-disk persistence

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, RwLock};
use tracing::{info, warn};

use lexq_core::{Error, Result, SearchConfig, SearchResult, VectorDocument, VectorStore};

const INDEX_FILE: &str = "index.json";

/// In-memory cosine-similarity vector store
///
/// Holds all (chunk, vector) pairs for the process lifetime and can
/// persist them to an index directory as JSON. The index is rebuilt
/// from the corpus on every startup, so persistence exists for
/// inspection and reuse by other tooling, not as a cache.
pub struct InMemoryVectorStore {
    documents: Arc<RwLock<HashMap<String, VectorDocument>>>,
    connected: bool,
}

impl InMemoryVectorStore {
    /// Create a new in-memory vector store
    pub fn new() -> Self {
        Self {
            documents: Arc::new(RwLock::new(HashMap::new())),
            connected: false,
        }
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            return 0.0;
        }

        let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

        if norm_a == 0.0 || norm_b == 0.0 {
            return 0.0;
        }

        dot_product / (norm_a * norm_b)
    }

    /// Write the store contents to an index directory
    pub async fn persist_to(&self, dir: &Path) -> Result<()> {
        let rows = {
            let docs = self
                .documents
                .read()
                .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
            let mut rows: Vec<VectorDocument> = docs.values().cloned().collect();
            rows.sort_by(|a, b| a.id.cmp(&b.id));
            rows
        };

        let index_path = dir.join(INDEX_FILE);
        if index_path.exists() {
            // The corpus is re-embedded from scratch on every startup;
            // an existing index is overwritten, never reused.
            warn!(
                path = %index_path.display(),
                "overwriting existing index directory with freshly embedded corpus"
            );
        }

        tokio::fs::create_dir_all(dir).await?;
        let json =
            serde_json::to_string(&rows).map_err(|e| Error::Serialization(e.to_string()))?;
        tokio::fs::write(&index_path, json).await?;

        info!(documents = rows.len(), path = %index_path.display(), "persisted vector index");
        Ok(())
    }

    /// Read a previously persisted index directory into a connected store
    pub async fn load_from(dir: &Path) -> Result<Self> {
        let index_path = dir.join(INDEX_FILE);
        let json = tokio::fs::read_to_string(&index_path).await?;
        let rows: Vec<VectorDocument> =
            serde_json::from_str(&json).map_err(|e| Error::Serialization(e.to_string()))?;

        let mut documents = HashMap::new();
        for row in rows {
            documents.insert(row.id.clone(), row);
        }

        Ok(Self {
            documents: Arc::new(RwLock::new(documents)),
            connected: true,
        })
    }
}

impl Default for InMemoryVectorStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VectorStore for InMemoryVectorStore {
    async fn connect(&mut self) -> Result<()> {
        self.connected = true;
        Ok(())
    }

    async fn store(&self, document: VectorDocument) -> Result<String> {
        let id = document.id.clone();
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        docs.insert(id.clone(), document);
        Ok(id)
    }

    async fn store_batch(&self, documents: Vec<VectorDocument>) -> Result<Vec<String>> {
        let mut ids = Vec::new();
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        for document in documents {
            let id = document.id.clone();
            docs.insert(id.clone(), document);
            ids.push(id);
        }

        Ok(ids)
    }

    async fn search_by_vector(
        &self,
        vector: Vec<f32>,
        config: &SearchConfig,
    ) -> Result<SearchResult> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;

        let mut results: Vec<VectorDocument> = docs
            .values()
            .filter_map(|doc| {
                if let Some(ref embedding) = doc.embedding {
                    let score = Self::cosine_similarity(&vector, embedding);
                    let mut doc_with_score = doc.clone();
                    doc_with_score.score = Some(score);
                    Some(doc_with_score)
                } else {
                    None
                }
            })
            .filter(|doc| {
                if let Some(threshold) = config.score_threshold {
                    doc.score.unwrap_or(0.0) >= threshold
                } else {
                    true
                }
            })
            .collect();

        results.sort_by(|a, b| {
            b.score
                .unwrap_or(0.0)
                .partial_cmp(&a.score.unwrap_or(0.0))
                .unwrap()
        });

        results.truncate(config.top_k);

        let total = results.len();

        Ok(SearchResult {
            documents: results,
            total,
        })
    }

    async fn count(&self) -> Result<usize> {
        let docs = self
            .documents
            .read()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        Ok(docs.len())
    }

    async fn clear(&self) -> Result<()> {
        let mut docs = self
            .documents
            .write()
            .map_err(|e| Error::VectorStore(format!("Lock error: {}", e)))?;
        docs.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(id: &str, content: &str, embedding: Vec<f32>) -> VectorDocument {
        VectorDocument {
            id: id.to_string(),
            content: content.to_string(),
            embedding: Some(embedding),
            metadata: json!({}),
            score: None,
        }
    }

    #[tokio::test]
    async fn test_store_and_count() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();
        assert!(store.is_connected());

        let id = store
            .store(doc("chunk_0", "Section 378. Theft.", vec![1.0, 0.0]))
            .await
            .unwrap();
        assert_eq!(id, "chunk_0");
        assert_eq!(store.count().await.unwrap(), 1);

        store.clear().await.unwrap();
        assert_eq!(store.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_search_ranks_by_cosine_distance() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();

        store
            .store_batch(vec![
                doc("chunk_0", "theft definition", vec![1.0, 0.0]),
                doc("chunk_1", "murder punishment", vec![0.0, 1.0]),
                doc("chunk_2", "theft punishment", vec![0.7, 0.7]),
            ])
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 2,
            score_threshold: None,
        };
        let result = store.search_by_vector(vec![1.0, 0.0], &config).await.unwrap();

        assert_eq!(result.total, 2);
        assert_eq!(result.documents[0].id, "chunk_0");
        assert_eq!(result.documents[1].id, "chunk_2");
    }

    #[tokio::test]
    async fn test_search_empty_store_returns_empty() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();

        let result = store
            .search_by_vector(vec![1.0, 0.0], &SearchConfig::default())
            .await
            .unwrap();

        assert!(result.documents.is_empty());
        assert_eq!(result.total, 0);
    }

    #[tokio::test]
    async fn test_score_threshold_filters_unrelated() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();

        store
            .store(doc("chunk_0", "theft definition", vec![1.0, 0.0]))
            .await
            .unwrap();

        let config = SearchConfig {
            top_k: 3,
            score_threshold: Some(0.1),
        };
        // Orthogonal query vector scores 0.0 and falls under the threshold
        let result = store.search_by_vector(vec![0.0, 1.0], &config).await.unwrap();

        assert!(result.documents.is_empty());
    }

    #[tokio::test]
    async fn test_persist_and_load() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();
        store
            .store_batch(vec![
                doc("chunk_0", "Section 378. Theft.", vec![1.0, 0.0]),
                doc("chunk_1", "Section 379. Punishment for theft.", vec![0.0, 1.0]),
            ])
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        store.persist_to(dir.path()).await.unwrap();

        let loaded = InMemoryVectorStore::load_from(dir.path()).await.unwrap();
        assert!(loaded.is_connected());
        assert_eq!(loaded.count().await.unwrap(), 2);

        let result = loaded
            .search_by_vector(vec![1.0, 0.0], &SearchConfig::default())
            .await
            .unwrap();
        assert_eq!(result.documents[0].content, "Section 378. Theft.");
    }
}
