//! Retriever implementation over the vector store

use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

use lexq_core::{
    Embedder, RagEngine, RagQuery, RagResult, Result, SearchConfig, VectorDocument, VectorStore,
};

/// Corpus retriever
///
/// Embeds the query with the same embedder used for indexing and
/// returns the nearest chunks concatenated into a context block, the
/// chunks separated by blank lines in result order.
pub struct CorpusRetriever<V: VectorStore, E: Embedder> {
    vector_store: Arc<V>,
    embedder: Arc<E>,
}

impl<V: VectorStore, E: Embedder> CorpusRetriever<V, E> {
    /// Create a new retriever over a populated vector store
    pub fn new(vector_store: Arc<V>, embedder: Arc<E>) -> Self {
        Self {
            vector_store,
            embedder,
        }
    }
}

#[async_trait]
impl<V: VectorStore + 'static, E: Embedder + 'static> RagEngine for CorpusRetriever<V, E> {
    async fn retrieve(&self, query: &RagQuery) -> Result<RagResult> {
        // An empty index returns empty context rather than failing.
        if self.vector_store.count().await? == 0 {
            return Ok(RagResult {
                documents: Vec::new(),
                context: String::new(),
            });
        }

        let vector = self.embedder.embed(&query.query).await?;
        let config = SearchConfig {
            top_k: query.top_k,
            score_threshold: query.score_threshold,
        };

        let result = self.vector_store.search_by_vector(vector, &config).await?;
        debug!(results = result.total, query = %query.query, "retrieved context chunks");

        let context = self.build_context(&result.documents);

        Ok(RagResult {
            documents: result.documents,
            context,
        })
    }

    fn build_context(&self, documents: &[VectorDocument]) -> String {
        documents
            .iter()
            .map(|doc| doc.content.as_str())
            .collect::<Vec<_>>()
            .join("\n\n")
    }

    fn is_ready(&self) -> bool {
        self.vector_store.is_connected()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::InMemoryVectorStore;
    use serde_json::json;

    const KEYWORDS: [&str; 4] = ["theft", "punishment", "murder", "dishonestly"];

    /// Deterministic embedder: one dimension per legal keyword,
    /// valued by occurrence count in the lowercased text.
    struct KeywordEmbedder;

    #[async_trait]
    impl Embedder for KeywordEmbedder {
        async fn embed(&self, text: &str) -> Result<Vec<f32>> {
            let lower = text.to_lowercase();
            Ok(KEYWORDS
                .iter()
                .map(|keyword| lower.matches(keyword).count() as f32)
                .collect())
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            let mut vectors = Vec::with_capacity(texts.len());
            for text in texts {
                vectors.push(self.embed(text).await?);
            }
            Ok(vectors)
        }

        fn model_id(&self) -> &str {
            "keyword-embedder"
        }
    }

    const THEFT_DEFINITION: &str = "Section 378. Theft. Whoever, intending to take dishonestly \
        any movable property out of the possession of any person without that person's consent, \
        is said to commit theft.";

    async fn populated_retriever() -> CorpusRetriever<InMemoryVectorStore, KeywordEmbedder> {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();
        let store = Arc::new(store);
        let embedder = Arc::new(KeywordEmbedder);

        let contents = [
            THEFT_DEFINITION,
            "Section 302. Punishment for murder. Whoever commits murder shall be punished with \
             imprisonment for life.",
            "Section 503. Criminal intimidation. Whoever threatens another with any injury to \
             his person, reputation or property.",
        ];

        for (i, content) in contents.iter().enumerate() {
            let embedding = embedder.embed(content).await.unwrap();
            store
                .store(VectorDocument {
                    id: format!("chunk_{}", i),
                    content: content.to_string(),
                    embedding: Some(embedding),
                    metadata: json!({"page": i + 1}),
                    score: None,
                })
                .await
                .unwrap();
        }

        CorpusRetriever::new(store, embedder)
    }

    #[tokio::test]
    async fn test_empty_index_returns_empty_context() {
        let mut store = InMemoryVectorStore::new();
        store.connect().await.unwrap();
        let retriever = CorpusRetriever::new(Arc::new(store), Arc::new(KeywordEmbedder));

        let result = retriever
            .retrieve(&RagQuery {
                query: "What is theft under the code?".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(result.documents.is_empty());
        assert_eq!(result.context, "");
    }

    #[tokio::test]
    async fn test_theft_question_retrieves_theft_definition() {
        let retriever = populated_retriever().await;

        let result = retriever
            .retrieve(&RagQuery {
                query: "What is theft under the code?".to_string(),
                ..Default::default()
            })
            .await
            .unwrap();

        assert_eq!(result.documents[0].content, THEFT_DEFINITION);
        assert!(result.context.contains("Section 378"));
    }

    #[tokio::test]
    async fn test_context_chunks_separated_by_blank_lines() {
        let retriever = populated_retriever().await;

        let result = retriever
            .retrieve(&RagQuery {
                query: "punishment for theft and murder".to_string(),
                top_k: 2,
                score_threshold: None,
            })
            .await
            .unwrap();

        assert_eq!(result.documents.len(), 2);
        let expected = format!(
            "{}\n\n{}",
            result.documents[0].content, result.documents[1].content
        );
        assert_eq!(result.context, expected);
    }

    #[tokio::test]
    async fn test_top_k_limits_results() {
        let retriever = populated_retriever().await;

        let result = retriever
            .retrieve(&RagQuery {
                query: "theft punishment murder".to_string(),
                top_k: 1,
                score_threshold: None,
            })
            .await
            .unwrap();

        assert_eq!(result.documents.len(), 1);
    }

    #[tokio::test]
    async fn test_unrelated_question_yields_no_relevant_context() {
        let retriever = populated_retriever().await;

        // No corpus keyword appears, so every chunk scores 0.0 and the
        // threshold leaves the context empty.
        let result = retriever
            .retrieve(&RagQuery {
                query: "What is the capital of France?".to_string(),
                top_k: 3,
                score_threshold: Some(0.1),
            })
            .await
            .unwrap();

        assert!(result.documents.is_empty());
        assert_eq!(result.context, "");
    }
}
