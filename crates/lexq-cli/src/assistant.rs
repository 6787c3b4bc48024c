//! Assistant turn orchestration

use std::sync::Arc;
use tracing::debug;

use lexq_core::{
    ChatMessage, ChatModel, GenerationConfig, RagEngine, RagQuery, Result, Role, SessionStore,
    Turn,
};

/// Prompt and generation settings for the assistant
#[derive(Debug, Clone)]
pub struct AssistantConfig {
    pub system_prompt: String,
    pub top_k: usize,
    pub max_tokens: u32,
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            system_prompt: "You are an AI-powered legal assistant specialized in the Indian \
                            Penal Code (IPC). Use the provided context to answer clearly and \
                            accurately."
                .to_string(),
            top_k: 3,
            max_tokens: 512,
        }
    }
}

/// Answers one question per call, threading session memory through
///
/// Each turn runs an explicit ordered sequence of stages: fetch prior
/// history, retrieve context, assemble the message list, generate, and
/// append the exchange. A failed stage aborts the turn and leaves the
/// session transcript unchanged, so memory never records a question
/// that got no answer.
pub struct Assistant<C: ChatModel, R: RagEngine> {
    model: Arc<C>,
    rag: R,
    sessions: Arc<SessionStore>,
    config: AssistantConfig,
}

impl<C: ChatModel, R: RagEngine> Assistant<C, R> {
    /// Create a new assistant
    pub fn new(model: Arc<C>, rag: R, sessions: Arc<SessionStore>, config: AssistantConfig) -> Self {
        Self {
            model,
            rag,
            sessions,
            config,
        }
    }

    /// Answer a question within the given session
    pub async fn answer(&self, session_id: &str, question: &str) -> Result<String> {
        let history = self.sessions.history(session_id)?;

        let rag_query = RagQuery {
            query: question.to_string(),
            top_k: self.config.top_k,
            score_threshold: None,
        };
        let retrieved = self.rag.retrieve(&rag_query).await?;
        debug!(
            session = session_id,
            context_chunks = retrieved.documents.len(),
            "assembled retrieval context"
        );

        let messages = self.build_messages(&history, &retrieved.context, question);

        let gen_config = GenerationConfig {
            model_id: self.model.model_id().to_string(),
            max_tokens: self.config.max_tokens,
            ..Default::default()
        };
        let result = self.model.complete_with_config(&messages, &gen_config).await?;

        self.sessions.append(session_id, Role::User, question)?;
        self.sessions.append(session_id, Role::Assistant, &result.text)?;

        Ok(result.text)
    }

    /// Assemble the message list: system instruction, prior turns in
    /// order, then the current question with its retrieved context
    fn build_messages(&self, history: &[Turn], context: &str, question: &str) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(history.len() + 2);

        messages.push(ChatMessage::system(self.config.system_prompt.as_str()));

        for turn in history {
            messages.push(ChatMessage {
                role: turn.role,
                content: turn.text.clone(),
            });
        }

        messages.push(ChatMessage::user(format!(
            "Answer the question based on the below context.\n\
             If context is missing, say 'I don't know'.\n\
             \n\
             Context:\n\
             {}\n\
             \n\
             Question:\n\
             {}",
            context, question
        )));

        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lexq_core::{Error, GenerationResult, RagResult, VectorDocument};
    use std::sync::Mutex;
    use std::time::Duration;

    struct ScriptedModel {
        replies: Mutex<Vec<String>>,
        calls: Mutex<Vec<Vec<ChatMessage>>>,
    }

    impl ScriptedModel {
        fn new(replies: &[&str]) -> Self {
            Self {
                replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
                calls: Mutex::new(Vec::new()),
            }
        }

        fn calls(&self) -> Vec<Vec<ChatMessage>> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ChatModel for ScriptedModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<GenerationResult> {
            self.complete_with_config(messages, &GenerationConfig::default())
                .await
        }

        async fn complete_with_config(
            &self,
            messages: &[ChatMessage],
            _config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            self.calls.lock().unwrap().push(messages.to_vec());

            let mut replies = self.replies.lock().unwrap();
            let text = if replies.is_empty() {
                "scripted answer".to_string()
            } else {
                replies.remove(0)
            };

            Ok(GenerationResult {
                text,
                model_id: "scripted".to_string(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "scripted"
        }
    }

    struct FailingModel;

    #[async_trait]
    impl ChatModel for FailingModel {
        async fn complete(&self, messages: &[ChatMessage]) -> Result<GenerationResult> {
            self.complete_with_config(messages, &GenerationConfig::default())
                .await
        }

        async fn complete_with_config(
            &self,
            _messages: &[ChatMessage],
            _config: &GenerationConfig,
        ) -> Result<GenerationResult> {
            Err(Error::Network("connection refused".to_string()))
        }

        fn model_id(&self) -> &str {
            "failing"
        }
    }

    struct StaticRag {
        context: String,
    }

    #[async_trait]
    impl RagEngine for StaticRag {
        async fn retrieve(&self, _query: &RagQuery) -> Result<RagResult> {
            Ok(RagResult {
                documents: Vec::new(),
                context: self.context.clone(),
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
            true
        }
    }

    fn assistant_with(
        model: Arc<ScriptedModel>,
        context: &str,
    ) -> (Assistant<ScriptedModel, StaticRag>, Arc<SessionStore>) {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let assistant = Assistant::new(
            model,
            StaticRag {
                context: context.to_string(),
            },
            sessions.clone(),
            AssistantConfig::default(),
        );
        (assistant, sessions)
    }

    #[tokio::test]
    async fn test_answer_appends_turns_in_order() {
        let model = Arc::new(ScriptedModel::new(&["Theft is defined in Section 378."]));
        let (assistant, sessions) = assistant_with(model, "Section 378. Theft.");

        let answer = assistant
            .answer("user1", "What is theft under the code?")
            .await
            .unwrap();
        assert_eq!(answer, "Theft is defined in Section 378.");

        let history = sessions.history("user1").unwrap();
        assert_eq!(history.len(), 2);
        assert_eq!(history[0].role, Role::User);
        assert_eq!(history[0].text, "What is theft under the code?");
        assert_eq!(history[1].role, Role::Assistant);
        assert_eq!(history[1].text, "Theft is defined in Section 378.");
    }

    #[tokio::test]
    async fn test_prompt_contains_context_and_question() {
        let model = Arc::new(ScriptedModel::new(&[]));
        let (assistant, _sessions) = assistant_with(model.clone(), "Section 378. Theft.");

        assistant
            .answer("user1", "What is theft under the code?")
            .await
            .unwrap();

        let calls = model.calls();
        let messages = &calls[0];

        assert_eq!(messages[0].role, Role::System);
        assert!(messages[0].content.contains("legal assistant"));

        let last = messages.last().unwrap();
        assert_eq!(last.role, Role::User);
        assert!(last.content.contains("Section 378. Theft."));
        assert!(last.content.contains("What is theft under the code?"));
    }

    #[tokio::test]
    async fn test_history_threaded_through_generation() {
        let model = Arc::new(ScriptedModel::new(&[
            "Theft is defined in Section 378.",
            "It is punished under Section 379.",
        ]));
        let (assistant, _sessions) = assistant_with(model.clone(), "Section 378. Theft.");

        assistant
            .answer("user1", "What is theft under the code?")
            .await
            .unwrap();
        assistant
            .answer("user1", "How is it punished?")
            .await
            .unwrap();

        let calls = model.calls();
        assert_eq!(calls.len(), 2);

        // The second call carries the first exchange, in order, between
        // the system instruction and the new question.
        let messages = &calls[1];
        assert_eq!(messages.len(), 4);
        assert_eq!(messages[1].role, Role::User);
        assert_eq!(messages[1].content, "What is theft under the code?");
        assert_eq!(messages[2].role, Role::Assistant);
        assert_eq!(messages[2].content, "Theft is defined in Section 378.");
        assert!(messages[3].content.contains("How is it punished?"));
    }

    #[tokio::test]
    async fn test_failed_generation_leaves_transcript_unchanged() {
        let sessions = Arc::new(SessionStore::new(Duration::from_secs(3600)));
        let assistant = Assistant::new(
            Arc::new(FailingModel),
            StaticRag {
                context: "Section 378. Theft.".to_string(),
            },
            sessions.clone(),
            AssistantConfig::default(),
        );

        let result = assistant
            .answer("user1", "What is theft under the code?")
            .await;
        assert!(matches!(result, Err(Error::Network(_))));

        assert!(sessions.history("user1").unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_empty_context_keeps_fallback_instruction() {
        let model = Arc::new(ScriptedModel::new(&["I don't know"]));
        let (assistant, _sessions) = assistant_with(model.clone(), "");

        let answer = assistant
            .answer("user1", "What is the capital of France?")
            .await
            .unwrap();
        assert_eq!(answer, "I don't know");

        let calls = model.calls();
        let last = calls[0].last().unwrap().clone();
        assert!(last.content.contains("If context is missing, say 'I don't know'."));
    }
}
