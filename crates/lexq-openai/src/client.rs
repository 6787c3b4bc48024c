//! OpenAI API client implementation

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::warn;

use lexq_core::{
    ChatMessage, ChatModel, Embedder, Error, GenerationConfig, GenerationResult, Result,
    RetryConfig,
};

use crate::config::OpenAiConfig;

/// OpenAI API client
///
/// Implements both seams the pipeline needs from the hosted service:
/// chat completions ([`ChatModel`]) and embeddings ([`Embedder`]).
/// Transient failures (timeouts, 429s, transport errors) are retried
/// with exponential backoff up to the configured attempt limit.
pub struct OpenAiClient {
    config: OpenAiConfig,
    client: Client,
    retry: RetryConfig,
    chat_model: String,
    embedding_model: String,
}

#[derive(Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

#[derive(Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Usage {
    total_tokens: u32,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
    index: usize,
}

impl OpenAiClient {
    /// Model constants
    pub const GPT_5_2: &'static str = "gpt-5.2-2025-12-11";
    pub const TEXT_EMBEDDING_3_SMALL: &'static str = "text-embedding-3-small";

    const EMBED_TIMEOUT: Duration = Duration::from_secs(60);

    /// Create a new OpenAI client from configuration
    pub fn new(config: OpenAiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| Error::Network(e.to_string()))?;

        Ok(Self {
            config,
            client,
            retry: RetryConfig::default(),
            chat_model: Self::GPT_5_2.to_string(),
            embedding_model: Self::TEXT_EMBEDDING_3_SMALL.to_string(),
        })
    }

    /// Create a new OpenAI client from environment variables
    pub fn from_env() -> Result<Self> {
        let config = OpenAiConfig::from_env()?;
        Self::new(config)
    }

    /// Set the chat model to use for generation
    pub fn with_chat_model(mut self, model_id: impl Into<String>) -> Self {
        self.chat_model = model_id.into();
        self
    }

    /// Set the embedding model
    pub fn with_embedding_model(mut self, model_id: impl Into<String>) -> Self {
        self.embedding_model = model_id.into();
        self
    }

    /// Set the retry policy for transient failures
    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Perform one chat-completion request
    async fn perform_chat(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let request_body = ChatCompletionRequest {
            model: &config.model_id,
            messages,
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        };

        let url = format!("{}/chat/completions", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_http_failure(status, error_text, true));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        let tokens_used = data.usage.map(|u| u.total_tokens);
        let choice = data
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| Error::Generation("no choices in response".to_string()))?;
        let text = choice
            .message
            .content
            .ok_or_else(|| Error::Generation("empty message content".to_string()))?;

        Ok(GenerationResult {
            text: text.trim().to_string(),
            model_id: config.model_id.clone(),
            tokens_used,
        })
    }

    /// Perform one embeddings request for a batch of texts
    async fn perform_embeddings(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let request_body = EmbeddingRequest {
            model: &self.embedding_model,
            input: texts,
        };

        let url = format!("{}/embeddings", self.config.api_url);

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .json(&request_body)
            .send()
            .await
            .map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Self::classify_http_failure(status, error_text, false));
        }

        let data: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Serialization(e.to_string()))?;

        if data.data.len() != texts.len() {
            return Err(Error::Embedding(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                data.data.len()
            )));
        }

        let mut rows = data.data;
        rows.sort_by_key(|row| row.index);

        Ok(rows.into_iter().map(|row| row.embedding).collect())
    }

    /// Map an HTTP failure onto the error taxonomy
    fn classify_http_failure(status: StatusCode, body: String, generation: bool) -> Error {
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Error::RateLimited(format!("OpenAI API returned 429: {}", body));
        }
        if status.is_server_error() {
            return Error::Network(format!(
                "OpenAI API request failed with status {}: {}",
                status, body
            ));
        }
        let message = format!(
            "OpenAI API request failed with status {}: {}",
            status, body
        );
        if generation {
            Error::Generation(message)
        } else {
            Error::Embedding(message)
        }
    }
}

#[async_trait]
impl ChatModel for OpenAiClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<GenerationResult> {
        let config = GenerationConfig {
            model_id: self.chat_model.clone(),
            ..Default::default()
        };
        self.complete_with_config(messages, &config).await
    }

    async fn complete_with_config(
        &self,
        messages: &[ChatMessage],
        config: &GenerationConfig,
    ) -> Result<GenerationResult> {
        let mut attempt = 1;
        loop {
            let outcome = match timeout(config.timeout, self.perform_chat(messages, config)).await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(format!(
                    "generation timed out after {:?}",
                    config.timeout
                ))),
            };

            match outcome {
                Ok(result) => return Ok(result),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %e, "transient generation failure, backing off");
                    sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.chat_model
    }
}

#[async_trait]
impl Embedder for OpenAiClient {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let texts = [text.to_string()];
        let mut vectors = self.embed_batch(&texts).await?;
        vectors
            .pop()
            .ok_or_else(|| Error::Embedding("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let mut attempt = 1;
        loop {
            let outcome = match timeout(Self::EMBED_TIMEOUT, self.perform_embeddings(texts)).await
            {
                Ok(result) => result,
                Err(_) => Err(Error::Timeout(format!(
                    "embedding timed out after {:?}",
                    Self::EMBED_TIMEOUT
                ))),
            };

            match outcome {
                Ok(vectors) => return Ok(vectors),
                Err(e) if e.is_transient() && attempt < self.retry.max_attempts => {
                    warn!(attempt, error = %e, "transient embedding failure, backing off");
                    sleep(self.retry.delay_for(attempt)).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn model_id(&self) -> &str {
        &self.embedding_model
    }
}
