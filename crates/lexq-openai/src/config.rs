//! OpenAI configuration

use serde::{Deserialize, Serialize};
use std::env;

use lexq_core::{Error, Result};

/// Configuration for the OpenAI API client
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
}

impl OpenAiConfig {
    /// Create configuration from environment variables
    ///
    /// Fails fast when the API key is absent, naming the missing
    /// variable, so the process refuses to start unconfigured.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let api_key = env::var("OPENAI_API_KEY").map_err(|_| {
            Error::Configuration("OPENAI_API_KEY environment variable not found".to_string())
        })?;

        let api_url = env::var("OPENAI_API_URL")
            .unwrap_or_else(|_| "https://api.openai.com/v1".to_string());

        Ok(Self { api_key, api_url })
    }

    /// Create configuration with explicit values
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            api_url: "https://api.openai.com/v1".to_string(),
        }
    }
}
