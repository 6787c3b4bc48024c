//! OpenAI API integration for LexQ
//!
//! This crate provides the OpenAI implementation of the ChatModel and
//! Embedder traits.

mod client;
mod config;


pub use client::OpenAiClient;
pub use config::OpenAiConfig;

// Re-export core types for convenience
pub use lexq_core::{
    ChatMessage, ChatModel, Embedder, Error, GenerationConfig, GenerationResult, Result,
    RetryConfig, Role,
};
