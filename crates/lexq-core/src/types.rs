//! Common types used across the LexQ system

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for retry behavior on transient failures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(500),
        }
    }
}

impl RetryConfig {
    /// Backoff delay before the given retry, doubling per attempt.
    /// `attempt` is 1-based; the delay applies after that attempt fails.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}
