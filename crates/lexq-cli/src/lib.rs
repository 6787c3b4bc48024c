//! Interactive terminal interface for LexQ

mod assistant;
mod ui;

pub use assistant::{Assistant, AssistantConfig};
pub use ui::{display_banner, handle_input_with_history, print_help};

// Re-export core types
pub use lexq_core::{Error, Result};
