pub mod client;
pub mod error;

pub use client::{ChatMessage, OpenRouterClient};
pub use error::CompletionError;
