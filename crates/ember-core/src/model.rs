//! Text-generation seam between the recommender and a concrete provider

use async_trait::async_trait;
use thiserror::Error;

/// Errors surfaced by a [`TextModel`] backend
#[derive(Debug, Error)]
pub enum ModelError {
    /// The upstream model endpoint returned an error
    #[error("upstream error: {0}")]
    Upstream(String),

    /// The request did not complete within its timeout
    #[error("model request timed out")]
    Timeout,

    /// The response body could not be decoded
    #[error("decode error: {0}")]
    Decode(String),
}

/// A text-completion backend
///
/// The sole suspension point the ranking stage depends on. Implemented by the
/// Ollama client in production and by canned fakes in tests; injected at
/// construction rather than reached through a global.
#[async_trait]
pub trait TextModel: Send + Sync {
    /// Generate a completion for a single prompt
    async fn generate(&self, prompt: &str) -> Result<String, ModelError>;
}
