//! Errors for the Ollama client

use thiserror::Error;

use crate::decode::DecodeError;

/// Errors that can occur talking to an Ollama server
#[derive(Debug, Error)]
pub enum OllamaError {
    /// The response body could not be decoded as text
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// The server answered with a non-success status
    #[error("upstream returned {status}: {body}")]
    Upstream {
        /// HTTP status code
        status: u16,
        /// Response body text
        body: String,
    },

    /// The request could not be sent or the body could not be read
    #[error("request failed: {0}")]
    Request(String),

    /// The request did not complete within its timeout
    #[error("request timed out")]
    Timeout,

    /// The response stream failed mid-flight
    #[error("streaming error: {0}")]
    Streaming(String),

    /// The operation is not available on the configured endpoint
    #[error("{operation} is not supported by the {endpoint} endpoint")]
    Unsupported {
        /// Attempted operation
        operation: &'static str,
        /// Configured endpoint path
        endpoint: &'static str,
    },

    /// The client could not be constructed from its configuration
    #[error("invalid client configuration: {0}")]
    Config(String),
}

impl OllamaError {
    /// Classify a transport error, separating timeouts from other failures
    pub fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else {
            Self::Request(e.to_string())
        }
    }
}
