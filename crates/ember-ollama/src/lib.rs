//! Ollama provider for Ember
//!
//! Talks to a local Ollama server over its native HTTP API. The response
//! decoder accepts all three framings the server is known to emit for one
//! logical response: a single JSON object, newline-delimited JSON objects,
//! and SSE lines with `data: ` prefixes and a `[DONE]` terminator.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod client;
pub mod decode;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod usage;

pub use client::{Completion, OllamaClient, StreamEvent};
pub use decode::{Chunk, DecodeError, decode};
pub use endpoint::ApiVariant;
pub use error::OllamaError;
pub use protocol::Message;
pub use usage::{Usage, UsageTotals};
