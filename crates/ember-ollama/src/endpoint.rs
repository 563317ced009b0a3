//! Endpoint variants and per-variant message handling
//!
//! Each Ollama endpoint has its own request shape and its own rule for
//! pulling text out of a decoded chunk. The variant is chosen once when a
//! client is constructed; nothing re-dispatches per call.

use serde_json::Value;

use ember_config::ApiVariantConfig;

use crate::decode::Chunk;
use crate::protocol::{ChatRequest, EmbedRequest, EmbeddingsRequest, GenerateRequest, Message, ModelOptions, RequestBody};

/// Ollama API endpoint variant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiVariant {
    /// `/api/chat`
    Chat,
    /// `/api/generate`
    Generate,
    /// `/api/embeddings` (legacy, single input)
    Embeddings,
    /// `/api/embed` (batched)
    Embed,
}

impl From<ApiVariantConfig> for ApiVariant {
    fn from(config: ApiVariantConfig) -> Self {
        match config {
            ApiVariantConfig::Chat => Self::Chat,
            ApiVariantConfig::Generate => Self::Generate,
            ApiVariantConfig::Embeddings => Self::Embeddings,
            ApiVariantConfig::Embed => Self::Embed,
        }
    }
}

impl ApiVariant {
    /// URL path suffix for this endpoint
    pub const fn path(self) -> &'static str {
        match self {
            Self::Chat => "/api/chat",
            Self::Generate => "/api/generate",
            Self::Embeddings => "/api/embeddings",
            Self::Embed => "/api/embed",
        }
    }

    /// Response key holding the vector payload, for embedding endpoints
    pub const fn embedding_key(self) -> Option<&'static str> {
        match self {
            Self::Embeddings => Some("embedding"),
            Self::Embed => Some("embeddings"),
            Self::Chat | Self::Generate => None,
        }
    }

    /// Build the request body for this endpoint
    ///
    /// Chat sends messages as-is. The single-prompt endpoints join message
    /// contents with newlines; attached images are forwarded where the
    /// endpoint supports them.
    pub fn build_request(self, model: &str, messages: &[Message], stream: bool, temperature: f64) -> RequestBody {
        let model = model.to_owned();
        match self {
            Self::Chat => RequestBody::Chat(ChatRequest {
                model,
                messages: messages.to_vec(),
                stream,
                options: ModelOptions { temperature },
            }),
            Self::Generate => {
                let images: Vec<String> = messages.iter().flat_map(|m| m.images.clone().unwrap_or_default()).collect();
                RequestBody::Generate(GenerateRequest {
                    model,
                    prompt: joined_contents(messages),
                    images: if images.is_empty() { None } else { Some(images) },
                    stream,
                    options: ModelOptions { temperature },
                })
            }
            Self::Embeddings => RequestBody::Embeddings(EmbeddingsRequest {
                model,
                prompt: joined_contents(messages),
            }),
            Self::Embed => RequestBody::Embed(EmbedRequest {
                model,
                input: messages.iter().map(|m| m.content.clone()).collect(),
            }),
        }
    }

    /// Extract display text from a decoded chunk
    ///
    /// An error-tagged chunk renders as a visible composite rather than an
    /// empty string so decode failures surface downstream. A chunk missing
    /// the expected keys stringifies; callers must be defensive about shape.
    pub fn extract_text(self, chunk: &Chunk) -> String {
        if let Some(error) = chunk.get("error").and_then(Value::as_str) {
            let raw = chunk.get("raw_data").and_then(Value::as_str).unwrap_or("");
            return format!("[ollama error] {error} | raw: {raw}");
        }

        match self {
            Self::Chat => chunk.get("message").map_or_else(
                || chunk.to_string(),
                |message| {
                    if message.get("role").and_then(Value::as_str) == Some("assistant") {
                        message.get("content").and_then(Value::as_str).unwrap_or_default().to_owned()
                    } else {
                        message.to_string()
                    }
                },
            ),
            Self::Generate => chunk
                .get("response")
                .and_then(Value::as_str)
                .map_or_else(|| chunk.to_string(), ToOwned::to_owned),
            // Vector payloads are consumed via `embedding_key`, not as text
            Self::Embeddings | Self::Embed => chunk.to_string(),
        }
    }
}

fn joined_contents(messages: &[Message]) -> String {
    messages.iter().map(|m| m.content.as_str()).collect::<Vec<_>>().join("\n")
}
