//! Ollama wire format types

use serde::{Deserialize, Serialize};

/// A chat message sent to or received from the model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Message role (`system`, `user`, `assistant`)
    pub role: String,
    /// Text content
    pub content: String,
    /// Base64-encoded images attached to the message
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
}

impl Message {
    /// A `user` message
    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role("user", content)
    }

    /// A `system` message
    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role("system", content)
    }

    /// An `assistant` message
    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role("assistant", content)
    }

    fn with_role(role: &str, content: impl Into<String>) -> Self {
        Self {
            role: role.to_owned(),
            content: content.into(),
            images: None,
        }
    }

    /// Attach base64-encoded images
    #[must_use]
    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = Some(images);
        self
    }
}

/// Sampling options forwarded to the server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelOptions {
    /// Sampling temperature
    pub temperature: f64,
}

/// `/api/chat` request
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model identifier
    pub model: String,
    /// Conversation messages
    pub messages: Vec<Message>,
    /// Whether the server should stream the response
    pub stream: bool,
    /// Sampling options
    pub options: ModelOptions,
}

/// `/api/generate` request
#[derive(Debug, Clone, Serialize)]
pub struct GenerateRequest {
    /// Model identifier
    pub model: String,
    /// Prompt text
    pub prompt: String,
    /// Base64-encoded images referenced by the prompt
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub images: Option<Vec<String>>,
    /// Whether the server should stream the response
    pub stream: bool,
    /// Sampling options
    pub options: ModelOptions,
}

/// Legacy `/api/embeddings` request (single input)
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingsRequest {
    /// Model identifier
    pub model: String,
    /// Input text
    pub prompt: String,
}

/// `/api/embed` request (batched input)
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    /// Model identifier
    pub model: String,
    /// Input texts
    pub input: Vec<String>,
}

/// Any request body the client can send, for uniform serialization
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RequestBody {
    /// Chat turn
    Chat(ChatRequest),
    /// Single-prompt completion
    Generate(GenerateRequest),
    /// Legacy embeddings
    Embeddings(EmbeddingsRequest),
    /// Batched embeddings
    Embed(EmbedRequest),
}
