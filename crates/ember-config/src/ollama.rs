//! Local-model (Ollama) endpoint configuration

use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

/// Which Ollama API endpoint a client talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApiVariantConfig {
    /// `/api/chat` — full chat turns
    #[default]
    Chat,
    /// `/api/generate` — single-prompt completion
    Generate,
    /// `/api/embeddings` — legacy single-input embeddings
    Embeddings,
    /// `/api/embed` — batched embeddings
    Embed,
}

/// Configuration for the Ollama client
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OllamaConfig {
    /// Base URL of the Ollama server
    #[serde(default = "default_base_url")]
    pub base_url: Url,
    /// Model identifier to request
    #[serde(default = "default_model")]
    pub model: String,
    /// API endpoint variant
    #[serde(default)]
    pub api: ApiVariantConfig,
    /// Whether completion requests ask the server to stream
    #[serde(default)]
    pub stream: bool,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    /// Sampling temperature forwarded in request options
    #[serde(default = "default_temperature")]
    pub temperature: f64,
    /// Optional bearer token for proxied Ollama deployments
    #[serde(default)]
    pub api_key: Option<SecretString>,
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api: ApiVariantConfig::default(),
            stream: false,
            timeout_secs: default_timeout_secs(),
            temperature: default_temperature(),
            api_key: None,
        }
    }
}

fn default_base_url() -> Url {
    Url::parse("http://127.0.0.1:11434").expect("valid default URL")
}

fn default_model() -> String {
    "llama3.1".to_owned()
}

// Local models are slow; the default mirrors typical first-token latency
// on consumer hardware.
const fn default_timeout_secs() -> u64 {
    120
}

const fn default_temperature() -> f64 {
    0.3
}
