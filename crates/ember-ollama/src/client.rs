//! HTTP client for the Ollama API

use std::pin::Pin;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::{Stream, StreamExt, pin_mut};
use secrecy::{ExposeSecret, SecretString};
use url::Url;

use ember_config::OllamaConfig;
use ember_core::{ModelError, TextModel};

use crate::decode::{self, Chunk};
use crate::endpoint::ApiVariant;
use crate::error::OllamaError;
use crate::protocol::Message;
use crate::usage::{Usage, UsageTotals};

/// A finished completion: the extracted text plus its usage record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    /// Extracted response text
    pub text: String,
    /// Token usage reported by the server
    pub usage: Usage,
}

/// One event on a live completion stream
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// Incremental content extracted from a not-done chunk
    Delta(String),
    /// Usage counters carried by the done chunk
    Usage(Usage),
    /// Stream has completed
    Done,
}

/// Boxed stream of completion events
pub type EventStream = Pin<Box<dyn Stream<Item = Result<StreamEvent, OllamaError>> + Send>>;

/// Client for a single Ollama endpoint
///
/// The endpoint variant, model, and default timeout are fixed at
/// construction. The client is cheap to share; concurrent calls are
/// independent and only the usage totals are synchronized.
pub struct OllamaClient {
    client: reqwest::Client,
    base_url: Url,
    model: String,
    variant: ApiVariant,
    stream: bool,
    temperature: f64,
    timeout: Duration,
    api_key: Option<SecretString>,
    totals: Mutex<UsageTotals>,
}

impl OllamaClient {
    /// Create a client from configuration
    pub fn new(config: &OllamaConfig) -> Result<Self, OllamaError> {
        let client = reqwest::Client::builder()
            .build()
            .map_err(|e| OllamaError::Config(e.to_string()))?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            model: config.model.clone(),
            variant: config.api.into(),
            stream: config.stream,
            temperature: config.temperature,
            timeout: Duration::from_secs(config.timeout_secs),
            api_key: config.api_key.clone(),
            totals: Mutex::new(UsageTotals::default()),
        })
    }

    /// The configured endpoint variant
    pub const fn variant(&self) -> ApiVariant {
        self.variant
    }

    /// Running usage totals across this client's lifetime
    pub fn usage_totals(&self) -> UsageTotals {
        *self.totals.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Complete a request, streaming or not per configuration
    pub async fn completion(&self, messages: &[Message]) -> Result<Completion, OllamaError> {
        if self.stream {
            let events = self.complete_stream(messages).await?;
            self.collect(events).await
        } else {
            self.complete(messages).await
        }
    }

    /// Send a non-streaming completion request with the default timeout
    pub async fn complete(&self, messages: &[Message]) -> Result<Completion, OllamaError> {
        self.complete_with_timeout(messages, self.timeout).await
    }

    /// Send a non-streaming completion request with an explicit timeout
    pub async fn complete_with_timeout(
        &self,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<Completion, OllamaError> {
        let bytes = self.send(messages, false, timeout).await?.bytes().await.map_err(|e| OllamaError::from_transport(&e))?;

        let chunk = decode::decode(&bytes)?;
        let usage = Usage::from_chunk(&chunk);
        self.record(usage);

        Ok(Completion {
            text: self.variant.extract_text(&chunk),
            usage,
        })
    }

    /// Open a streaming completion
    ///
    /// Each arriving network chunk passes through the tolerant decoder; a
    /// not-done chunk yields a [`StreamEvent::Delta`], the done chunk yields
    /// [`StreamEvent::Usage`] then [`StreamEvent::Done`]. Dropping the
    /// returned stream stops consumption; partial text is discarded.
    pub async fn complete_stream(&self, messages: &[Message]) -> Result<EventStream, OllamaError> {
        self.complete_stream_with_timeout(messages, self.timeout).await
    }

    /// Open a streaming completion with an explicit timeout
    pub async fn complete_stream_with_timeout(
        &self,
        messages: &[Message],
        timeout: Duration,
    ) -> Result<EventStream, OllamaError> {
        let response = self.send(messages, true, timeout).await?;
        let variant = self.variant;

        let events = response
            .bytes_stream()
            .map(move |result| match result {
                Ok(bytes) => match decode::decode(&bytes) {
                    Ok(chunk) => {
                        if decode::is_done(&chunk) {
                            vec![
                                Ok(StreamEvent::Usage(Usage::from_chunk(&chunk))),
                                Ok(StreamEvent::Done),
                            ]
                        } else {
                            let delta = variant.extract_text(&chunk);
                            tracing::trace!(delta = %delta, "stream delta");
                            vec![Ok(StreamEvent::Delta(delta))]
                        }
                    }
                    Err(e) => vec![Err(OllamaError::Decode(e))],
                },
                Err(e) => vec![Err(OllamaError::Streaming(e.to_string()))],
            })
            .flat_map(futures_util::stream::iter);

        Ok(Box::pin(events))
    }

    /// Fold a completion stream into its final text and usage record
    ///
    /// Delta text accumulates while the done flag is unseen; the done chunk
    /// contributes the usage record instead of text.
    pub async fn collect<S>(&self, events: S) -> Result<Completion, OllamaError>
    where
        S: Stream<Item = Result<StreamEvent, OllamaError>>,
    {
        pin_mut!(events);

        let mut text = String::new();
        let mut usage = Usage::default();

        while let Some(event) = events.next().await {
            match event? {
                StreamEvent::Delta(delta) => text.push_str(&delta),
                StreamEvent::Usage(u) => usage = u,
                StreamEvent::Done => break,
            }
        }

        self.record(usage);
        Ok(Completion { text, usage })
    }

    /// Embed inputs via an embeddings endpoint
    ///
    /// The legacy endpoint's flat vector is wrapped as a single row. A
    /// response missing the vector key degrades to an empty result with a
    /// warning rather than failing the caller.
    pub async fn embed(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, OllamaError> {
        let Some(key) = self.variant.embedding_key() else {
            return Err(OllamaError::Unsupported {
                operation: "embed",
                endpoint: self.variant.path(),
            });
        };

        let messages: Vec<Message> = inputs.iter().map(Message::user).collect();
        let bytes = self
            .send(&messages, false, self.timeout)
            .await?
            .bytes()
            .await
            .map_err(|e| OllamaError::from_transport(&e))?;

        let chunk = decode::decode(&bytes)?;
        Ok(Self::embedding_values(&chunk, key))
    }

    fn embedding_values(chunk: &Chunk, key: &str) -> Vec<Vec<f32>> {
        let Some(value) = chunk.get(key) else {
            tracing::warn!(key, "embedding response missing vector payload");
            return Vec::new();
        };

        if let Ok(rows) = serde_json::from_value::<Vec<Vec<f32>>>(value.clone()) {
            return rows;
        }
        if let Ok(row) = serde_json::from_value::<Vec<f32>>(value.clone()) {
            return vec![row];
        }

        tracing::warn!(key, "embedding payload has unexpected shape");
        Vec::new()
    }

    async fn send(
        &self,
        messages: &[Message],
        stream: bool,
        timeout: Duration,
    ) -> Result<reqwest::Response, OllamaError> {
        let body = self.variant.build_request(&self.model, messages, stream, self.temperature);
        let url = format!("{}{}", self.base_url.as_str().trim_end_matches('/'), self.variant.path());

        let mut builder = self.client.post(&url).timeout(timeout).json(&body);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key.expose_secret());
        }

        let response = builder.send().await.map_err(|e| {
            tracing::error!(url = %url, error = %e, "ollama request failed");
            OllamaError::from_transport(&e)
        })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status = %status, "ollama returned error");
            return Err(OllamaError::Upstream {
                status: status.as_u16(),
                body,
            });
        }

        Ok(response)
    }

    fn record(&self, usage: Usage) {
        self.totals.lock().unwrap_or_else(PoisonError::into_inner).record(usage);
    }
}

#[async_trait]
impl TextModel for OllamaClient {
    async fn generate(&self, prompt: &str) -> Result<String, ModelError> {
        let completion = self.complete(&[Message::user(prompt)]).await.map_err(|e| match e {
            OllamaError::Timeout => ModelError::Timeout,
            OllamaError::Decode(decode) => ModelError::Decode(decode.to_string()),
            other => ModelError::Upstream(other.to_string()),
        })?;
        Ok(completion.text)
    }
}
