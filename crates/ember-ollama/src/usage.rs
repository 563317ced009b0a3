//! Token usage extracted from completion chunks

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::decode::Chunk;

/// Token usage for one completed request
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Usage {
    /// Tokens consumed by the prompt
    pub prompt_tokens: u64,
    /// Tokens generated by the model
    pub completion_tokens: u64,
}

impl Usage {
    /// Read usage counters from a done chunk; absent fields read as zero
    pub fn from_chunk(chunk: &Chunk) -> Self {
        let count = |key: &str| chunk.get(key).and_then(Value::as_u64).unwrap_or(0);
        Self {
            prompt_tokens: count("prompt_eval_count"),
            completion_tokens: count("eval_count"),
        }
    }

    /// Total tokens for the request
    pub const fn total_tokens(self) -> u64 {
        self.prompt_tokens + self.completion_tokens
    }
}

/// Running usage totals across a client's lifetime
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UsageTotals {
    /// Completed requests recorded
    pub requests: u64,
    /// Prompt tokens across all requests
    pub prompt_tokens: u64,
    /// Completion tokens across all requests
    pub completion_tokens: u64,
}

impl UsageTotals {
    /// Fold one request's usage into the totals
    pub fn record(&mut self, usage: Usage) {
        self.requests += 1;
        self.prompt_tokens += usage.prompt_tokens;
        self.completion_tokens += usage.completion_tokens;
    }
}
