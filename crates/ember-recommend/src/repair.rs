//! Parsing of untrusted model completions
//!
//! The ranking answer is modeled as a strict grammar (a JSON array of
//! strings, optionally fenced); anything else is a parse error that feeds
//! the fallback ladder. No creative recovery happens here beyond stripping
//! the fence.

use serde_json::Value;
use thiserror::Error;

/// Why a completion failed to parse as a JSON answer
#[derive(Debug, Error)]
pub enum ParseError {
    /// The completion is prose, not a JSON value
    #[error("completion is not structurally JSON: {0}")]
    NotJson(String),

    /// The completion looked like JSON but did not decode
    #[error("JSON decode failed: {0}")]
    Decode(String),
}

/// Strip an optional Markdown code fence, returning the inner block
///
/// Accepts ```` ```json ```` and bare ```` ``` ```` fences. Text without a
/// complete fence passes through trimmed.
pub fn extract_json_block(text: &str) -> &str {
    let trimmed = text.trim();
    let Some(open) = trimmed.find("```") else {
        return trimmed;
    };
    let after_fence = &trimmed[open + 3..];
    // The rest of the fence line is a language tag; content starts after it
    let Some((_, content)) = after_fence.split_once('\n') else {
        return trimmed;
    };
    let Some(close) = content.find("```") else {
        return trimmed;
    };
    content[..close].trim()
}

/// Parse a model completion as a JSON value
///
/// A block that does not open with `[` or `{` is rejected before decoding:
/// bare strings and prose are parse failures, not answers.
pub fn parse_json_answer(text: &str) -> Result<Value, ParseError> {
    let block = extract_json_block(text);
    if !block.starts_with('[') && !block.starts_with('{') {
        let mut preview: String = block.chars().take(80).collect();
        if preview.is_empty() {
            preview.push_str("<empty>");
        }
        return Err(ParseError::NotJson(preview));
    }
    serde_json::from_str(block).map_err(|e| ParseError::Decode(e.to_string()))
}
