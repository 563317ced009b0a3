//! Tolerant response-body decoding
//!
//! One HTTP response body becomes exactly one [`Chunk`], regardless of how
//! the server framed it. Individual unparseable lines are skipped because a
//! network read may split a JSON value across chunk boundaries; the policy
//! only requires that at least one line parse on its own.

use serde_json::{Value, json};
use thiserror::Error;

/// One decoded unit of model output
pub type Chunk = Value;

/// Maximum number of characters of raw payload carried in an error chunk
pub const RAW_EXCERPT_CHARS: usize = 200;

/// Fatal decode failures
///
/// Everything short of invalid text degrades to an error-tagged chunk; only
/// a body that is not UTF-8 at all is raised, since no recovery exists at
/// this layer.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The payload is not valid UTF-8
    #[error("response body is not valid UTF-8: {0}")]
    InvalidText(#[from] std::str::Utf8Error),
}

/// Decode a raw response body into a single chunk
///
/// Handles three wire shapes: a single JSON object, newline-delimited JSON
/// objects, and SSE framing (`data: ` prefixes, `[DONE]` sentinel). When
/// multiple objects parse, the last one wins -- later streaming chunks
/// supersede earlier state for the same logical turn.
///
/// A payload where nothing parses yields an error-tagged chunk carrying the
/// message and a truncated excerpt of the raw text; the parse failure never
/// propagates.
pub fn decode(payload: &[u8]) -> Result<Chunk, DecodeError> {
    let text = std::str::from_utf8(payload)?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut last_parsed: Option<Value> = None;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let line = line.strip_prefix("data: ").unwrap_or(line);
        if line == "[DONE]" {
            continue;
        }
        match serde_json::from_str::<Value>(line) {
            Ok(value) => last_parsed = Some(value),
            // Possibly a fragment of a value split across reads
            Err(_) => continue,
        }
    }

    if let Some(value) = last_parsed {
        return Ok(value);
    }

    // No line parsed on its own: the body may be a single object whose
    // string values contain embedded newlines, which the line split above
    // fragmented. Try the whole text as one value.
    match serde_json::from_str::<Value>(text) {
        Ok(value) => Ok(value),
        Err(e) => {
            tracing::warn!(error = %e, excerpt = %excerpt(text), "failed to decode model response");
            Ok(error_chunk(&format!("JSON parsing failed: {e}"), text))
        }
    }
}

/// Build the error-tagged chunk returned when nothing in a payload parses
pub fn error_chunk(message: &str, raw: &str) -> Chunk {
    json!({
        "error": message,
        "raw_data": excerpt(raw),
    })
}

/// Whether a chunk carries the decode-failure tag
pub fn is_error_chunk(chunk: &Chunk) -> bool {
    chunk.get("error").is_some_and(Value::is_string)
}

/// Whether a chunk signals stream completion
pub fn is_done(chunk: &Chunk) -> bool {
    chunk.get("done").and_then(Value::as_bool).unwrap_or(false)
}

fn excerpt(raw: &str) -> String {
    raw.chars().take(RAW_EXCERPT_CHARS).collect()
}

#[cfg(test)]
mod tests {
    use indoc::indoc;
    use serde_json::json;

    use super::*;

    #[test]
    fn single_object_passes_through() {
        let chunk = decode(br#"{"model":"llama3.1","response":"hi","done":true}"#).unwrap();
        assert_eq!(chunk, json!({"model": "llama3.1", "response": "hi", "done": true}));
    }

    #[test]
    fn ndjson_returns_last_object() {
        let payload = indoc! {br#"
            {"response":"a","done":false}
            {"response":"b","done":false}
            {"response":"","done":true,"eval_count":7}
        "#};
        let chunk = decode(payload).unwrap();
        assert_eq!(chunk["done"], json!(true));
        assert_eq!(chunk["eval_count"], json!(7));
    }

    #[test]
    fn invalid_lines_are_skipped_without_raising() {
        let payload = b"{\"a\":1}\nnot json at all\n{\"a\":2}\n{\"broken\":";
        let chunk = decode(payload).unwrap();
        assert_eq!(chunk, json!({"a": 2}));
    }

    #[test]
    fn sse_framing_with_done_sentinel() {
        let chunk = decode(b"data: {\"a\":1}\ndata: [DONE]\n").unwrap();
        assert_eq!(chunk, json!({"a": 1}));
    }

    #[test]
    fn bare_done_sentinel_is_skipped() {
        let chunk = decode(b"{\"a\":1}\n[DONE]\n").unwrap();
        assert_eq!(chunk, json!({"a": 1}));
    }

    #[test]
    fn whole_body_fallback_for_embedded_newlines() {
        // No single line parses, but the whole body is one object
        let payload = b"{\"message\": {\"role\": \"assistant\",\n\"content\": \"line one\\nline two\"}\n}";
        let chunk = decode(payload).unwrap();
        assert_eq!(chunk["message"]["content"], json!("line one\nline two"));
    }

    #[test]
    fn bom_is_stripped() {
        let payload = "\u{feff}{\"a\":1}".as_bytes();
        assert_eq!(decode(payload).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn garbage_becomes_error_chunk() {
        let raw = "x".repeat(500);
        let chunk = decode(raw.as_bytes()).unwrap();
        assert!(is_error_chunk(&chunk));
        let excerpt = chunk["raw_data"].as_str().unwrap();
        assert_eq!(excerpt.chars().count(), RAW_EXCERPT_CHARS);
        assert!(excerpt.starts_with("xxx"));
    }

    #[test]
    fn excerpt_truncates_characters_not_bytes() {
        let raw = "é".repeat(300);
        let chunk = decode(raw.as_bytes()).unwrap();
        assert_eq!(chunk["raw_data"].as_str().unwrap().chars().count(), RAW_EXCERPT_CHARS);
    }

    #[test]
    fn invalid_utf8_is_fatal() {
        let err = decode(&[0xff, 0xfe, 0x00]);
        assert!(matches!(err, Err(DecodeError::InvalidText(_))));
    }

    #[test]
    fn empty_body_becomes_error_chunk() {
        let chunk = decode(b"").unwrap();
        assert!(is_error_chunk(&chunk));
    }

    #[test]
    fn done_flag_detection() {
        assert!(is_done(&json!({"done": true})));
        assert!(!is_done(&json!({"done": false})));
        assert!(!is_done(&json!({"response": "hi"})));
        assert!(!is_done(&json!({"done": "true"})));
    }
}
