//! LLM-driven ranking of recalled candidates
//!
//! Ranking is a refinement, not a requirement: every failure mode in this
//! module degrades to the recall order rather than surfacing an error to
//! the agent loop.

use std::sync::Arc;

use indexmap::IndexMap;
use indoc::indoc;
use serde_json::Value;

use ember_core::{TextModel, Tool};

use crate::repair::{ParseError, parse_json_answer};

const RANK_PROMPT: &str = indoc! {r#"
    ## User Requirement:
    {task}

    ## Task
    Select up to {topk} tools from "Available Tools" that best help with the
    user requirement.

    ## Available Tools:
    {tools}

    ## Selection Rules:
    - Choose only tools relevant to the requirement.
    - If no tool fits, return an empty list [].
    - List tool names only, with no other information.
    - Every chosen name must appear in "Available Tools".

    ## Output Format:
    ```json
    ["tool_name1", "tool_name2"]
    ```

    Return the JSON list of tool names directly, without explanation.
"#};

const REPAIR_PROMPT: &str = indoc! {r#"
    The JSON below failed to parse with this error: {error}

    Fix the content so it is a valid JSON array of strings. Return only the
    corrected JSON, without explanation.

    {json}
"#};

/// Rank recalled candidates with the model, degrading on any failure
///
/// The returned list is always a subset of `candidates` and never longer
/// than `rank_k`.
pub(crate) async fn rank(
    model: &dyn TextModel,
    candidates: &IndexMap<String, Arc<Tool>>,
    task_text: &str,
    rank_k: usize,
) -> Vec<Arc<Tool>> {
    let prompt = build_rank_prompt(candidates, task_text, rank_k);

    let raw = match model.generate(&prompt).await {
        Ok(raw) => raw,
        Err(e) => {
            tracing::warn!(error = %e, "rank completion failed, falling back to recall order");
            return fallback(candidates, rank_k);
        }
    };

    let value = match parse_json_answer(&raw) {
        Ok(value) => value,
        Err(e) => {
            tracing::warn!(error = %e, "rank output unparseable, attempting repair");
            match repair_round_trip(model, &raw, &e).await {
                Ok(value) => value,
                Err(repair_error) => {
                    tracing::warn!(error = %repair_error, "JSON repair failed, falling back to recall order");
                    return fallback(candidates, rank_k);
                }
            }
        }
    };

    // Tolerate the model wrapping the array in an object
    let value = match value {
        Value::Object(map) => map.into_iter().next().map_or(Value::Null, |(_, inner)| inner),
        other => other,
    };

    let names: Vec<String> = match value {
        Value::Array(items) => items
            .into_iter()
            .filter_map(|item| item.as_str().map(ToOwned::to_owned))
            .collect(),
        other => {
            tracing::warn!(value = %other, "rank result is not a list, keeping all candidates");
            candidates.keys().cloned().collect()
        }
    };

    resolve(candidates, &names, rank_k)
}

/// One re-prompt asking the model to fix its own malformed output
async fn repair_round_trip(model: &dyn TextModel, raw: &str, error: &ParseError) -> Result<Value, String> {
    let prompt = REPAIR_PROMPT
        .replace("{error}", &error.to_string())
        .replace("{json}", raw);

    let repaired = model.generate(&prompt).await.map_err(|e| e.to_string())?;
    parse_json_answer(&repaired).map_err(|e| e.to_string())
}

fn build_rank_prompt(candidates: &IndexMap<String, Arc<Tool>>, task_text: &str, rank_k: usize) -> String {
    let available: IndexMap<&str, &str> = candidates
        .iter()
        .map(|(name, tool)| (name.as_str(), tool.description.as_str()))
        .collect();
    let tools = serde_json::to_string_pretty(&available).unwrap_or_else(|_| "{}".to_owned());

    RANK_PROMPT
        .replace("{task}", task_text)
        .replace("{topk}", &rank_k.to_string())
        .replace("{tools}", &tools)
}

/// Resolve ranked names against the candidate set, dropping the rest
///
/// Candidates hold the canonical registry `Arc`s, so resolving here both
/// validates names and keeps the result a subset of what recall produced.
fn resolve(candidates: &IndexMap<String, Arc<Tool>>, names: &[String], rank_k: usize) -> Vec<Arc<Tool>> {
    let mut resolved: IndexMap<&str, Arc<Tool>> = IndexMap::new();
    for name in names {
        match candidates.get(name.as_str()) {
            Some(tool) => {
                resolved.entry(name.as_str()).or_insert_with(|| Arc::clone(tool));
            }
            None => tracing::debug!(tool = %name, "dropping name outside the candidate set"),
        }
    }
    resolved.into_values().take(rank_k).collect()
}

fn fallback(candidates: &IndexMap<String, Arc<Tool>>, rank_k: usize) -> Vec<Arc<Tool>> {
    candidates.values().take(rank_k).cloned().collect()
}
