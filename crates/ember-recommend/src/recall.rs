//! Recall strategies: cheap, high-recall filtering of the tool pool

use std::sync::Arc;

use indexmap::IndexMap;

use ember_config::RecallStrategyConfig;
use ember_core::{Task, Tool};

use crate::bm25::Bm25Index;

/// How candidates are recalled from the pool
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecallStrategy {
    /// Exact match between the task's type and tool tags
    TagMatch,
    /// BM25 over tool name, tags, and description
    Lexical,
    /// Embedding similarity; reserved extension point, recalls nothing
    Embedding,
}

impl From<RecallStrategyConfig> for RecallStrategy {
    fn from(config: RecallStrategyConfig) -> Self {
        match config {
            RecallStrategyConfig::TagMatch => Self::TagMatch,
            RecallStrategyConfig::Lexical => Self::Lexical,
            RecallStrategyConfig::Embedding => Self::Embedding,
        }
    }
}

/// Tag-match recall
///
/// A task type filters the pool to tools carrying that tag; without a task
/// (or a type on it) there is no filter signal, so the first `k` pool
/// entries are returned in pool order.
pub(crate) fn tag_match(
    pool: &IndexMap<String, Arc<Tool>>,
    task: Option<&Task>,
    k: usize,
) -> IndexMap<String, Arc<Tool>> {
    let Some(task_type) = task.and_then(|t| t.task_type.as_deref()) else {
        return pool.iter().take(k).map(|(n, t)| (n.clone(), Arc::clone(t))).collect();
    };

    pool.iter()
        .filter(|(_, tool)| tool.tags.iter().any(|tag| tag == task_type))
        .take(k)
        .map(|(n, t)| (n.clone(), Arc::clone(t)))
        .collect()
}

/// Lexical recall over the prebuilt BM25 index
///
/// The index was built over the pool in pool order, so score indices map
/// directly onto pool positions.
pub(crate) fn lexical(
    pool: &IndexMap<String, Arc<Tool>>,
    index: &Bm25Index,
    query: &str,
    k: usize,
) -> IndexMap<String, Arc<Tool>> {
    index
        .top_k(query, k)
        .into_iter()
        .filter_map(|position| pool.get_index(position))
        .map(|(n, t)| (n.clone(), Arc::clone(t)))
        .collect()
}

/// The per-tool document indexed for lexical recall
pub(crate) fn tool_document(tool: &Tool) -> String {
    format!("{} {}: {}", tool.name, tool.tags.join(" "), tool.description)
}
