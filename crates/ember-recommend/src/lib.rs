//! Two-stage tool recommendation for Ember
//!
//! Given a task description and a pool of named capabilities, recall filters
//! the pool to a bounded candidate set cheaply, then rank asks a model to
//! pick the final few. Ranking output is untrusted: it passes a strict
//! parser, one repair round-trip, and a name-resolution step, and every
//! failure along the way degrades to the recall order.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

pub mod bm25;
pub mod recall;
mod rank;
pub mod repair;

use std::sync::Arc;

use indexmap::IndexMap;
use indoc::indoc;
use serde_json::Value;

use ember_config::RecommenderConfig;
use ember_core::{Task, TextModel, Tool, ToolRegistry, ToolSelection};

pub use bm25::Bm25Index;
pub use recall::RecallStrategy;
pub use repair::{ParseError, extract_json_block, parse_json_answer};

const TOOL_INFO_PROMPT: &str = indoc! {"
    ## Capabilities
    - You can call the pre-defined tools listed in 'Available Tools'.
    - You can freely combine them with ordinary code.

    ## Available Tools:
    Each tool is described in JSON format.
    {tool_schemas}
"};

/// Recommends a bounded, ordered subset of a tool pool for a task
///
/// Pool membership is fixed at construction; the pool shares `Arc`s with
/// the canonical registry. Each `recommend` call is independent: nothing is
/// cached across calls and concurrent calls on one instance are safe.
pub struct ToolRecommender {
    pool: IndexMap<String, Arc<Tool>>,
    strategy: RecallStrategy,
    bm25: Option<Bm25Index>,
    force: bool,
    model: Arc<dyn TextModel>,
}

impl ToolRecommender {
    /// Build a recommender over a selection of registry tools
    pub fn new(
        registry: &ToolRegistry,
        selection: &ToolSelection,
        strategy: RecallStrategy,
        force: bool,
        model: Arc<dyn TextModel>,
    ) -> Self {
        let pool = registry.select(selection);
        let bm25 = (strategy == RecallStrategy::Lexical).then(|| {
            let docs: Vec<String> = pool.values().map(|tool| recall::tool_document(tool)).collect();
            Bm25Index::build(docs.iter().map(String::as_str))
        });

        Self {
            pool,
            strategy,
            bm25,
            force,
            model,
        }
    }

    /// Build a recommender from configuration
    pub fn from_config(registry: &ToolRegistry, config: &RecommenderConfig, model: Arc<dyn TextModel>) -> Self {
        let selection = ToolSelection::from_names(&config.tools);
        Self::new(registry, &selection, config.strategy.into(), config.force, model)
    }

    /// The candidate pool, in pool order
    pub fn pool(&self) -> &IndexMap<String, Arc<Tool>> {
        &self.pool
    }

    /// Recommend up to `rank_k` tools for the given context and task
    ///
    /// Forced mode, or a call with neither context nor task, returns the
    /// whole pool: there is no signal to filter on. Otherwise recall bounds
    /// the candidates to `recall_k` and rank selects the final set. This
    /// method never fails; ranking problems degrade to recall order.
    pub async fn recommend(
        &self,
        context: &str,
        task: Option<&Task>,
        recall_k: usize,
        rank_k: usize,
    ) -> Vec<Arc<Tool>> {
        if self.pool.is_empty() {
            return Vec::new();
        }
        if self.force || (context.is_empty() && task.is_none()) {
            return self.pool.values().cloned().collect();
        }

        let recalled = self.recall(context, task, recall_k);
        if recalled.is_empty() {
            tracing::debug!("recall produced no candidates");
            return Vec::new();
        }

        let task_text = task.map_or(context, |t| t.instruction.as_str());
        let ranked = rank::rank(self.model.as_ref(), &recalled, task_text, rank_k).await;

        tracing::info!(
            tools = ?ranked.iter().map(|t| t.name.as_str()).collect::<Vec<_>>(),
            "recommended tools"
        );
        ranked
    }

    /// Format recommended tool schemas as a prompt block
    ///
    /// `fixed` names resolvable in the pool are appended after the
    /// recommendation (without duplication). Returns an empty string when
    /// nothing is recommended, so callers can skip the block entirely.
    pub async fn recommended_tool_info(
        &self,
        context: &str,
        task: Option<&Task>,
        recall_k: usize,
        rank_k: usize,
        fixed: &[String],
    ) -> String {
        let mut recommended = self.recommend(context, task, recall_k, rank_k).await;

        for name in fixed {
            if recommended.iter().any(|tool| &tool.name == name) {
                continue;
            }
            if let Some(tool) = self.pool.get(name) {
                recommended.push(Arc::clone(tool));
            }
        }

        if recommended.is_empty() {
            return String::new();
        }

        let schemas: IndexMap<&str, &Value> = recommended
            .iter()
            .map(|tool| (tool.name.as_str(), &tool.schema))
            .collect();
        let rendered = serde_json::to_string_pretty(&schemas).unwrap_or_else(|_| "{}".to_owned());

        TOOL_INFO_PROMPT.replace("{tool_schemas}", &rendered)
    }

    fn recall(&self, context: &str, task: Option<&Task>, recall_k: usize) -> IndexMap<String, Arc<Tool>> {
        match self.strategy {
            RecallStrategy::TagMatch => recall::tag_match(&self.pool, task, recall_k),
            RecallStrategy::Lexical => {
                let query = task.map_or(context, |t| t.instruction.as_str());
                self.bm25
                    .as_ref()
                    .map_or_else(IndexMap::new, |index| recall::lexical(&self.pool, index, query, recall_k))
            }
            RecallStrategy::Embedding => {
                tracing::debug!("embedding recall is reserved and recalls nothing");
                IndexMap::new()
            }
        }
    }
}
