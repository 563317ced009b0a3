//! Tool recommendation configuration

use serde::Deserialize;

/// Recall strategy selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecallStrategyConfig {
    /// Exact match between task type and tool tags
    TagMatch,
    /// BM25 over tool name, tags, and description
    #[default]
    Lexical,
    /// Embedding similarity (reserved, recalls nothing)
    Embedding,
}

/// Configuration for the tool recommender
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecommenderConfig {
    /// Tool names to draw from, or the `"<all>"` sentinel
    #[serde(default = "default_tools")]
    pub tools: Vec<String>,
    /// Recall strategy
    #[serde(default)]
    pub strategy: RecallStrategyConfig,
    /// Always return the configured tools without recall or ranking
    #[serde(default)]
    pub force: bool,
    /// Candidate-set bound for the recall stage
    #[serde(default = "default_recall_k")]
    pub recall_k: usize,
    /// Final-set bound for the rank stage
    #[serde(default = "default_rank_k")]
    pub rank_k: usize,
}

impl Default for RecommenderConfig {
    fn default() -> Self {
        Self {
            tools: default_tools(),
            strategy: RecallStrategyConfig::default(),
            force: false,
            recall_k: default_recall_k(),
            rank_k: default_rank_k(),
        }
    }
}

fn default_tools() -> Vec<String> {
    vec!["<all>".to_owned()]
}

const fn default_recall_k() -> usize {
    20
}

const fn default_rank_k() -> usize {
    5
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RecommenderConfig::default();
        assert_eq!(config.tools, ["<all>"]);
        assert_eq!(config.strategy, RecallStrategyConfig::Lexical);
        assert_eq!(config.recall_k, 20);
        assert_eq!(config.rank_k, 5);
        assert!(!config.force);
    }

    #[test]
    fn strategy_parses_from_snake_case() {
        let config: RecommenderConfig = toml::from_str("strategy = \"tag_match\"").unwrap();
        assert_eq!(config.strategy, RecallStrategyConfig::TagMatch);
    }
}
