//! Configuration for Ember
//!
//! TOML-backed configuration with `{{ env.VAR }}` placeholder expansion.
//! Loaded once at startup and passed into constructors; nothing here is
//! read from the environment after `Config::load` returns.

#![allow(clippy::must_use_candidate, clippy::missing_errors_doc)]

mod env;
mod loader;
pub mod ollama;
pub mod recommend;

use serde::Deserialize;

pub use env::expand_env;
pub use ollama::{ApiVariantConfig, OllamaConfig};
pub use recommend::{RecallStrategyConfig, RecommenderConfig};

/// Top-level Ember configuration
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Local-model endpoint configuration
    #[serde(default)]
    pub ollama: OllamaConfig,
    /// Tool recommendation configuration
    #[serde(default)]
    pub recommender: RecommenderConfig,
}
