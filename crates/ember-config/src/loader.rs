//! Loading and validation

use std::path::Path;

use crate::Config;

impl Config {
    /// Load configuration from a TOML file
    ///
    /// Reads the file, expands `{{ env.VAR }}` placeholders, then
    /// deserializes and validates the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, environment variable
    /// expansion fails, TOML parsing fails, or validation fails.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("failed to read config file {}: {e}", path.display()))?;

        let expanded =
            crate::env::expand_env(&raw).map_err(|e| anyhow::anyhow!("config variable expansion failed: {e}"))?;

        let config: Self = toml::from_str(&expanded).map_err(|e| anyhow::anyhow!("failed to parse config: {e}"))?;

        config.validate()?;

        Ok(config)
    }

    /// Validate that the configuration is internally consistent
    ///
    /// # Errors
    ///
    /// Returns an error if the model is empty or the recall/rank bounds are
    /// inverted or zero.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ollama.model.trim().is_empty() {
            anyhow::bail!("ollama.model must not be empty");
        }
        if self.ollama.timeout_secs == 0 {
            anyhow::bail!("ollama.timeout_secs must be at least 1");
        }
        if self.recommender.rank_k == 0 {
            anyhow::bail!("recommender.rank_k must be at least 1");
        }
        if self.recommender.recall_k < self.recommender.rank_k {
            anyhow::bail!(
                "recommender.recall_k ({}) must be >= rank_k ({})",
                self.recommender.recall_k,
                self.recommender.rank_k
            );
        }
        Ok(())
    }
}
