//! Reconciler configuration.
//!
//! Configuration is a plain YAML document:
//!
//! ```yaml
//! models:
//!   - gpt-4o-mini
//!   - gpt-4o
//! context: "Prefer legal entity names over trade names."
//! api_keys:
//!   gpt-4o: sk-...
//! weights:
//!   lexical: 0.8
//!   model: 1.2
//! cache_ttl_hours: 24
//! ```
//!
//! Only `models` is required. API keys are opaque here; they are handed
//! to the completion client untouched.

use std::collections::HashMap;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::domain::ConfidenceWeights;

/// Configuration for a [`Reconciler`](crate::reconcile::Reconciler)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReconcilerConfig {
    /// Model identifiers in priority order
    pub models: Vec<String>,

    /// Free-text context steering domain-specific matching rules
    #[serde(default)]
    pub context: Option<String>,

    /// Per-model API keys, passed through to the completion client
    #[serde(default)]
    pub api_keys: HashMap<String, String>,

    /// Confidence weighting policy
    #[serde(default)]
    pub weights: ConfidenceWeights,

    /// Staleness window for cached match results, in hours
    #[serde(default = "default_cache_ttl_hours")]
    pub cache_ttl_hours: u32,
}

fn default_cache_ttl_hours() -> u32 {
    24
}

impl ReconcilerConfig {
    /// Configuration with just a model list, everything else default
    pub fn with_models<M, S>(models: M) -> Self
    where
        M: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            models: models.into_iter().map(Into::into).collect(),
            context: None,
            api_keys: HashMap::new(),
            weights: ConfidenceWeights::default(),
            cache_ttl_hours: default_cache_ttl_hours(),
        }
    }

    /// Load configuration from a YAML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_yaml(&content)
    }

    /// Parse configuration from YAML content
    pub fn from_yaml(content: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(content).context("Failed to parse config YAML")?;
        config.validate()?;
        Ok(config)
    }

    /// Staleness window for the match-result cache
    pub fn cache_window(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.cache_ttl_hours))
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.models.is_empty() {
            anyhow::bail!("Config must list at least one model");
        }
        if self.models.iter().any(|m| m.is_empty()) {
            anyhow::bail!("Model identifiers cannot be empty");
        }
        if self.cache_ttl_hours == 0 {
            anyhow::bail!("cache_ttl_hours must be at least 1");
        }
        Ok(())
    }
}
