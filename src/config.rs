//! Tunables shared by the path-finding algorithms.
//!
//! A `Config` can be built in code or read from a TOML file:
//!
//! ```toml
//! default_edge_weight = 1.0
//! max_expansions = 50000
//! reweight_tolerance = 1e-9
//! ```

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Cost of an edge that carries no weight of its own. Must not be
    /// negative: A* never reopens a closed node.
    #[serde(default = "default_edge_weight")]
    pub default_edge_weight: f64,

    /// Upper bound on A* expansions before the search gives up (None = unbounded).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_expansions: Option<usize>,

    /// Slack below zero accepted for reweighted costs (float noise is clamped to 0).
    #[serde(default = "default_reweight_tolerance")]
    pub reweight_tolerance: f64,
}

fn default_edge_weight() -> f64 {
    1.0
}

fn default_reweight_tolerance() -> f64 {
    1e-9
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_edge_weight: default_edge_weight(),
            max_expansions: None,
            reweight_tolerance: default_reweight_tolerance(),
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content).context("Failed to parse graph config")?;
        config.check()?;
        Ok(config)
    }

    /// Load configuration from a TOML file. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("no graph config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read graph config: {}", path.display()))?;

        Self::from_toml_str(&content)
            .with_context(|| format!("Invalid graph config: {}", path.display()))
    }

    /// Unchecked; a negative weight makes A* results suboptimal.
    pub fn with_default_edge_weight(mut self, weight: f64) -> Self {
        self.default_edge_weight = weight;
        self
    }

    pub fn with_max_expansions(mut self, limit: usize) -> Self {
        self.max_expansions = Some(limit);
        self
    }

    fn check(&self) -> Result<()> {
        if !self.default_edge_weight.is_finite() || self.default_edge_weight < 0.0 {
            anyhow::bail!(
                "default_edge_weight must be finite and non-negative, got {}",
                self.default_edge_weight
            );
        }
        if self.reweight_tolerance.is_nan() || self.reweight_tolerance < 0.0 {
            anyhow::bail!(
                "reweight_tolerance must be non-negative, got {}",
                self.reweight_tolerance
            );
        }
        Ok(())
    }
}
