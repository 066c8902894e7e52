//! Viewer configuration.
//!
//! Loaded from a TOML file; every key has a default so a partial (or
//! missing) file is fine.
//!
//! ```toml
//! fanout_threshold = 4
//!
//! [layout]
//! name = "dagre"
//! fit = true
//! ```

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::entry_point::DEFAULT_FANOUT_THRESHOLD;
use crate::error::TraceViewError;

/// Settings handed to the layout collaborator after every visibility change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub name: String,
    pub fit: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            name: "dagre".to_string(),
            fit: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Minimum direct child count for a node to be flagged as a fan-out.
    pub fanout_threshold: usize,
    pub layout: LayoutConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            fanout_threshold: DEFAULT_FANOUT_THRESHOLD,
            layout: LayoutConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: ViewerConfig = toml::from_str(content).context("Invalid viewer config")?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config = Self::from_toml_str(&content)
            .with_context(|| format!("Failed to load config {}", path.display()))?;
        info!(
            "Loaded config from {} (fanout_threshold={}, layout={})",
            path.display(),
            config.fanout_threshold,
            config.layout.name
        );
        Ok(config)
    }

    pub fn validate(&self) -> std::result::Result<(), TraceViewError> {
        if self.fanout_threshold == 0 {
            return Err(TraceViewError::InvalidConfig(
                "fanout_threshold must be at least 1".to_string(),
            ));
        }
        if self.layout.name.trim().is_empty() {
            return Err(TraceViewError::InvalidConfig(
                "layout.name must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
