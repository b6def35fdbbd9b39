//! Configuration management for the NES touch pad
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.
//!
//! ```yaml
//! controller:
//!   debounce_ms: 10
//! layout:
//!   up:    { x: 60,  y: 440, width: 50, height: 50 }
//!   a:     { x: 280, y: 480, width: 50, height: 50 }
//! ```

pub mod watcher;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tokio::fs;
use tracing::warn;

use crate::input::touchpad::{LogicalButton, Rect};

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub controller: ControllerConfig,
    /// Hit box of each on-screen button; buttons left out are not mounted
    #[serde(default)]
    pub layout: BTreeMap<LogicalButton, Rect>,
}

/// Input controller tuning
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ControllerConfig {
    /// Minimum spacing between accepted moves of the same contacts (0 disables)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
        }
    }
}

impl AppConfig {
    /// Load configuration from file with validation
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::from_yaml(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate configuration from a YAML string
    pub fn from_yaml(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;

        config.validate()?;

        Ok(config)
    }

    /// Save configuration to file
    pub async fn save(&self, path: &str) -> Result<()> {
        let yaml = serde_yaml::to_string(self).context("Failed to serialize config to YAML")?;

        fs::write(path, yaml)
            .await
            .with_context(|| format!("Failed to write config file: {}", path))?;

        Ok(())
    }

    /// Validate configuration for correctness and consistency
    pub fn validate(&self) -> Result<()> {
        if self.layout.is_empty() {
            anyhow::bail!("Layout must define at least one button region");
        }

        for (button, rect) in &self.layout {
            rect.validate(*button)
                .with_context(|| format!("Invalid layout entry '{}'", button.name()))?;
        }

        // Overlap is legal (precedence decides) but usually a layout mistake
        let entries: Vec<_> = self.layout.iter().collect();
        for (i, (a, ra)) in entries.iter().enumerate() {
            for (b, rb) in entries.iter().skip(i + 1) {
                if ra.intersects(rb) {
                    warn!("Layout regions {} and {} overlap; {} takes precedence", a, b, a);
                }
            }
        }

        Ok(())
    }
}

// Default value functions
fn default_debounce_ms() -> u64 { 10 }
