//! Configuration management for Chroma CC
//!
//! Handles loading, parsing, and hot-reloading of YAML configuration files.

pub mod watcher;

use crate::emitter::ChangeDiffEmitter;
use crate::midi::MidiChannel;
use crate::surface::ControlSurface;
use crate::registry::{ControlDefinition, ControlRegistry};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::fs;

pub use watcher::ConfigWatcher;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub midi: MidiConfig,
    #[serde(default)]
    pub engine: EngineConfig,
    /// Replaces the built-in control table when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub controls: Option<Vec<ControlDefinition>>,
    /// Values applied before the first tick
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub initial_values: HashMap<String, i32>,
}

/// MIDI output configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct MidiConfig {
    /// Output channel (1-16)
    #[serde(default = "default_channel")]
    pub channel: i32,
}

/// Processing loop configuration
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// Interval between diff ticks
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

impl Default for MidiConfig {
    fn default() -> Self {
        Self {
            channel: default_channel(),
        }
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl EngineConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }
}

impl AppConfig {
    /// Load configuration from file
    pub async fn load(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read config file: {}", path))?;

        Self::parse(&contents).with_context(|| format!("Invalid config file: {}", path))
    }

    /// Parse and validate YAML
    pub fn parse(contents: &str) -> Result<Self> {
        let config: AppConfig =
            serde_yaml::from_str(contents).context("Failed to parse YAML config")?;
        config.channel()?;
        // Dry-run restore against a scratch emitter
        ChangeDiffEmitter::new(config.registry()?)
            .restore(config.initial_values())
            .context("Invalid initial_values")?;
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

    pub fn channel(&self) -> Result<MidiChannel> {
        MidiChannel::new(self.midi.channel).context("Invalid midi.channel")
    }

    /// Control registry from `controls`, or the built-in table
    pub fn registry(&self) -> Result<Arc<ControlRegistry>> {
        let registry = match &self.controls {
            Some(controls) => {
                ControlRegistry::new(controls.clone()).context("Invalid controls table")?
            }
            None => ControlRegistry::chroma_console(),
        };
        Ok(Arc::new(registry))
    }

    /// Surface on the configured channel with `initial_values` applied
    pub fn surface(&self) -> Result<ControlSurface> {
        let mut surface = ControlSurface::new(self.registry()?, self.channel()?);
        surface
            .restore(self.initial_values())
            .context("Invalid initial_values")?;
        Ok(surface)
    }

    /// Sections that differ from `previous` but only take effect on restart
    pub fn startup_only_changes(&self, previous: &AppConfig) -> Vec<&'static str> {
        let mut changed = Vec::new();
        if self.controls != previous.controls {
            changed.push("controls");
        }
        if self.initial_values != previous.initial_values {
            changed.push("initial_values");
        }
        changed
    }

    /// `initial_values` in the shape `restore` takes
    pub fn initial_values(&self) -> impl Iterator<Item = (&str, i32)> + '_ {
        self.initial_values
            .iter()
            .map(|(identifier, value)| (identifier.as_str(), *value))
    }
}

// Default value functions
fn default_channel() -> i32 { 1 }
fn default_tick_ms() -> u64 { 10 }
