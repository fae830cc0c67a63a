// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Loader configuration and per-call parameter overrides

use crate::error::{LoaderError, LoaderResult};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default number of points sampled per surface
pub const DEFAULT_SAMPLES: usize = 1024;
/// Config file picked up by [`LoaderConfig::load`]
pub const CONFIG_FILE: &str = "polycloud.toml";

/// Immutable loader defaults
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Points to sample per surface
    pub samples: usize,
    /// Sample each geometry into its own chunk instead of one combined mesh
    pub as_chunks: bool,
    /// Clear the inline uri or blob once it has been loaded
    pub drop_content: bool,
    /// Fixed sampling seed; stochastic when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<u64>,
    /// Directory for temporary files; OS temp dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temp_dir: Option<PathBuf>,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            samples: DEFAULT_SAMPLES,
            as_chunks: false,
            drop_content: true,
            seed: None,
            temp_dir: None,
        }
    }
}

/// Per-call overrides; unset fields fall back to the [`LoaderConfig`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Parameters {
    pub samples: Option<usize>,
    pub as_chunks: Option<bool>,
    pub drop_content: Option<bool>,
    pub seed: Option<u64>,
}

impl Parameters {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn samples(mut self, samples: usize) -> Self {
        self.samples = Some(samples);
        self
    }

    pub fn as_chunks(mut self, as_chunks: bool) -> Self {
        self.as_chunks = Some(as_chunks);
        self
    }

    pub fn drop_content(mut self, drop_content: bool) -> Self {
        self.drop_content = Some(drop_content);
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Parse a JSON `parameters` object
    pub fn from_json(json: &str) -> LoaderResult<Self> {
        serde_json::from_str(json).map_err(|e| LoaderError::InvalidConfig(e.to_string()))
    }
}

impl LoaderConfig {
    /// Load configuration from a TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {:?}", path.as_ref()))?;
        let config: LoaderConfig = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {:?}", path.as_ref()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load `polycloud.toml` when present, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = if PathBuf::from(CONFIG_FILE).exists() {
            Self::from_file(CONFIG_FILE)?
        } else {
            Self::default()
        };

        if let Ok(samples) = std::env::var("POLYCLOUD_SAMPLES") {
            config.samples = samples
                .parse()
                .with_context(|| format!("POLYCLOUD_SAMPLES is not a number: {}", samples))?;
        }

        if let Ok(as_chunks) = std::env::var("POLYCLOUD_AS_CHUNKS") {
            config.as_chunks = as_chunks.parse().unwrap_or(config.as_chunks);
        }

        if let Ok(drop_content) = std::env::var("POLYCLOUD_DROP_CONTENT") {
            config.drop_content = drop_content.parse().unwrap_or(config.drop_content);
        }

        if let Ok(seed) = std::env::var("POLYCLOUD_SEED") {
            config.seed = seed.parse().ok();
        }

        if let Ok(temp_dir) = std::env::var("POLYCLOUD_TEMP_DIR") {
            config.temp_dir = Some(PathBuf::from(temp_dir));
        }

        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path.as_ref(), content)
            .with_context(|| format!("Failed to write config file: {:?}", path.as_ref()))?;
        Ok(())
    }

    pub fn validate(&self) -> LoaderResult<()> {
        if self.samples == 0 {
            return Err(LoaderError::InvalidConfig(
                "samples must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Resolve per-call overrides into a new configuration
    pub fn merge(&self, params: &Parameters) -> LoaderResult<LoaderConfig> {
        let merged = LoaderConfig {
            samples: params.samples.unwrap_or(self.samples),
            as_chunks: params.as_chunks.unwrap_or(self.as_chunks),
            drop_content: params.drop_content.unwrap_or(self.drop_content),
            seed: params.seed.or(self.seed),
            temp_dir: self.temp_dir.clone(),
        };
        merged.validate()?;
        Ok(merged)
    }
}
