// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! YAML configuration for conversion jobs.

use crate::delivery::DEFAULT_MAX_ATTEMPTS;
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

/// Measurement used when none is configured.
pub const DEFAULT_MEASUREMENT: &str = "sample_measurement";

/// A conversion job: how CSV columns map to Line Protocol and where the
/// result goes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct JobConfig {
    /// InfluxDB measurement name.
    #[serde(default = "default_measurement")]
    pub measurement: String,
    /// Columns used as tags; `["*"]` selects every non-field column.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Columns used as fields, as `name` or `name:type`.
    #[serde(default)]
    pub fields: Vec<String>,
    /// Timestamp applied to every line (RFC 3339, date, or epoch ns).
    pub timestamp: Option<String>,
    /// CSV delimiter. None = comma.
    pub delimiter: Option<char>,
    /// Output file, or directory when ending with a path separator.
    pub output_path: Option<String>,
    /// InfluxDB write endpoint URL.
    pub load_url: Option<String>,
    /// Delivery attempts per file. None = default (3).
    pub max_attempts: Option<u32>,
}

fn default_measurement() -> String {
    DEFAULT_MEASUREMENT.to_string()
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            measurement: default_measurement(),
            tags: Vec::new(),
            fields: Vec::new(),
            timestamp: None,
            delimiter: None,
            output_path: None,
            load_url: None,
            max_attempts: None,
        }
    }
}

/// Configuration parsing errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("YAML parse error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JobConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: JobConfig = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Parse configuration from a YAML file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Effective number of delivery attempts.
    pub fn attempts(&self) -> u32 {
        self.max_attempts.unwrap_or(DEFAULT_MAX_ATTEMPTS)
    }
}
