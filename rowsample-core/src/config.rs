//! Session configuration

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default number of rows kept in the sample
pub const DEFAULT_SAMPLE_SIZE: usize = 5000;

/// Default random seed
pub const DEFAULT_SEED: u64 = 1;

/// How rows beyond the sample size are treated
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SamplingMode {
    /// Keep a random reservoir over the whole stream
    #[default]
    Reservoir,

    /// Keep the first `sample_size` rows and ignore the rest
    FirstRows,
}

/// Configuration for a [`StreamSession`](crate::session::StreamSession)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Number of rows to keep; 0 keeps every row
    pub sample_size: usize,

    /// Seed for the reservoir's random generator
    pub seed: u64,

    /// Sampling mode
    pub mode: SamplingMode,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            seed: DEFAULT_SEED,
            mode: SamplingMode::Reservoir,
        }
    }
}

impl SessionConfig {
    /// Random reservoir of `sample_size` rows
    pub fn reservoir(sample_size: usize, seed: u64) -> Self {
        Self {
            sample_size,
            seed,
            mode: SamplingMode::Reservoir,
        }
    }

    /// First `sample_size` rows of the stream
    pub fn first_rows(sample_size: usize) -> Self {
        Self {
            sample_size,
            mode: SamplingMode::FirstRows,
            ..Self::default()
        }
    }

    /// Row cap after which further rows are ignored, if any
    pub fn row_cap(&self) -> Option<u64> {
        match self.mode {
            SamplingMode::FirstRows if self.sample_size > 0 => Some(self.sample_size as u64),
            _ => None,
        }
    }

    /// Parse a configuration from JSON; absent fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration from a JSON file
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Self::from_json_str(&text)
    }
}
