//! Run configuration
//!
//! Shared by [`Scenario::run`](crate::scenarios::Scenario::run), the
//! [`TranscriptOracle`](crate::oracle::TranscriptOracle) and the CLI.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::oracle::DiffOptions;
use crate::Result;

/// How scenarios are run and compared
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunConfig {
    /// Write transcripts to stdout while recording them
    pub echo: bool,
    /// Colour the per-scenario header
    pub color: bool,
    /// Transcript comparison options
    pub diff: DiffOptions,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            echo: false,
            color: true,
            diff: DiffOptions::default(),
        }
    }
}

impl RunConfig {
    /// Configuration for interactive runs: echo on
    #[must_use]
    pub fn interactive() -> Self {
        Self {
            echo: true,
            ..Self::default()
        }
    }

    /// Set echo
    #[must_use]
    pub fn with_echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Set header colouring
    #[must_use]
    pub fn with_color(mut self, color: bool) -> Self {
        self.color = color;
        self
    }

    /// Set diff options
    #[must_use]
    pub fn with_diff_options(mut self, diff: DiffOptions) -> Self {
        self.diff = diff;
        self
    }

    /// Parse a configuration from JSON; missing fields take defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the JSON is malformed
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load a configuration file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }
}
