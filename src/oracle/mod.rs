//! Transcript oracle for scope semantics
//!
//! The oracle runs a scenario, captures what it printed and which exception
//! (if any) escaped, and compares that observation with the pinned
//! expectation.
//!
//! # Example
//!
//! ```rust
//! use scopekit::oracle::{TranscriptOracle, Verdict};
//! use scopekit::scenarios;
//!
//! let oracle = TranscriptOracle::new();
//! let scenario = scenarios::find("procedure_suppresses")?;
//! let result = oracle.verify(scenario)?;
//! assert_eq!(result.verdict, Verdict::Pass);
//! # Ok::<(), scopekit::Error>(())
//! ```

mod diff;

pub use diff::{
    diff_lines, diff_observations, format_diff, normalize_addresses, normalize_line, DiffOptions,
    DiffResult, Difference, DifferenceKind, NORMALIZED_ADDRESS,
};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::RunConfig;
use crate::exception::{Exception, ExceptionKind};
use crate::scenarios::{self, Scenario};
use crate::Result;

/// Exception that escaped a scenario, reduced to comparable text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscapedException {
    /// Exception class
    pub kind: ExceptionKind,
    /// Exception value
    pub message: String,
}

impl From<&Exception> for EscapedException {
    fn from(exc: &Exception) -> Self {
        Self {
            kind: exc.kind(),
            message: exc.message().to_string(),
        }
    }
}

impl fmt::Display for EscapedException {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "{}", self.kind)
        } else {
            write!(f, "{}: {}", self.kind, self.message)
        }
    }
}

/// Everything observable about one scenario run
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Observation {
    /// Printed lines, in order
    pub lines: Vec<String>,
    /// Exception that escaped the outermost scope
    pub escaped: Option<EscapedException>,
}

/// Verdict from verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Observation matches the expectation
    Pass,
    /// Observation differs
    Mismatch {
        /// Differences found
        differences: Vec<Difference>,
    },
}

impl Verdict {
    /// Whether verification passed
    #[must_use]
    pub fn is_pass(&self) -> bool {
        matches!(self, Self::Pass)
    }
}

/// Verification result with full metadata
#[derive(Debug, Clone, Serialize)]
pub struct VerificationResult {
    /// Scenario name
    pub scenario: String,
    /// Pinned expectation
    pub expected: Observation,
    /// What the run produced
    pub actual: Observation,
    /// Verification verdict
    pub verdict: Verdict,
}

/// Oracle that verifies scenarios against their pinned transcripts
#[derive(Debug, Clone, Default)]
pub struct TranscriptOracle {
    config: RunConfig,
}

impl TranscriptOracle {
    /// Create an oracle with default settings (silent, default diff options)
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an oracle from a run configuration
    #[must_use]
    pub fn with_config(config: RunConfig) -> Self {
        Self { config }
    }

    /// Set diff options for comparison
    #[must_use]
    pub fn with_diff_options(mut self, options: DiffOptions) -> Self {
        self.config.diff = options;
        self
    }

    /// Get diff options
    #[must_use]
    pub fn diff_options(&self) -> &DiffOptions {
        &self.config.diff
    }

    /// Compare an observation with its expectation
    #[must_use]
    pub fn compare(&self, expected: &Observation, actual: &Observation) -> Verdict {
        let diff = diff_observations(expected, actual, &self.config.diff);

        if diff.matches {
            Verdict::Pass
        } else {
            Verdict::Mismatch {
                differences: diff.differences,
            }
        }
    }

    /// Run `scenario` and verify it
    ///
    /// # Errors
    ///
    /// Returns an error if the scenario violates the scope protocol
    pub fn verify(&self, scenario: &Scenario) -> Result<VerificationResult> {
        let report = scenario.run(&self.config)?;
        let expected = scenario.expected();
        let verdict = self.compare(&expected, &report.observation);
        debug!(scenario = scenario.name, pass = verdict.is_pass(), "verified scenario");

        Ok(VerificationResult {
            scenario: scenario.name.to_string(),
            expected,
            actual: report.observation,
            verdict,
        })
    }

    /// Verify every scenario in the catalog
    ///
    /// # Errors
    ///
    /// Returns the first protocol violation encountered
    pub fn verify_all(&self) -> Result<Vec<VerificationResult>> {
        scenarios::catalog()
            .iter()
            .map(|scenario| self.verify(scenario))
            .collect()
    }
}
