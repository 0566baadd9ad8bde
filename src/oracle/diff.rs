//! Transcript diffing utilities for verification
//!
//! Compares observed console transcripts line by line, with normalization
//! options for whitespace, case and traceback addresses.

use std::fmt::Write;

use serde::{Deserialize, Serialize};

use super::Observation;

/// Placeholder that every `0x…` address is rewritten to when normalizing
pub const NORMALIZED_ADDRESS: &str = "0x000000000000";

/// Options for transcript comparison
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)]
pub struct DiffOptions {
    /// Normalize whitespace (collapse multiple spaces, trim lines)
    pub normalize_whitespace: bool,
    /// Ignore trailing whitespace on lines
    pub ignore_trailing_whitespace: bool,
    /// Ignore case when comparing
    pub ignore_case: bool,
    /// Rewrite hexadecimal addresses so tracebacks compare equal
    pub normalize_addresses: bool,
    /// Ignore which exception (if any) escaped the scope
    pub ignore_escaped: bool,
}

impl Default for DiffOptions {
    fn default() -> Self {
        Self {
            normalize_whitespace: false,
            ignore_trailing_whitespace: true,
            ignore_case: false,
            normalize_addresses: true,
            ignore_escaped: false,
        }
    }
}

impl DiffOptions {
    /// Create strict comparison options
    ///
    /// Addresses are still normalized: they differ on every run.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            normalize_whitespace: false,
            ignore_trailing_whitespace: false,
            ignore_case: false,
            normalize_addresses: true,
            ignore_escaped: false,
        }
    }

    /// Create lenient comparison options
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            normalize_whitespace: true,
            ignore_trailing_whitespace: true,
            ignore_case: true,
            normalize_addresses: true,
            ignore_escaped: true,
        }
    }
}

/// Result of a diff operation
#[derive(Debug, Clone, Serialize)]
pub struct DiffResult {
    /// Whether the observations match
    pub matches: bool,
    /// Differences found (if any)
    pub differences: Vec<Difference>,
}

/// A single difference between expected and actual observation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difference {
    /// Line number (1-indexed, 0 for the escaped exception)
    pub line: usize,
    /// Expected content
    pub expected: String,
    /// Actual content
    pub actual: String,
    /// Type of difference
    pub kind: DifferenceKind,
}

/// Type of difference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DifferenceKind {
    /// Line content differs
    ContentMismatch,
    /// Line missing in actual
    MissingLine,
    /// Extra line in actual
    ExtraLine,
    /// A different exception (or none) escaped the scope
    EscapeMismatch,
}

/// Compare two observations
#[must_use]
pub fn diff_observations(
    expected: &Observation,
    actual: &Observation,
    options: &DiffOptions,
) -> DiffResult {
    let mut differences = diff_lines(&expected.lines, &actual.lines, options);

    if !options.ignore_escaped && expected.escaped != actual.escaped {
        let describe = |escaped: &Option<super::EscapedException>| {
            escaped
                .as_ref()
                .map_or_else(|| "nothing".to_string(), ToString::to_string)
        };
        differences.push(Difference {
            line: 0,
            expected: describe(&expected.escaped),
            actual: describe(&actual.escaped),
            kind: DifferenceKind::EscapeMismatch,
        });
    }

    DiffResult {
        matches: differences.is_empty(),
        differences,
    }
}

/// Compare two transcripts line by line
#[must_use]
pub fn diff_lines(expected: &[String], actual: &[String], options: &DiffOptions) -> Vec<Difference> {
    let mut differences = Vec::new();
    let max_lines = expected.len().max(actual.len());

    for i in 0..max_lines {
        match (expected.get(i), actual.get(i)) {
            (Some(exp), Some(act)) => {
                if !lines_equal(exp, act, options) {
                    differences.push(Difference {
                        line: i + 1,
                        expected: exp.clone(),
                        actual: act.clone(),
                        kind: DifferenceKind::ContentMismatch,
                    });
                }
            }
            (Some(exp), None) => differences.push(Difference {
                line: i + 1,
                expected: exp.clone(),
                actual: String::new(),
                kind: DifferenceKind::MissingLine,
            }),
            (None, Some(act)) => differences.push(Difference {
                line: i + 1,
                expected: String::new(),
                actual: act.clone(),
                kind: DifferenceKind::ExtraLine,
            }),
            (None, None) => {}
        }
    }

    differences
}

/// Apply the normalizations enabled in `options` to one line
#[must_use]
pub fn normalize_line(line: &str, options: &DiffOptions) -> String {
    let mut out = line.to_string();

    if options.normalize_addresses {
        out = normalize_addresses(&out);
    }

    if options.ignore_trailing_whitespace {
        out = out.trim_end().to_string();
    }

    if options.normalize_whitespace {
        out = normalize_whitespace(&out);
    }

    if options.ignore_case {
        out = out.to_lowercase();
    }

    out
}

fn lines_equal(expected: &str, actual: &str, options: &DiffOptions) -> bool {
    normalize_line(expected, options) == normalize_line(actual, options)
}

/// Normalize whitespace in a string
fn normalize_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Rewrite every `0x` followed by hex digits to [`NORMALIZED_ADDRESS`]
#[must_use]
pub fn normalize_addresses(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find("0x") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + 2..];
        let digits = after
            .find(|c: char| !c.is_ascii_hexdigit())
            .unwrap_or(after.len());
        if digits == 0 {
            out.push_str("0x");
        } else {
            out.push_str(NORMALIZED_ADDRESS);
        }
        rest = &after[digits..];
    }

    out.push_str(rest);
    out
}

/// Format a diff result for display
#[must_use]
pub fn format_diff(result: &DiffResult) -> String {
    if result.matches {
        return "Transcripts match".to_string();
    }

    let mut output = String::new();
    let _ = writeln!(output, "Found {} difference(s):", result.differences.len());

    for diff in &result.differences {
        match diff.kind {
            DifferenceKind::ContentMismatch => {
                let _ = writeln!(
                    output,
                    "Line {}: expected '{}', got '{}'",
                    diff.line, diff.expected, diff.actual
                );
            }
            DifferenceKind::MissingLine => {
                let _ = writeln!(output, "Line {}: missing '{}'", diff.line, diff.expected);
            }
            DifferenceKind::ExtraLine => {
                let _ = writeln!(output, "Line {}: unexpected '{}'", diff.line, diff.actual);
            }
            DifferenceKind::EscapeMismatch => {
                let _ = writeln!(
                    output,
                    "Escaped: expected {}, got {}",
                    diff.expected, diff.actual
                );
            }
        }
    }

    output
}
