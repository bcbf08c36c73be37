use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// One alias → canonical value mapping.
///
/// The alias is the unique key of the store; both fields are compared
/// case-sensitively everywhere, matching the legacy contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRecord {
    /// Short key supplied by a Quote Master file.
    pub alias: String,
    /// Canonical part value the alias resolves to.
    pub value: String,
}

impl AliasRecord {
    /// Creates a record from anything string-like, mostly for tests and
    /// fixtures.
    pub fn new(alias: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            alias: alias.into(),
            value: value.into(),
        }
    }
}

/// Estimated Annual Usage figure for a single part.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PartForecast {
    /// Canonical part number.
    pub part_number: String,
    /// Forecast quantity. A soft miss on lookup is reported as `0.0`.
    pub eau: f64,
}

/// Per-file result of one reconciliation pass.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "detail")]
pub enum FileStatus {
    /// The file contributed records; `merged` counts the rows extracted from
    /// it (before batch-level deduplication).
    Success { merged: usize },
    /// The master sheet exists but carries no `alias`/`value` columns. A
    /// legitimate outcome, not an error.
    MissingColumns,
    /// The workbook has no "Master Part List" sheet.
    MissingSheet,
    /// The file could not be read at all.
    ReadError(String),
}

/// Outcome recorded for one candidate file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshOutcome {
    /// Path of the processed candidate.
    pub file: PathBuf,
    /// What happened to it.
    #[serde(flatten)]
    pub status: FileStatus,
}

/// Aggregated result of a whole refresh run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshSummary {
    /// One entry per candidate file, in processing order.
    pub outcomes: Vec<RefreshOutcome>,
    /// False only when some file produced a [`FileStatus::ReadError`].
    /// Missing sheets or columns are warnings and do not count against
    /// success.
    pub success: bool,
    /// Number of aliases newly added to the store by this run.
    pub total_merged: usize,
}

impl RefreshSummary {
    /// True when every file contributed cleanly, without even benign
    /// warnings.
    pub fn is_clean(&self) -> bool {
        self.outcomes
            .iter()
            .all(|outcome| matches!(outcome.status, FileStatus::Success { .. }))
    }
}
