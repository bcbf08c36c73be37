use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, SandboxError>;

/// Error type covering the different failure cases that can occur when the
/// tool discovers, ingests, merges, or queries part data.
#[derive(Debug, Error)]
pub enum SandboxError {
    /// Wrapper for IO failures such as reading directories or files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when JSON serialization of query results fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Errors bubbled up from the SQLite store.
    #[error("store error: {0}")]
    Store(#[from] rusqlite::Error),

    /// Raised when a workbook does not contain the required sheet. Non-fatal
    /// at the batch level: the reconciliation engine records it as a per-file
    /// outcome instead of propagating it.
    #[error("missing sheet '{sheet}' in {file}")]
    MissingSheet { file: PathBuf, sheet: String },

    /// Raised when the user provides a file path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the candidate directory does not exist. Fatal for the
    /// whole refresh, unlike per-file failures.
    #[error("directory not found: {0}")]
    DirectoryNotFound(PathBuf),

    /// Raised when a query argument fails validation before touching the
    /// store.
    #[error("invalid query: {0}")]
    InvalidQuery(String),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
