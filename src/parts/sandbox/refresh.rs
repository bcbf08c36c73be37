use std::fs;
use std::path::Path;

use tracing::{debug, info, instrument, warn};

use crate::parts::sandbox::error::{Result, SandboxError};
use crate::parts::sandbox::io::excel_read::{self, Extraction};
use crate::parts::sandbox::model::{
    AliasRecord, FileStatus, PartForecast, RefreshOutcome, RefreshSummary,
};
use crate::parts::sandbox::store::{AliasStore, dedup_first, merge_first_wins};

/// Extension candidate Quote Master files must carry.
const QUOTE_MASTER_EXTENSION: &str = "xlsx";

/// Enumerates candidate Quote Master file names in `dir`, sorted for a
/// deterministic processing order.
///
/// Only `.xlsx` files count, and the store's own file is excluded so a store
/// kept next to its inputs never feeds itself. Fails with
/// [`SandboxError::DirectoryNotFound`] when the directory does not resolve.
pub fn list_quote_master_files(dir: &Path, store_path: Option<&Path>) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Err(SandboxError::DirectoryNotFound(dir.to_path_buf()));
    }
    let store_file_name = store_path.and_then(|path| path.file_name());

    let mut names = Vec::new();
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_file() {
            continue;
        }
        if path
            .extension()
            .is_none_or(|extension| extension != QUOTE_MASTER_EXTENSION)
        {
            continue;
        }
        if store_file_name.is_some() && path.file_name() == store_file_name {
            continue;
        }
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    names.sort();
    Ok(names)
}

/// Runs the whole reconciliation batch over `dir`: discover candidates, read
/// and extract each one, merge everything first-wins against the store, and
/// persist the result in a single transaction.
///
/// A single file's failure never aborts the batch; it is recorded in the
/// returned summary instead. Only discovery and the final persist propagate
/// as errors.
#[instrument(level = "info", skip(store), fields(dir = %dir.display()))]
pub fn refresh_all(store: &mut AliasStore, dir: &Path) -> Result<RefreshSummary> {
    let candidates = list_quote_master_files(dir, store.path())?;
    info!(candidate_count = candidates.len(), "discovered candidates");

    let mut outcomes = Vec::new();
    let mut batch_aliases = Vec::new();
    let mut batch_parts = Vec::new();
    let mut sources = Vec::new();

    for name in &candidates {
        let path = dir.join(name);
        let (status, aliases, forecasts) = process_file(&path);
        match &status {
            FileStatus::Success { merged } => {
                debug!(file = %path.display(), rows = merged, "extracted aliases");
                sources.push(name.clone());
            }
            FileStatus::MissingColumns => {
                warn!(file = %path.display(), "no alias/value columns, skipping");
            }
            FileStatus::MissingSheet => {
                warn!(file = %path.display(), "no master part list sheet, skipping");
            }
            FileStatus::ReadError(reason) => {
                warn!(file = %path.display(), %reason, "failed to read candidate");
            }
        }
        batch_aliases.extend(aliases);
        batch_parts.extend(forecasts);
        outcomes.push(RefreshOutcome {
            file: path,
            status,
        });
    }

    merge_and_persist(store, batch_aliases, batch_parts, sources, outcomes)
}

/// Single-file variant of [`refresh_all`]: extracts one Quote Master file and
/// merges its records through the same first-wins path.
#[instrument(level = "info", skip(store), fields(file = %file.display()))]
pub fn update_from_file(store: &mut AliasStore, file: &Path) -> Result<RefreshSummary> {
    let (status, aliases, forecasts) = process_file(file);
    let sources = match &status {
        FileStatus::Success { .. } => vec![
            file.file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| file.display().to_string()),
        ],
        _ => Vec::new(),
    };
    let outcomes = vec![RefreshOutcome {
        file: file.to_path_buf(),
        status,
    }];
    merge_and_persist(store, aliases, forecasts, sources, outcomes)
}

/// Reads and extracts one candidate. All failure modes collapse into the
/// returned [`FileStatus`]; nothing escapes as an error, so the batch loop
/// can keep going. The workbook handle is released inside
/// [`excel_read::read_master_rows`] on every path.
fn process_file(path: &Path) -> (FileStatus, Vec<AliasRecord>, Vec<PartForecast>) {
    let rows = match excel_read::read_master_rows(path) {
        Ok(rows) => rows,
        Err(SandboxError::MissingSheet { .. }) => {
            return (FileStatus::MissingSheet, Vec::new(), Vec::new());
        }
        Err(error) => {
            return (
                FileStatus::ReadError(error.to_string()),
                Vec::new(),
                Vec::new(),
            );
        }
    };

    match excel_read::extract_aliases(&rows) {
        Extraction::AbsentColumns => (FileStatus::MissingColumns, Vec::new(), Vec::new()),
        Extraction::Records(records) => {
            let forecasts = excel_read::extract_forecasts(&rows);
            (
                FileStatus::Success {
                    merged: records.len(),
                },
                records,
                forecasts,
            )
        }
    }
}

fn merge_and_persist(
    store: &mut AliasStore,
    aliases: Vec<AliasRecord>,
    forecasts: Vec<PartForecast>,
    sources: Vec<String>,
    outcomes: Vec<RefreshOutcome>,
) -> Result<RefreshSummary> {
    let incoming = dedup_first(aliases, |record| record.alias.as_str());
    let forecasts = dedup_first(forecasts, |forecast| forecast.part_number.as_str());

    let existing = store.load_aliases()?;
    let (merged, added) = merge_first_wins(&existing, incoming);
    store.persist(&merged, &forecasts, &sources)?;

    let success = !outcomes
        .iter()
        .any(|outcome| matches!(outcome.status, FileStatus::ReadError(_)));
    info!(
        total_merged = added,
        success,
        files = outcomes.len(),
        "refresh persisted"
    );

    Ok(RefreshSummary {
        outcomes,
        success,
        total_merged: added,
    })
}
