use std::path::Path;

use crate::parts::sandbox::error::{Result, SandboxError};
use crate::parts::sandbox::model::{AliasRecord, PartForecast};
use crate::parts::sandbox::refresh;
use crate::parts::sandbox::store::AliasStore;

/// Read-only query surface over the alias store.
///
/// Constructed with an explicit store reference rather than reaching for any
/// process-wide instance; callers own the store lifecycle.
pub struct QueryService<'a> {
    store: &'a AliasStore,
}

impl<'a> QueryService<'a> {
    pub fn new(store: &'a AliasStore) -> Self {
        Self { store }
    }

    /// Case-sensitive substring search over aliases and values.
    ///
    /// An empty or blank term is rejected up front; it would otherwise match
    /// the entire store.
    pub fn search(&self, term: &str) -> Result<Vec<AliasRecord>> {
        if term.trim().is_empty() {
            return Err(SandboxError::InvalidQuery(
                "search term must not be empty".to_string(),
            ));
        }
        self.store.search(term)
    }

    /// EAU forecast for one part. An absent part yields `eau: 0.0` (legacy
    /// soft-miss policy).
    pub fn eau_forecast(&self, part_number: &str) -> Result<PartForecast> {
        if part_number.trim().is_empty() {
            return Err(SandboxError::InvalidQuery(
                "part number must not be empty".to_string(),
            ));
        }
        self.store.eau_forecast(part_number)
    }

    /// Candidate Quote Master files in `dir`, excluding the store's own
    /// file.
    pub fn list_candidate_files(&self, dir: &Path) -> Result<Vec<String>> {
        refresh::list_quote_master_files(dir, self.store.path())
    }
}
