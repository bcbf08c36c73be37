use std::path::Path;

use calamine::{DataType, Reader, Xlsx, open_workbook};

use crate::parts::sandbox::error::{Result, SandboxError};
use crate::parts::sandbox::model::{AliasRecord, PartForecast};

/// Sheet every Quote Master file is expected to carry.
pub const MASTER_SHEET: &str = "Master Part List";

/// Header label of the alias column. Matched case-sensitively.
pub const ALIAS_COLUMN: &str = "alias";
/// Header label of the canonical value column. Matched case-sensitively.
pub const VALUE_COLUMN: &str = "value";
/// Header label of the part number column used for forecasts.
pub const PART_NUMBER_COLUMN: &str = "Part Number";
/// Header label of the Estimated Annual Usage column.
pub const EAU_COLUMN: &str = "EAU";

/// Result of projecting the alias relation out of a master sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// The sheet carried both required columns; these are the non-empty rows.
    Records(Vec<AliasRecord>),
    /// The sheet has no `alias`/`value` column pair. The file simply does not
    /// contribute aliases.
    AbsentColumns,
}

/// Reads the "Master Part List" sheet of the workbook at `path` into rows of
/// strings, the first row being the header.
///
/// The workbook handle is scoped to this call and released on every exit
/// path. Fails with [`SandboxError::MissingInput`] when the path does not
/// resolve and [`SandboxError::MissingSheet`] when the sheet is absent.
pub fn read_master_rows(path: &Path) -> Result<Vec<Vec<String>>> {
    if !path.exists() {
        return Err(SandboxError::MissingInput(path.to_path_buf()));
    }

    let mut workbook: Xlsx<_> = open_workbook(path)?;
    let range = workbook
        .worksheet_range(MASTER_SHEET)
        .ok_or_else(|| SandboxError::MissingSheet {
            file: path.to_path_buf(),
            sheet: MASTER_SHEET.to_string(),
        })?
        .map_err(SandboxError::from)?;

    let rows = range
        .rows()
        .map(|row| row.iter().map(|cell| cell_to_string(Some(cell))).collect())
        .collect();
    Ok(rows)
}

/// Projects the `(alias, value)` relation out of master-sheet rows.
///
/// Row 0 is the header. Both column labels must match exactly; otherwise the
/// sheet is reported as [`Extraction::AbsentColumns`]. Data rows shorter than
/// the header are read as having empty trailing cells, and rows where either
/// field is empty are skipped.
pub fn extract_aliases(rows: &[Vec<String>]) -> Extraction {
    let Some((alias_idx, value_idx)) = locate_columns(rows, ALIAS_COLUMN, VALUE_COLUMN) else {
        return Extraction::AbsentColumns;
    };

    let records = rows
        .iter()
        .skip(1)
        .filter_map(|row| {
            let alias = cell_at(row, alias_idx);
            let value = cell_at(row, value_idx);
            if alias.is_empty() || value.is_empty() {
                None
            } else {
                Some(AliasRecord { alias, value })
            }
        })
        .collect();
    Extraction::Records(records)
}

/// Projects the `(Part Number, EAU)` relation out of master-sheet rows.
///
/// Forecast columns are optional per file: when either is missing the result
/// is simply empty. Rows with an empty part number or a non-numeric EAU cell
/// are skipped.
pub fn extract_forecasts(rows: &[Vec<String>]) -> Vec<PartForecast> {
    let Some((part_idx, eau_idx)) = locate_columns(rows, PART_NUMBER_COLUMN, EAU_COLUMN) else {
        return Vec::new();
    };

    rows.iter()
        .skip(1)
        .filter_map(|row| {
            let part_number = cell_at(row, part_idx);
            if part_number.is_empty() {
                return None;
            }
            let eau = cell_at(row, eau_idx).parse::<f64>().ok()?;
            Some(PartForecast { part_number, eau })
        })
        .collect()
}

fn locate_columns(rows: &[Vec<String>], first: &str, second: &str) -> Option<(usize, usize)> {
    let header = rows.first()?;
    let first_idx = header.iter().position(|label| label == first)?;
    let second_idx = header.iter().position(|label| label == second)?;
    Some((first_idx, second_idx))
}

fn cell_at(row: &[String], idx: usize) -> String {
    row.get(idx).cloned().unwrap_or_default()
}

fn cell_to_string(cell: Option<&DataType>) -> String {
    match cell {
        Some(DataType::String(value)) => value.clone(),
        Some(DataType::Float(value)) => value.to_string(),
        Some(DataType::Int(value)) => value.to_string(),
        Some(DataType::Bool(value)) => value.to_string(),
        Some(DataType::Empty) | None => String::new(),
        Some(other) => other.to_string(),
    }
}
