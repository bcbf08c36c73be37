use std::collections::BTreeMap;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

use rusqlite::{Connection, OptionalExtension, params};

use crate::parts::sandbox::error::Result;
use crate::parts::sandbox::model::{AliasRecord, PartForecast};

/// Persistent alias → value store backed by SQLite.
///
/// The store owns its connection; the reference deployment is single-writer
/// and batch-oriented, so no connection pooling or cross-process locking is
/// layered on top of what SQLite itself provides.
pub struct AliasStore {
    conn: Connection,
    path: Option<PathBuf>,
}

impl AliasStore {
    /// Opens the store at `path`, creating the database file and schema on
    /// first run. Parent directories are created as part of the bootstrap.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        let store = Self {
            conn,
            path: Some(path.to_path_buf()),
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Opens a throwaway in-memory store. Used by tests.
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
            path: None,
        };
        store.ensure_schema()?;
        Ok(store)
    }

    /// Location of the backing database file, if the store is file-backed.
    /// Candidate discovery uses it to keep the store out of its own input
    /// set.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    fn ensure_schema(&self) -> Result<()> {
        self.conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS aliases (
              alias TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS parts (
              part_number TEXT PRIMARY KEY,
              eau REAL NOT NULL
            );

            CREATE TABLE IF NOT EXISTS quote_masters (
              id INTEGER PRIMARY KEY AUTOINCREMENT,
              file_name TEXT NOT NULL,
              last_updated TEXT NOT NULL DEFAULT (datetime('now'))
            );
            "#,
        )?;
        Ok(())
    }

    /// Loads the full alias mapping currently persisted.
    pub fn load_aliases(&self) -> Result<BTreeMap<String, String>> {
        let mut statement = self.conn.prepare("SELECT alias, value FROM aliases")?;
        let rows = statement.query_map([], |row| Ok((row.get(0)?, row.get(1)?)))?;

        let mut aliases = BTreeMap::new();
        for row in rows {
            let (alias, value): (String, String) = row?;
            aliases.insert(alias, value);
        }
        Ok(aliases)
    }

    /// Persists the outcome of one reconciliation pass in a single
    /// transaction: the merged alias mapping, the part forecasts, and one
    /// audit row per contributing source file. Commit-or-nothing, so a failed
    /// write leaves the pre-merge state intact.
    ///
    /// Inserts use `INSERT OR IGNORE`, so rows already present always win;
    /// replaying the same batch is a no-op.
    pub fn persist(
        &mut self,
        aliases: &BTreeMap<String, String>,
        parts: &[PartForecast],
        sources: &[String],
    ) -> Result<()> {
        let tx = self.conn.transaction()?;
        {
            let mut insert_alias =
                tx.prepare("INSERT OR IGNORE INTO aliases (alias, value) VALUES (?1, ?2)")?;
            for (alias, value) in aliases {
                insert_alias.execute(params![alias, value])?;
            }

            let mut insert_part =
                tx.prepare("INSERT OR IGNORE INTO parts (part_number, eau) VALUES (?1, ?2)")?;
            for part in parts {
                insert_part.execute(params![part.part_number, part.eau])?;
            }

            let mut insert_source =
                tx.prepare("INSERT INTO quote_masters (file_name) VALUES (?1)")?;
            for source in sources {
                insert_source.execute(params![source])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    /// Case-sensitive substring search over aliases and values.
    ///
    /// SQLite's `LIKE` folds ASCII case, which would silently change the
    /// legacy contract, so matching goes through `instr()` instead.
    pub fn search(&self, term: &str) -> Result<Vec<AliasRecord>> {
        let mut statement = self.conn.prepare(
            "SELECT alias, value FROM aliases \
             WHERE instr(alias, ?1) > 0 OR instr(value, ?1) > 0 \
             ORDER BY alias",
        )?;
        let rows = statement.query_map(params![term], |row| {
            Ok(AliasRecord {
                alias: row.get(0)?,
                value: row.get(1)?,
            })
        })?;
        rows.map(|row| row.map_err(Into::into)).collect()
    }

    /// Looks up the EAU forecast for one part.
    ///
    /// Soft-miss policy preserved from the legacy behavior: an absent part
    /// returns `eau: 0.0` rather than an error, which is indistinguishable
    /// from a genuine zero forecast.
    pub fn eau_forecast(&self, part_number: &str) -> Result<PartForecast> {
        let eau: Option<f64> = self
            .conn
            .query_row(
                "SELECT eau FROM parts WHERE part_number = ?1",
                params![part_number],
                |row| row.get(0),
            )
            .optional()?;
        Ok(PartForecast {
            part_number: part_number.to_string(),
            eau: eau.unwrap_or(0.0),
        })
    }
}

/// Drops in-batch duplicates, keeping the first occurrence of each key in
/// processing order.
pub fn dedup_first<T, F>(items: Vec<T>, key: F) -> Vec<T>
where
    F: Fn(&T) -> &str,
{
    let mut seen: HashSet<String> = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(key(item).to_string()))
        .collect()
}

/// Merges incoming records into the existing mapping under the
/// first-write-wins rule: an alias already present keeps its stored value.
/// Returns the merged mapping and the number of records actually added.
///
/// Callers are expected to run [`dedup_first`] over `incoming` beforehand so
/// that in-batch conflicts also resolve to the earliest occurrence.
pub fn merge_first_wins(
    existing: &BTreeMap<String, String>,
    incoming: Vec<AliasRecord>,
) -> (BTreeMap<String, String>, usize) {
    let mut merged = existing.clone();
    let mut added = 0;
    for record in incoming {
        if !merged.contains_key(&record.alias) {
            merged.insert(record.alias, record.value);
            added += 1;
        }
    }
    (merged, added)
}
