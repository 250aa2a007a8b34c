//! CSV seed import.
//!
//! Each table in [`rowstore::ALL_TABLES`] has a seed file named by its
//! descriptor. Files are loaded in dependency order (companies before the
//! platforms and games that name them, games before their relations), all
//! inside one transaction. Besides first-run seeding, the catalog can be
//! emptied ([`clear_tables`]), refilled ([`reseed`]), or dropped and rebuilt
//! from scratch ([`rebuild`]).

use std::io::Read;
use std::path::{Path, PathBuf};

use gameshelf_db::operations::{OperationError, insert_import_log};
use gameshelf_db::rowstore::{self, Row, Table};
use gameshelf_db::schema::{self, SchemaError};
use rusqlite::Connection;
use rusqlite::types::Value;
use thiserror::Error;

use crate::progress::SeedProgress;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error("Database error: {0}")]
    Db(#[from] OperationError),
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("CSV error in {source_name}: {source}")]
    Csv { source_name: String, source: csv::Error },
    #[error("{source_name}, line {line}: {source}")]
    Row {
        source_name: String,
        line: u64,
        source: OperationError,
    },
    #[error("Seed directory not found: {}", .0.display())]
    DirNotFound(PathBuf),
}

/// Statistics from a seed run.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SeedStats {
    /// Rows inserted per table, in load order.
    pub tables: Vec<(&'static str, u64)>,
    /// Seed files that were expected but not present.
    pub skipped_files: Vec<&'static str>,
}

impl SeedStats {
    pub fn total_rows(&self) -> u64 {
        self.tables.iter().map(|(_, n)| n).sum()
    }

    pub fn rows_for(&self, table: &str) -> Option<u64> {
        self.tables
            .iter()
            .find(|(name, _)| *name == table)
            .map(|(_, n)| *n)
    }
}

/// Insert every record of a headered CSV stream into `table`.
///
/// Header names are column (or reference input) names. An empty field is
/// stored as NULL. The first failing record aborts the import; callers that
/// need all-or-nothing behavior run this inside a transaction.
pub fn import_csv<R: Read>(
    conn: &Connection,
    table: &Table,
    reader: R,
    source_name: &str,
    progress: &dyn SeedProgress,
) -> Result<u64, SeedError> {
    let csv_error = |source| SeedError::Csv {
        source_name: source_name.to_string(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);
    let headers = reader.headers().map_err(csv_error)?.clone();

    let mut count = 0u64;
    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let row: Row = headers
            .iter()
            .zip(record.iter())
            .map(|(column, field)| {
                let value = if field.is_empty() {
                    Value::Null
                } else {
                    Value::Text(field.to_string())
                };
                (column.to_string(), value)
            })
            .collect();

        rowstore::insert_row(conn, table, row).map_err(|source| SeedError::Row {
            source_name: source_name.to_string(),
            line: record.position().map_or(count + 2, |p| p.line()),
            source,
        })?;
        count += 1;
        progress.on_row(table.name, count);
    }

    Ok(count)
}

/// Import one seed file into `table` and record it in the import log.
pub fn import_csv_file(
    conn: &Connection,
    table: &Table,
    path: &Path,
    progress: &dyn SeedProgress,
) -> Result<u64, SeedError> {
    let source_name = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|source| SeedError::Io {
        path: path.to_path_buf(),
        source,
    })?;

    progress.on_table(table.name, &source_name);
    let count = import_csv(conn, table, file, &source_name, progress)?;
    insert_import_log(conn, table.name, &source_name, count)?;
    log::info!("Imported {} rows into {} from {}", count, table.name, source_name);
    Ok(count)
}

/// Load every table's seed file from `dir` in one transaction.
///
/// Missing files are skipped with a warning. Any failing row rolls back the
/// whole run.
pub fn seed_from_dir(
    conn: &Connection,
    dir: &Path,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    check_dir(dir)?;
    let tx = conn.unchecked_transaction()?;
    let stats = seed_tables(&tx, dir, progress)?;
    tx.commit()?;
    finish(&stats, dir, progress);
    Ok(stats)
}

/// Delete every row from the catalog tables and the import log.
///
/// Tables are emptied in reverse dependency order so no foreign key is
/// left dangling. The schema itself is kept.
pub fn clear_tables(conn: &Connection) -> Result<(), SeedError> {
    for table in rowstore::ALL_TABLES.iter().rev() {
        let removed = conn.execute(&format!("DELETE FROM {}", table.name), [])?;
        log::debug!("Cleared {} rows from {}", removed, table.name);
    }
    conn.execute("DELETE FROM import_log", [])?;
    Ok(())
}

/// Replace all catalog data with the seed files in `dir`.
///
/// Clearing and seeding share one transaction: if any row fails, the
/// previous contents are left in place.
pub fn reseed(
    conn: &Connection,
    dir: &Path,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    check_dir(dir)?;
    let tx = conn.unchecked_transaction()?;
    clear_tables(&tx)?;
    let stats = seed_tables(&tx, dir, progress)?;
    tx.commit()?;
    log::info!("Reseeded catalog from {}", dir.display());
    finish(&stats, dir, progress);
    Ok(stats)
}

/// Drop and recreate every table, then seed from `dir`.
///
/// Unlike [`reseed`], this also resets the schema version and id sequences.
/// Runs in one transaction; a failure keeps the old database.
pub fn rebuild(
    conn: &Connection,
    dir: &Path,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    check_dir(dir)?;
    let tx = conn.unchecked_transaction()?;
    schema::drop_tables(&tx)?;
    schema::create_schema(&tx)?;
    let stats = seed_tables(&tx, dir, progress)?;
    tx.commit()?;
    log::info!("Rebuilt catalog from {}", dir.display());
    finish(&stats, dir, progress);
    Ok(stats)
}

fn check_dir(dir: &Path) -> Result<(), SeedError> {
    if dir.is_dir() {
        Ok(())
    } else {
        Err(SeedError::DirNotFound(dir.to_path_buf()))
    }
}

/// Import each table's seed file in dependency order. The caller owns the
/// transaction.
fn seed_tables(
    conn: &Connection,
    dir: &Path,
    progress: &dyn SeedProgress,
) -> Result<SeedStats, SeedError> {
    let mut stats = SeedStats::default();
    for table in rowstore::ALL_TABLES {
        let path = dir.join(table.seed_file);
        if !path.is_file() {
            log::warn!("Seed file {} not found, skipping {}", path.display(), table.name);
            stats.skipped_files.push(table.seed_file);
            continue;
        }
        let count = import_csv_file(conn, table, &path, progress)?;
        stats.tables.push((table.name, count));
    }
    Ok(stats)
}

fn finish(stats: &SeedStats, dir: &Path, progress: &dyn SeedProgress) {
    progress.on_complete(&format!(
        "Seeded {} rows into {} tables from {}",
        stats.total_rows(),
        stats.tables.len(),
        dir.display()
    ));
}

/// Seed the database from `dir` if it holds no catalog data yet.
///
/// Returns `None` when the database already has data or when `dir` does not
/// exist; an empty catalog is a valid starting point.
pub fn bootstrap(
    conn: &Connection,
    dir: &Path,
    progress: &dyn SeedProgress,
) -> Result<Option<SeedStats>, SeedError> {
    if !schema::is_empty(conn)? {
        log::debug!("Database already populated, skipping seed");
        return Ok(None);
    }
    if !dir.is_dir() {
        log::warn!("Seed directory {} not found, starting empty", dir.display());
        return Ok(None);
    }
    seed_from_dir(conn, dir, progress).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::SilentProgress;

    #[test]
    fn empty_fields_become_null() {
        let conn = schema::open_memory().unwrap();
        let data = "name,country,founded,description\nValve,,1996-08-24,\n";
        let n = import_csv(&conn, &rowstore::COMPANIES, data.as_bytes(), "test", &SilentProgress)
            .unwrap();
        assert_eq!(n, 1);

        let (country, founded): (Option<String>, Option<String>) = conn
            .query_row(
                "SELECT country, founded FROM companies WHERE name = 'Valve'",
                [],
                |r| Ok((r.get(0)?, r.get(1)?)),
            )
            .unwrap();
        assert_eq!(country, None);
        assert_eq!(founded.as_deref(), Some("1996-08-24"));
    }

    #[test]
    fn failing_row_reports_line() {
        let conn = schema::open_memory().unwrap();
        let data = "title,release_date,developer\nPortal,2007-10-10,\nHalf-Life,1998-11-19,Valve\n";
        let err =
            import_csv(&conn, &rowstore::GAMES, data.as_bytes(), "games.csv", &SilentProgress)
                .unwrap_err();
        match err {
            SeedError::Row { line, source, .. } => {
                assert_eq!(line, 3);
                assert!(matches!(source, OperationError::UnresolvedReference { .. }));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn stats_lookup() {
        let stats = SeedStats {
            tables: vec![("companies", 3), ("games", 5)],
            skipped_files: vec![],
        };
        assert_eq!(stats.total_rows(), 8);
        assert_eq!(stats.rows_for("games"), Some(5));
        assert_eq!(stats.rows_for("users"), None);
    }
}
