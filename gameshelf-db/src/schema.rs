//! SQLite schema creation and version tracking.

use std::path::Path;

use rusqlite::Connection;
use thiserror::Error;

use crate::rowstore::ALL_TABLES;

#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Schema version mismatch: expected version {expected}, found {found}")]
    VersionMismatch { expected: i32, found: i32 },
}

/// Current schema version. Increment when the table layout changes.
pub const CURRENT_VERSION: i32 = 1;

/// Create all tables and indexes if they don't exist.
///
/// This is idempotent: safe to call on an existing database.
pub fn create_schema(conn: &Connection) -> Result<(), SchemaError> {
    conn.execute_batch(SCHEMA_SQL)?;
    if get_schema_version(conn)? != CURRENT_VERSION {
        set_schema_version(conn, CURRENT_VERSION)?;
    }
    Ok(())
}

/// Open or create a catalog database at the given path.
///
/// The parent directory is created if needed. A fresh file gets the full
/// schema; a file written by a different schema version is refused.
pub fn open_database(path: &Path) -> Result<Connection, SchemaError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;

    match get_schema_version(&conn)? {
        0 => {
            log::info!("Creating catalog schema in {}", path.display());
            create_schema(&conn)?;
        }
        CURRENT_VERSION => {}
        found => {
            return Err(SchemaError::VersionMismatch {
                expected: CURRENT_VERSION,
                found,
            });
        }
    }

    Ok(conn)
}

/// Open an in-memory database with the full schema. Useful for testing.
pub fn open_memory() -> Result<Connection, SchemaError> {
    let conn = Connection::open_in_memory()?;
    conn.execute_batch("PRAGMA foreign_keys=ON;")?;
    create_schema(&conn)?;
    Ok(conn)
}

/// True when none of the catalog tables hold a row.
pub fn is_empty(conn: &Connection) -> Result<bool, SchemaError> {
    for table in ALL_TABLES {
        let any: bool = conn.query_row(
            &format!("SELECT EXISTS(SELECT 1 FROM {})", table.name),
            [],
            |row| row.get(0),
        )?;
        if any {
            return Ok(false);
        }
    }
    Ok(true)
}

/// Drop every table, including the version and import log tables.
///
/// Catalog tables go in reverse dependency order so foreign keys never
/// point at a dropped table. Follow with [`create_schema`] to rebuild.
pub fn drop_tables(conn: &Connection) -> Result<(), SchemaError> {
    for table in ALL_TABLES.iter().rev() {
        conn.execute_batch(&format!("DROP TABLE IF EXISTS {};", table.name))?;
    }
    conn.execute_batch("DROP TABLE IF EXISTS import_log; DROP TABLE IF EXISTS schema_version;")?;
    log::info!("Dropped all catalog tables");
    Ok(())
}

/// Get the current schema version, or 0 if no schema exists.
fn get_schema_version(conn: &Connection) -> Result<i32, SchemaError> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name='schema_version')",
        [],
        |row| row.get(0),
    )?;

    if !exists {
        return Ok(0);
    }

    let version: i32 = conn.query_row(
        "SELECT COALESCE(MAX(version), 0) FROM schema_version",
        [],
        |row| row.get(0),
    )?;
    Ok(version)
}

fn set_schema_version(conn: &Connection, version: i32) -> Result<(), SchemaError> {
    conn.execute(
        "INSERT INTO schema_version (version) VALUES (?1)",
        [version],
    )?;
    Ok(())
}

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS schema_version (
    version INTEGER NOT NULL,
    applied_at TEXT NOT NULL DEFAULT (datetime('now'))
);

CREATE TABLE IF NOT EXISTS users (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    password_hash TEXT NOT NULL,
    salt TEXT NOT NULL,
    created_at TEXT NOT NULL DEFAULT (datetime('now'))
);

-- Publishers and developers alike
CREATE TABLE IF NOT EXISTS companies (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    country TEXT,
    founded TEXT,
    description TEXT
);

CREATE TABLE IF NOT EXISTS platforms (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE,
    kind TEXT NOT NULL,
    release_date TEXT NOT NULL,
    description TEXT,
    company_id INTEGER REFERENCES companies(id)
);

CREATE TABLE IF NOT EXISTS games (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    title TEXT NOT NULL UNIQUE,
    release_date TEXT NOT NULL,
    price REAL,
    content TEXT,
    developer_id INTEGER REFERENCES companies(id),
    average_playtime REAL,
    median_playtime REAL,
    rating REAL
);
CREATE INDEX IF NOT EXISTS idx_games_release_date ON games(release_date);
CREATE INDEX IF NOT EXISTS idx_games_developer ON games(developer_id);

-- Game x Company (publisher)
CREATE TABLE IF NOT EXISTS publishers (
    game_id INTEGER NOT NULL REFERENCES games(id),
    company_id INTEGER NOT NULL REFERENCES companies(id),
    PRIMARY KEY (game_id, company_id)
);
CREATE INDEX IF NOT EXISTS idx_publishers_company ON publishers(company_id);

-- Game x Platform
CREATE TABLE IF NOT EXISTS supports (
    game_id INTEGER NOT NULL REFERENCES games(id),
    platform_id INTEGER NOT NULL REFERENCES platforms(id),
    PRIMARY KEY (game_id, platform_id)
);
CREATE INDEX IF NOT EXISTS idx_supports_platform ON supports(platform_id);

-- Seed import tracking
CREATE TABLE IF NOT EXISTS import_log (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    table_name TEXT NOT NULL,
    source TEXT NOT NULL,
    rows_imported INTEGER NOT NULL DEFAULT 0,
    imported_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
