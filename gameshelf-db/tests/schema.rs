use gameshelf_db::rowstore::ALL_TABLES;
use gameshelf_db::schema::{CURRENT_VERSION, create_schema, drop_tables, is_empty};
use gameshelf_db::{SchemaError, open_database, open_memory};

#[test]
fn create_schema_in_memory() {
    let conn = open_memory().unwrap();
    let version: i32 = conn
        .query_row(
            "SELECT COALESCE(MAX(version), 0) FROM schema_version",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(version, CURRENT_VERSION);
}

#[test]
fn schema_is_idempotent() {
    let conn = open_memory().unwrap();
    create_schema(&conn).unwrap();
    let rows: i32 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(rows, 1);
}

#[test]
fn foreign_keys_enabled() {
    let conn = open_memory().unwrap();
    let fk: i32 = conn
        .query_row("PRAGMA foreign_keys", [], |row| row.get(0))
        .unwrap();
    assert_eq!(fk, 1);
}

#[test]
fn all_tables_exist() {
    let conn = open_memory().unwrap();
    let names = ALL_TABLES.iter().map(|t| t.name);
    for table in names.chain(["schema_version", "import_log"]) {
        let exists: bool = conn
            .query_row(
                "SELECT EXISTS(SELECT 1 FROM sqlite_master WHERE type='table' AND name=?1)",
                [table],
                |row| row.get(0),
            )
            .unwrap();
        assert!(exists, "table '{}' should exist", table);
    }
}

#[test]
fn fresh_database_is_empty() {
    let conn = open_memory().unwrap();
    assert!(is_empty(&conn).unwrap());
    conn.execute(
        "INSERT INTO companies (name) VALUES ('Valve')",
        [],
    )
    .unwrap();
    assert!(!is_empty(&conn).unwrap());
}

#[test]
fn open_database_creates_file_and_reopens() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("nested").join("catalog.db");

    {
        let conn = open_database(&path).unwrap();
        conn.execute("INSERT INTO companies (name) VALUES ('Valve')", [])
            .unwrap();
    }
    assert!(path.exists());

    let conn = open_database(&path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM companies", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn open_database_refuses_newer_schema() {
    let tmp = tempfile::tempdir().unwrap();
    let path = tmp.path().join("catalog.db");
    {
        let conn = open_database(&path).unwrap();
        conn.execute("INSERT INTO schema_version (version) VALUES (99)", [])
            .unwrap();
    }
    match open_database(&path) {
        Err(SchemaError::VersionMismatch { expected, found }) => {
            assert_eq!(expected, CURRENT_VERSION);
            assert_eq!(found, 99);
        }
        other => panic!("expected version mismatch, got {:?}", other.map(|_| ())),
    }
}

#[test]
fn every_catalog_table_counts_towards_empty() {
    for table in ALL_TABLES {
        let conn = open_memory().unwrap();
        // Bypass the row store so no other table gains a row.
        conn.execute_batch("PRAGMA foreign_keys=OFF;").unwrap();
        let (columns, values) = match table.name {
            "users" => ("name, password_hash, salt", "'u', 'h', 's'"),
            "companies" => ("name", "'c'"),
            "platforms" => ("name, kind, release_date", "'p', 'k', '2000-01-01'"),
            "games" => ("title, release_date", "'g', '2000-01-01'"),
            "publishers" => ("game_id, company_id", "1, 1"),
            "supports" => ("game_id, platform_id", "1, 1"),
            other => panic!("no fixture for table {other}"),
        };
        conn.execute(
            &format!("INSERT INTO {} ({columns}) VALUES ({values})", table.name),
            [],
        )
        .unwrap();
        assert!(!is_empty(&conn).unwrap(), "{} should count", table.name);
    }
}

#[test]
fn drop_then_create_gives_fresh_schema() {
    let conn = open_memory().unwrap();
    conn.execute("INSERT INTO companies (name) VALUES ('Valve')", [])
        .unwrap();
    drop_tables(&conn).unwrap();
    let tables: i64 = conn
        .query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name NOT LIKE 'sqlite_%'",
            [],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(tables, 0);

    create_schema(&conn).unwrap();
    assert!(is_empty(&conn).unwrap());
}
