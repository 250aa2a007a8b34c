//! Generic row insertion driven by static table descriptors.
//!
//! A row is a column → value map. Before inserting, null values are dropped,
//! the table's row transform runs, and every natural-key reference (a company
//! name, a game title, ...) is replaced by the surrogate id it names. A name
//! that resolves to no row is an error and nothing is written.
//!
//! Typed columns (dates, numbers) are checked with the same rules as form
//! input, so text rows from a CSV file cannot store values the read queries
//! would choke on.

use std::collections::BTreeMap;

use gameshelf_catalog::forms::{FieldError, check_number, parse_date, parse_number};
use gameshelf_catalog::password::hash_password;
use rusqlite::types::Value;
use rusqlite::{Connection, params_from_iter};

use crate::operations::OperationError;

/// One row to insert, keyed by column (or reference input) name.
pub type Row = BTreeMap<String, Value>;

/// A column whose input is a natural key that must be resolved to an id.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    /// Name of the input column carrying the natural key (e.g. `developer`).
    pub input: &'static str,
    /// Stored foreign-key column (e.g. `developer_id`).
    pub column: &'static str,
    /// Referenced table.
    pub target: &'static str,
    /// Natural-key column in the referenced table.
    pub key: &'static str,
    /// Human name of the referenced entity, for errors.
    pub entity: &'static str,
}

/// Per-table rewrite applied before columns are checked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowTransform {
    None,
    /// Replace a plain `password` column with `password_hash` + `salt`,
    /// unless a salt is already supplied.
    HashPassword,
}

/// Value rule for a column that is not free text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    /// `YYYY-MM-DD`, stored as text.
    Date,
    /// Finite, non-negative, stored as REAL.
    Number,
}

/// Static description of a table the row store can write to.
#[derive(Debug, Clone, Copy)]
pub struct Table {
    pub name: &'static str,
    /// Human name of one row, for errors.
    pub entity: &'static str,
    /// Columns that may be written directly.
    pub columns: &'static [&'static str],
    pub references: &'static [Reference],
    /// Columns whose values must satisfy a [`ColumnKind`].
    pub typed: &'static [(&'static str, ColumnKind)],
    /// Natural-key column, if the table has one.
    pub natural_key: Option<&'static str>,
    pub transform: RowTransform,
    /// CSV file the table is seeded from.
    pub seed_file: &'static str,
}

const fn company_by_name(input: &'static str, column: &'static str) -> Reference {
    Reference {
        input,
        column,
        target: "companies",
        key: "name",
        entity: "company",
    }
}

const GAME_BY_TITLE: Reference = Reference {
    input: "game",
    column: "game_id",
    target: "games",
    key: "title",
    entity: "game",
};

pub const USERS: Table = Table {
    name: "users",
    entity: "user",
    columns: &["name", "password_hash", "salt"],
    references: &[],
    typed: &[],
    natural_key: Some("name"),
    transform: RowTransform::HashPassword,
    seed_file: "users.csv",
};

pub const COMPANIES: Table = Table {
    name: "companies",
    entity: "company",
    columns: &["name", "country", "founded", "description"],
    references: &[],
    typed: &[("founded", ColumnKind::Date)],
    natural_key: Some("name"),
    transform: RowTransform::None,
    seed_file: "companies.csv",
};

pub const PLATFORMS: Table = Table {
    name: "platforms",
    entity: "platform",
    columns: &["name", "kind", "release_date", "description", "company_id"],
    references: &[company_by_name("company", "company_id")],
    typed: &[("release_date", ColumnKind::Date)],
    natural_key: Some("name"),
    transform: RowTransform::None,
    seed_file: "platforms.csv",
};

pub const GAMES: Table = Table {
    name: "games",
    entity: "game",
    columns: &[
        "title",
        "release_date",
        "price",
        "content",
        "developer_id",
        "average_playtime",
        "median_playtime",
        "rating",
    ],
    references: &[company_by_name("developer", "developer_id")],
    typed: &[
        ("release_date", ColumnKind::Date),
        ("price", ColumnKind::Number),
        ("average_playtime", ColumnKind::Number),
        ("median_playtime", ColumnKind::Number),
        ("rating", ColumnKind::Number),
    ],
    natural_key: Some("title"),
    transform: RowTransform::None,
    seed_file: "games.csv",
};

pub const PUBLISHERS: Table = Table {
    name: "publishers",
    entity: "publisher",
    columns: &["game_id", "company_id"],
    references: &[GAME_BY_TITLE, company_by_name("company", "company_id")],
    typed: &[],
    natural_key: None,
    transform: RowTransform::None,
    seed_file: "publishers.csv",
};

pub const SUPPORTS: Table = Table {
    name: "supports",
    entity: "platform",
    columns: &["game_id", "platform_id"],
    references: &[
        GAME_BY_TITLE,
        Reference {
            input: "platform",
            column: "platform_id",
            target: "platforms",
            key: "name",
            entity: "platform",
        },
    ],
    typed: &[],
    natural_key: None,
    transform: RowTransform::None,
    seed_file: "supports.csv",
};

/// Every table in an order where references always point backwards.
pub const ALL_TABLES: [&Table; 6] = [
    &USERS,
    &COMPANIES,
    &PLATFORMS,
    &GAMES,
    &PUBLISHERS,
    &SUPPORTS,
];

impl Table {
    /// Look up a table descriptor by its SQL name.
    pub fn by_name(name: &str) -> Option<&'static Table> {
        ALL_TABLES.iter().copied().find(|t| t.name == name)
    }

    fn accepts(&self, column: &str) -> bool {
        self.columns.contains(&column) || self.references.iter().any(|r| r.input == column)
    }

    /// Human-readable key of `row` for duplicate errors.
    fn describe_key(&self, row: &Row) -> String {
        let parts: Vec<&str> = match self.natural_key {
            Some(key) => vec![key],
            None => self.references.iter().map(|r| r.input).collect(),
        };
        parts
            .iter()
            .filter_map(|c| row.get(*c).and_then(value_as_text))
            .collect::<Vec<_>>()
            .join(" / ")
    }
}

/// Insert one row into `table` and return the generated rowid.
///
/// Null values are dropped so the column default (or NULL) applies. Columns
/// the table does not declare are rejected before any SQL runs.
pub fn insert_row(conn: &Connection, table: &Table, mut row: Row) -> Result<i64, OperationError> {
    row.retain(|_, v| *v != Value::Null);

    if table.transform == RowTransform::HashPassword {
        hash_password_column(&mut row);
    }

    if let Some(column) = row.keys().find(|c| !table.accepts(c)) {
        return Err(OperationError::UnknownColumn {
            table: table.name,
            column: column.clone(),
        });
    }
    if row.is_empty() {
        return Err(OperationError::EmptyRow { table: table.name });
    }
    check_typed_columns(table, &mut row).map_err(|source| OperationError::InvalidValue {
        table: table.name,
        source,
    })?;

    let key = table.describe_key(&row);

    for reference in table.references {
        let Some(value) = row.remove(reference.input) else {
            continue;
        };
        let name = value_as_text(&value).unwrap_or_default();
        let id = lookup_id(conn, reference.target, reference.key, &name)?.ok_or_else(|| {
            OperationError::UnresolvedReference {
                entity: reference.entity,
                name: name.clone(),
            }
        })?;
        row.insert(reference.column.to_string(), Value::Integer(id));
    }

    let columns: Vec<&str> = row.keys().map(String::as_str).collect();
    let placeholders: Vec<String> = (1..=columns.len()).map(|i| format!("?{i}")).collect();
    let sql = format!(
        "INSERT INTO {} ({}) VALUES ({})",
        table.name,
        columns.join(", "),
        placeholders.join(", ")
    );
    log::debug!("{sql}");

    conn.execute(&sql, params_from_iter(row.values()))
        .map_err(|e| unique_violation(e, table.entity, key))?;
    Ok(conn.last_insert_rowid())
}

/// Find the surrogate id of the row in `table` whose `key` column equals
/// `name`.
pub fn lookup_id(
    conn: &Connection,
    table: &str,
    key: &str,
    name: &str,
) -> Result<Option<i64>, OperationError> {
    let mut stmt = conn.prepare_cached(&format!("SELECT id FROM {table} WHERE {key} = ?1"))?;
    let result = stmt.query_row([name], |row| row.get::<_, i64>(0));
    match result {
        Ok(id) => Ok(Some(id)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Convert a UNIQUE / PRIMARY KEY violation into [`OperationError::Duplicate`].
pub(crate) fn unique_violation(
    err: rusqlite::Error,
    entity: &'static str,
    key: String,
) -> OperationError {
    if let rusqlite::Error::SqliteFailure(ref failure, _) = err {
        if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
            || failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_PRIMARYKEY
        {
            return OperationError::Duplicate { entity, key };
        }
    }
    OperationError::Sqlite(err)
}

/// Validate every typed column present in `row`, normalizing dates and
/// turning numeric text into REAL values.
fn check_typed_columns(table: &Table, row: &mut Row) -> Result<(), FieldError> {
    for &(column, kind) in table.typed {
        let Some(value) = row.get(column) else {
            continue;
        };
        let checked = match (kind, value) {
            (ColumnKind::Date, Value::Text(text)) => Value::Text(parse_date(column, text)?),
            (ColumnKind::Number, Value::Text(text)) => match parse_number(column, text)? {
                Some(n) => Value::Real(n),
                None => Value::Null,
            },
            (ColumnKind::Number, Value::Real(n)) => Value::Real(check_number(column, *n)?),
            (ColumnKind::Number, Value::Integer(n)) => {
                Value::Real(check_number(column, *n as f64)?)
            }
            (ColumnKind::Date, other) => {
                return Err(FieldError::InvalidDate {
                    field: column,
                    value: value_as_text(other).unwrap_or_default(),
                });
            }
            (ColumnKind::Number, other) => {
                return Err(FieldError::InvalidNumber {
                    field: column,
                    value: value_as_text(other).unwrap_or_default(),
                });
            }
        };
        if checked == Value::Null {
            row.remove(column);
        } else {
            row.insert(column.to_string(), checked);
        }
    }
    Ok(())
}

fn hash_password_column(row: &mut Row) {
    if row.contains_key("salt") {
        return;
    }
    if let Some(plain) = row.remove("password") {
        let hashed = hash_password(&value_as_text(&plain).unwrap_or_default());
        row.insert("password_hash".to_string(), Value::Text(hashed.hash));
        row.insert("salt".to_string(), Value::Text(hashed.salt));
    }
}

fn value_as_text(value: &Value) -> Option<String> {
    match value {
        Value::Text(s) => Some(s.clone()),
        Value::Integer(i) => Some(i.to_string()),
        Value::Real(f) => Some(f.to_string()),
        Value::Null | Value::Blob(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(pairs: &[(&str, &str)]) -> Row {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), Value::Text(v.to_string())))
            .collect()
    }

    #[test]
    fn relation_tables_describe_key_by_references() {
        let r = row(&[("game", "Celeste"), ("company", "Matt Makes Games")]);
        assert_eq!(PUBLISHERS.describe_key(&r), "Celeste / Matt Makes Games");
    }

    #[test]
    fn accepts_declared_columns_and_reference_inputs() {
        assert!(GAMES.accepts("title"));
        assert!(GAMES.accepts("developer"));
        assert!(GAMES.accepts("developer_id"));
        assert!(!GAMES.accepts("publisher"));
    }

    #[test]
    fn password_column_is_replaced() {
        let mut r = row(&[("name", "ana"), ("password", "pw")]);
        hash_password_column(&mut r);
        assert!(!r.contains_key("password"));
        assert!(r.contains_key("password_hash"));
        assert!(r.contains_key("salt"));
    }

    #[test]
    fn typed_columns_are_normalized() {
        let mut r = row(&[
            ("title", "Celeste"),
            ("release_date", "2018-1-25"),
            ("price", "19.99"),
        ]);
        check_typed_columns(&GAMES, &mut r).unwrap();
        assert_eq!(r["release_date"], Value::Text("2018-01-25".to_string()));
        assert_eq!(r["price"], Value::Real(19.99));
        assert_eq!(r["title"], Value::Text("Celeste".to_string()));
    }

    #[test]
    fn blank_number_is_dropped() {
        let mut r = row(&[("title", "Celeste"), ("rating", "  ")]);
        check_typed_columns(&GAMES, &mut r).unwrap();
        assert!(!r.contains_key("rating"));
    }

    #[test]
    fn typed_columns_reject_bad_values() {
        let mut r = row(&[("release_date", "1.1.2020")]);
        assert!(matches!(
            check_typed_columns(&GAMES, &mut r),
            Err(FieldError::InvalidDate { field: "release_date", .. })
        ));
        let mut r = row(&[("price", "free")]);
        assert!(matches!(
            check_typed_columns(&GAMES, &mut r),
            Err(FieldError::InvalidNumber { field: "price", .. })
        ));
        let mut r = Row::from([("rating".to_string(), Value::Real(-1.0))]);
        assert_eq!(
            check_typed_columns(&GAMES, &mut r),
            Err(FieldError::Negative { field: "rating" })
        );
    }

    #[test]
    fn table_lookup_by_name() {
        assert_eq!(Table::by_name("supports").map(|t| t.seed_file), Some("supports.csv"));
        assert!(Table::by_name("nope").is_none());
    }
}
