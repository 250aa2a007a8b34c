//! Write operations for every catalog entity.
//!
//! Compound writes (a game with its relations, attaching a platform or a
//! publisher) run inside one transaction, so a failed reference lookup leaves
//! the database untouched.

use gameshelf_catalog::forms::FieldError;
use gameshelf_catalog::types::*;
use rusqlite::types::Value;
use rusqlite::{Connection, params};
use thiserror::Error;

use crate::rowstore::{self, Row};

#[derive(Debug, Error)]
pub enum OperationError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Entity not found: {entity} '{key}'")]
    NotFound { entity: &'static str, key: String },
    #[error("Unknown {entity} '{name}'")]
    UnresolvedReference { entity: &'static str, name: String },
    #[error("Duplicate {entity}: '{key}' already exists")]
    Duplicate { entity: &'static str, key: String },
    #[error("Table '{table}' has no column '{column}'")]
    UnknownColumn { table: &'static str, column: String },
    #[error("Nothing to insert into '{table}'")]
    EmptyRow { table: &'static str },
    #[error("Invalid value for '{table}': {source}")]
    InvalidValue {
        table: &'static str,
        source: FieldError,
    },
}

// ── User Operations ─────────────────────────────────────────────────────────

/// Create an account. The password is hashed with a fresh salt.
pub fn create_user(conn: &Connection, user: &NewUser) -> Result<User, OperationError> {
    let row = Row::from([
        ("name".to_string(), Value::from(user.name.clone())),
        ("password".to_string(), Value::from(user.password.clone())),
    ]);
    let id = rowstore::insert_row(conn, &rowstore::USERS, row)?;
    log::info!("Created user '{}'", user.name);
    Ok(User {
        id,
        name: user.name.clone(),
    })
}

// ── Company Operations ──────────────────────────────────────────────────────

pub fn create_company(conn: &Connection, company: &NewCompany) -> Result<Company, OperationError> {
    let row = Row::from([
        ("name".to_string(), Value::from(company.name.clone())),
        ("country".to_string(), Value::from(company.country.clone())),
        ("founded".to_string(), Value::from(company.founded.clone())),
        ("description".to_string(), Value::from(company.description.clone())),
    ]);
    let id = rowstore::insert_row(conn, &rowstore::COMPANIES, row)?;
    Ok(Company {
        id,
        name: company.name.clone(),
        country: company.country.clone(),
        founded: company.founded.clone(),
        description: company.description.clone(),
    })
}

/// Find a company's id by exact name.
pub fn find_company_id(conn: &Connection, name: &str) -> Result<Option<i64>, OperationError> {
    rowstore::lookup_id(conn, "companies", "name", name)
}

// ── Platform Operations ─────────────────────────────────────────────────────

/// Create a platform. An owning company, if given, must already exist.
pub fn create_platform(
    conn: &Connection,
    platform: &NewPlatform,
) -> Result<Platform, OperationError> {
    let row = Row::from([
        ("name".to_string(), Value::from(platform.name.clone())),
        ("kind".to_string(), Value::from(platform.kind.clone())),
        ("release_date".to_string(), Value::from(platform.release_date.clone())),
        ("description".to_string(), Value::from(platform.description.clone())),
        ("company".to_string(), Value::from(platform.company.clone())),
    ]);
    let id = rowstore::insert_row(conn, &rowstore::PLATFORMS, row)?;
    Ok(Platform {
        id,
        name: platform.name.clone(),
        kind: platform.kind.clone(),
        release_date: platform.release_date.clone(),
        description: platform.description.clone(),
        company: platform.company.clone(),
    })
}

/// Find a platform's id by exact name.
pub fn find_platform_id(conn: &Connection, name: &str) -> Result<Option<i64>, OperationError> {
    rowstore::lookup_id(conn, "platforms", "name", name)
}

// ── Game Operations ─────────────────────────────────────────────────────────

/// Create a game together with its publisher and platform relations.
///
/// Every referenced company and platform must exist; otherwise nothing is
/// written and [`OperationError::UnresolvedReference`] is returned.
pub fn create_game(conn: &Connection, game: &NewGame) -> Result<Game, OperationError> {
    let tx = conn.unchecked_transaction()?;

    let row = Row::from([
        ("title".to_string(), Value::from(game.title.clone())),
        ("release_date".to_string(), Value::from(game.release_date.clone())),
        ("price".to_string(), Value::from(game.price)),
        ("content".to_string(), Value::from(game.content.clone())),
        ("developer".to_string(), Value::from(game.developer.clone())),
        ("average_playtime".to_string(), Value::from(game.average_playtime)),
        ("median_playtime".to_string(), Value::from(game.median_playtime)),
        ("rating".to_string(), Value::from(game.rating)),
    ]);
    let id = rowstore::insert_row(&tx, &rowstore::GAMES, row)?;

    for publisher in &game.publishers {
        rowstore::insert_row(&tx, &rowstore::PUBLISHERS, relation_row(&game.title, "company", publisher))?;
    }
    for platform in &game.platforms {
        rowstore::insert_row(&tx, &rowstore::SUPPORTS, relation_row(&game.title, "platform", platform))?;
    }

    tx.commit()?;
    log::info!("Created game '{}'", game.title);

    Ok(Game {
        id,
        title: game.title.clone(),
        release_date: game.release_date.clone(),
        price: game.price,
        content: game.content.clone(),
        developer: game.developer.clone(),
        average_playtime: game.average_playtime,
        median_playtime: game.median_playtime,
        rating: game.rating,
    })
}

/// Overwrite the editable fields of the game titled `title`.
pub fn update_game(
    conn: &Connection,
    title: &str,
    update: &GameUpdate,
) -> Result<(), OperationError> {
    let changed = conn.execute(
        "UPDATE games
         SET release_date = ?2, price = ?3, content = ?4,
             average_playtime = ?5, median_playtime = ?6, rating = ?7
         WHERE title = ?1",
        params![
            title,
            update.release_date,
            update.price,
            update.content,
            update.average_playtime,
            update.median_playtime,
            update.rating,
        ],
    )?;
    if changed == 0 {
        return Err(OperationError::NotFound {
            entity: "game",
            key: title.to_string(),
        });
    }
    Ok(())
}

/// Find a game's id by exact title.
pub fn find_game_id(conn: &Connection, title: &str) -> Result<Option<i64>, OperationError> {
    rowstore::lookup_id(conn, "games", "title", title)
}

/// Attach an existing platform to an existing game.
pub fn attach_platform(conn: &Connection, title: &str, platform: &str) -> Result<(), OperationError> {
    attach(conn, title, &rowstore::SUPPORTS, "platform", platform)
}

/// Attach an existing company to an existing game as a publisher.
pub fn attach_publisher(conn: &Connection, title: &str, company: &str) -> Result<(), OperationError> {
    attach(conn, title, &rowstore::PUBLISHERS, "company", company)
}

fn attach(
    conn: &Connection,
    title: &str,
    table: &rowstore::Table,
    input: &str,
    name: &str,
) -> Result<(), OperationError> {
    let tx = conn.unchecked_transaction()?;
    if find_game_id(&tx, title)?.is_none() {
        return Err(OperationError::NotFound {
            entity: "game",
            key: title.to_string(),
        });
    }
    rowstore::insert_row(&tx, table, relation_row(title, input, name))?;
    tx.commit()?;
    log::info!("Attached {} '{}' to '{}'", table.entity, name, title);
    Ok(())
}

fn relation_row(title: &str, input: &str, name: &str) -> Row {
    Row::from([
        ("game".to_string(), Value::from(title.to_string())),
        (input.to_string(), Value::from(name.to_string())),
    ])
}

// ── Import Log Operations ───────────────────────────────────────────────────

/// Record that `rows` rows were imported into `table_name` from `source`.
/// Returns the generated ID.
pub fn insert_import_log(
    conn: &Connection,
    table_name: &str,
    source: &str,
    rows: u64,
) -> Result<i64, OperationError> {
    conn.execute(
        "INSERT INTO import_log (table_name, source, rows_imported) VALUES (?1, ?2, ?3)",
        params![table_name, source, rows as i64],
    )?;
    Ok(conn.last_insert_rowid())
}
