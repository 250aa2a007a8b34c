//! Read queries for the catalog database.
//!
//! Provides the listings, search, and detail lookups behind every page of the
//! catalog.

use std::collections::BTreeSet;

use gameshelf_catalog::types::*;
use rusqlite::{Connection, params};

use crate::operations::OperationError;

/// Number of games shown on the home page.
pub const LATEST_GAMES: u32 = 10;

const GAME_COLUMNS: &str = "g.id, g.title, g.release_date, g.price, g.content, d.name,
                g.average_playtime, g.median_playtime, g.rating";

// ── Game Listings ───────────────────────────────────────────────────────────

/// The `limit` most recently released games, newest first.
pub fn latest_games(conn: &Connection, limit: u32) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g LEFT JOIN companies d ON d.id = g.developer_id
         ORDER BY g.release_date DESC, g.title
         LIMIT ?1"
    ))?;
    let rows = stmt.query_map(params![limit], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Games whose title contains `needle`.
///
/// Matching follows SQLite `LIKE`: ASCII letters compare case-insensitively.
/// Wildcard characters in `needle` are matched literally.
pub fn search_games(conn: &Connection, needle: &str) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g LEFT JOIN companies d ON d.id = g.developer_id
         WHERE g.title LIKE ?1 ESCAPE '\\'
         ORDER BY g.title"
    ))?;
    let rows = stmt.query_map(params![like_pattern(needle)], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Every game in the requested order. Ties are broken by title, so each
/// ordering is total.
pub fn list_games(conn: &Connection, sort: GameSort) -> Result<Vec<Game>, OperationError> {
    let order = match sort {
        GameSort::Unsorted => "g.id",
        GameSort::Name => "g.title",
        GameSort::Date => "g.release_date DESC, g.title",
        GameSort::Price => "g.price ASC NULLS LAST, g.title",
        GameSort::Rating => "g.rating DESC NULLS LAST, g.title",
    };
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g LEFT JOIN companies d ON d.id = g.developer_id
         ORDER BY {order}"
    ))?;
    let rows = stmt.query_map([], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Games available on the named platform.
pub fn games_for_platform(conn: &Connection, platform: &str) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g LEFT JOIN companies d ON d.id = g.developer_id
         JOIN supports s ON s.game_id = g.id
         JOIN platforms p ON p.id = s.platform_id
         WHERE p.name = ?1
         ORDER BY g.title"
    ))?;
    let rows = stmt.query_map(params![platform], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Games the named company publishes.
pub fn games_published_by(conn: &Connection, company: &str) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g LEFT JOIN companies d ON d.id = g.developer_id
         JOIN publishers gp ON gp.game_id = g.id
         JOIN companies c ON c.id = gp.company_id
         WHERE c.name = ?1
         ORDER BY g.title"
    ))?;
    let rows = stmt.query_map(params![company], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// Games the named company developed.
pub fn games_developed_by(conn: &Connection, company: &str) -> Result<Vec<Game>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}
         FROM games g JOIN companies d ON d.id = g.developer_id
         WHERE d.name = ?1
         ORDER BY g.title"
    ))?;
    let rows = stmt.query_map(params![company], row_to_game)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Details ─────────────────────────────────────────────────────────────────

/// Everything known about one game, with its publishers and platforms
/// collected into sets.
pub fn game_detail(conn: &Connection, title: &str) -> Result<Option<GameDetail>, OperationError> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {GAME_COLUMNS}, pc.name, p.name
         FROM games g
         LEFT JOIN companies d ON d.id = g.developer_id
         LEFT JOIN publishers gp ON gp.game_id = g.id
         LEFT JOIN companies pc ON pc.id = gp.company_id
         LEFT JOIN supports s ON s.game_id = g.id
         LEFT JOIN platforms p ON p.id = s.platform_id
         WHERE g.title = ?1"
    ))?;
    let mut rows = stmt.query(params![title])?;

    let mut detail: Option<GameDetail> = None;
    while let Some(row) = rows.next()? {
        if detail.is_none() {
            detail = Some(GameDetail {
                game: row_to_game(row)?,
                publishers: BTreeSet::new(),
                platforms: BTreeSet::new(),
            });
        }
        let Some(entry) = detail.as_mut() else {
            continue;
        };
        if let Some(publisher) = row.get::<_, Option<String>>(9)? {
            entry.publishers.insert(publisher);
        }
        if let Some(platform) = row.get::<_, Option<String>>(10)? {
            entry.platforms.insert(platform);
        }
    }
    Ok(detail)
}

/// Look up a company by exact name.
pub fn company_detail(conn: &Connection, name: &str) -> Result<Option<Company>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, country, founded, description FROM companies WHERE name = ?1",
    )?;
    let result = stmt.query_row(params![name], row_to_company);
    match result {
        Ok(c) => Ok(Some(c)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Look up a platform by exact name.
pub fn platform_detail(conn: &Connection, name: &str) -> Result<Option<Platform>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.kind, p.release_date, p.description, c.name
         FROM platforms p LEFT JOIN companies c ON c.id = p.company_id
         WHERE p.name = ?1",
    )?;
    let result = stmt.query_row(params![name], row_to_platform);
    match result {
        Ok(p) => Ok(Some(p)),
        Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// All companies, by name.
pub fn list_companies(conn: &Connection) -> Result<Vec<Company>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, name, country, founded, description FROM companies ORDER BY name",
    )?;
    let rows = stmt.query_map([], row_to_company)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

/// All platforms, by name.
pub fn list_platforms(conn: &Connection) -> Result<Vec<Platform>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT p.id, p.name, p.kind, p.release_date, p.description, c.name
         FROM platforms p LEFT JOIN companies c ON c.id = p.company_id
         ORDER BY p.name",
    )?;
    let rows = stmt.query_map([], row_to_platform)?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Statistics ──────────────────────────────────────────────────────────────

/// Get overall catalog statistics.
pub fn catalog_stats(conn: &Connection) -> Result<CatalogStats, OperationError> {
    let count = |table: &str| -> Result<i64, OperationError> {
        Ok(conn.query_row(&format!("SELECT COUNT(*) FROM {table}"), [], |r| r.get(0))?)
    };
    Ok(CatalogStats {
        users: count("users")?,
        companies: count("companies")?,
        platforms: count("platforms")?,
        games: count("games")?,
        publisher_links: count("publishers")?,
        platform_links: count("supports")?,
    })
}

/// Summary statistics for the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CatalogStats {
    pub users: i64,
    pub companies: i64,
    pub platforms: i64,
    pub games: i64,
    pub publisher_links: i64,
    pub platform_links: i64,
}

// ── Import Log Queries ──────────────────────────────────────────────────────

/// List import log entries, oldest first.
pub fn list_import_logs(conn: &Connection) -> Result<Vec<ImportLog>, OperationError> {
    let mut stmt = conn.prepare(
        "SELECT id, table_name, source, rows_imported, imported_at
         FROM import_log ORDER BY id",
    )?;
    let rows = stmt.query_map([], |row| {
        Ok(ImportLog {
            id: row.get(0)?,
            table_name: row.get(1)?,
            source: row.get(2)?,
            rows_imported: row.get(3)?,
            imported_at: row.get(4)?,
        })
    })?;
    rows.collect::<Result<Vec<_>, _>>().map_err(Into::into)
}

// ── Row Mapping Helpers ─────────────────────────────────────────────────────

fn like_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for ch in needle.chars() {
        if matches!(ch, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn row_to_game(row: &rusqlite::Row<'_>) -> rusqlite::Result<Game> {
    Ok(Game {
        id: row.get(0)?,
        title: row.get(1)?,
        release_date: row.get(2)?,
        price: row.get(3)?,
        content: row.get(4)?,
        developer: row.get(5)?,
        average_playtime: row.get(6)?,
        median_playtime: row.get(7)?,
        rating: row.get(8)?,
    })
}

fn row_to_company(row: &rusqlite::Row<'_>) -> rusqlite::Result<Company> {
    Ok(Company {
        id: row.get(0)?,
        name: row.get(1)?,
        country: row.get(2)?,
        founded: row.get(3)?,
        description: row.get(4)?,
    })
}

fn row_to_platform(row: &rusqlite::Row<'_>) -> rusqlite::Result<Platform> {
    Ok(Platform {
        id: row.get(0)?,
        name: row.get(1)?,
        kind: row.get(2)?,
        release_date: row.get(3)?,
        description: row.get(4)?,
        company: row.get(5)?,
    })
}
