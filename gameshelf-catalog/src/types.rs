//! Data model types for the game catalog.
//!
//! Read types (`Game`, `Company`, ...) mirror what the façade returns; the
//! `New*` and `*Update` types are validated commands ready to be persisted.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

// ── User ────────────────────────────────────────────────────────────────────

/// A registered account. The password hash and salt never leave the database
/// layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct User {
    pub id: i64,
    pub name: String,
}

/// A validated signup request. The password is hashed by the database layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub password: String,
}

// ── Company ─────────────────────────────────────────────────────────────────

/// A company. Whether it acts as a developer or a publisher is decided by the
/// relation it appears in, not by its type.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Company {
    pub id: i64,
    pub name: String,
    pub country: Option<String>,
    /// Founding date, `YYYY-MM-DD`.
    pub founded: Option<String>,
    pub description: Option<String>,
}

/// A validated request to create a company.
#[derive(Debug, Clone, PartialEq)]
pub struct NewCompany {
    pub name: String,
    pub country: Option<String>,
    pub founded: Option<String>,
    pub description: Option<String>,
}

// ── Platform ────────────────────────────────────────────────────────────────

/// A platform a game can run on (console, PC, handheld, ...).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Platform {
    pub id: i64,
    pub name: String,
    /// Free-form category, e.g. "console" or "handheld".
    pub kind: String,
    pub release_date: String,
    pub description: Option<String>,
    /// Name of the owning company, if known.
    pub company: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewPlatform {
    pub name: String,
    pub kind: String,
    pub release_date: String,
    pub description: Option<String>,
    pub company: Option<String>,
}

// ── Game ────────────────────────────────────────────────────────────────────

/// One catalog title. Titles are unique and act as the lookup key.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Game {
    pub id: i64,
    pub title: String,
    pub release_date: String,
    pub price: Option<f64>,
    /// Content descriptors (violence, language, ...).
    pub content: Option<String>,
    /// Developer company name.
    pub developer: Option<String>,
    /// Average playtime.
    pub average_playtime: Option<f64>,
    /// Median playtime.
    pub median_playtime: Option<f64>,
    pub rating: Option<f64>,
}

/// A game together with every publisher and platform attached to it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GameDetail {
    pub game: Game,
    pub publishers: BTreeSet<String>,
    pub platforms: BTreeSet<String>,
}

/// A validated request to create a game, including its initial relations.
#[derive(Debug, Clone, PartialEq)]
pub struct NewGame {
    pub title: String,
    pub release_date: String,
    pub price: Option<f64>,
    pub content: Option<String>,
    pub developer: Option<String>,
    pub average_playtime: Option<f64>,
    pub median_playtime: Option<f64>,
    pub rating: Option<f64>,
    pub publishers: Vec<String>,
    pub platforms: Vec<String>,
}

/// Fields of a game that may change after creation. Title and developer are
/// fixed once the game exists.
#[derive(Debug, Clone, PartialEq)]
pub struct GameUpdate {
    pub release_date: String,
    pub price: Option<f64>,
    pub content: Option<String>,
    pub average_playtime: Option<f64>,
    pub median_playtime: Option<f64>,
    pub rating: Option<f64>,
}

/// Orderings offered by the full game listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameSort {
    /// Insertion order.
    #[default]
    Unsorted,
    /// Title, A to Z.
    Name,
    /// Newest release first.
    Date,
    /// Cheapest first, unknown prices last.
    Price,
    /// Best rated first, unrated last.
    Rating,
}

impl GameSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unsorted => "unsorted",
            Self::Name => "name",
            Self::Date => "date",
            Self::Price => "price",
            Self::Rating => "rating",
        }
    }

    pub fn from_str_loose(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "name" | "title" => Self::Name,
            "date" | "release_date" => Self::Date,
            "price" => Self::Price,
            "rating" => Self::Rating,
            _ => Self::Unsorted,
        }
    }
}

// ── Import Tracking ─────────────────────────────────────────────────────────

/// Log entry for one seed file imported into a table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportLog {
    pub id: i64,
    pub table_name: String,
    pub source: String,
    pub rows_imported: i64,
    pub imported_at: String,
}
