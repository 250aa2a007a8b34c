//! SQLite persistence layer for the game catalog.
//!
//! Provides schema creation, the table-driven row store, entity operations,
//! read queries, and credential checks, backed by SQLite (via rusqlite with
//! the bundled feature).

pub mod auth;
pub mod operations;
pub mod queries;
pub mod rowstore;
pub mod schema;

pub use auth::{LoginError, login};
pub use operations::{
    OperationError, attach_platform, attach_publisher, create_company, create_game,
    create_platform, create_user, find_company_id, find_game_id, find_platform_id,
    insert_import_log, update_game,
};
pub use queries::{
    CatalogStats, LATEST_GAMES, catalog_stats, company_detail, game_detail, games_developed_by,
    games_for_platform, games_published_by, latest_games, list_companies, list_games,
    list_import_logs, list_platforms, platform_detail, search_games,
};
pub use rowstore::{Row, Table, insert_row};
pub use schema::{SchemaError, open_database, open_memory};
