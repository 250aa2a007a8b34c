//! Application layer for the game catalog.
//!
//! [`Shelf`] owns the database connection and is the single entry point a
//! frontend talks to: page reads go straight to the query layer, form
//! submissions are validated, checked against the store, then persisted.
//! [`settings`] locates the database and seed data on disk.

pub mod error;
pub mod settings;
pub mod shelf;

pub use error::{ShelfError, SubmitError};
pub use settings::{Settings, SettingsError, load_or_create, settings_path};
pub use shelf::Shelf;
