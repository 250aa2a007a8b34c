//! Seed the catalog database from CSV files.
//!
//! This crate owns first-run bootstrapping: reading one column-headered CSV
//! file per table, replaying each record through the row store, and recording
//! every imported file in the import log.

pub mod progress;
pub mod seed;

pub use progress::{LogProgress, SeedProgress, SilentProgress};
pub use seed::{
    SeedError, SeedStats, bootstrap, clear_tables, import_csv, import_csv_file, rebuild, reseed,
    seed_from_dir,
};
