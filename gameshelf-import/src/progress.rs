//! Seed progress reporting.

/// Trait for receiving seed progress updates.
pub trait SeedProgress {
    /// Called when a table starts loading from `source`.
    fn on_table(&self, table: &str, source: &str);

    /// Called after each row is inserted. `current` counts from 1.
    fn on_row(&self, table: &str, current: u64);

    /// Called when seeding is complete.
    fn on_complete(&self, message: &str);
}

/// A no-op progress reporter that discards all updates.
pub struct SilentProgress;

impl SeedProgress for SilentProgress {
    fn on_table(&self, _table: &str, _source: &str) {}
    fn on_row(&self, _table: &str, _current: u64) {}
    fn on_complete(&self, _message: &str) {}
}

/// A progress reporter that logs to the `log` crate.
pub struct LogProgress;

impl SeedProgress for LogProgress {
    fn on_table(&self, table: &str, source: &str) {
        log::info!("Seeding {} from {}", table, source);
    }

    fn on_row(&self, table: &str, current: u64) {
        if current.is_multiple_of(500) {
            log::info!("  [{}] {} rows", table, current);
        }
    }

    fn on_complete(&self, message: &str) {
        log::info!("{}", message);
    }
}
