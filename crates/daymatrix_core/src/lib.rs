//! Core domain logic for DayMatrix, a per-day four-quadrant task organizer.
//! This crate is the single source of truth for document invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod persist;
pub mod service;

pub use config::DayMatrixConfig;
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::date_key::{to_key, DateKey};
pub use model::document::{MatrixDocument, COMPLETED_KEY};
pub use model::ledger::{CompletedLedger, CompletedTaskEntry};
pub use model::matrix::{is_day_empty, DayMatrix, Quadrant};
pub use model::validation::ValidationError;
pub use persist::{
    export_file_name, ChannelError, FlushReport, JsonFileChannel, MemoryChannel,
    PersistenceChannel, PersistenceGateway, SqliteChannel,
};
pub use service::clock::{Clock, FixedClock, SystemClock};
pub use service::matrix_store::{
    AutoCopyOutcome, AutoCopyReport, CompletionReport, MatrixStore, DEFAULT_LOOKBACK_DAYS,
};
pub use service::session::MatrixSession;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
