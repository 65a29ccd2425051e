//! Runtime configuration and storage wiring.
//!
//! # Responsibility
//! - Resolve data/log locations from explicit values, environment, defaults.
//! - Build the layered persistence gateway from resolved settings.
//!
//! # Invariants
//! - Explicit values win over environment, environment wins over defaults.
//! - Blank environment values are treated as unset.

use crate::logging::default_log_level;
use crate::persist::{ChannelResult, JsonFileChannel, PersistenceGateway, SqliteChannel};
use crate::service::matrix_store::DEFAULT_LOOKBACK_DAYS;
use log::{info, warn};
use std::path::PathBuf;

pub const ENV_DATA_DIR: &str = "DAYMATRIX_DATA_DIR";
pub const ENV_JSON_FILE: &str = "DAYMATRIX_JSON_FILE";
pub const ENV_LOG_LEVEL: &str = "DAYMATRIX_LOG_LEVEL";
pub const ENV_LOOKBACK_DAYS: &str = "DAYMATRIX_LOOKBACK_DAYS";

const DEFAULT_DIR_NAME: &str = "daymatrix";
const DB_FILE_NAME: &str = "daymatrix.sqlite3";
const LOG_DIR_NAME: &str = "logs";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayMatrixConfig {
    /// Directory holding the SQLite cache and logs.
    pub data_dir: PathBuf,
    /// Optional durable JSON file written on every save.
    pub json_file: Option<PathBuf>,
    pub log_level: String,
    pub lookback_days: u32,
}

impl Default for DayMatrixConfig {
    fn default() -> Self {
        Self {
            data_dir: std::env::temp_dir().join(DEFAULT_DIR_NAME),
            json_file: None,
            log_level: default_log_level().to_string(),
            lookback_days: DEFAULT_LOOKBACK_DAYS,
        }
    }
}

impl DayMatrixConfig {
    /// Defaults overlaid with `DAYMATRIX_*` environment variables.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with values from `lookup` (environment-shaped).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let mut config = Self::default();
        if let Some(dir) = read(ENV_DATA_DIR) {
            config.data_dir = PathBuf::from(dir);
        }
        if let Some(file) = read(ENV_JSON_FILE) {
            config.json_file = Some(PathBuf::from(file));
        }
        if let Some(level) = read(ENV_LOG_LEVEL) {
            config.log_level = level;
        }
        match read(ENV_LOOKBACK_DAYS).map(|raw| raw.parse::<u32>()) {
            Some(Ok(days)) if days > 0 => config.lookback_days = days,
            Some(_) => warn!("event=config_load module=config status=ignored key={ENV_LOOKBACK_DAYS}"),
            None => {}
        }
        config
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join(DB_FILE_NAME)
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join(LOG_DIR_NAME)
    }

    /// Builds `[sqlite cache, json file?]` in load-precedence order.
    ///
    /// # Errors
    /// - When the data directory cannot be created or the cache cannot be
    ///   opened. A missing JSON file is not an error.
    pub fn build_gateway(&self) -> ChannelResult<PersistenceGateway> {
        std::fs::create_dir_all(&self.data_dir)?;
        let mut gateway = PersistenceGateway::new().with_channel(SqliteChannel::open(self.db_path())?);
        if let Some(json_file) = &self.json_file {
            gateway = gateway.with_channel(JsonFileChannel::new(json_file.clone()));
        }
        info!(
            "event=gateway_init module=config status=ok channels={}",
            gateway.channel_ids().join(",")
        );
        Ok(gateway)
    }
}
