//! Storage channels and the layered persistence gateway.
//!
//! # Responsibility
//! - Define the load/save contract every storage channel implements.
//! - Fan saves out to all channels with independent failure handling.
//!
//! # Invariants
//! - `load` returning `Ok(None)` means "nothing saved yet", never an error.
//! - A failing channel never prevents other channels from being written.
//! - Persistence failures are reported, never retried.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod file_channel;
mod gateway;
pub mod memory_channel;
pub mod sqlite_channel;

pub use file_channel::{export_file_name, JsonFileChannel};
pub use gateway::{ChannelOutcome, FlushReport, LoadOutcome, PersistenceGateway};
pub use memory_channel::MemoryChannel;
pub use sqlite_channel::SqliteChannel;

pub type ChannelResult<T> = Result<T, ChannelError>;

/// Failure of a single storage channel.
#[derive(Debug)]
pub enum ChannelError {
    Io(std::io::Error),
    Db(DbError),
    /// Channel cannot currently accept reads or writes.
    Unavailable(String),
}

impl Display for ChannelError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
            Self::Unavailable(reason) => write!(f, "channel unavailable: {reason}"),
        }
    }
}

impl Error for ChannelError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Db(err) => Some(err),
            Self::Unavailable(_) => None,
        }
    }
}

impl From<std::io::Error> for ChannelError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<DbError> for ChannelError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for ChannelError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// One storage destination for the serialized document.
pub trait PersistenceChannel {
    /// Stable short identifier used in logs and status messages.
    fn channel_id(&self) -> &str;
    /// Returns the last saved payload, or `None` when nothing was saved.
    fn load(&self) -> ChannelResult<Option<String>>;
    /// Replaces the stored payload.
    fn save(&self, body: &str) -> ChannelResult<()>;
}
