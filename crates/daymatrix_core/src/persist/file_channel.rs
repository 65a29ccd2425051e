//! Durable external JSON file channel.
//!
//! # Invariants
//! - Writes go to a sibling temp file first and are renamed into place.
//! - A missing or blank file loads as "nothing saved", not an error.

use super::{ChannelResult, PersistenceChannel};
use crate::model::date_key::DateKey;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

const CHANNEL_ID: &str = "json_file";
const EXPORT_FILE_PREFIX: &str = "daymatrix-data";

/// Suggested file name for a manual export taken on `date`.
pub fn export_file_name(date: DateKey) -> String {
    format!("{EXPORT_FILE_PREFIX}-{date}.json")
}

/// Pretty-printed JSON document at a fixed path.
#[derive(Debug, Clone)]
pub struct JsonFileChannel {
    path: PathBuf,
}

impl JsonFileChannel {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|name| name.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceChannel for JsonFileChannel {
    fn channel_id(&self) -> &str {
        CHANNEL_ID
    }

    fn load(&self) -> ChannelResult<Option<String>> {
        match fs::read_to_string(&self.path) {
            Ok(body) if body.trim().is_empty() => Ok(None),
            Ok(body) => Ok(Some(body)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn save(&self, body: &str) -> ChannelResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let temp_path = self.temp_path();
        {
            let mut file = fs::File::create(&temp_path)?;
            file.write_all(body.as_bytes())?;
            file.sync_all()?;
        }
        fs::rename(&temp_path, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{export_file_name, JsonFileChannel};
    use crate::model::date_key::DateKey;
    use crate::persist::PersistenceChannel;

    #[test]
    fn missing_file_loads_none_and_save_creates_parents() {
        let dir = tempfile::tempdir().unwrap();
        let channel = JsonFileChannel::new(dir.path().join("nested").join("matrix.json"));
        assert!(channel.load().unwrap().is_none());

        channel.save("{}\n").unwrap();
        assert_eq!(channel.load().unwrap().as_deref(), Some("{}\n"));
        assert!(!dir.path().join("nested").join("matrix.json.tmp").exists());
    }

    #[test]
    fn export_name_embeds_date_key() {
        let date = DateKey::parse("2024-06-01").unwrap();
        assert_eq!(export_file_name(date), "daymatrix-data-2024-06-01.json");
    }
}
