//! In-process channel for tests and embedders without disk access.

use super::{ChannelError, ChannelResult, PersistenceChannel};
use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Default)]
struct MemoryState {
    body: Option<String>,
    fail_saves: bool,
    save_count: usize,
}

/// Shared in-memory payload slot.
///
/// Clones share the same slot, so a test can keep a handle after moving the
/// channel into a gateway.
#[derive(Debug, Clone)]
pub struct MemoryChannel {
    channel_id: String,
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryChannel {
    pub fn new(channel_id: impl Into<String>) -> Self {
        Self {
            channel_id: channel_id.into(),
            state: Arc::new(Mutex::new(MemoryState::default())),
        }
    }

    /// Channel pre-seeded with a saved payload.
    pub fn with_body(channel_id: impl Into<String>, body: &str) -> Self {
        let channel = Self::new(channel_id);
        channel.lock().body = Some(body.to_string());
        channel
    }

    /// Makes subsequent saves fail with `ChannelError::Unavailable`.
    pub fn set_fail_saves(&self, fail: bool) {
        self.lock().fail_saves = fail;
    }

    /// Last successfully saved payload.
    pub fn body(&self) -> Option<String> {
        self.lock().body.clone()
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.lock().save_count
    }

    fn lock(&self) -> MutexGuard<'_, MemoryState> {
        // A poisoned slot still holds plain data; keep using it.
        self.state
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl PersistenceChannel for MemoryChannel {
    fn channel_id(&self) -> &str {
        &self.channel_id
    }

    fn load(&self) -> ChannelResult<Option<String>> {
        Ok(self.lock().body.clone())
    }

    fn save(&self, body: &str) -> ChannelResult<()> {
        let mut state = self.lock();
        if state.fail_saves {
            return Err(ChannelError::Unavailable(format!(
                "{} rejects writes",
                self.channel_id
            )));
        }
        state.body = Some(body.to_string());
        state.save_count += 1;
        Ok(())
    }
}
