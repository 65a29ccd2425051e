//! Ordered channel list with per-channel failure isolation.

use super::PersistenceChannel;
use crate::model::document::MatrixDocument;
use log::{debug, info, warn};
use std::time::Instant;

/// Result of a gateway load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub document: MatrixDocument,
    /// Channel the document came from; `None` when every channel was empty.
    pub source: Option<String>,
}

/// Save result for one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelOutcome {
    pub channel_id: String,
    /// `Err` holds a human-readable failure reason.
    pub result: Result<(), String>,
}

/// Summary of one flush across all channels.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlushReport {
    flushed: bool,
    outcomes: Vec<ChannelOutcome>,
}

impl FlushReport {
    /// Report for a call that changed nothing and therefore wrote nothing.
    pub fn skipped() -> Self {
        Self::default()
    }

    /// Whether a flush was issued at all.
    pub fn is_flushed(&self) -> bool {
        self.flushed
    }

    pub fn outcomes(&self) -> &[ChannelOutcome] {
        &self.outcomes
    }

    /// True when a flush happened and every channel accepted it.
    pub fn all_saved(&self) -> bool {
        self.flushed && self.outcomes.iter().all(|outcome| outcome.result.is_ok())
    }

    pub fn saved_channels(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_ok())
            .map(|outcome| outcome.channel_id.as_str())
            .collect()
    }

    pub fn failed_channels(&self) -> Vec<&str> {
        self.outcomes
            .iter()
            .filter(|outcome| outcome.result.is_err())
            .map(|outcome| outcome.channel_id.as_str())
            .collect()
    }

    /// Degraded-mode aware status line for the caller to display.
    pub fn status_message(&self) -> String {
        if !self.flushed {
            return "No changes to save.".to_string();
        }
        if self.outcomes.is_empty() {
            return "Changes kept in memory only; no storage configured.".to_string();
        }

        let failures = self
            .outcomes
            .iter()
            .filter_map(|outcome| match &outcome.result {
                Ok(()) => None,
                Err(reason) => Some(format!("{} ({reason})", outcome.channel_id)),
            })
            .collect::<Vec<_>>();

        if failures.is_empty() {
            return "Saved.".to_string();
        }
        let saved = self.saved_channels();
        if saved.is_empty() {
            format!("Save failed on every channel: {}.", failures.join("; "))
        } else {
            format!(
                "Saved to {} but not to {}.",
                saved.join(", "),
                failures.join("; ")
            )
        }
    }
}

/// Layered storage: first channel is authoritative for loads, all channels
/// receive every save.
#[derive(Default)]
pub struct PersistenceGateway {
    channels: Vec<Box<dyn PersistenceChannel>>,
}

impl PersistenceGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a channel; earlier channels take precedence on load.
    pub fn with_channel(mut self, channel: impl PersistenceChannel + 'static) -> Self {
        self.push(Box::new(channel));
        self
    }

    pub fn push(&mut self, channel: Box<dyn PersistenceChannel>) {
        self.channels.push(channel);
    }

    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn channel_ids(&self) -> Vec<String> {
        self.channels
            .iter()
            .map(|channel| channel.channel_id().to_string())
            .collect()
    }

    /// Loads from the first channel holding a valid, non-empty document.
    ///
    /// Unreadable or malformed channels are logged and skipped; when nothing
    /// usable is found an empty document is returned.
    pub fn load(&self) -> LoadOutcome {
        for channel in &self.channels {
            let channel_id = channel.channel_id();
            let raw = match channel.load() {
                Ok(Some(raw)) => raw,
                Ok(None) => {
                    debug!("event=channel_load module=persist status=empty channel={channel_id}");
                    continue;
                }
                Err(err) => {
                    warn!(
                        "event=channel_load module=persist status=error channel={} error={}",
                        channel_id, err
                    );
                    continue;
                }
            };

            match MatrixDocument::from_json_str(&raw) {
                Ok(document) if document.is_empty() => {
                    debug!("event=channel_load module=persist status=empty channel={channel_id}");
                }
                Ok(document) => {
                    info!(
                        "event=channel_load module=persist status=ok channel={} days={} completed={}",
                        channel_id,
                        document.days.len(),
                        document.completed.len()
                    );
                    return LoadOutcome {
                        document,
                        source: Some(channel_id.to_string()),
                    };
                }
                Err(err) => {
                    warn!(
                        "event=channel_load module=persist status=invalid channel={} error={}",
                        channel_id, err
                    );
                }
            }
        }

        LoadOutcome {
            document: MatrixDocument::new(),
            source: None,
        }
    }

    /// Writes `document` to every channel, isolating failures per channel.
    pub fn save(&self, document: &MatrixDocument) -> FlushReport {
        let started_at = Instant::now();
        let body = document.to_json_pretty();
        let outcomes = self
            .channels
            .iter()
            .map(|channel| {
                let channel_id = channel.channel_id().to_string();
                let result = channel.save(&body).map_err(|err| {
                    warn!(
                        "event=channel_save module=persist status=error channel={} error={}",
                        channel_id, err
                    );
                    err.to_string()
                });
                ChannelOutcome { channel_id, result }
            })
            .collect::<Vec<_>>();

        let report = FlushReport {
            flushed: true,
            outcomes,
        };
        debug!(
            "event=flush module=persist status={} channels={} failed={} duration_ms={}",
            if report.all_saved() { "ok" } else { "degraded" },
            report.outcomes.len(),
            report.failed_channels().len(),
            started_at.elapsed().as_millis()
        );
        report
    }
}
