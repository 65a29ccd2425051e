//! Rolling monthly ledger of completed tasks.
//!
//! # Responsibility
//! - Record completed tasks most-recent-first.
//! - Expire entries that fall before the current calendar month.
//!
//! # Invariants
//! - After `record` or `purge(now)`, no entry is older than the first instant
//!   of `now`'s month (in `now`'s time zone).
//! - Entry order is most-recent-first; `record` always prepends.

use chrono::{DateTime, Datelike, SecondsFormat, TimeZone, Utc};
use serde::{Deserialize, Serialize};

/// One finished task with its completion instant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedTaskEntry {
    pub task: String,
    /// Serialized as `completedDate` to match the exported file format.
    #[serde(rename = "completedDate", with = "iso_millis")]
    pub completed_at: DateTime<Utc>,
}

impl CompletedTaskEntry {
    pub fn new(task: impl Into<String>, completed_at: DateTime<Utc>) -> Self {
        Self {
            task: task.into(),
            completed_at,
        }
    }
}

/// Most-recent-first list of tasks completed in the current month.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedLedger {
    entries: Vec<CompletedTaskEntry>,
}

impl CompletedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a ledger from already ordered entries (most-recent-first).
    pub fn from_entries(entries: Vec<CompletedTaskEntry>) -> Self {
        Self { entries }
    }

    /// Prepends a completion record, then purges expired entries.
    pub fn record<Tz: TimeZone>(
        &mut self,
        task: impl Into<String>,
        now: &DateTime<Tz>,
    ) -> CompletedTaskEntry {
        let entry = CompletedTaskEntry::new(task, now.with_timezone(&Utc));
        self.entries.insert(0, entry.clone());
        self.purge(now);
        entry
    }

    /// Removes every entry strictly before the first instant of `now`'s month.
    ///
    /// Returns the number of removed entries.
    pub fn purge<Tz: TimeZone>(&mut self, now: &DateTime<Tz>) -> usize {
        let cutoff = month_start(now);
        let before = self.entries.len();
        self.entries.retain(|entry| entry.completed_at >= cutoff);
        before - self.entries.len()
    }

    pub fn entries(&self) -> &[CompletedTaskEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// First instant of `now`'s calendar month in `now`'s zone, as UTC.
fn month_start<Tz: TimeZone>(now: &DateTime<Tz>) -> DateTime<Utc> {
    let zone = now.timezone();
    let first_day = now
        .date_naive()
        .with_day(1)
        .and_then(|date| date.and_hms_opt(0, 0, 0));
    let Some(midnight) = first_day else {
        return now.with_timezone(&Utc);
    };

    // Local midnight may not exist (DST gap); fall back to the UTC reading.
    match zone.from_local_datetime(&midnight).earliest() {
        Some(start) => start.with_timezone(&Utc),
        None => Utc.from_utc_datetime(&midnight),
    }
}

mod iso_millis {
    //! ISO-8601 with millisecond precision and `Z` suffix on write; any
    //! RFC 3339 offset on read.

    use super::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.trim())
            .map(|parsed| parsed.with_timezone(&Utc))
            .map_err(|err| serde::de::Error::custom(format!("invalid completedDate `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{CompletedLedger, CompletedTaskEntry};
    use chrono::{FixedOffset, TimeZone, Utc};

    #[test]
    fn record_prepends_most_recent_first() {
        let mut ledger = CompletedLedger::new();
        let first = Utc.with_ymd_and_hms(2024, 6, 3, 9, 0, 0).unwrap();
        let second = Utc.with_ymd_and_hms(2024, 6, 4, 9, 0, 0).unwrap();

        ledger.record("write report", &first);
        let entry = ledger.record("file taxes", &second);

        assert_eq!(entry.completed_at, second);
        let tasks: Vec<_> = ledger.entries().iter().map(|e| e.task.as_str()).collect();
        assert_eq!(tasks, ["file taxes", "write report"]);
    }

    #[test]
    fn purge_keeps_current_month_and_drops_previous() {
        let mut ledger = CompletedLedger::from_entries(vec![
            CompletedTaskEntry::new("june", Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()),
            CompletedTaskEntry::new("may", Utc.with_ymd_and_hms(2024, 5, 31, 23, 59, 59).unwrap()),
        ]);

        let removed = ledger.purge(&Utc.with_ymd_and_hms(2024, 6, 20, 12, 0, 0).unwrap());
        assert_eq!(removed, 1);
        assert_eq!(ledger.len(), 1);
        assert_eq!(ledger.entries()[0].task, "june");

        ledger.purge(&Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap());
        assert!(ledger.is_empty());
    }

    #[test]
    fn month_boundary_follows_the_clock_zone() {
        // 2024-05-31T23:30 at UTC-2 is 2024-06-01T01:30Z: still May locally.
        let offset = FixedOffset::west_opt(2 * 3600).unwrap();
        let completed = offset.with_ymd_and_hms(2024, 5, 31, 23, 30, 0).unwrap();
        let mut ledger = CompletedLedger::new();
        ledger.record("late may", &completed);

        ledger.purge(&offset.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap());
        assert!(ledger.is_empty());
    }

    #[test]
    fn completed_date_uses_iso_millis_wire_format() {
        let entry = CompletedTaskEntry::new(
            "Buy milk",
            Utc.with_ymd_and_hms(2024, 6, 1, 10, 15, 0).unwrap(),
        );
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["task"], "Buy milk");
        assert_eq!(json["completedDate"], "2024-06-01T10:15:00.000Z");

        let parsed: CompletedTaskEntry = serde_json::from_str(
            r#"{"task":"Buy milk","completedDate":"2024-06-01T12:15:00+02:00"}"#,
        )
        .unwrap();
        assert_eq!(parsed, entry);
    }
}
