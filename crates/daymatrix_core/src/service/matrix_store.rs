//! Matrix store: the single owner of document mutation.
//!
//! # Responsibility
//! - Apply add/delete/move/complete/copy/paste/auto-copy/import commands.
//! - Keep the completed ledger purged to the current month.
//! - Flush the full document through the persistence gateway after each
//!   mutation and report per-channel outcomes.
//!
//! # Invariants
//! - Memory is updated before the flush; a failed flush never rolls back.
//! - Reads never materialize a day; only mutations create day entries.
//! - A day that becomes empty stays as an empty record.
//! - Validation failures leave the document untouched.

use crate::model::date_key::DateKey;
use crate::model::document::MatrixDocument;
use crate::model::ledger::{CompletedLedger, CompletedTaskEntry};
use crate::model::matrix::{DayMatrix, Quadrant};
use crate::model::validation::ValidationError;
use crate::persist::{FlushReport, LoadOutcome, PersistenceGateway};
use crate::service::clock::{Clock, SystemClock};
use chrono::{DateTime, FixedOffset};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Default number of previous days scanned by auto-copy.
pub const DEFAULT_LOOKBACK_DAYS: u32 = 7;

/// Expected, non-exceptional auto-copy results that copy nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AutoCopyOutcome {
    /// Target day already holds tasks; it was not touched.
    AlreadyHasTasks,
    /// No non-empty day exists inside the look-back window.
    NoRecentTasks,
}

impl Display for AutoCopyOutcome {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::AlreadyHasTasks => {
                write!(f, "Current day already has tasks. Clear them first to auto-copy.")
            }
            Self::NoRecentTasks => write!(f, "No tasks found in the recent look-back window."),
        }
    }
}

impl Error for AutoCopyOutcome {}

/// Successful auto-copy result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AutoCopyReport {
    /// Day the matrix was copied from.
    pub source: DateKey,
    pub flush: FlushReport,
}

/// Result of completing a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompletionReport {
    /// Ledger entry appended by this call.
    pub entry: CompletedTaskEntry,
    /// Whether a matching task was removed from its quadrant.
    pub removed: bool,
    pub flush: FlushReport,
}

/// In-memory document plus its persistence gateway and clipboard.
pub struct MatrixStore<C: Clock = SystemClock> {
    document: MatrixDocument,
    gateway: PersistenceGateway,
    clock: C,
    clipboard: Option<DayMatrix>,
}

impl MatrixStore<SystemClock> {
    /// Loads the current document through `gateway` using the wall clock.
    pub fn open(gateway: PersistenceGateway) -> Self {
        Self::with_clock(gateway, SystemClock)
    }
}

impl<C: Clock> MatrixStore<C> {
    /// Loads the current document through `gateway` using `clock`.
    ///
    /// Never fails: unreadable channels degrade to an empty document.
    pub fn with_clock(gateway: PersistenceGateway, clock: C) -> Self {
        let LoadOutcome {
            mut document,
            source,
        } = gateway.load();
        let expired = document.completed.purge(&clock.now());
        info!(
            "event=store_open module=store status=ok source={} days={} completed={} expired={}",
            source.as_deref().unwrap_or("none"),
            document.days.len(),
            document.completed.len(),
            expired
        );

        Self {
            document,
            gateway,
            clock,
            clipboard: None,
        }
    }

    /// Current instant per the store clock.
    pub fn now(&self) -> DateTime<FixedOffset> {
        self.clock.now()
    }

    /// Local calendar day per the store clock.
    pub fn today(&self) -> DateKey {
        DateKey::for_instant(&self.clock.now())
    }

    pub fn gateway(&self) -> &PersistenceGateway {
        &self.gateway
    }

    /// Stored matrix for `date`, if any mutation ever touched it.
    pub fn day(&self, date: DateKey) -> Option<&DayMatrix> {
        self.document.days.get(&date)
    }

    /// Stored days in ascending date order.
    pub fn days(&self) -> impl Iterator<Item = (&DateKey, &DayMatrix)> {
        self.document.days.iter()
    }

    /// Appends trimmed `text` to `quadrant` on `date`, creating the day.
    ///
    /// # Errors
    /// - `EmptyTask` when `text` is blank after trimming.
    pub fn add_task(
        &mut self,
        date: DateKey,
        quadrant: Quadrant,
        text: &str,
    ) -> Result<FlushReport, ValidationError> {
        let task = text.trim();
        if task.is_empty() {
            return Err(ValidationError::EmptyTask);
        }

        self.day_mut(date).push(quadrant, task);
        debug!("event=task_add module=store status=ok date={date} quadrant={quadrant}");
        Ok(self.flush())
    }

    /// Same as `add_task`, parsing the quadrant name first.
    ///
    /// # Errors
    /// - `UnknownQuadrant` for names outside the four known buckets.
    /// - `EmptyTask` when `text` is blank after trimming.
    pub fn add_task_named(
        &mut self,
        date: DateKey,
        quadrant: &str,
        text: &str,
    ) -> Result<FlushReport, ValidationError> {
        let quadrant = Quadrant::parse(quadrant)?;
        self.add_task(date, quadrant, text)
    }

    /// Removes the first task equal to `text`; no match changes nothing.
    pub fn delete_task(&mut self, date: DateKey, quadrant: Quadrant, text: &str) -> FlushReport {
        let removed = self
            .document
            .days
            .get_mut(&date)
            .is_some_and(|matrix| matrix.remove_first(quadrant, text));
        if !removed {
            debug!("event=task_delete module=store status=noop date={date} quadrant={quadrant}");
            return FlushReport::skipped();
        }

        debug!("event=task_delete module=store status=ok date={date} quadrant={quadrant}");
        self.flush()
    }

    /// Moves `text` between quadrants by value.
    ///
    /// A missing source entry is tolerated (stale caller state); the target
    /// never receives a duplicate. `source == target` is a no-op.
    pub fn move_task(
        &mut self,
        date: DateKey,
        source: Quadrant,
        target: Quadrant,
        text: &str,
    ) -> FlushReport {
        if source == target {
            return FlushReport::skipped();
        }

        let matrix = self.day_mut(date);
        let removed = matrix.remove_first(source, text);
        let inserted = matrix.push_unique(target, text);
        debug!(
            "event=task_move module=store status=ok date={} from={} to={} removed={} inserted={}",
            date, source, target, removed, inserted
        );
        self.flush()
    }

    /// Records `text` in the ledger, then deletes it from its quadrant.
    ///
    /// Both changes are persisted by a single flush.
    pub fn complete_task(
        &mut self,
        date: DateKey,
        quadrant: Quadrant,
        text: &str,
    ) -> CompletionReport {
        let now = self.clock.now();
        let entry = self.document.completed.record(text, &now);
        let removed = self
            .document
            .days
            .get_mut(&date)
            .is_some_and(|matrix| matrix.remove_first(quadrant, text));
        info!(
            "event=task_complete module=store status=ok date={} quadrant={} removed={} ledger_size={}",
            date,
            quadrant,
            removed,
            self.document.completed.len()
        );

        CompletionReport {
            entry,
            removed,
            flush: self.flush(),
        }
    }

    /// Deep copy of `date`'s matrix, or an empty matrix when absent.
    pub fn copy_snapshot(&self, date: DateKey) -> DayMatrix {
        self.day(date).cloned().unwrap_or_default()
    }

    /// Replaces `date`'s matrix with a deep copy of `snapshot`.
    pub fn paste_snapshot(&mut self, date: DateKey, snapshot: &DayMatrix) -> FlushReport {
        self.document.days.insert(date, snapshot.clone());
        info!(
            "event=matrix_paste module=store status=ok date={} tasks={}",
            date,
            snapshot.task_count()
        );
        self.flush()
    }

    /// Copies `date`'s matrix into the session clipboard.
    pub fn copy_to_clipboard(&mut self, date: DateKey) -> &DayMatrix {
        let snapshot = self.copy_snapshot(date);
        self.clipboard.insert(snapshot)
    }

    pub fn clipboard(&self) -> Option<&DayMatrix> {
        self.clipboard.as_ref()
    }

    /// Pastes the clipboard into `date`; `None` when nothing was copied.
    pub fn paste_clipboard(&mut self, date: DateKey) -> Option<FlushReport> {
        let snapshot = self.clipboard.clone()?;
        Some(self.paste_snapshot(date, &snapshot))
    }

    /// True iff all four quadrant sequences are empty.
    pub fn is_day_empty(matrix: &DayMatrix) -> bool {
        matrix.is_empty()
    }

    /// Most recent non-empty day in `date-1 ..= date-lookback_days`.
    pub fn find_recent_non_empty(&self, date: DateKey, lookback_days: u32) -> Option<DateKey> {
        (1..=i64::from(lookback_days))
            .map_while(|offset| date.add_days(-offset))
            .find(|candidate| self.day(*candidate).is_some_and(|matrix| !matrix.is_empty()))
    }

    /// Fills an empty `date` from the nearest non-empty previous day.
    ///
    /// # Errors
    /// - `AlreadyHasTasks` when `date` is non-empty (nothing is touched).
    /// - `NoRecentTasks` when the look-back window holds no tasks.
    pub fn auto_copy_from_recent(
        &mut self,
        date: DateKey,
        lookback_days: u32,
    ) -> Result<AutoCopyReport, AutoCopyOutcome> {
        if self.day(date).is_some_and(|matrix| !matrix.is_empty()) {
            debug!("event=auto_copy module=store status=skipped reason=already_has_tasks date={date}");
            return Err(AutoCopyOutcome::AlreadyHasTasks);
        }

        let Some(source) = self.find_recent_non_empty(date, lookback_days) else {
            debug!(
                "event=auto_copy module=store status=skipped reason=no_recent_tasks date={} lookback_days={}",
                date, lookback_days
            );
            return Err(AutoCopyOutcome::NoRecentTasks);
        };

        let snapshot = self.copy_snapshot(source);
        info!("event=auto_copy module=store status=ok date={date} source={source}");
        Ok(AutoCopyReport {
            source,
            flush: self.paste_snapshot(date, &snapshot),
        })
    }

    /// Replaces the whole document with a parsed import payload.
    ///
    /// # Errors
    /// - `MalformedDocument` when `raw` fails validation; the current
    ///   document is left untouched.
    pub fn import_document(&mut self, raw: &str) -> Result<FlushReport, ValidationError> {
        let mut imported = match MatrixDocument::from_json_str(raw) {
            Ok(document) => document,
            Err(err) => {
                warn!("event=import module=store status=error error={err}");
                return Err(err);
            }
        };
        imported.completed.purge(&self.clock.now());
        info!(
            "event=import module=store status=ok days={} completed={}",
            imported.days.len(),
            imported.completed.len()
        );
        self.document = imported;
        Ok(self.flush())
    }

    /// Current document in the indented wire shape.
    pub fn export_document(&self) -> String {
        let mut snapshot = self.document.clone();
        snapshot.completed = self.current_ledger();
        snapshot.to_json_pretty()
    }

    /// Tasks completed this month, most recent first.
    pub fn completed_this_month(&self) -> Vec<CompletedTaskEntry> {
        self.current_ledger().entries().to_vec()
    }

    /// Re-issues a flush of the current document.
    pub fn flush(&mut self) -> FlushReport {
        let now = self.clock.now();
        self.document.completed.purge(&now);
        let report = self.gateway.save(&self.document);
        if !report.all_saved() {
            warn!(
                "event=flush module=store status=degraded failed_channels={}",
                report.failed_channels().join(",")
            );
        }
        report
    }

    fn current_ledger(&self) -> CompletedLedger {
        let mut ledger = self.document.completed.clone();
        ledger.purge(&self.clock.now());
        ledger
    }

    fn day_mut(&mut self, date: DateKey) -> &mut DayMatrix {
        self.document.days.entry(date).or_default()
    }
}
