//! Current-day cursor over a `MatrixStore`.
//!
//! # Responsibility
//! - Track which calendar day the caller is looking at.
//! - Route day-scoped commands to the store for that day.
//!
//! # Invariants
//! - The cursor starts at the store clock's local "today".
//! - Navigation never mutates the document.

use crate::model::date_key::DateKey;
use crate::model::matrix::{DayMatrix, Quadrant};
use crate::model::validation::ValidationError;
use crate::persist::FlushReport;
use crate::service::clock::{Clock, SystemClock};
use crate::service::matrix_store::{
    AutoCopyOutcome, AutoCopyReport, CompletionReport, MatrixStore, DEFAULT_LOOKBACK_DAYS,
};

/// A store bound to a movable current date.
pub struct MatrixSession<C: Clock = SystemClock> {
    store: MatrixStore<C>,
    current: DateKey,
}

impl<C: Clock> MatrixSession<C> {
    pub fn new(store: MatrixStore<C>) -> Self {
        let current = store.today();
        Self { store, current }
    }

    pub fn store(&self) -> &MatrixStore<C> {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut MatrixStore<C> {
        &mut self.store
    }

    pub fn into_store(self) -> MatrixStore<C> {
        self.store
    }

    pub fn current(&self) -> DateKey {
        self.current
    }

    pub fn go_to(&mut self, date: DateKey) {
        self.current = date;
    }

    pub fn go_to_today(&mut self) {
        self.current = self.store.today();
    }

    /// Moves the cursor by `days`; stays put at the calendar range edge.
    pub fn navigate(&mut self, days: i64) -> DateKey {
        if let Some(next) = self.current.add_days(days) {
            self.current = next;
        }
        self.current
    }

    /// Matrix for the current day (empty when never touched).
    pub fn matrix(&self) -> DayMatrix {
        self.store.copy_snapshot(self.current)
    }

    pub fn add(&mut self, quadrant: Quadrant, text: &str) -> Result<FlushReport, ValidationError> {
        self.store.add_task(self.current, quadrant, text)
    }

    pub fn delete(&mut self, quadrant: Quadrant, text: &str) -> FlushReport {
        self.store.delete_task(self.current, quadrant, text)
    }

    pub fn move_task(&mut self, source: Quadrant, target: Quadrant, text: &str) -> FlushReport {
        self.store.move_task(self.current, source, target, text)
    }

    pub fn complete(&mut self, quadrant: Quadrant, text: &str) -> CompletionReport {
        self.store.complete_task(self.current, quadrant, text)
    }

    /// Copies the current day into the store clipboard.
    pub fn copy(&mut self) -> DayMatrix {
        self.store.copy_to_clipboard(self.current).clone()
    }

    /// Pastes the clipboard onto the current day; `None` when empty.
    pub fn paste(&mut self) -> Option<FlushReport> {
        self.store.paste_clipboard(self.current)
    }

    pub fn auto_copy(&mut self) -> Result<AutoCopyReport, AutoCopyOutcome> {
        self.store
            .auto_copy_from_recent(self.current, DEFAULT_LOOKBACK_DAYS)
    }
}
