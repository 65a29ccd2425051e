//! Canonical calendar-day identifier.
//!
//! # Responsibility
//! - Map calendar dates to the `YYYY-MM-DD` key used to index documents.
//! - Provide calendar arithmetic for day navigation and look-back scans.
//!
//! # Invariants
//! - Two keys are equal iff they denote the same calendar day.
//! - Keys derived from instants use the instant's own (local) calendar date,
//!   never the UTC date of a local instant.
//! - The textual form is always zero-padded `YYYY-MM-DD`.

use crate::model::validation::ValidationError;
use chrono::{DateTime, Days, NaiveDate, TimeZone};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

const DATE_KEY_FORMAT: &str = "%Y-%m-%d";

static DATE_KEY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid date key regex"));

/// Calendar-day key used to index day matrices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DateKey(NaiveDate);

impl DateKey {
    /// Wraps a calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self(date)
    }

    /// Builds a key from year/month/day parts.
    ///
    /// Returns `None` when the parts do not form a valid calendar date.
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(Self)
    }

    /// Returns the key for the calendar day `instant` falls on in its own zone.
    pub fn for_instant<Tz: TimeZone>(instant: &DateTime<Tz>) -> Self {
        Self(instant.date_naive())
    }

    /// Parses a strict `YYYY-MM-DD` key.
    ///
    /// # Errors
    /// - `InvalidDateKey` when the shape is wrong or the date does not exist.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        if !DATE_KEY_RE.is_match(value) {
            return Err(ValidationError::InvalidDateKey(value.to_string()));
        }
        NaiveDate::parse_from_str(value, DATE_KEY_FORMAT)
            .map(Self)
            .map_err(|_| ValidationError::InvalidDateKey(value.to_string()))
    }

    /// Calendar arithmetic; negative `days` walks backwards.
    ///
    /// Returns `None` only when the result leaves chrono's supported range.
    pub fn add_days(self, days: i64) -> Option<Self> {
        let magnitude = Days::new(days.unsigned_abs());
        let shifted = if days >= 0 {
            self.0.checked_add_days(magnitude)
        } else {
            self.0.checked_sub_days(magnitude)
        };
        shifted.map(Self)
    }

    /// Underlying calendar date.
    pub fn date(self) -> NaiveDate {
        self.0
    }
}

/// Maps a calendar date to its canonical key.
pub fn to_key(date: NaiveDate) -> DateKey {
    DateKey::from_date(date)
}

impl Display for DateKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.format(DATE_KEY_FORMAT))
    }
}

impl FromStr for DateKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<NaiveDate> for DateKey {
    fn from(value: NaiveDate) -> Self {
        Self(value)
    }
}

impl Serialize for DateKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for DateKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}
