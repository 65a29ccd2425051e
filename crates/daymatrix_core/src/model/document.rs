//! Persisted document: day matrices plus the completed-task ledger.
//!
//! # Responsibility
//! - Hold the full in-memory state as a two-field record.
//! - Convert to and from the flat wire shape where the ledger lives under the
//!   reserved `completedThisMonth` key next to `YYYY-MM-DD` day keys.
//!
//! # Invariants
//! - Parsing is all-or-nothing: any invalid key or value rejects the payload.
//! - Every day key in the wire shape is a canonical `DateKey`.

use crate::model::date_key::DateKey;
use crate::model::ledger::{CompletedLedger, CompletedTaskEntry};
use crate::model::matrix::DayMatrix;
use crate::model::validation::ValidationError;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::BTreeMap;

/// Reserved top-level wire key holding the completed-task ledger.
pub const COMPLETED_KEY: &str = "completedThisMonth";

/// Full persisted state.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatrixDocument {
    pub days: BTreeMap<DateKey, DayMatrix>,
    pub completed: CompletedLedger,
}

impl MatrixDocument {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses the wire shape with full validation.
    ///
    /// # Errors
    /// - `MalformedDocument` for invalid JSON, a non-object root, a non-date
    ///   key, or a day/ledger value of the wrong shape.
    pub fn from_json_str(raw: &str) -> Result<Self, ValidationError> {
        let value: Value = serde_json::from_str(raw)
            .map_err(|err| ValidationError::MalformedDocument(format!("invalid JSON: {err}")))?;
        Self::from_value(value)
    }

    /// Parses an already decoded JSON tree.
    pub fn from_value(value: Value) -> Result<Self, ValidationError> {
        let Value::Object(entries) = value else {
            return Err(ValidationError::MalformedDocument(
                "top-level value must be an object".to_string(),
            ));
        };

        let mut document = Self::new();
        for (key, value) in entries {
            if key == COMPLETED_KEY {
                let ledger: Vec<CompletedTaskEntry> =
                    serde_json::from_value(value).map_err(|err| {
                        ValidationError::MalformedDocument(format!("`{COMPLETED_KEY}`: {err}"))
                    })?;
                document.completed = CompletedLedger::from_entries(ledger);
                continue;
            }

            let date = DateKey::parse(&key).map_err(|_| {
                ValidationError::MalformedDocument(format!("unexpected top-level key `{key}`"))
            })?;
            let matrix: DayMatrix = serde_json::from_value(value)
                .map_err(|err| ValidationError::MalformedDocument(format!("day `{key}`: {err}")))?;
            document.days.insert(date, matrix);
        }

        Ok(document)
    }

    /// Serializes to the indented wire shape used for files and export.
    pub fn to_json_pretty(&self) -> String {
        // Keys are strings and values are plain data, so this cannot fail.
        serde_json::to_string_pretty(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Serializes to the compact wire shape.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| String::from("{}"))
    }

    /// Returns whether no day and no ledger entry is stored.
    pub fn is_empty(&self) -> bool {
        self.days.is_empty() && self.completed.is_empty()
    }
}

impl Serialize for MatrixDocument {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.days.len() + 1))?;
        for (date, matrix) in &self.days {
            map.serialize_entry(&date.to_string(), matrix)?;
        }
        map.serialize_entry(COMPLETED_KEY, &self.completed)?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::{MatrixDocument, COMPLETED_KEY};
    use crate::model::date_key::DateKey;
    use crate::model::matrix::{DayMatrix, Quadrant};
    use crate::model::validation::ValidationError;
    use chrono::{TimeZone, Utc};

    #[test]
    fn parses_original_flat_shape() {
        let raw = r#"{
            "2024-06-01": {"do-now": ["Buy milk"], "schedule": [], "delegate": [], "eliminate": []},
            "completedThisMonth": [{"task": "Call mom", "completedDate": "2024-06-01T08:00:00.000Z"}]
        }"#;
        let document = MatrixDocument::from_json_str(raw).unwrap();

        let day = &document.days[&DateKey::parse("2024-06-01").unwrap()];
        assert_eq!(day.tasks(Quadrant::DoNow), ["Buy milk".to_string()]);
        assert_eq!(document.completed.len(), 1);
        assert_eq!(
            document.completed.entries()[0].completed_at,
            Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
        );
    }

    #[test]
    fn ledger_key_is_optional() {
        let document = MatrixDocument::from_json_str(r#"{"2024-06-02": {}}"#).unwrap();
        assert!(document.completed.is_empty());
        assert_eq!(document.days.len(), 1);
    }

    #[test]
    fn rejects_unknown_keys_and_wrong_shapes() {
        for raw in [
            "not json",
            "[]",
            r#"{"tomorrow": {}}"#,
            r#"{"2024-06-01": {"do-now": "oops"}}"#,
            r#"{"2024-06-01": {"someday": []}}"#,
            r#"{"completedThisMonth": [{"task": "x"}]}"#,
        ] {
            let err = MatrixDocument::from_json_str(raw).expect_err(raw);
            assert!(matches!(err, ValidationError::MalformedDocument(_)), "{raw}");
        }
    }

    #[test]
    fn serializes_days_then_reserved_key() {
        let mut document = MatrixDocument::new();
        let mut matrix = DayMatrix::new();
        matrix.push(Quadrant::Delegate, "expenses");
        document
            .days
            .insert(DateKey::parse("2024-06-01").unwrap(), matrix);

        let value: serde_json::Value = serde_json::from_str(&document.to_json()).unwrap();
        assert_eq!(value["2024-06-01"]["delegate"][0], "expenses");
        assert_eq!(value["2024-06-01"]["do-now"], serde_json::json!([]));
        assert_eq!(value[COMPLETED_KEY], serde_json::json!([]));

        let reparsed = MatrixDocument::from_json_str(&document.to_json_pretty()).unwrap();
        assert_eq!(reparsed, document);
    }
}
