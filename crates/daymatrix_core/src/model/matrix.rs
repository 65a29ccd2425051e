//! Quadrant buckets and the per-day four-quadrant matrix.
//!
//! # Responsibility
//! - Define the closed set of priority quadrants and their wire names.
//! - Hold the ordered task sequences of one calendar day.
//!
//! # Invariants
//! - Order inside a quadrant is display order; additions append to the end.
//! - `push_unique` never introduces a duplicate; `push` may.
//! - Removal is by value (first equal element), never by position.

use crate::model::validation::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// One of the four urgent/important priority buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Quadrant {
    /// Urgent and important.
    DoNow,
    /// Important, not urgent.
    Schedule,
    /// Urgent, not important.
    Delegate,
    /// Neither urgent nor important.
    Eliminate,
}

impl Quadrant {
    /// All quadrants in canonical display order.
    pub const ALL: [Quadrant; 4] = [
        Quadrant::DoNow,
        Quadrant::Schedule,
        Quadrant::Delegate,
        Quadrant::Eliminate,
    ];

    /// Stable wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DoNow => "do-now",
            Self::Schedule => "schedule",
            Self::Delegate => "delegate",
            Self::Eliminate => "eliminate",
        }
    }

    /// Parses a wire name; surrounding whitespace and ASCII case are ignored.
    pub fn parse(value: &str) -> Result<Self, ValidationError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "do-now" => Ok(Self::DoNow),
            "schedule" => Ok(Self::Schedule),
            "delegate" => Ok(Self::Delegate),
            "eliminate" => Ok(Self::Eliminate),
            _ => Err(ValidationError::UnknownQuadrant(value.to_string())),
        }
    }
}

impl Display for Quadrant {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Quadrant {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

/// Four quadrant task lists for one day.
///
/// Missing quadrants in persisted input deserialize as empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DayMatrix {
    #[serde(rename = "do-now", default)]
    pub do_now: Vec<String>,
    #[serde(default)]
    pub schedule: Vec<String>,
    #[serde(default)]
    pub delegate: Vec<String>,
    #[serde(default)]
    pub eliminate: Vec<String>,
}

impl DayMatrix {
    /// Empty matrix (four empty sequences).
    pub fn new() -> Self {
        Self::default()
    }

    /// Tasks in one quadrant, in display order.
    pub fn tasks(&self, quadrant: Quadrant) -> &[String] {
        match quadrant {
            Quadrant::DoNow => &self.do_now,
            Quadrant::Schedule => &self.schedule,
            Quadrant::Delegate => &self.delegate,
            Quadrant::Eliminate => &self.eliminate,
        }
    }

    fn tasks_mut(&mut self, quadrant: Quadrant) -> &mut Vec<String> {
        match quadrant {
            Quadrant::DoNow => &mut self.do_now,
            Quadrant::Schedule => &mut self.schedule,
            Quadrant::Delegate => &mut self.delegate,
            Quadrant::Eliminate => &mut self.eliminate,
        }
    }

    /// Appends a task, allowing duplicates inside the quadrant.
    pub fn push(&mut self, quadrant: Quadrant, task: impl Into<String>) {
        self.tasks_mut(quadrant).push(task.into());
    }

    /// Appends a task only when the quadrant does not already hold it.
    ///
    /// Returns whether the task was inserted.
    pub fn push_unique(&mut self, quadrant: Quadrant, task: &str) -> bool {
        let tasks = self.tasks_mut(quadrant);
        if tasks.iter().any(|existing| existing == task) {
            return false;
        }
        tasks.push(task.to_string());
        true
    }

    /// Removes the first task equal to `task`.
    ///
    /// Returns whether an element was removed.
    pub fn remove_first(&mut self, quadrant: Quadrant, task: &str) -> bool {
        let tasks = self.tasks_mut(quadrant);
        match tasks.iter().position(|existing| existing == task) {
            Some(index) => {
                tasks.remove(index);
                true
            }
            None => false,
        }
    }

    /// Returns whether the quadrant holds `task`.
    pub fn contains(&self, quadrant: Quadrant, task: &str) -> bool {
        self.tasks(quadrant).iter().any(|existing| existing == task)
    }

    /// True iff all four quadrants are empty.
    pub fn is_empty(&self) -> bool {
        Quadrant::ALL
            .iter()
            .all(|quadrant| self.tasks(*quadrant).is_empty())
    }

    /// Total number of tasks across quadrants.
    pub fn task_count(&self) -> usize {
        Quadrant::ALL
            .iter()
            .map(|quadrant| self.tasks(*quadrant).len())
            .sum()
    }
}

/// True iff all four quadrant sequences of `matrix` are empty.
pub fn is_day_empty(matrix: &DayMatrix) -> bool {
    matrix.is_empty()
}

#[cfg(test)]
mod tests {
    use super::{is_day_empty, DayMatrix, Quadrant};
    use crate::model::validation::ValidationError;

    #[test]
    fn quadrant_names_round_trip() {
        for quadrant in Quadrant::ALL {
            assert_eq!(Quadrant::parse(quadrant.as_str()).unwrap(), quadrant);
        }
        assert_eq!(Quadrant::parse(" DO-NOW ").unwrap(), Quadrant::DoNow);
    }

    #[test]
    fn unknown_quadrant_is_validation_error() {
        let err = Quadrant::parse("someday").expect_err("unknown quadrant");
        assert_eq!(err, ValidationError::UnknownQuadrant("someday".to_string()));
    }

    #[test]
    fn push_allows_duplicates_but_push_unique_does_not() {
        let mut matrix = DayMatrix::new();
        matrix.push(Quadrant::Schedule, "gym");
        matrix.push(Quadrant::Schedule, "gym");
        assert_eq!(matrix.tasks(Quadrant::Schedule).len(), 2);

        assert!(matrix.push_unique(Quadrant::Delegate, "invoice"));
        assert!(!matrix.push_unique(Quadrant::Delegate, "invoice"));
        assert_eq!(matrix.tasks(Quadrant::Delegate), ["invoice".to_string()]);
    }

    #[test]
    fn remove_first_only_removes_one_match() {
        let mut matrix = DayMatrix::new();
        matrix.push(Quadrant::DoNow, "a");
        matrix.push(Quadrant::DoNow, "b");
        matrix.push(Quadrant::DoNow, "a");

        assert!(matrix.remove_first(Quadrant::DoNow, "a"));
        assert_eq!(matrix.tasks(Quadrant::DoNow), ["b".to_string(), "a".to_string()]);
        assert!(!matrix.remove_first(Quadrant::DoNow, "missing"));
    }

    #[test]
    fn empty_check_covers_every_quadrant() {
        let mut matrix = DayMatrix::new();
        assert!(is_day_empty(&matrix));
        matrix.push(Quadrant::Eliminate, "doomscroll");
        assert!(!is_day_empty(&matrix));
        assert_eq!(matrix.task_count(), 1);
    }

    #[test]
    fn missing_quadrants_deserialize_as_empty() {
        let matrix: DayMatrix = serde_json::from_str(r#"{"do-now":["x"]}"#).unwrap();
        assert_eq!(matrix.tasks(Quadrant::DoNow), ["x".to_string()]);
        assert!(matrix.tasks(Quadrant::Eliminate).is_empty());
    }
}
