//! Validation errors raised at every ingestion boundary.
//!
//! # Responsibility
//! - Describe malformed caller input (task text, quadrant names, date keys).
//! - Describe structurally invalid persisted/imported documents.
//!
//! # Invariants
//! - A `ValidationError` is always raised before any in-memory state changes.

use std::error::Error;
use std::fmt::{Display, Formatter};

/// Malformed input to a mutating call or an ingestion path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Task text is empty after trimming whitespace.
    EmptyTask,
    /// Quadrant name is not one of `do-now|schedule|delegate|eliminate`.
    UnknownQuadrant(String),
    /// Value is not a canonical `YYYY-MM-DD` calendar date.
    InvalidDateKey(String),
    /// Imported or loaded payload does not match the document shape.
    MalformedDocument(String),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTask => write!(f, "task text cannot be empty"),
            Self::UnknownQuadrant(value) => write!(
                f,
                "unknown quadrant `{value}`; expected do-now|schedule|delegate|eliminate"
            ),
            Self::InvalidDateKey(value) => {
                write!(f, "invalid date key `{value}`; expected YYYY-MM-DD")
            }
            Self::MalformedDocument(details) => write!(f, "malformed document: {details}"),
        }
    }
}

impl Error for ValidationError {}
