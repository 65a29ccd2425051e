//! Domain model for per-day priority matrices.
//!
//! # Responsibility
//! - Define canonical data structures used by the store and persistence.
//! - Own wire-shape conversion and validation for every ingestion boundary.
//!
//! # Invariants
//! - Days are indexed by canonical `DateKey` values.
//! - Absent days read as empty matrices and are never materialized by reads.

pub mod date_key;
pub mod document;
pub mod ledger;
pub mod matrix;
pub mod validation;
