//! Core use-case services.
//!
//! # Responsibility
//! - Own the in-memory document and every mutation rule over it.
//! - Keep callers (CLI, embedders) decoupled from storage channels.

pub mod clock;
pub mod matrix_store;
pub mod session;
