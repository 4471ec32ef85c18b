//! Roster Core - person model, error facility and logging facility
//!
//! This crate provides the foundational pieces shared by the store, the
//! view synchronizer and the CLI:
//! - `Person` and `NewPerson` records
//! - Structured error taxonomy (`ExError`, `ExErrorKind`, `RosterError`)
//! - Structured logging facility with canonical `log_op_*` macros

pub mod errors;
pub mod logging_facility;
pub mod model;

// Re-export commonly used types
pub use errors::{ExError, ExErrorKind, Result, RosterError};
pub use model::{NewPerson, Person, Snapshot};
