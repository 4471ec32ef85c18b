//! Error handling for roster-store
//!
//! Wraps roster-core ExError with store-specific helpers

use roster_core::errors::{ExError, ExErrorKind};
use roster_core::RosterError;

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create a migration error wrapping the database failure that caused it
pub fn migration_error(migration_id: &str, cause: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("migration")
        .with_entity_id(migration_id)
        .with_message(format!("Migration {} failed", migration_id))
        .with_source(from_rusqlite(cause))
}

/// Create a checksum mismatch error
pub fn checksum_mismatch(migration_id: &str, expected: &str, actual: &str) -> ExError {
    RosterError::SchemaMismatch {
        migration_id: migration_id.to_string(),
        reason: format!("checksum expected {}, got {}", expected, actual),
    }
    .into()
}

/// Create an error for a recorded migration this build does not know
pub fn unknown_migration(migration_id: &str) -> ExError {
    RosterError::SchemaMismatch {
        migration_id: migration_id.to_string(),
        reason: "recorded migration is not embedded in this build".to_string(),
    }
    .into()
}

/// Create a store-closed error for the given operation
pub fn store_closed(op: &str) -> ExError {
    ExError::from(RosterError::StoreClosed).with_op(op.to_string())
}

/// Create an error for a poisoned lock
pub fn lock_poisoned(what: &str) -> ExError {
    RosterError::LockPoisoned {
        what: what.to_string(),
    }
    .into()
}

/// Create a database error from rusqlite::Error
pub fn from_rusqlite(err: rusqlite::Error) -> ExError {
    ExError::new(ExErrorKind::Persistence)
        .with_op("sqlite")
        .with_message(err.to_string())
}

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}
