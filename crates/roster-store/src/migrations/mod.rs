//! Migration framework
//!
//! Provides:
//! - Migration runner with checksums and idempotent application
//! - Schema mismatch detection with strict or destructive handling
//! - Embedded SQL migrations

mod checksums;
mod embedded;
mod runner;

pub use embedded::{get_migrations, Migration};
pub use runner::{apply_migrations, apply_migrations_with_policy, MigrationOutcome};
