//! Store configuration
//!
//! Where the database lives and what to do when the recorded schema no
//! longer matches the embedded migrations.

use std::path::{Path, PathBuf};

/// Default on-disk location, relative to the working directory
pub const DEFAULT_DB_PATH: &str = ".roster/store.db";

/// Backing medium for the store
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// SQLite file; parent directories are created on open
    File(PathBuf),
    /// Private in-memory database, gone when the store closes
    InMemory,
}

/// Behaviour when recorded migrations disagree with embedded ones
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MigrationPolicy {
    /// Fail `open` with `SchemaMismatch`
    #[default]
    Strict,
    /// Drop stored records and rebuild the schema
    Destructive,
}

/// Configuration for `PersonStore::open`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    pub location: StoreLocation,
    pub migration_policy: MigrationPolicy,
}

impl StoreConfig {
    /// File-backed store at `path` with the strict migration policy
    pub fn file(path: impl AsRef<Path>) -> Self {
        Self {
            location: StoreLocation::File(path.as_ref().to_path_buf()),
            migration_policy: MigrationPolicy::Strict,
        }
    }

    /// In-memory store (for tests and throwaway sessions)
    pub fn in_memory() -> Self {
        Self {
            location: StoreLocation::InMemory,
            migration_policy: MigrationPolicy::Strict,
        }
    }

    pub fn with_migration_policy(mut self, policy: MigrationPolicy) -> Self {
        self.migration_policy = policy;
        self
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self::file(DEFAULT_DB_PATH)
    }
}
