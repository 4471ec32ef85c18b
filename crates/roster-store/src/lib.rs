//! Roster Store - observable person persistence on SQLite
//!
//! Provides:
//! - SQLite connection management and configuration
//! - Embedded migrations with checksums and a schema mismatch policy
//! - A repository layer for the `people` table
//! - `PersonStore`, the shared handle for inserts, ordered reads and
//!   live snapshot observation

pub mod config;
pub mod db;
pub mod errors;
pub mod migrations;
pub mod observe;
pub mod repo;
pub mod store;

// Re-export key types
pub use config::{MigrationPolicy, StoreConfig, StoreLocation};
pub use errors::Result;
pub use observe::Observation;
pub use store::PersonStore;
