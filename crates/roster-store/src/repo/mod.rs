//! Repository layer for persisting person records to SQLite

pub mod sqlite_repo;

pub use sqlite_repo::SqliteRepo;
