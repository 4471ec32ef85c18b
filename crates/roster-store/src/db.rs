//! Database connection management
//!
//! Provides utilities for opening and configuring SQLite connections

#![allow(clippy::result_large_err)]

use crate::config::StoreLocation;
use crate::errors::{from_rusqlite, io_error, Result};
use rusqlite::Connection;
use std::path::Path;

/// Open a SQLite database at the given path
pub fn open<P: AsRef<Path>>(path: P) -> Result<Connection> {
    Connection::open(path).map_err(from_rusqlite)
}

/// Open an in-memory SQLite database (for testing)
pub fn open_in_memory() -> Result<Connection> {
    Connection::open_in_memory().map_err(from_rusqlite)
}

/// Open a configured connection for a store location
pub fn open_location(location: &StoreLocation) -> Result<Connection> {
    let conn = match location {
        StoreLocation::File(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|e| io_error("create_db_dir", e))?;
            }
            open(path)?
        }
        StoreLocation::InMemory => open_in_memory()?,
    };
    configure(&conn)?;
    Ok(conn)
}

/// Configure a connection for durable single-writer use
pub fn configure(conn: &Connection) -> Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON")
        .map_err(from_rusqlite)?;

    // journal_mode returns a row, so it goes through query_row
    let _mode: String = conn
        .query_row("PRAGMA journal_mode = WAL", [], |row| row.get(0))
        .map_err(from_rusqlite)?;

    // A committed insert must survive power loss
    conn.execute_batch("PRAGMA synchronous = FULL")
        .map_err(from_rusqlite)?;

    Ok(())
}
