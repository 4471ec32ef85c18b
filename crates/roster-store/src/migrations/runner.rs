//! Migration runner
//!
//! Applies migrations with checksums and idempotency. A recorded migration
//! that is unknown to this build, or whose checksum differs, is a schema
//! mismatch; the policy decides whether that fails or wipes the store.

#![allow(clippy::result_large_err)]

use crate::config::MigrationPolicy;
use crate::errors::{
    checksum_mismatch, from_rusqlite, migration_error, unknown_migration, Result,
};
use crate::migrations::checksums::compute_checksum;
use crate::migrations::embedded::{get_migrations, Migration};
use rusqlite::{Connection, OptionalExtension};

/// What a migration run did
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct MigrationOutcome {
    /// Ids of migrations applied during this run
    pub applied: Vec<String>,
    /// True when a schema mismatch caused stored data to be dropped
    pub reset: bool,
}

/// Apply all pending migrations, failing on any schema mismatch
pub fn apply_migrations(conn: &mut Connection) -> Result<MigrationOutcome> {
    apply_migrations_with_policy(conn, MigrationPolicy::Strict)
}

/// Apply all pending migrations under the given mismatch policy
pub fn apply_migrations_with_policy(
    conn: &mut Connection,
    policy: MigrationPolicy,
) -> Result<MigrationOutcome> {
    create_schema_version_table(conn)?;

    let migrations = get_migrations();
    let mut outcome = MigrationOutcome::default();

    if let Err(mismatch) = verify_recorded(conn, &migrations) {
        match policy {
            MigrationPolicy::Strict => return Err(mismatch),
            MigrationPolicy::Destructive => {
                tracing::warn!(
                    component = module_path!(),
                    op = "migration",
                    err_code = mismatch.code(),
                    "schema mismatch, dropping stored records"
                );
                reset_schema(conn)?;
                create_schema_version_table(conn)?;
                outcome.reset = true;
            }
        }
    }

    for migration in &migrations {
        if apply_migration(conn, migration.id, migration.sql)? {
            outcome.applied.push(migration.id.to_string());
        }
    }

    Ok(outcome)
}

/// Create the schema_version table if it doesn't exist
fn create_schema_version_table(conn: &Connection) -> Result<()> {
    conn.execute(
        "CREATE TABLE IF NOT EXISTS schema_version (
            id INTEGER PRIMARY KEY,
            migration_id TEXT NOT NULL UNIQUE,
            applied_at INTEGER NOT NULL,
            checksum TEXT
        )",
        [],
    )
    .map_err(from_rusqlite)?;

    Ok(())
}

/// Check every recorded migration against the embedded set
fn verify_recorded(conn: &Connection, migrations: &[Migration]) -> Result<()> {
    let mut stmt = conn
        .prepare("SELECT migration_id, checksum FROM schema_version ORDER BY id")
        .map_err(from_rusqlite)?;
    let recorded: Vec<(String, Option<String>)> = stmt
        .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;

    for (migration_id, checksum) in recorded {
        let embedded = migrations
            .iter()
            .find(|m| m.id == migration_id)
            .ok_or_else(|| unknown_migration(&migration_id))?;

        let expected = compute_checksum(embedded.sql);
        match checksum {
            Some(actual) if actual == expected => {}
            Some(actual) => return Err(checksum_mismatch(&migration_id, &expected, &actual)),
            None => return Err(checksum_mismatch(&migration_id, &expected, "<none>")),
        }
    }

    Ok(())
}

/// Drop every user table, including the migration ledger
fn reset_schema(conn: &mut Connection) -> Result<()> {
    let mut stmt = conn
        .prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        )
        .map_err(from_rusqlite)?;
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))
        .map_err(from_rusqlite)?
        .collect::<std::result::Result<Vec<_>, _>>()
        .map_err(from_rusqlite)?;
    drop(stmt);

    let tx = conn.transaction().map_err(from_rusqlite)?;
    for table in tables {
        tx.execute_batch(&format!("DROP TABLE IF EXISTS \"{}\"", table))
            .map_err(from_rusqlite)?;
    }
    tx.commit().map_err(from_rusqlite)?;

    Ok(())
}

/// Apply a single migration if not already applied
///
/// Returns whether the migration ran.
fn apply_migration(conn: &mut Connection, migration_id: &str, sql: &str) -> Result<bool> {
    let already_applied = conn
        .query_row(
            "SELECT 1 FROM schema_version WHERE migration_id = ?",
            [migration_id],
            |_| Ok(()),
        )
        .optional()
        .map_err(from_rusqlite)?
        .is_some();

    if already_applied {
        return Ok(false);
    }

    let checksum = compute_checksum(sql);

    let tx = conn.transaction().map_err(from_rusqlite)?;

    tx.execute_batch(sql)
        .map_err(|e| migration_error(migration_id, e))?;

    let now = chrono::Utc::now().timestamp();
    tx.execute(
        "INSERT INTO schema_version (migration_id, applied_at, checksum) VALUES (?, ?, ?)",
        rusqlite::params![migration_id, now, checksum],
    )
    .map_err(from_rusqlite)?;

    tx.commit().map_err(from_rusqlite)?;

    Ok(true)
}
