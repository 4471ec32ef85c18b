// Integration tests for the migration framework
// Covers fresh application, idempotency, checksum recording and the
// strict/destructive schema mismatch policies

use roster_core::{ExErrorKind, NewPerson};
use roster_store::migrations::{apply_migrations, apply_migrations_with_policy};
use roster_store::{MigrationPolicy, PersonStore, StoreConfig};
use rusqlite::Connection;
use tempfile::TempDir;

fn setup_test_db() -> Connection {
    Connection::open_in_memory().expect("Failed to create in-memory database")
}

fn get_table_names(conn: &Connection) -> Vec<String> {
    let mut stmt = conn
        .prepare("SELECT name FROM sqlite_master WHERE type='table' ORDER BY name")
        .unwrap();

    let tables = stmt
        .query_map([], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<String>, _>>()
        .unwrap();

    tables
}

/// Simulate a build whose embedded migration SQL changed
fn tamper_checksum(db_path: &std::path::Path) {
    let conn = Connection::open(db_path).unwrap();
    conn.execute(
        "UPDATE schema_version SET checksum = 'stale' WHERE migration_id = '001_people'",
        [],
    )
    .unwrap();
}

#[test]
fn test_apply_migrations_on_empty_db() {
    let mut conn = setup_test_db();

    let outcome = apply_migrations(&mut conn).unwrap();
    assert_eq!(outcome.applied, vec!["001_people".to_string()]);

    // people, the ledger, and sqlite_sequence for AUTOINCREMENT
    let tables = get_table_names(&conn);
    for expected in ["people", "schema_version", "sqlite_sequence"] {
        assert!(
            tables.contains(&expected.to_string()),
            "Missing table: {}",
            expected
        );
    }
}

#[test]
fn test_migration_idempotency() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    apply_migrations(&mut conn).unwrap();

    let version_count: i64 = conn
        .query_row("SELECT COUNT(*) FROM schema_version", [], |row| row.get(0))
        .unwrap();
    assert_eq!(version_count, 1);
}

#[test]
fn test_checksum_recorded() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();

    let checksum: String = conn
        .query_row(
            "SELECT checksum FROM schema_version WHERE migration_id = ?",
            ["001_people"],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(checksum.len(), 64, "SHA256 checksum should be 64 hex chars");
}

#[test]
fn test_strict_policy_rejects_changed_schema() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("store.db");

    let store = PersonStore::open(StoreConfig::file(&db_path)).unwrap();
    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();
    store.close().unwrap();

    tamper_checksum(&db_path);

    let err = PersonStore::open(StoreConfig::file(&db_path)).unwrap_err();
    assert_eq!(err.kind(), ExErrorKind::SchemaMismatch);
    assert!(err.is_storage_error());

    // Data is left untouched for an explicit migration to handle
    let conn = Connection::open(&db_path).unwrap();
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM people", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
}

#[test]
fn test_destructive_policy_invalidates_stored_data() {
    let temp_dir = TempDir::new().unwrap();
    let db_path = temp_dir.path().join("store.db");

    let store = PersonStore::open(StoreConfig::file(&db_path)).unwrap();
    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();
    store.insert(NewPerson::new("Alan", "Turing", 41)).unwrap();
    store.close().unwrap();

    tamper_checksum(&db_path);

    let config = StoreConfig::file(&db_path).with_migration_policy(MigrationPolicy::Destructive);
    let store = PersonStore::open(config).unwrap();
    assert!(store.query_all_ordered_by_id_desc().unwrap().is_empty());

    // The rebuilt table starts a fresh id sequence
    let id = store.insert(NewPerson::new("Grace", "Hopper", 85)).unwrap();
    assert_eq!(id, 1);
}

#[test]
fn test_destructive_reset_reported() {
    let mut conn = setup_test_db();
    apply_migrations(&mut conn).unwrap();
    conn.execute("UPDATE schema_version SET checksum = NULL", [])
        .unwrap();

    let outcome = apply_migrations_with_policy(&mut conn, MigrationPolicy::Destructive).unwrap();
    assert!(outcome.reset);
    assert_eq!(outcome.applied, vec!["001_people".to_string()]);
}
