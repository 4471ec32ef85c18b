//! Person store handle
//!
//! `PersonStore` owns the single SQLite connection and a change channel.
//! Construct one per process and pass clones to every consumer.
//!
//! Writes are serialized by the connection mutex, committed before `insert`
//! returns, and only then announced on the change channel. The channel holds
//! a single version number, so announcing never waits on observers and
//! rapid writes coalesce into whichever version an observer reads next.

#![allow(clippy::result_large_err)]

use crate::config::StoreConfig;
use crate::db::open_location;
use crate::errors::{lock_poisoned, store_closed, Result};
use crate::migrations::apply_migrations_with_policy;
use crate::observe::Observation;
use crate::repo::SqliteRepo;
use roster_core::model::{NewPerson, Snapshot};
use roster_core::{log_op_end, log_op_error, log_op_start};
use rusqlite::Connection;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::watch;

/// Value carried by the change channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub(crate) struct ChangeState {
    /// Bumped after every committed insert
    pub version: u64,
    /// Set once by `close`; observers end their streams when they see it
    pub closed: bool,
}

struct Inner {
    conn: Mutex<Option<Connection>>,
    changes: watch::Sender<ChangeState>,
    next_observer_id: AtomicU64,
}

/// Shared handle to the person store
#[derive(Clone)]
pub struct PersonStore {
    inner: Arc<Inner>,
}

impl std::fmt::Debug for PersonStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.inner.changes.borrow();
        f.debug_struct("PersonStore")
            .field("version", &state.version)
            .field("closed", &state.closed)
            .field("observers", &self.inner.changes.receiver_count())
            .finish()
    }
}

impl PersonStore {
    /// Open the store, applying migrations under the configured policy
    pub fn open(config: StoreConfig) -> Result<Self> {
        log_op_start!("store_open", location = ?config.location);
        let start = std::time::Instant::now();

        let store = Self::open_impl(&config).map_err(|e| {
            log_op_error!(
                "store_open",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "store_open",
            duration_ms = start.elapsed().as_millis() as u64
        );

        Ok(store)
    }

    fn open_impl(config: &StoreConfig) -> Result<Self> {
        let mut conn = open_location(&config.location)?;
        let outcome = apply_migrations_with_policy(&mut conn, config.migration_policy)?;
        if !outcome.applied.is_empty() || outcome.reset {
            tracing::debug!(
                applied = ?outcome.applied,
                reset = outcome.reset,
                "migrations applied"
            );
        }

        let (changes, _) = watch::channel(ChangeState::default());

        Ok(Self {
            inner: Arc::new(Inner {
                conn: Mutex::new(Some(conn)),
                changes,
                next_observer_id: AtomicU64::new(1),
            }),
        })
    }

    /// Open a private in-memory store
    pub fn open_in_memory() -> Result<Self> {
        Self::open(StoreConfig::in_memory())
    }

    /// Append a person and return its store-assigned id
    ///
    /// Blocks until the row is committed. Every live observer is then
    /// notified; a slow observer never delays this call.
    pub fn insert(&self, person: NewPerson) -> Result<i64> {
        log_op_start!("person_insert");
        let start = std::time::Instant::now();

        let id = self.insert_impl(&person).map_err(|e| {
            log_op_error!(
                "person_insert",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        self.notify_changed();

        log_op_end!(
            "person_insert",
            duration_ms = start.elapsed().as_millis() as u64,
            person_id = id
        );

        Ok(id)
    }

    fn insert_impl(&self, person: &NewPerson) -> Result<i64> {
        self.with_conn_mut("person_insert", |conn| {
            SqliteRepo::insert_person(conn, person)
        })
    }

    /// All records, highest id first
    pub fn query_all_ordered_by_id_desc(&self) -> Result<Snapshot> {
        log_op_start!("person_query_all");
        let start = std::time::Instant::now();

        let people = self
            .with_conn("person_query_all", SqliteRepo::list_people_desc)
            .map_err(|e| {
                log_op_error!(
                    "person_query_all",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!(
            "person_query_all",
            duration_ms = start.elapsed().as_millis() as u64,
            snapshot_len = people.len()
        );

        Ok(people)
    }

    /// Number of stored records
    pub fn count(&self) -> Result<i64> {
        self.with_conn("person_count", SqliteRepo::count_people)
    }

    /// Subscribe to live snapshots of all records
    ///
    /// The first `next()` yields the current state immediately; each later
    /// `next()` waits for a change. Dropping the observation unsubscribes.
    pub fn observe_all(&self) -> Observation {
        let id = self.inner.next_observer_id.fetch_add(1, Ordering::Relaxed);
        let changes = self.inner.changes.subscribe();
        tracing::debug!(observer_id = id, "observer subscribed");
        Observation::new(id, self.clone(), changes)
    }

    /// Number of live observations
    pub fn observer_count(&self) -> usize {
        self.inner.changes.receiver_count()
    }

    /// Shut the store down
    ///
    /// Releases the connection and ends every observer's stream. Later
    /// reads and writes fail with `StoreClosed`. Closing twice is a no-op.
    pub fn close(&self) -> Result<()> {
        log_op_start!("store_close");
        let start = std::time::Instant::now();

        let conn = self
            .inner
            .conn
            .lock()
            .map_err(|_| lock_poisoned("store connection"))?
            .take();

        if let Some(conn) = conn {
            if let Err((_conn, e)) = conn.close() {
                tracing::warn!(error = %e, "sqlite close reported an error");
            }
        }

        self.inner.changes.send_modify(|state| state.closed = true);

        log_op_end!(
            "store_close",
            duration_ms = start.elapsed().as_millis() as u64
        );

        Ok(())
    }

    /// Whether `close` has been called
    pub fn is_closed(&self) -> bool {
        self.inner.changes.borrow().closed
    }

    pub(crate) fn change_state(&self) -> ChangeState {
        *self.inner.changes.borrow()
    }

    /// Announce a new version to every observer; never blocks
    pub(crate) fn notify_changed(&self) {
        self.inner.changes.send_modify(|state| state.version += 1);
    }

    pub(crate) fn with_conn<T>(
        &self,
        op: &str,
        f: impl FnOnce(&Connection) -> Result<T>,
    ) -> Result<T> {
        let guard = self
            .inner
            .conn
            .lock()
            .map_err(|_| lock_poisoned("store connection"))?;
        let conn = guard.as_ref().ok_or_else(|| store_closed(op))?;
        f(conn)
    }

    fn with_conn_mut<T>(
        &self,
        op: &str,
        f: impl FnOnce(&mut Connection) -> Result<T>,
    ) -> Result<T> {
        let mut guard = self
            .inner
            .conn
            .lock()
            .map_err(|_| lock_poisoned("store connection"))?;
        let conn = guard.as_mut().ok_or_else(|| store_closed(op))?;
        f(conn)
    }
}
