//! Live snapshot observation
//!
//! An `Observation` pairs a change-channel receiver with a store handle.
//! Each `next()` waits for the channel to move past the version this
//! observer last saw, then reads a fresh snapshot. Versions published while
//! the observer was busy collapse into one wake-up, so a slow observer sees
//! fewer, never staler, snapshots.
//!
//! `next()` is cancel safe. A wake-up is consumed only once its snapshot
//! read has completed, so dropping an in-flight `next()` (a timeout or a
//! losing `select!` branch) leaves the read due for the following call.
//!
//! Snapshot reads run on tokio's blocking pool; poll observations from
//! inside a tokio runtime.

#![allow(clippy::result_large_err)]

use crate::errors::Result;
use crate::store::{ChangeState, PersonStore};
use futures::Stream;
use roster_core::errors::{ExError, ExErrorKind};
use roster_core::model::Snapshot;
use roster_core::RosterError;
use tokio::sync::watch;

/// A live, restartable stream of ordered snapshots
pub struct Observation {
    id: u64,
    store: PersonStore,
    changes: watch::Receiver<ChangeState>,
    /// A snapshot is owed: the initial one, or one for a change already
    /// taken off the channel whose read has not completed
    read_pending: bool,
    finished: bool,
}

impl std::fmt::Debug for Observation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Observation")
            .field("id", &self.id)
            .field("read_pending", &self.read_pending)
            .field("finished", &self.finished)
            .finish()
    }
}

impl Observation {
    pub(crate) fn new(id: u64, store: PersonStore, changes: watch::Receiver<ChangeState>) -> Self {
        Self {
            id,
            store,
            changes,
            read_pending: true,
            finished: false,
        }
    }

    /// Observer id, unique per store
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Whether the stream has ended
    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Wait for and return the next snapshot
    ///
    /// Returns `None` once the store is closed. A failed snapshot read is
    /// returned as `Some(Err(_))`; the observation stays live and retries on
    /// the next change.
    pub async fn next(&mut self) -> Option<Result<Snapshot>> {
        if self.finished {
            return None;
        }

        if !self.read_pending {
            if self.changes.changed().await.is_err() {
                // the sender lives as long as any store handle; treat as closed
                return self.finish();
            }
            self.read_pending = true;
        }

        let state = *self.changes.borrow_and_update();
        if state.closed {
            return self.finish();
        }

        let result = self.read_snapshot().await;
        self.read_pending = false;
        match &result {
            Ok(snapshot) => tracing::debug!(
                observer_id = self.id,
                version = state.version,
                snapshot_len = snapshot.len(),
                "snapshot delivered"
            ),
            Err(e) => tracing::warn!(
                observer_id = self.id,
                version = state.version,
                err_code = e.code(),
                error = %e,
                "snapshot read failed"
            ),
        }
        Some(result)
    }

    /// Like `next`, but an ended stream is reported as `SubscriptionClosed`
    pub async fn next_snapshot(&mut self) -> Result<Snapshot> {
        match self.next().await {
            Some(result) => result,
            None => Err(RosterError::SubscriptionClosed {
                observer_id: self.id,
            }
            .into()),
        }
    }

    /// Adapt into a `futures::Stream`
    pub fn into_stream(self) -> impl Stream<Item = Result<Snapshot>> + Send + 'static {
        futures::stream::unfold(self, |mut observation| async move {
            observation
                .next()
                .await
                .map(|item| (item, observation))
        })
    }

    async fn read_snapshot(&self) -> Result<Snapshot> {
        let store = self.store.clone();
        tokio::task::spawn_blocking(move || store.query_all_ordered_by_id_desc())
            .await
            .map_err(|e| {
                ExError::new(ExErrorKind::Internal)
                    .with_op("snapshot_read")
                    .with_message(e.to_string())
            })?
    }

    fn finish(&mut self) -> Option<Result<Snapshot>> {
        if !self.finished {
            self.finished = true;
            tracing::debug!(observer_id = self.id, "observation ended");
        }
        None
    }
}
