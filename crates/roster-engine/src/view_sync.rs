//! View synchronizer
//!
//! Bridges a store's live snapshot stream to a presentation callback.
//! One tokio task owns the observation and invokes the callback for each
//! snapshot in arrival order, so invocations never overlap.
//!
//! `stop` signals the task over a oneshot channel and waits for it to exit;
//! a callback already running is allowed to finish. Dropping a `ViewSync`
//! without stopping aborts the task.

use roster_core::errors::ExError;
use roster_core::model::Snapshot;
use roster_core::{log_op_end, log_op_error, log_op_start, RosterError};
use roster_store::{Observation, PersonStore};
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

/// A running subscription that forwards snapshots to a callback
#[derive(Debug)]
pub struct ViewSync {
    observer_id: u64,
    shutdown: Option<oneshot::Sender<()>>,
    task: Option<JoinHandle<()>>,
}

impl ViewSync {
    /// Subscribe to `store` and call `on_snapshot` for every snapshot
    ///
    /// Snapshot read failures are logged and skipped. Must be called from
    /// within a tokio runtime.
    pub fn start<F>(store: &PersonStore, on_snapshot: F) -> Self
    where
        F: FnMut(Snapshot) + Send + 'static,
    {
        Self::start_with_errors(store, on_snapshot, |err: ExError| {
            tracing::warn!(
                err_code = err.code(),
                error = %err,
                "snapshot skipped after read failure"
            );
        })
    }

    /// Like `start`, but read failures are passed to `on_error`
    ///
    /// The subscription stays live after an error and delivers the next
    /// successful snapshot as usual.
    pub fn start_with_errors<F, E>(store: &PersonStore, on_snapshot: F, on_error: E) -> Self
    where
        F: FnMut(Snapshot) + Send + 'static,
        E: FnMut(ExError) + Send + 'static,
    {
        let observation = store.observe_all();
        let observer_id = observation.id();
        let (shutdown_tx, shutdown_rx) = oneshot::channel();

        let task = tokio::spawn(run(observation, on_snapshot, on_error, shutdown_rx));
        tracing::info!(observer_id, "view sync started");

        Self {
            observer_id,
            shutdown: Some(shutdown_tx),
            task: Some(task),
        }
    }

    /// Id of the underlying store observation
    pub fn observer_id(&self) -> u64 {
        self.observer_id
    }

    /// Whether the delivery task is still alive
    ///
    /// Becomes false after `stop`, after the store closes, or if the
    /// callback panicked.
    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Cancel the subscription and wait for the delivery task to exit
    ///
    /// No callback runs after this returns. Fails only if the task ended
    /// abnormally (a panicking callback).
    pub async fn stop(mut self) -> Result<(), RosterError> {
        log_op_start!("view_sync_stop", observer_id = self.observer_id);
        let start = std::time::Instant::now();

        if let Some(shutdown) = self.shutdown.take() {
            // the task may already be gone; nothing to signal then
            let _ = shutdown.send(());
        }

        let Some(task) = self.task.take() else {
            return Ok(());
        };

        if let Err(join_err) = task.await {
            let err = RosterError::SyncTaskFailed {
                message: join_err.to_string(),
            };
            log_op_error!(
                "view_sync_stop",
                err.clone(),
                duration_ms = start.elapsed().as_millis() as u64,
                observer_id = self.observer_id
            );
            return Err(err);
        }

        log_op_end!(
            "view_sync_stop",
            duration_ms = start.elapsed().as_millis() as u64,
            observer_id = self.observer_id
        );

        Ok(())
    }
}

impl Drop for ViewSync {
    fn drop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

async fn run<F, E>(
    mut observation: Observation,
    mut on_snapshot: F,
    mut on_error: E,
    mut shutdown: oneshot::Receiver<()>,
) where
    F: FnMut(Snapshot) + Send + 'static,
    E: FnMut(ExError) + Send + 'static,
{
    let observer_id = observation.id();
    let mut delivered: u64 = 0;

    loop {
        tokio::select! {
            // Biased so a pending stop wins over a ready snapshot.
            biased;

            _ = &mut shutdown => break,

            item = observation.next() => match item {
                Some(Ok(snapshot)) => {
                    delivered += 1;
                    on_snapshot(snapshot);
                }
                Some(Err(err)) => on_error(err),
                None => {
                    tracing::info!(observer_id, "store closed, view sync ending");
                    break;
                }
            },
        }
    }

    tracing::debug!(observer_id, delivered, "view sync task exited");
}
