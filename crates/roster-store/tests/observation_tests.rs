// Integration tests for live snapshot observation
// Covers initial delivery, liveness under bursts of inserts, independent
// observers, cancellation and shutdown

use futures::StreamExt;
use roster_core::{NewPerson, Snapshot};
use roster_store::PersonStore;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

/// Pull snapshots until one satisfies `done`, failing after `WAIT`
async fn next_until(
    observation: &mut roster_store::Observation,
    done: impl Fn(&Snapshot) -> bool,
) -> Vec<Snapshot> {
    let mut seen = Vec::new();
    tokio::time::timeout(WAIT, async {
        while let Some(item) = observation.next().await {
            let snapshot = item.unwrap();
            let finished = done(&snapshot);
            seen.push(snapshot);
            if finished {
                return;
            }
        }
        panic!("observation ended before reaching the expected state");
    })
    .await
    .expect("timed out waiting for snapshot");
    seen
}

#[tokio::test]
async fn test_first_snapshot_empty_then_insert_delivered() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut observation = store.observe_all();

    // Subscribe before any insert: first snapshot is empty
    let first = observation.next().await.unwrap().unwrap();
    assert!(first.is_empty());

    store.insert(NewPerson::new("Grace", "Hopper", 85)).unwrap();

    let next = tokio::time::timeout(WAIT, observation.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(next, vec![NewPerson::new("Grace", "Hopper", 85).with_id(1)]);
}

#[tokio::test]
async fn test_burst_of_inserts_reaches_final_state() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut observation = store.observe_all();
    observation.next().await.unwrap().unwrap();

    for i in 0..50 {
        store
            .insert(NewPerson::new("Burst", format!("{}", i), i))
            .unwrap();
    }
    let final_state = store.query_all_ordered_by_id_desc().unwrap();

    let seen = next_until(&mut observation, |s| s.len() == 50).await;

    // Coalescing is allowed, so far fewer than 50 snapshots may arrive
    assert!(seen.len() <= 50);
    assert_eq!(seen.last().unwrap(), &final_state);
}

#[tokio::test]
async fn test_snapshots_never_go_backwards() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut observation = store.observe_all();

    let writer = {
        let store = store.clone();
        tokio::task::spawn_blocking(move || {
            for i in 0..30 {
                store.insert(NewPerson::new("W", "R", i)).unwrap();
            }
        })
    };

    let seen = next_until(&mut observation, |s| s.len() == 30).await;
    writer.await.unwrap();

    let lens: Vec<usize> = seen.iter().map(Vec::len).collect();
    assert!(lens.windows(2).all(|w| w[0] <= w[1]), "lens: {:?}", lens);
    for snapshot in &seen {
        assert!(snapshot.windows(2).all(|w| w[0].id > w[1].id));
    }
}

#[tokio::test]
async fn test_observers_are_independent() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut early = store.observe_all();
    early.next().await.unwrap().unwrap();

    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();

    // A late subscriber starts from the current state
    let mut late = store.observe_all();
    let late_first = late.next().await.unwrap().unwrap();
    assert_eq!(late_first.len(), 1);

    store.insert(NewPerson::new("Alan", "Turing", 41)).unwrap();

    let early_seen = next_until(&mut early, |s| s.len() == 2).await;
    let late_seen = next_until(&mut late, |s| s.len() == 2).await;
    assert_eq!(early_seen.last(), late_seen.last());
}

#[tokio::test]
async fn test_idle_observer_does_not_block_writer() {
    let store = PersonStore::open_in_memory().unwrap();
    // Never polled after subscribing
    let _idle = store.observe_all();

    let inserted = tokio::time::timeout(
        WAIT,
        tokio::task::spawn_blocking({
            let store = store.clone();
            move || {
                for i in 0..200 {
                    store.insert(NewPerson::new("Fast", "Writer", i)).unwrap();
                }
                store.count().unwrap()
            }
        }),
    )
    .await
    .expect("writer stalled")
    .unwrap();

    assert_eq!(inserted, 200);
}

#[tokio::test]
async fn test_dropping_observation_unsubscribes() {
    let store = PersonStore::open_in_memory().unwrap();
    let observation = store.observe_all();
    assert_eq!(store.observer_count(), 1);

    drop(observation);
    assert_eq!(store.observer_count(), 0);

    // Writes after cancellation are unaffected
    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();
}

#[tokio::test]
async fn test_close_ends_every_observer() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut a = store.observe_all();
    let mut b = store.observe_all();
    a.next().await.unwrap().unwrap();

    store.close().unwrap();

    assert!(tokio::time::timeout(WAIT, a.next()).await.unwrap().is_none());
    assert!(tokio::time::timeout(WAIT, b.next()).await.unwrap().is_none());
}

#[tokio::test]
async fn test_stream_adapter() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut stream = Box::pin(store.observe_all().into_stream());

    assert!(stream.next().await.unwrap().unwrap().is_empty());

    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();
    let snapshot = tokio::time::timeout(WAIT, stream.next())
        .await
        .unwrap()
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);

    store.close().unwrap();
    assert!(tokio::time::timeout(WAIT, stream.next())
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_cancelled_first_next_still_delivers_initial_snapshot() {
    let store = PersonStore::open_in_memory().unwrap();
    store.insert(NewPerson::new("Ada", "Lovelace", 36)).unwrap();
    let mut observation = store.observe_all();

    // Given a first next() abandoned by a timeout
    let _ = tokio::time::timeout(Duration::from_nanos(1), observation.next()).await;

    // When polled again on an idle store
    let snapshot = tokio::time::timeout(WAIT, observation.next())
        .await
        .expect("initial snapshot lost after cancellation")
        .unwrap()
        .unwrap();

    // Then the current state still arrives
    assert_eq!(snapshot, vec![NewPerson::new("Ada", "Lovelace", 36).with_id(1)]);
}

#[tokio::test]
async fn test_dropped_next_does_not_swallow_change() {
    let store = PersonStore::open_in_memory().unwrap();
    let mut observation = store.observe_all();
    assert!(observation.next().await.unwrap().unwrap().is_empty());

    store.insert(NewPerson::new("Grace", "Hopper", 85)).unwrap();

    // Given a next() polled once and dropped mid-read
    {
        let pending = observation.next();
        tokio::pin!(pending);
        let _ = futures::poll!(pending.as_mut());
    }

    // Then the change is still delivered without a further insert
    let snapshot = tokio::time::timeout(WAIT, observation.next())
        .await
        .expect("change lost after cancellation")
        .unwrap()
        .unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].first_name, "Grace");
}
