//! # In-Memory Engine Lifecycle Under Load
//!
//! Many writers against one started engine, sweeping and shutdown while
//! traffic is in flight.

#[cfg(test)]
mod tests {
    use crate::fixtures::{init_tracing, now_millis, Writer};
    use futures::future::join_all;
    use s4_envelope::Secp256k1Envelope;
    use s4_storage::test_utils::ManualTimeSource;
    use s4_storage::{InMemoryS4Storage, LifecycleState, Record, S4Config, S4Error, S4Storage};
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_many_writers_many_slots() {
        init_tracing();
        let storage = Arc::new(
            InMemoryS4Storage::new(&S4Config::default(), Secp256k1Envelope::new()).unwrap(),
        );
        storage.start().await.unwrap();

        let writers: Vec<_> = (0..8).map(|_| Arc::new(Writer::random())).collect();
        let slots = storage.constraints().max_slots_per_user;
        let expiration = now_millis() + 600_000;

        let mut tasks = Vec::new();
        for writer in &writers {
            for slot_id in 0..slots {
                let storage = Arc::clone(&storage);
                let writer = Arc::clone(writer);
                tasks.push(tokio::spawn(async move {
                    let record = Record::new(vec![slot_id as u8; 64], 1, expiration);
                    let signature = writer.sign(slot_id, &record);
                    storage
                        .put(&writer.address, slot_id, &record, &signature)
                        .await
                }));
            }
        }

        for result in join_all(tasks).await {
            result.unwrap().unwrap();
        }

        let stats = storage.stats().await.unwrap();
        assert_eq!(stats.new, writers.len() * slots as usize);
        assert_eq!(storage.snapshot().await.unwrap().len(), stats.total());

        storage.close().await.unwrap();
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_versions_settle_on_highest() {
        let storage = Arc::new(
            InMemoryS4Storage::new(&S4Config::default(), Secp256k1Envelope::new()).unwrap(),
        );
        storage.start().await.unwrap();

        let writer = Arc::new(Writer::random());
        let expiration = now_millis() + 600_000;

        let tasks = (1..=20u64).map(|version| {
            let storage = Arc::clone(&storage);
            let writer = Arc::clone(&writer);
            tokio::spawn(async move {
                let record = Record::new(version.to_be_bytes().to_vec(), version, expiration);
                let signature = writer.sign(0, &record);
                storage.put(&writer.address, 0, &record, &signature).await
            })
        });

        for result in join_all(tasks).await {
            match result.unwrap() {
                Ok(()) | Err(S4Error::StaleVersion { .. }) => {}
                Err(other) => panic!("unexpected error: {other:?}"),
            }
        }

        let (record, _) = storage.get(&writer.address, 0).await.unwrap();
        assert_eq!(record.version, 20);
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweep_marks_entries_and_close_stops_it() {
        let start = 1_700_000_000_000;
        let clock = ManualTimeSource::new(start);
        let config = S4Config::new().with_sweep_interval(Duration::from_millis(200));
        let storage =
            InMemoryS4Storage::with_time_source(&config, Secp256k1Envelope::new(), clock.clone())
                .unwrap();
        storage.start().await.unwrap();

        let writer = Writer::random();
        for (slot_id, ttl) in [(0, 100), (1, 10_000)] {
            let record = Record::new(b"peer".to_vec(), 1, start + ttl);
            storage
                .put(&writer.address, slot_id, &record, &writer.sign(slot_id, &record))
                .await
                .unwrap();
        }

        clock.advance(500);
        tokio::time::sleep(Duration::from_millis(450)).await;

        let stats = storage.stats().await.unwrap();
        assert_eq!(stats.expired, 1);
        assert_eq!(stats.new, 1);

        storage.close().await.unwrap();
        assert_eq!(storage.lifecycle_state(), LifecycleState::Stopped);
        assert_eq!(
            storage.get(&writer.address, 1).await,
            Err(S4Error::ServiceNotStarted)
        );
        assert_eq!(storage.close().await, Ok(()));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_close_during_traffic() {
        let storage = Arc::new(
            InMemoryS4Storage::new(&S4Config::default(), Secp256k1Envelope::new()).unwrap(),
        );
        storage.start().await.unwrap();

        let writer = Arc::new(Writer::random());
        let expiration = now_millis() + 600_000;

        let traffic = {
            let storage = Arc::clone(&storage);
            let writer = Arc::clone(&writer);
            tokio::spawn(async move {
                let mut version = 0u64;
                loop {
                    version += 1;
                    let record = Record::new(b"x".to_vec(), version, expiration);
                    let signature = writer.sign(0, &record);
                    match storage.put(&writer.address, 0, &record, &signature).await {
                        Ok(()) => tokio::task::yield_now().await,
                        Err(S4Error::ServiceNotStarted) => return version,
                        Err(other) => panic!("unexpected error: {other:?}"),
                    }
                }
            })
        };

        tokio::time::sleep(Duration::from_millis(20)).await;
        storage.close().await.unwrap();

        let stopped_at = traffic.await.unwrap();
        assert!(stopped_at >= 1);
        assert_eq!(
            storage.get(&writer.address, 0).await,
            Err(S4Error::ServiceNotStarted)
        );
    }
}
