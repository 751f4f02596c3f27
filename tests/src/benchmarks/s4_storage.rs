//! # S4 Storage Benchmarks
//!
//! Measured paths:
//! - `put` on the in-memory engine (deterministic envelope, engine cost only)
//! - `get` hit on a populated engine
//! - secp256k1 signer recovery (dominates a production `put`)
//! - one expiration sweep over a populated table

use crate::fixtures::Writer;
use criterion::{black_box, BenchmarkId, Criterion, Throughput};
use s4_envelope::Secp256k1Envelope;
use s4_storage::test_utils::{FakeEnvelope, ManualTimeSource};
use s4_storage::{Address, Envelope, InMemoryS4Storage, Record, S4Config, S4Storage};
use std::time::Duration;
use tokio::runtime::Runtime;

const NOW: i64 = 1_700_000_000_000;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

fn address_for(i: u32) -> Address {
    let mut address = [0u8; 20];
    address[..4].copy_from_slice(&i.to_be_bytes());
    address
}

fn engine(
    config: &S4Config,
) -> (
    InMemoryS4Storage<FakeEnvelope, ManualTimeSource>,
    ManualTimeSource,
) {
    let clock = ManualTimeSource::new(NOW);
    let storage = InMemoryS4Storage::with_time_source(config, FakeEnvelope, clock.clone())
        .expect("valid config");
    (storage, clock)
}

pub fn bench_put(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("s4-put");
    group.measurement_time(Duration::from_secs(5));

    for size in [64usize, 1024, 5 * 1024] {
        let (storage, _) = engine(&S4Config::default());
        rt.block_on(storage.start()).expect("start");
        let address = [0x42; 20];
        let mut version = 0u64;

        group.throughput(Throughput::Bytes(size as u64));
        group.bench_with_input(BenchmarkId::new("in_memory", size), &size, |b, &size| {
            b.iter(|| {
                version += 1;
                let record = Record::new(vec![0xAB; size], version, NOW + 60_000);
                let signature = FakeEnvelope::sign(&address, 0, &record);
                black_box(rt.block_on(storage.put(&address, 0, &record, &signature)))
            })
        });
    }

    group.finish();
}

pub fn bench_get(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("s4-get");

    let config = S4Config::default();
    let (storage, _) = engine(&config);
    rt.block_on(async {
        storage.start().await.expect("start");
        for i in 0..1_000u32 {
            let address = address_for(i);
            for slot_id in 0..config.max_slots_per_user {
                let record = Record::new(vec![0u8; 256], 1, NOW + 60_000);
                let signature = FakeEnvelope::sign(&address, slot_id, &record);
                storage
                    .put(&address, slot_id, &record, &signature)
                    .await
                    .expect("populate");
            }
        }
    });

    let address = address_for(263);
    group.bench_function("hit_10k_entries", |b| {
        b.iter(|| black_box(rt.block_on(storage.get(&address, 3))))
    });

    group.finish();
}

pub fn bench_signer_recovery(c: &mut Criterion) {
    let mut group = c.benchmark_group("s4-envelope");

    let writer = Writer::random();
    let envelope = Secp256k1Envelope::new();
    let record = Record::new(vec![0x11; 1024], 1, NOW + 60_000);
    let signature = writer.sign(0, &record);

    group.bench_function("sign_target_and_recover", |b| {
        b.iter(|| {
            let target = envelope
                .sign_target(&writer.address, 0, &record)
                .expect("canonical json");
            black_box(envelope.recover_signer(&target, &signature))
        })
    });

    group.finish();
}

pub fn bench_sweep(c: &mut Criterion) {
    let rt = runtime();
    let mut group = c.benchmark_group("s4-sweep");

    for entries in [1_000u32, 10_000] {
        let config = S4Config::new().with_max_slots_per_user(entries);
        let (storage, clock) = engine(&config);
        rt.block_on(async {
            storage.start().await.expect("start");
            let address = [0x99; 20];
            for slot_id in 0..entries {
                let record = Record::new(vec![], 1, NOW + 1 + (slot_id % 2) as i64 * 60_000);
                let signature = FakeEnvelope::sign(&address, slot_id, &record);
                storage
                    .put(&address, slot_id, &record, &signature)
                    .await
                    .expect("populate");
            }
        });
        clock.advance(10);

        group.throughput(Throughput::Elements(entries as u64));
        group.bench_with_input(BenchmarkId::new("scan", entries), &entries, |b, _| {
            b.iter(|| black_box(rt.block_on(storage.sweep_now())))
        });
    }

    group.finish();
}

/// Register all S4 benchmarks.
pub fn register_benchmarks(c: &mut Criterion) {
    bench_put(c);
    bench_get(c);
    bench_signer_recovery(c);
    bench_sweep(c);
}
