//! # In-Memory S4 Storage
//!
//! Self-contained engine: two keyed maps (records, metadata) under a single
//! reader/writer lock, an explicit lifecycle and a periodic expiration sweep.
//!
//! ## Locking
//!
//! | Operation | Lock |
//! |-----------|------|
//! | `get`, `snapshot`, `stats` | shared |
//! | `put`, `confirm`, sweep, `close` | exclusive |
//!
//! Per-key writes are totally ordered by lock acquisition, so the version
//! check always sees the latest committed entry.

use crate::config::S4Config;
use crate::domain::entities::{
    address_hex, Address, Constraints, Entry, EntryState, Metadata, Record, SlotId, SnapshotRow,
    StorageStats,
};
use crate::domain::validation::{check_slot, resolve_conflict, validate_write, SlotHead};
use crate::error::{ConfigError, S4Error, S4Result};
use crate::ports::inbound::S4Storage;
use crate::ports::outbound::{Envelope, SystemTimeSource, TimeSource};
use crate::service::lifecycle::{Lifecycle, LifecycleState};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, RwLock};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info, warn};

type SlotKey = (Address, SlotId);

#[derive(Debug, Default)]
struct SlotTables {
    records: HashMap<SlotKey, Record>,
    metadata: HashMap<SlotKey, Metadata>,
}

impl SlotTables {
    fn head(&self, key: &SlotKey) -> Option<SlotHead> {
        let record = self.records.get(key)?;
        let metadata = self.metadata.get(key)?;
        Some(SlotHead {
            version: record.version,
            highest_expiration: metadata.highest_expiration,
        })
    }
}

/// State shared between the engine handle and the sweep task.
struct Shared<E, T> {
    constraints: Constraints,
    envelope: E,
    time_source: T,
    lifecycle: Lifecycle,
    tables: RwLock<SlotTables>,
}

impl<E, T> Shared<E, T>
where
    E: Envelope,
    T: TimeSource,
{
    #[inline]
    fn ensure_running(&self) -> S4Result<()> {
        if !self.lifecycle.is_running() {
            return Err(S4Error::ServiceNotStarted);
        }
        Ok(())
    }

    /// Mark every live entry whose expiration has passed. Returns the count.
    async fn sweep_expired(&self) -> usize {
        let mut tables = self.tables.write().await;
        if !self.lifecycle.is_running() {
            return 0;
        }

        let now = self.time_source.now_millis();
        let SlotTables { records, metadata } = &mut *tables;
        let mut expired = 0;

        for (key, meta) in metadata.iter_mut() {
            if meta.state == EntryState::Expired {
                continue;
            }
            if records.get(key).is_some_and(|r| r.is_expired_at(now)) {
                meta.state = EntryState::Expired;
                expired += 1;
            }
        }

        expired
    }
}

struct Sweeper {
    shutdown_tx: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

/// In-memory implementation of [`S4Storage`].
///
/// Must be started with [`InMemoryS4Storage::start`] before use and shut down
/// with [`InMemoryS4Storage::close`].
pub struct InMemoryS4Storage<E, T = SystemTimeSource> {
    shared: Arc<Shared<E, T>>,
    sweep_interval: Duration,
    sweeper: parking_lot::Mutex<Option<Sweeper>>,
}

impl<E> InMemoryS4Storage<E, SystemTimeSource>
where
    E: Envelope + 'static,
{
    /// Create an engine driven by the system clock.
    pub fn new(config: &S4Config, envelope: E) -> Result<Self, ConfigError> {
        Self::with_time_source(config, envelope, SystemTimeSource)
    }
}

impl<E, T> InMemoryS4Storage<E, T>
where
    E: Envelope + 'static,
    T: TimeSource + 'static,
{
    /// Create an engine with an explicit time source.
    ///
    /// Fails if the configuration is invalid (e.g. zero slots per user).
    pub fn with_time_source(
        config: &S4Config,
        envelope: E,
        time_source: T,
    ) -> Result<Self, ConfigError> {
        let constraints = config.constraints()?;

        Ok(Self {
            shared: Arc::new(Shared {
                constraints,
                envelope,
                time_source,
                lifecycle: Lifecycle::new(),
                tables: RwLock::new(SlotTables::default()),
            }),
            sweep_interval: config.sweep_interval(),
            sweeper: parking_lot::Mutex::new(None),
        })
    }

    /// Current lifecycle state.
    pub fn lifecycle_state(&self) -> LifecycleState {
        self.shared.lifecycle.state()
    }

    /// Start the engine and spawn the expiration sweep.
    ///
    /// A second call is a no-op. Starting a closed engine fails with
    /// `InvalidLifecycleTransition`.
    pub async fn start(&self) -> S4Result<()> {
        // Held across the transition so `close` never observes `Started`
        // without the sweeper handle in place.
        let mut sweeper = self.sweeper.lock();

        match self.shared.lifecycle.start() {
            Ok(()) => {}
            Err(LifecycleState::Started) => {
                debug!("[s4] start() called on running storage, ignoring");
                return Ok(());
            }
            Err(state) => {
                return Err(S4Error::InvalidLifecycleTransition {
                    from: state.as_str(),
                    to: LifecycleState::Started.as_str(),
                });
            }
        }

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let handle = tokio::spawn(sweep_loop(
            Arc::clone(&self.shared),
            self.sweep_interval,
            shutdown_rx,
        ));
        *sweeper = Some(Sweeper {
            shutdown_tx,
            handle,
        });

        info!(
            max_slots_per_user = self.shared.constraints.max_slots_per_user,
            max_payload_size_bytes = self.shared.constraints.max_payload_size_bytes,
            sweep_interval_ms = self.sweep_interval.as_millis() as u64,
            "[s4] In-memory storage started"
        );
        Ok(())
    }

    /// Stop the engine.
    ///
    /// Waits for in-flight operations by taking the exclusive lock, then stops
    /// the sweep task and waits for it to exit. A second call returns `Ok(())`.
    pub async fn close(&self) -> S4Result<()> {
        let tables = self.shared.tables.write().await;

        let previous = self.shared.lifecycle.stop();
        if previous == LifecycleState::Stopped {
            debug!("[s4] close() called on stopped storage, ignoring");
            return Ok(());
        }

        let sweeper = self.sweeper.lock().take();
        drop(tables);

        if let Some(Sweeper {
            shutdown_tx,
            handle,
        }) = sweeper
        {
            let _ = shutdown_tx.send(true);
            handle.abort();
            if let Err(e) = handle.await {
                if !e.is_cancelled() {
                    warn!(error = %e, "[s4] Sweep task ended abnormally");
                }
            }
        }

        info!(previous = previous.as_str(), "[s4] In-memory storage closed");
        Ok(())
    }

    /// Run one expiration sweep immediately. Returns the number of entries marked.
    pub async fn sweep_now(&self) -> usize {
        self.shared.sweep_expired().await
    }

    /// Mark the entry at `(address, slot_id)` as confirmed.
    ///
    /// Only the currently stored `version` can be confirmed; confirming an
    /// already confirmed entry is a no-op.
    pub async fn confirm(&self, address: &Address, slot_id: SlotId, version: u64) -> S4Result<()> {
        check_slot(&self.shared.constraints, slot_id)?;

        let mut tables = self.shared.tables.write().await;
        self.shared.ensure_running()?;

        let now = self.shared.time_source.now_millis();
        let key = (*address, slot_id);
        let SlotTables { records, metadata } = &mut *tables;

        let (Some(record), Some(meta)) = (records.get(&key), metadata.get_mut(&key)) else {
            return Err(S4Error::RecordNotFound);
        };
        if meta.state == EntryState::Expired || record.is_expired_at(now) {
            return Err(S4Error::RecordExpired);
        }
        if record.version != version {
            return Err(S4Error::StaleVersion {
                version,
                stored: record.version,
            });
        }

        meta.state = EntryState::Confirmed;
        debug!(
            address = %address_hex(address),
            slot_id,
            version,
            "[s4] Entry confirmed"
        );
        Ok(())
    }

    /// All entries, ordered by `(address, slot_id)`. Payloads are omitted.
    pub async fn snapshot(&self) -> S4Result<Vec<SnapshotRow>> {
        let tables = self.shared.tables.read().await;
        self.shared.ensure_running()?;

        let mut rows: Vec<SnapshotRow> = tables
            .records
            .iter()
            .filter_map(|(key, record)| {
                let meta = tables.metadata.get(key)?;
                Some(SnapshotRow {
                    address: key.0,
                    slot_id: key.1,
                    version: record.version,
                    expiration: record.expiration,
                    state: meta.state,
                    payload_size: record.payload.len(),
                })
            })
            .collect();
        rows.sort_by(|a, b| (a.address, a.slot_id).cmp(&(b.address, b.slot_id)));
        Ok(rows)
    }

    /// Entry counts by state.
    pub async fn stats(&self) -> S4Result<StorageStats> {
        let tables = self.shared.tables.read().await;
        self.shared.ensure_running()?;

        let mut stats = StorageStats::default();
        for meta in tables.metadata.values() {
            match meta.state {
                EntryState::New => stats.new += 1,
                EntryState::Confirmed => stats.confirmed += 1,
                EntryState::Expired => stats.expired += 1,
            }
        }
        Ok(stats)
    }
}

#[async_trait]
impl<E, T> S4Storage for InMemoryS4Storage<E, T>
where
    E: Envelope + 'static,
    T: TimeSource + 'static,
{
    fn constraints(&self) -> Constraints {
        self.shared.constraints
    }

    async fn get(&self, address: &Address, slot_id: SlotId) -> S4Result<(Record, Metadata)> {
        check_slot(&self.shared.constraints, slot_id)?;

        let tables = self.shared.tables.read().await;
        self.shared.ensure_running()?;

        let key = (*address, slot_id);
        let (Some(record), Some(metadata)) = (tables.records.get(&key), tables.metadata.get(&key))
        else {
            return Err(S4Error::RecordNotFound);
        };

        let now = self.shared.time_source.now_millis();
        if metadata.state == EntryState::Expired || record.is_expired_at(now) {
            return Err(S4Error::RecordExpired);
        }

        Ok((record.clone(), metadata.clone()))
    }

    async fn put(
        &self,
        address: &Address,
        slot_id: SlotId,
        record: &Record,
        signature: &[u8],
    ) -> S4Result<()> {
        check_slot(&self.shared.constraints, slot_id)?;
        self.shared.ensure_running()?;

        let now = self.shared.time_source.now_millis();
        validate_write(
            &self.shared.constraints,
            &self.shared.envelope,
            now,
            address,
            slot_id,
            record,
            signature,
        )?;

        let mut tables = self.shared.tables.write().await;
        // Re-checked under the lock: `close` flips the state while holding it.
        self.shared.ensure_running()?;

        let key = (*address, slot_id);
        let entry: Entry = resolve_conflict(tables.head(&key), record, signature)?;
        let highest_expiration = entry.highest_expiration;
        let (stored, metadata) = entry.into_parts();

        tables.records.insert(key, stored);
        tables.metadata.insert(key, metadata);
        drop(tables);

        debug!(
            address = %address_hex(address),
            slot_id,
            version = record.version,
            highest_expiration,
            "[s4] Record stored"
        );
        Ok(())
    }
}

impl<E, T> Drop for InMemoryS4Storage<E, T> {
    fn drop(&mut self) {
        if let Some(sweeper) = self.sweeper.get_mut().take() {
            sweeper.handle.abort();
        }
    }
}

/// Background loop: sweep every `period` until shutdown is signalled.
async fn sweep_loop<E, T>(
    shared: Arc<Shared<E, T>>,
    period: Duration,
    mut shutdown_rx: watch::Receiver<bool>,
) where
    E: Envelope,
    T: TimeSource,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        tokio::select! {
            biased;
            changed = shutdown_rx.changed() => {
                if changed.is_err() || *shutdown_rx.borrow() {
                    break;
                }
            }
            _ = ticker.tick() => {
                let expired = shared.sweep_expired().await;
                if expired > 0 {
                    info!(expired, "[s4] Sweep marked entries expired");
                }
            }
        }
    }

    debug!("[s4] Sweep task exited");
}
