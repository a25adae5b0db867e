// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The synchronization engine.
//!
//! [`SyncCoordinator`] owns the authoritative in-memory list of
//! appointments. Every read and mutation decides between the remote
//! service and the local store, the local store is kept as a durable
//! mirror of whatever is authoritative, and push events from the realtime
//! channel are folded in with echoes of our own creates filtered out.
//!
//! # Routing
//!
//! ```text
//! network down ───────────────────────────► local store
//! probe fails  ── mark unavailable ───────► local store
//! probe ok     ── reconcile if unavailable ► remote ──(failure)──► local store
//! ```
//!
//! # Concurrency
//!
//! Operation bodies (load, reconcile, create, update, delete and the push
//! appliers) run one at a time under an operation lock, so none of them
//! works from a remote or store read another one has already invalidated.
//! The in-memory set sits behind its own mutex that is only held for short
//! sections, never across remote or store I/O, so observers are never
//! blocked by a slow call. Re-entrancy guards (`is_loading`,
//! `is_creating`, `is_syncing`) are checked before the operation lock and
//! short-circuit a concurrent duplicate call instead of queueing it.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use bk_core::record::sort_records;
use bk_core::{NewRecord, Record, RecordStore};
use futures_util::future::BoxFuture;
use serde::Serialize;
use tokio::sync::{broadcast, watch, Mutex};
use tokio::task::JoinHandle;

use super::channel::ChannelHandler;
use super::echo::{EchoTracker, DEFAULT_ECHO_WINDOW};
use super::remote::{RemoteApi, RemoteError, RemoteResult};
use crate::error::Result;

/// Default time own-write suppression outlives the write itself.
pub const DEFAULT_STORE_SETTLE: Duration = Duration::from_millis(250);

/// Tunables for the coordinator.
#[derive(Debug, Clone)]
pub struct CoordinatorOptions {
    /// How long an id returned by our own create counts as an echo.
    pub echo_window: Duration,
    /// How long store change notifications are ignored after our writes.
    pub store_settle: Duration,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        CoordinatorOptions {
            echo_window: DEFAULT_ECHO_WINDOW,
            store_settle: DEFAULT_STORE_SETTLE,
        }
    }
}

/// Availability and re-entrancy flags, as last observed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncFlags {
    pub reachable: bool,
    pub server_was_unavailable: bool,
    pub is_loading: bool,
    pub is_creating: bool,
    pub is_syncing: bool,
    pub has_synced_once: bool,
    pub has_loaded_once: bool,
}

/// Observable state of the coordinator.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SyncSnapshot {
    /// The authoritative set, sorted by time.
    pub records: Vec<Record>,
    /// User-facing text of the last failure, until cleared.
    pub last_error: Option<String>,
    pub flags: SyncFlags,
}

#[derive(Debug)]
struct Flags {
    reachable: AtomicBool,
    server_was_unavailable: AtomicBool,
    is_loading: AtomicBool,
    is_creating: AtomicBool,
    is_syncing: AtomicBool,
    has_synced_once: AtomicBool,
    has_loaded_once: AtomicBool,
}

impl Flags {
    fn new() -> Self {
        Flags {
            // Assume a usable network until told otherwise
            reachable: AtomicBool::new(true),
            server_was_unavailable: AtomicBool::new(false),
            is_loading: AtomicBool::new(false),
            is_creating: AtomicBool::new(false),
            is_syncing: AtomicBool::new(false),
            has_synced_once: AtomicBool::new(false),
            has_loaded_once: AtomicBool::new(false),
        }
    }

    fn observe(&self) -> SyncFlags {
        SyncFlags {
            reachable: self.reachable.load(Ordering::Acquire),
            server_was_unavailable: self.server_was_unavailable.load(Ordering::Acquire),
            is_loading: self.is_loading.load(Ordering::Acquire),
            is_creating: self.is_creating.load(Ordering::Acquire),
            is_syncing: self.is_syncing.load(Ordering::Acquire),
            has_synced_once: self.has_synced_once.load(Ordering::Acquire),
            has_loaded_once: self.has_loaded_once.load(Ordering::Acquire),
        }
    }
}

/// Holds a re-entrancy flag for the lifetime of an operation.
struct FlagGuard<'a>(&'a AtomicBool);

impl<'a> FlagGuard<'a> {
    /// Sets the flag, or returns `None` if it was already set.
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(FlagGuard(flag))
        }
    }
}

impl Drop for FlagGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Marks the coordinator's own store writes for the change listener.
///
/// The mark stays up for the settle delay after the guard drops, so that
/// notifications delivered late are still recognized.
struct QuietWrites {
    depth: Arc<AtomicUsize>,
    settle: Duration,
}

impl QuietWrites {
    fn hold(depth: &Arc<AtomicUsize>, settle: Duration) -> Self {
        depth.fetch_add(1, Ordering::AcqRel);
        QuietWrites {
            depth: Arc::clone(depth),
            settle,
        }
    }
}

impl Drop for QuietWrites {
    fn drop(&mut self) {
        let depth = Arc::clone(&self.depth);
        match tokio::runtime::Handle::try_current() {
            Ok(handle) if !self.settle.is_zero() => {
                let settle = self.settle;
                handle.spawn(async move {
                    tokio::time::sleep(settle).await;
                    depth.fetch_sub(1, Ordering::AcqRel);
                });
            }
            _ => {
                depth.fetch_sub(1, Ordering::AcqRel);
            }
        }
    }
}

#[derive(Debug, Default)]
struct State {
    records: Vec<Record>,
    last_error: Option<String>,
}

enum Route {
    Remote,
    Local,
}

/// Keeps the appointment list consistent between memory, the local store
/// and the remote service.
pub struct SyncCoordinator {
    remote: Arc<dyn RemoteApi>,
    store: Arc<dyn RecordStore>,
    /// Serializes operation bodies. Held across remote and store I/O.
    ops: Mutex<()>,
    state: Mutex<State>,
    echo: Mutex<EchoTracker>,
    flags: Flags,
    quiet: Arc<AtomicUsize>,
    store_settle: Duration,
    snapshots: watch::Sender<SyncSnapshot>,
}

impl SyncCoordinator {
    pub fn new(
        remote: Arc<dyn RemoteApi>,
        store: Arc<dyn RecordStore>,
        options: CoordinatorOptions,
    ) -> Self {
        let flags = Flags::new();
        let (snapshots, _) = watch::channel(SyncSnapshot {
            flags: flags.observe(),
            ..SyncSnapshot::default()
        });
        SyncCoordinator {
            remote,
            store,
            ops: Mutex::new(()),
            state: Mutex::new(State::default()),
            echo: Mutex::new(EchoTracker::new(options.echo_window)),
            flags,
            quiet: Arc::new(AtomicUsize::new(0)),
            store_settle: options.store_settle,
            snapshots,
        }
    }

    // ---- observation -------------------------------------------------

    /// Current records, error and flags.
    pub async fn snapshot(&self) -> SyncSnapshot {
        let state = self.state.lock().await;
        self.build_snapshot(&state)
    }

    /// The authoritative set, sorted by time.
    pub async fn records(&self) -> Vec<Record> {
        self.state.lock().await.records.clone()
    }

    /// User-facing text of the last failure.
    pub async fn last_error(&self) -> Option<String> {
        self.state.lock().await.last_error.clone()
    }

    /// Receives a new snapshot after every change of the set or the error.
    pub fn subscribe(&self) -> watch::Receiver<SyncSnapshot> {
        self.snapshots.subscribe()
    }

    pub async fn clear_error(&self) {
        let mut state = self.state.lock().await;
        state.last_error = None;
        self.publish(&state);
    }

    pub fn flags(&self) -> SyncFlags {
        self.flags.observe()
    }

    pub fn has_loaded_once(&self) -> bool {
        self.flags.has_loaded_once.load(Ordering::Acquire)
    }

    pub fn server_was_unavailable(&self) -> bool {
        self.flags.server_was_unavailable.load(Ordering::Acquire)
    }

    /// Records that the service could not be used, so the next successful
    /// probe reconciles local-only records first.
    pub fn mark_unavailable(&self) {
        if !self.flags.server_was_unavailable.swap(true, Ordering::AcqRel) {
            tracing::info!("service marked unavailable");
        }
    }

    /// Network-layer reachability, reported by the reachability monitor.
    pub fn set_reachable(&self, reachable: bool) {
        self.flags.reachable.store(reachable, Ordering::Release);
    }

    pub fn is_reachable(&self) -> bool {
        self.flags.reachable.load(Ordering::Acquire)
    }

    /// Live availability check of the service.
    pub async fn probe_service(&self) -> bool {
        let available = self.remote.probe().await;
        if !available {
            self.mark_unavailable();
        }
        available
    }

    // ---- operations --------------------------------------------------

    /// Loads the authoritative set.
    ///
    /// Mirrors the remote set into the local store, or falls back to the
    /// local store if the service cannot be used. Pushes local records to
    /// an empty server once per session (bootstrap sync).
    pub async fn load(&self) -> Result<()> {
        let Some(_loading) = FlagGuard::acquire(&self.flags.is_loading) else {
            tracing::debug!("load already in flight");
            return Ok(());
        };
        let _op = self.ops.lock().await;

        let result = self.load_inner().await;
        self.flags.has_loaded_once.store(true, Ordering::Release);
        self.publish_current().await;
        result
    }

    async fn load_inner(&self) -> Result<()> {
        if !self.is_reachable() {
            tracing::debug!("network unreachable, loading from local store");
            return self.load_local().await;
        }

        if !self.remote.probe().await {
            self.remote_failed(&RemoteError::Unreachable("probe failed".into()), true)
                .await;
            return self.load_local().await;
        }

        // Local-only records from earlier in this session must not be
        // mirrored away
        if self.server_was_unavailable() {
            return self.reconcile_locked().await;
        }

        let remote = match self.remote.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                self.remote_failed(&e, true).await;
                return self.load_local().await;
            }
        };

        if remote.is_empty()
            && !self.flags.has_synced_once.load(Ordering::Acquire)
            && !self.flags.is_syncing.load(Ordering::Acquire)
        {
            let local_count = self.read_store(|store| store.count()).await?;
            if local_count > 0 {
                return self.bootstrap().await;
            }
        }

        self.mirror(remote, Vec::new()).await
    }

    /// Pushes every local record to an empty server under a new identity.
    async fn bootstrap(&self) -> Result<()> {
        let Some(_syncing) = FlagGuard::acquire(&self.flags.is_syncing) else {
            return Ok(());
        };
        self.flags.has_synced_once.store(true, Ordering::Release);

        let local = self.read_store(|store| store.all()).await?;
        tracing::info!(count = local.len(), "bootstrapping empty server");
        let kept = self.push_local_only(local).await?;

        match self.remote.fetch_all().await {
            Ok(remote) => self.mirror(remote, kept).await,
            Err(e) => {
                self.remote_failed(&e, true).await;
                self.load_local().await
            }
        }
    }

    /// Pushes local-only records to the server and reloads from it.
    ///
    /// A record whose create fails stays in the local store and in the
    /// set. The service stays marked unavailable so a later call retries.
    pub async fn reconcile(&self) -> Result<()> {
        let Some(_syncing) = FlagGuard::acquire(&self.flags.is_syncing) else {
            tracing::debug!("reconciliation already in flight");
            return Ok(());
        };
        let _op = self.ops.lock().await;
        self.run_reconcile().await
    }

    /// Reconciles from inside an operation that holds the operation lock.
    async fn reconcile_locked(&self) -> Result<()> {
        let Some(_syncing) = FlagGuard::acquire(&self.flags.is_syncing) else {
            tracing::debug!("reconciliation already in flight");
            return Ok(());
        };
        self.run_reconcile().await
    }

    async fn run_reconcile(&self) -> Result<()> {
        let result = self.reconcile_inner().await;
        self.publish_current().await;
        result
    }

    async fn reconcile_inner(&self) -> Result<()> {
        let remote = match self.remote.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                self.remote_failed(&e, true).await;
                return self.load_local().await;
            }
        };

        let remote_ids: HashSet<&str> = remote.iter().map(|r| r.id.as_str()).collect();
        let local = self.read_store(|store| store.all()).await?;
        let local_only: Vec<Record> = local
            .into_iter()
            .filter(|r| !remote_ids.contains(r.id.as_str()))
            .collect();

        if local_only.is_empty() {
            self.mirror(remote, Vec::new()).await?;
            self.flags
                .server_was_unavailable
                .store(false, Ordering::Release);
            return Ok(());
        }

        tracing::info!(count = local_only.len(), "reconciling local-only records");
        let kept = self.push_local_only(local_only).await?;

        let fresh = match self.remote.fetch_all().await {
            Ok(records) => records,
            Err(e) => {
                self.remote_failed(&e, true).await;
                return self.load_local().await;
            }
        };

        let clean = kept.is_empty();
        self.mirror(fresh, kept).await?;
        if clean {
            self.flags
                .server_was_unavailable
                .store(false, Ordering::Release);
            tracing::info!("reconciliation complete");
        }
        Ok(())
    }

    /// Creates each record remotely and swaps the local row for the
    /// server copy. Stops at the first failure and returns the rows that
    /// were not pushed.
    async fn push_local_only(&self, rows: Vec<Record>) -> Result<Vec<Record>> {
        let mut rows = rows.into_iter();
        let mut kept = Vec::new();

        while let Some(row) = rows.next() {
            let draft = row.draft();
            match self.create_tracked(&draft).await {
                Ok(created) => {
                    tracing::debug!(old = %row.id, new = %created.id, "pushed local record");
                    let stale = row.id.clone();
                    let fresh = created.clone();
                    self.write_store(move |store| {
                        match store.delete(&stale) {
                            Ok(()) | Err(bk_core::Error::NotFound(_)) => {}
                            Err(e) => return Err(e),
                        }
                        store.upsert(&fresh)
                    })
                    .await?;

                    let mut state = self.state.lock().await;
                    state.records.retain(|r| r.id != row.id);
                    upsert_sorted(&mut state.records, created);
                    self.publish(&state);
                }
                Err(e) => {
                    tracing::warn!(id = %row.id, "failed to push local record: {}", e);
                    self.remote_failed(&e, true).await;
                    kept.push(row);
                    break;
                }
            }
        }

        kept.extend(rows);
        Ok(kept)
    }

    /// Creates an appointment.
    ///
    /// Returns `Ok(None)` if another create is in flight.
    pub async fn create(&self, draft: NewRecord) -> Result<Option<Record>> {
        let Some(_creating) = FlagGuard::acquire(&self.flags.is_creating) else {
            tracing::debug!("create already in flight, dropping");
            return Ok(None);
        };
        let _op = self.ops.lock().await;

        let record = match self.route().await {
            Route::Remote => match self.create_tracked(&draft).await {
                Ok(created) => {
                    self.store_upsert(created.clone()).await?;
                    self.merge(created.clone()).await;
                    created
                }
                Err(e) => {
                    self.remote_failed(&e, true).await;
                    self.create_local(draft).await?
                }
            },
            Route::Local => self.create_local(draft).await?,
        };

        Ok(Some(record))
    }

    /// Remote create with echo bookkeeping around the call.
    async fn create_tracked(&self, draft: &NewRecord) -> RemoteResult<Record> {
        let fingerprint = draft.fingerprint();
        self.echo.lock().await.register_pending(fingerprint.clone());

        let result = self.remote.create(draft).await;

        let mut echo = self.echo.lock().await;
        if let Ok(created) = &result {
            echo.remember_created(created.id.clone());
        }
        echo.release_pending(&fingerprint);
        result
    }

    async fn create_local(&self, draft: NewRecord) -> Result<Record> {
        let record = draft.into_record(uuid::Uuid::new_v4().to_string());
        tracing::info!(id = %record.id, "created appointment locally");

        let row = record.clone();
        self.write_store(move |store| store.insert(&row)).await?;
        self.merge(record.clone()).await;
        self.mark_unavailable();
        Ok(record)
    }

    /// Updates an appointment by identity.
    pub async fn update(&self, record: Record) -> Result<Record> {
        let _op = self.ops.lock().await;
        match self.route().await {
            Route::Remote => match self.remote.update(&record).await {
                Ok(updated) => {
                    self.store_upsert(updated.clone()).await?;
                    self.merge(updated.clone()).await;
                    Ok(updated)
                }
                Err(e) => {
                    self.remote_failed(&e, false).await;
                    self.update_local(record).await
                }
            },
            Route::Local => self.update_local(record).await,
        }
    }

    async fn update_local(&self, record: Record) -> Result<Record> {
        let row = record.clone();
        if let Err(e) = self.write_store(move |store| store.update(&row)).await {
            self.set_error(e.to_string()).await;
            return Err(e);
        }
        self.merge(record.clone()).await;
        Ok(record)
    }

    /// Deletes an appointment by identity.
    pub async fn delete(&self, id: &str) -> Result<()> {
        let _op = self.ops.lock().await;
        match self.route().await {
            Route::Remote => match self.remote.delete(id).await {
                Ok(()) => {
                    self.store_delete_quietly(id.to_string()).await?;
                    self.remove(id).await;
                    Ok(())
                }
                Err(e) => {
                    self.remote_failed(&e, false).await;
                    self.delete_local(id).await
                }
            },
            Route::Local => self.delete_local(id).await,
        }
    }

    async fn delete_local(&self, id: &str) -> Result<()> {
        let owned = id.to_string();
        if let Err(e) = self.write_store(move |store| store.delete(&owned)).await {
            self.set_error(e.to_string()).await;
            return Err(e);
        }
        self.remove(id).await;
        Ok(())
    }

    /// Decides where a mutation goes. The caller holds the operation lock.
    async fn route(&self) -> Route {
        if !self.is_reachable() {
            tracing::debug!("network unreachable, routing to local store");
            return Route::Local;
        }

        if !self.remote.probe().await {
            tracing::info!("service probe failed, routing to local store");
            self.mark_unavailable();
            self.set_error(RemoteError::Unreachable("probe failed".into()).user_message())
                .await;
            return Route::Local;
        }

        if self.server_was_unavailable() {
            if let Err(e) = self.reconcile_locked().await {
                tracing::warn!("reconciliation before mutation failed: {}", e);
            }
        }
        Route::Remote
    }

    // ---- push events -------------------------------------------------

    /// Folds in a record created by some client.
    ///
    /// Echoes of our own creates and records already present are dropped.
    /// A pending create is recognized without waiting for the operation
    /// lock its create holds.
    pub async fn apply_created(&self, record: Record) -> Result<()> {
        if self.echo.lock().await.is_echo(&record) {
            tracing::debug!(id = %record.id, "dropping echo of own create");
            return Ok(());
        }
        let _op = self.ops.lock().await;
        // A create that finished while we waited has merged its record
        if self.state.lock().await.records.iter().any(|r| r.id == record.id) {
            tracing::debug!(id = %record.id, "dropping create for known record");
            return Ok(());
        }

        self.store_upsert(record.clone()).await?;
        self.merge(record).await;
        Ok(())
    }

    /// Folds in an updated record. Last write wins.
    pub async fn apply_updated(&self, record: Record) -> Result<()> {
        let _op = self.ops.lock().await;
        self.store_upsert(record.clone()).await?;
        self.merge(record).await;
        Ok(())
    }

    /// Removes a deleted record. Unknown ids are ignored.
    pub async fn apply_deleted(&self, id: &str) -> Result<()> {
        let _op = self.ops.lock().await;
        self.store_delete_quietly(id.to_string()).await?;
        self.remove(id).await;
        Ok(())
    }

    // ---- store change feed -------------------------------------------

    /// Reloads from the local store after an external change.
    ///
    /// Ignored while our own writes are settling.
    pub async fn on_store_change(&self) -> Result<()> {
        if self.quiet.load(Ordering::Acquire) > 0 {
            tracing::trace!("ignoring store change from own write");
            return Ok(());
        }
        tracing::debug!("local store changed externally, reloading");
        let _op = self.ops.lock().await;
        self.load_local().await
    }

    /// Spawns a task that follows the store's change feed.
    pub fn watch_store(self: &Arc<Self>) -> JoinHandle<()> {
        let mut changes = self.store.subscribe();
        let coordinator = Arc::clone(self);
        tokio::spawn(async move {
            loop {
                match changes.recv().await {
                    Ok(_) | Err(broadcast::error::RecvError::Lagged(_)) => {
                        if let Err(e) = coordinator.on_store_change().await {
                            tracing::warn!("reload after store change failed: {}", e);
                        }
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        })
    }

    // ---- helpers -----------------------------------------------------

    async fn load_local(&self) -> Result<()> {
        let records = self.read_store(|store| store.all()).await?;
        let mut state = self.state.lock().await;
        state.records = records;
        self.publish(&state);
        Ok(())
    }

    /// Makes the store and the set equal to `remote` plus `kept`.
    async fn mirror(&self, remote: Vec<Record>, kept: Vec<Record>) -> Result<()> {
        let mut records = remote;
        let known: HashSet<String> = records.iter().map(|r| r.id.clone()).collect();
        records.extend(kept.into_iter().filter(|r| !known.contains(&r.id)));
        sort_records(&mut records);

        let rows = records.clone();
        self.write_store(move |store| store.replace_all(&rows)).await?;

        let mut state = self.state.lock().await;
        state.records = records;
        self.publish(&state);
        Ok(())
    }

    async fn merge(&self, record: Record) {
        let mut state = self.state.lock().await;
        upsert_sorted(&mut state.records, record);
        self.publish(&state);
    }

    async fn remove(&self, id: &str) {
        let mut state = self.state.lock().await;
        let before = state.records.len();
        state.records.retain(|r| r.id != id);
        if state.records.len() != before {
            self.publish(&state);
        }
    }

    async fn store_upsert(&self, record: Record) -> Result<()> {
        self.write_store(move |store| store.upsert(&record)).await
    }

    /// Deletes a row, treating an absent row as already deleted.
    async fn store_delete_quietly(&self, id: String) -> Result<()> {
        self.write_store(move |store| match store.delete(&id) {
            Ok(()) | Err(bk_core::Error::NotFound(_)) => Ok(()),
            Err(e) => Err(e),
        })
        .await
    }

    async fn read_store<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore) -> bk_core::Result<T> + Send + 'static,
    {
        let store = Arc::clone(&self.store);
        let result = tokio::task::spawn_blocking(move || f(store.as_ref())).await?;
        Ok(result?)
    }

    async fn write_store<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&dyn RecordStore) -> bk_core::Result<T> + Send + 'static,
    {
        let _quiet = QuietWrites::hold(&self.quiet, self.store_settle);
        self.read_store(f).await
    }

    async fn remote_failed(&self, error: &RemoteError, always_mark: bool) {
        tracing::warn!("remote call failed: {}", error);
        if always_mark || error.is_outage() {
            self.mark_unavailable();
        }
        self.set_error(error.user_message()).await;
    }

    async fn set_error(&self, message: String) {
        let mut state = self.state.lock().await;
        state.last_error = Some(message);
        self.publish(&state);
    }

    async fn publish_current(&self) {
        let state = self.state.lock().await;
        self.publish(&state);
    }

    fn publish(&self, state: &State) {
        self.snapshots.send_replace(self.build_snapshot(state));
    }

    fn build_snapshot(&self, state: &State) -> SyncSnapshot {
        SyncSnapshot {
            records: state.records.clone(),
            last_error: state.last_error.clone(),
            flags: self.flags.observe(),
        }
    }
}

/// Replaces the record with the same id, or inserts it, keeping time order.
fn upsert_sorted(records: &mut Vec<Record>, record: Record) {
    match records.iter_mut().find(|r| r.id == record.id) {
        Some(existing) => *existing = record,
        None => records.push(record),
    }
    sort_records(records);
}

impl ChannelHandler for SyncCoordinator {
    fn on_connected(&self) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            tracing::info!("receiving push updates");
        })
    }

    fn on_created(&self, record: Record) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.apply_created(record).await {
                tracing::warn!("failed to apply pushed create: {}", e);
                self.set_error(e.to_string()).await;
            }
        })
    }

    fn on_updated(&self, record: Record) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.apply_updated(record).await {
                tracing::warn!("failed to apply pushed update: {}", e);
                self.set_error(e.to_string()).await;
            }
        })
    }

    fn on_deleted(&self, id: String) -> BoxFuture<'_, ()> {
        Box::pin(async move {
            if let Err(e) = self.apply_deleted(&id).await {
                tracing::warn!("failed to apply pushed delete: {}", e);
                self.set_error(e.to_string()).await;
            }
        })
    }
}

#[cfg(test)]
#[path = "coordinator_tests.rs"]
mod tests;
