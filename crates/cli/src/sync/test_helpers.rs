// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync module tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use bk_core::record::sort_records;
use bk_core::{NewRecord, Record, RecordStore, SqliteStore};
use chrono::{TimeZone, Utc};
use futures_util::future::BoxFuture;
use tokio::sync::{mpsc, Notify};

use super::coordinator::{CoordinatorOptions, SyncCoordinator};
use super::remote::{RemoteApi, RemoteError, RemoteResult};

/// A draft for 2026-03-01 at the given hour.
pub fn draft_at(label: &str, hour: u32) -> NewRecord {
    NewRecord::new(
        "user-1",
        "practitioner-1",
        label,
        Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
    )
}

/// A full record for 2026-03-01 at the given hour.
pub fn record_at(id: &str, label: &str, hour: u32) -> Record {
    draft_at(label, hour).into_record(id)
}

/// Serves a router on an ephemeral local port.
pub async fn spawn_router(router: axum::Router) -> SocketAddr {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    addr
}

/// An http URL on which nothing listens.
pub async fn closed_port_url() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// A running reference server backed by an in-memory store.
pub struct TestServer {
    addr: SocketAddr,
}

impl TestServer {
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

pub async fn spawn_reference_server() -> TestServer {
    let state = bk_remote::ServerState::in_memory().unwrap();
    let addr = spawn_router(bk_remote::router(state)).await;
    TestServer { addr }
}

/// Remote operation kinds, for call logs and failure scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Call {
    Probe,
    FetchAll,
    Create,
    Update,
    Delete,
}

/// In-memory stand-in for the remote service.
///
/// Failures are scripted per operation and persist until cleared.
#[derive(Default)]
pub struct MockRemote {
    records: Mutex<Vec<Record>>,
    calls: Mutex<Vec<Call>>,
    failures: Mutex<HashMap<Call, RemoteError>>,
    probe_down: AtomicBool,
    next_id: AtomicUsize,
    /// Creates to store but answer with a transport failure.
    lost_responses: AtomicUsize,
    /// When set, creates report the stored record here and wait for
    /// `release` before answering.
    gate: Mutex<Option<(mpsc::UnboundedSender<Record>, Arc<Notify>)>>,
    /// One-shot: the next fetch reads its records, signals here, and waits
    /// for `release` before answering with what it read.
    fetch_gate: Mutex<Option<(mpsc::UnboundedSender<()>, Arc<Notify>)>>,
}

impl MockRemote {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_records(records: Vec<Record>) -> Arc<Self> {
        let remote = Self::default();
        *remote.records.lock().unwrap() = records;
        Arc::new(remote)
    }

    pub fn set_probe(&self, up: bool) {
        self.probe_down.store(!up, Ordering::SeqCst);
    }

    pub fn fail(&self, call: Call, error: RemoteError) {
        self.failures.lock().unwrap().insert(call, error);
    }

    pub fn heal(&self) {
        self.failures.lock().unwrap().clear();
        self.set_probe(true);
    }

    /// The next `n` creates succeed server-side but lose their response.
    pub fn lose_create_responses(&self, n: usize) {
        self.lost_responses.store(n, Ordering::SeqCst);
    }

    /// Holds creates after storing them until the returned notify fires.
    pub fn gate_creates(&self) -> (mpsc::UnboundedReceiver<Record>, Arc<Notify>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let release = Arc::new(Notify::new());
        *self.gate.lock().unwrap() = Some((tx, Arc::clone(&release)));
        (rx, release)
    }

    /// Holds the next fetch after it has read the records.
    pub fn gate_next_fetch(&self) -> (mpsc::UnboundedReceiver<()>, Arc<Notify>) {
        let (tx, rx) = mpsc::unbounded_channel();
        let release = Arc::new(Notify::new());
        *self.fetch_gate.lock().unwrap() = Some((tx, Arc::clone(&release)));
        (rx, release)
    }

    pub fn records(&self) -> Vec<Record> {
        let mut records = self.records.lock().unwrap().clone();
        sort_records(&mut records);
        records
    }

    /// Inserts a record as if another client had created it.
    pub fn insert(&self, record: Record) {
        self.records.lock().unwrap().push(record);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, call: Call) -> usize {
        self.calls().iter().filter(|c| **c == call).count()
    }

    pub fn reset_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn enter(&self, call: Call) -> RemoteResult<()> {
        self.calls.lock().unwrap().push(call);
        match self.failures.lock().unwrap().get(&call) {
            Some(error) => Err(error.clone()),
            None => Ok(()),
        }
    }
}

impl RemoteApi for MockRemote {
    fn probe(&self) -> BoxFuture<'_, bool> {
        Box::pin(async move {
            self.calls.lock().unwrap().push(Call::Probe);
            !self.probe_down.load(Ordering::SeqCst)
        })
    }

    fn fetch_all(&self) -> BoxFuture<'_, RemoteResult<Vec<Record>>> {
        Box::pin(async move {
            self.enter(Call::FetchAll)?;
            let records = self.records();
            let gate = self.fetch_gate.lock().unwrap().take();
            if let Some((tx, release)) = gate {
                let _ = tx.send(());
                release.notified().await;
            }
            Ok(records)
        })
    }

    fn create<'a>(&'a self, draft: &'a NewRecord) -> BoxFuture<'a, RemoteResult<Record>> {
        Box::pin(async move {
            self.enter(Call::Create)?;
            let n = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
            let record = draft.clone().into_record(format!("srv-{}", n));
            self.records.lock().unwrap().push(record.clone());

            let gate = self.gate.lock().unwrap().clone();
            if let Some((tx, release)) = gate {
                let _ = tx.send(record.clone());
                release.notified().await;
            }

            let lost = self
                .lost_responses
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if lost {
                return Err(RemoteError::Unreachable("response lost".into()));
            }
            Ok(record)
        })
    }

    fn update<'a>(&'a self, record: &'a Record) -> BoxFuture<'a, RemoteResult<Record>> {
        Box::pin(async move {
            self.enter(Call::Update)?;
            let mut records = self.records.lock().unwrap();
            match records.iter_mut().find(|r| r.id == record.id) {
                Some(existing) => {
                    *existing = record.clone();
                    Ok(record.clone())
                }
                None => Err(RemoteError::HttpStatus(404)),
            }
        })
    }

    fn delete<'a>(&'a self, id: &'a str) -> BoxFuture<'a, RemoteResult<()>> {
        Box::pin(async move {
            self.enter(Call::Delete)?;
            let mut records = self.records.lock().unwrap();
            let before = records.len();
            records.retain(|r| r.id != id);
            if records.len() == before {
                return Err(RemoteError::HttpStatus(404));
            }
            Ok(())
        })
    }
}

/// Options with a short settle delay so tests do not wait long.
pub fn test_options() -> CoordinatorOptions {
    CoordinatorOptions {
        echo_window: Duration::from_secs(3),
        store_settle: Duration::from_millis(20),
    }
}

/// A coordinator over the given remote and a fresh in-memory store.
pub fn coordinator_with(
    remote: &Arc<MockRemote>,
) -> (Arc<SyncCoordinator>, Arc<SqliteStore>) {
    let store = Arc::new(SqliteStore::open_in_memory().unwrap());
    let coordinator = coordinator_over(remote, &store);
    (coordinator, store)
}

/// A coordinator over the given remote and store.
pub fn coordinator_over(
    remote: &Arc<MockRemote>,
    store: &Arc<SqliteStore>,
) -> Arc<SyncCoordinator> {
    let remote: Arc<dyn RemoteApi> = Arc::clone(remote) as Arc<dyn RemoteApi>;
    let store: Arc<dyn RecordStore> = Arc::clone(store) as Arc<dyn RecordStore>;
    Arc::new(SyncCoordinator::new(remote, store, test_options()))
}

/// Ids of records, in order.
pub fn ids(records: &[Record]) -> Vec<String> {
    records.iter().map(|r| r.id.clone()).collect()
}
