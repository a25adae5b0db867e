// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Server state management.
//!
//! Wraps the canonical store and the push broadcast for shared access.

use std::path::Path;
use std::sync::Arc;

use bk_core::{NewRecord, PushEvent, Record, RecordStore, Result, SqliteStore};
use tokio::sync::broadcast;

/// Shared server state containing the canonical store.
#[derive(Clone)]
pub struct ServerState {
    inner: Arc<ServerStateInner>,
}

struct ServerStateInner {
    /// The canonical store.
    store: SqliteStore,
    /// Broadcast channel for notifying clients of mutations.
    broadcast_tx: broadcast::Sender<PushEvent>,
}

impl ServerState {
    /// Opens the store in the given data directory.
    pub fn open(data_dir: &Path) -> Result<Self> {
        let store = SqliteStore::open(&data_dir.join("appointments.db"))?;
        Ok(Self::with_store(store))
    }

    /// Creates a state backed by an in-memory store.
    pub fn in_memory() -> Result<Self> {
        Ok(Self::with_store(SqliteStore::open_in_memory()?))
    }

    fn with_store(store: SqliteStore) -> Self {
        let (broadcast_tx, _) = broadcast::channel(1024);
        ServerState {
            inner: Arc::new(ServerStateInner {
                store,
                broadcast_tx,
            }),
        }
    }

    /// Subscribes to push events.
    pub fn subscribe(&self) -> broadcast::Receiver<PushEvent> {
        self.inner.broadcast_tx.subscribe()
    }

    /// Number of connected push clients.
    pub fn client_count(&self) -> usize {
        self.inner.broadcast_tx.receiver_count()
    }

    pub fn list(&self) -> Result<Vec<Record>> {
        self.inner.store.all()
    }

    /// Stores a draft under a fresh id and announces it.
    pub fn create(&self, draft: NewRecord) -> Result<Record> {
        let record = draft.into_record(uuid::Uuid::new_v4().to_string());
        self.inner.store.insert(&record)?;
        self.broadcast(PushEvent::created(record.clone()));
        Ok(record)
    }

    /// Replaces the record with the given id and announces it.
    pub fn update(&self, id: &str, mut record: Record) -> Result<Record> {
        // The path is authoritative for identity
        record.id = id.to_string();
        self.inner.store.update(&record)?;
        self.broadcast(PushEvent::updated(record.clone()));
        Ok(record)
    }

    /// Removes the record with the given id and announces it.
    pub fn delete(&self, id: &str) -> Result<()> {
        self.inner.store.delete(id)?;
        self.broadcast(PushEvent::deleted(id));
        Ok(())
    }

    fn broadcast(&self, event: PushEvent) {
        // No receivers is fine
        let _ = self.inner.broadcast_tx.send(event);
    }
}
