// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The local record store seen by the sync engine.
//!
//! A store offers CRUD by identifier plus a change-notification feed. The
//! engine treats it as a durable mirror of whatever state is authoritative.

use tokio::sync::broadcast;

use crate::error::Result;
use crate::record::Record;

/// A change made to the store, delivered to subscribers after the write.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreChange {
    /// A record was inserted or updated.
    Upserted(String),
    /// A record was removed.
    Deleted(String),
    /// The whole content was replaced.
    Replaced,
}

/// Durable CRUD-by-identifier storage for records.
///
/// Implementations are blocking; async callers should run them on a
/// blocking thread.
pub trait RecordStore: Send + Sync {
    /// Returns all records sorted by `occurs_at` ascending.
    fn all(&self) -> Result<Vec<Record>>;

    /// Returns the record with the given id.
    ///
    /// Fails with [`crate::Error::NotFound`] if absent.
    fn get(&self, id: &str) -> Result<Record>;

    /// Returns true if a record with the given id exists.
    fn contains(&self, id: &str) -> Result<bool>;

    /// Inserts a new record.
    ///
    /// Fails with [`crate::Error::Duplicate`] if the id is taken.
    fn insert(&self, record: &Record) -> Result<()>;

    /// Updates an existing record in place.
    ///
    /// Fails with [`crate::Error::NotFound`] if absent.
    fn update(&self, record: &Record) -> Result<()>;

    /// Inserts or replaces a record.
    fn upsert(&self, record: &Record) -> Result<()>;

    /// Deletes a record.
    ///
    /// Fails with [`crate::Error::NotFound`] if absent.
    fn delete(&self, id: &str) -> Result<()>;

    /// Makes the store content exactly `records`.
    fn replace_all(&self, records: &[Record]) -> Result<()>;

    /// Returns the number of stored records.
    fn count(&self) -> Result<usize>;

    /// Subscribes to the change feed.
    fn subscribe(&self) -> broadcast::Receiver<StoreChange>;
}
