// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bk-core: Shared library for the booker appointment sync engine
//!
//! This crate provides the record model, the push-channel wire protocol,
//! and the local record store used by both the `bk` client and the
//! `bk-remote` reference server.

pub mod db;
pub mod error;
pub mod protocol;
pub mod record;
pub mod store;

pub use db::SqliteStore;
pub use error::{Error, Result};
pub use protocol::{PushEvent, PushFrame};
pub use record::{Fingerprint, NewRecord, Record, RecordState};
pub use store::{RecordStore, StoreChange};
