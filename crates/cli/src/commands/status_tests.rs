// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::tests::test_session;
use crate::sync::test_helpers::{record_at, Call, MockRemote};
use tempfile::TempDir;

#[tokio::test]
async fn reports_store_and_service() {
    let temp = TempDir::new().unwrap();
    let remote = MockRemote::new();
    let session = test_session(&remote, temp.path());
    session.store.insert(&record_at("a1", "Checkup", 9)).unwrap();

    let report = run_impl(&session).await.unwrap();
    assert_eq!(report.base_url, "http://127.0.0.1:8080");
    assert_eq!(report.push_url, "ws://127.0.0.1:8080");
    assert_eq!(report.db_path, temp.path().join("appointments.db"));
    assert!(report.server_available);
    assert_eq!(report.local_records, 1);
    assert!(!report.unsynced_changes);
}

#[tokio::test]
async fn failed_probe_does_not_mark_unsynced() {
    let temp = TempDir::new().unwrap();
    let remote = MockRemote::new();
    remote.set_probe(false);
    let session = test_session(&remote, temp.path());

    let report = run_impl(&session).await.unwrap();
    assert!(!report.server_available);
    assert!(!report.unsynced_changes);
    assert_eq!(remote.calls(), vec![Call::Probe]);
}
