// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::commands::tests::test_session;
use crate::sync::test_helpers::{record_at, Call, MockRemote};
use crate::sync::RemoteError;
use bk_core::RecordStore;
use tempfile::TempDir;

#[tokio::test]
async fn pushes_local_only_records() {
    let temp = TempDir::new().unwrap();
    let remote = MockRemote::with_records(vec![record_at("a1", "Server", 9)]);
    let session = test_session(&remote, temp.path());
    session.store.insert(&record_at("local-1", "Offline", 10)).unwrap();

    let report = run_impl(&session).await.unwrap();
    assert_eq!(report.records, 2);
    assert!(!report.pending);
    assert!(report.error.is_none());
    assert_eq!(remote.count(Call::Create), 1);
    assert!(!session.store.contains("local-1").unwrap());
}

#[tokio::test]
async fn failed_sync_reports_pending() {
    let temp = TempDir::new().unwrap();
    let remote = MockRemote::new();
    remote.fail(Call::FetchAll, RemoteError::Unreachable("down".into()));
    let session = test_session(&remote, temp.path());
    session.store.insert(&record_at("local-1", "Offline", 10)).unwrap();

    let report = run_impl(&session).await.unwrap();
    assert_eq!(report.records, 1);
    assert!(report.pending);
    assert!(report.error.is_some());
}
