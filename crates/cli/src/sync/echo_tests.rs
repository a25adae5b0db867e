// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use crate::sync::test_helpers::draft_at;

#[test]
fn pending_fingerprint_marks_echo() {
    let mut tracker = EchoTracker::default();
    let draft = draft_at("Checkup", 9);
    tracker.register_pending(draft.fingerprint());

    let pushed = draft.clone().into_record("srv-1");
    assert!(tracker.is_echo(&pushed));

    tracker.release_pending(&draft.fingerprint());
    assert!(!tracker.is_echo(&pushed));
}

#[test]
fn pending_counts_multiplicity() {
    let mut tracker = EchoTracker::default();
    let fp = draft_at("Checkup", 9).fingerprint();
    tracker.register_pending(fp.clone());
    tracker.register_pending(fp.clone());

    tracker.release_pending(&fp);
    assert!(tracker.is_pending(&fp));
    tracker.release_pending(&fp);
    assert!(!tracker.is_pending(&fp));
}

#[test]
fn release_of_unknown_fingerprint_is_noop() {
    let mut tracker = EchoTracker::default();
    tracker.release_pending(&draft_at("Checkup", 9).fingerprint());
    assert!(!tracker.is_pending(&draft_at("Checkup", 9).fingerprint()));
}

#[test]
fn different_content_is_not_echo() {
    let mut tracker = EchoTracker::default();
    tracker.register_pending(draft_at("Checkup", 9).fingerprint());
    let other = draft_at("Cleaning", 9).into_record("srv-2");
    assert!(!tracker.is_echo(&other));
}

#[tokio::test(start_paused = true)]
async fn recent_id_expires_after_window() {
    let mut tracker = EchoTracker::new(Duration::from_secs(3));
    tracker.remember_created("srv-1");
    let pushed = draft_at("Checkup", 9).into_record("srv-1");
    assert!(tracker.is_echo(&pushed));

    tokio::time::advance(Duration::from_millis(2999)).await;
    assert!(tracker.is_recent("srv-1"));

    tokio::time::advance(Duration::from_millis(1)).await;
    assert!(!tracker.is_recent("srv-1"));
    assert_eq!(tracker.recent_len(), 0);
}

#[tokio::test(start_paused = true)]
async fn remembering_prunes_expired_entries() {
    let mut tracker = EchoTracker::new(Duration::from_secs(1));
    tracker.remember_created("old");
    tokio::time::advance(Duration::from_secs(2)).await;
    tracker.remember_created("new");
    assert_eq!(tracker.recent_len(), 1);
}
