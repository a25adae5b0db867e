// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]

use super::*;
use bk_core::NewRecord;
use chrono::{TimeZone, Utc};
use yare::parameterized;

fn checkup(state: RecordState) -> Record {
    NewRecord::new(
        "u1",
        "p1",
        "Checkup",
        Utc.with_ymd_and_hms(2026, 3, 1, 9, 30, 0).unwrap(),
    )
    .with_state(state)
    .into_record("a1")
}

#[test]
fn test_format_record_line() {
    assert_eq!(
        format_record_line(&checkup(RecordState::Scheduled)),
        "a1  2026-03-01 09:30  booked     Checkup (u1 with p1)"
    );
}

#[parameterized(
    booked = { RecordState::Scheduled, "booked" },
    completed = { RecordState::Completed, "completed" },
    canceled = { RecordState::Canceled, "canceled" },
)]
fn test_status_column(state: RecordState, label: &str) {
    let line = format_record_line(&checkup(state));
    assert!(line.contains(&format!("  {:<9}  ", label)), "{}", line);
}

#[test]
fn test_empty_list() {
    assert_eq!(format_record_list(&[]), "No appointments.");
}

#[test]
fn test_list_one_line_per_record() {
    let mut later = checkup(RecordState::Scheduled);
    later.id = "a2".to_string();
    let out = format_record_list(&[checkup(RecordState::Completed), later]);
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("a1 "));
    assert!(lines[1].starts_with("a2 "));
}

#[test]
fn test_details() {
    let out = format_record_details(&checkup(RecordState::Canceled));
    assert!(out.starts_with("Appointment a1\n"));
    assert!(out.contains("Service:      Checkup"));
    assert!(out.contains("When:         2026-03-01T09:30:00+00:00"));
    assert!(out.contains("Status:       canceled"));
}
