// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bk_core::{Record, RecordState};

/// Width of the status column, enough for the longest status.
const STATUS_WIDTH: usize = 9;

fn status_label(state: RecordState) -> &'static str {
    match state {
        RecordState::Scheduled => "booked",
        RecordState::Completed => "completed",
        RecordState::Canceled => "canceled",
    }
}

/// Format a record as a single list line.
///
/// Format: `{id}  {YYYY-MM-DD HH:MM}  {status}  {service} ({owner} with {practitioner})`
pub fn format_record_line(record: &Record) -> String {
    format!(
        "{}  {}  {:<width$}  {} ({} with {})",
        record.id,
        record.occurs_at.format("%Y-%m-%d %H:%M"),
        status_label(record.state),
        record.label,
        record.owner_id,
        record.subject_id,
        width = STATUS_WIDTH,
    )
}

/// Format the full list, one record per line.
pub fn format_record_list(records: &[Record]) -> String {
    if records.is_empty() {
        return "No appointments.".to_string();
    }
    records
        .iter()
        .map(format_record_line)
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format a record with one field per line.
pub fn format_record_details(record: &Record) -> String {
    format!(
        "Appointment {}\n  \
         Service:      {}\n  \
         When:         {}\n  \
         Client:       {}\n  \
         Practitioner: {}\n  \
         Status:       {}",
        record.id,
        record.label,
        record.occurs_at.to_rfc3339(),
        record.owner_id,
        record.subject_id,
        status_label(record.state),
    )
}

#[cfg(test)]
#[path = "display_tests.rs"]
mod tests;
