// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;

use super::Session;

/// Outcome of an explicit sync.
#[derive(Debug, Serialize)]
pub struct SyncReport {
    pub records: usize,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub async fn run(session: &Session, output: OutputFormat) -> Result<()> {
    let report = run_impl(session).await?;
    match output {
        OutputFormat::Text => match &report.error {
            None => println!("Synced {} appointment(s).", report.records),
            Some(error) => println!(
                "{}\n{} appointment(s) stored on this device.",
                error, report.records
            ),
        },
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Pushes local-only records and reloads the set from the server.
pub(crate) async fn run_impl(session: &Session) -> Result<SyncReport> {
    session.coordinator.clear_error().await;
    session.coordinator.reconcile().await?;
    let snapshot = session.coordinator.snapshot().await;
    Ok(SyncReport {
        records: snapshot.records.len(),
        pending: snapshot.flags.server_was_unavailable,
        error: snapshot.last_error,
    })
}

#[cfg(test)]
#[path = "sync_tests.rs"]
mod tests;
