// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use bk_core::RecordStore;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::error::Result;
use crate::sync::push_url;

use super::Session;

/// Where the client syncs to and what it holds locally.
#[derive(Debug, Serialize)]
pub struct StatusReport {
    pub base_url: String,
    pub push_url: String,
    pub db_path: PathBuf,
    pub server_available: bool,
    pub local_records: usize,
    pub unsynced_changes: bool,
}

pub async fn run(session: &Session, output: OutputFormat) -> Result<()> {
    let report = run_impl(session).await?;
    match output {
        OutputFormat::Text => {
            println!("Server:   {}", report.base_url);
            println!("Push:     {}", report.push_url);
            println!(
                "          {}",
                if report.server_available {
                    "available"
                } else {
                    "unavailable"
                }
            );
            println!("Store:    {}", report.db_path.display());
            println!("Records:  {}", report.local_records);
            if report.unsynced_changes {
                println!("Changes made offline are waiting to be synced (run `bk sync`).");
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }
    Ok(())
}

/// Gathers the report. Probes the service without changing sync state.
pub(crate) async fn run_impl(session: &Session) -> Result<StatusReport> {
    let server_available = session.remote.probe().await;
    let store = std::sync::Arc::clone(&session.store);
    let local_records = tokio::task::spawn_blocking(move || store.count()).await??;
    Ok(StatusReport {
        base_url: session.config.base_url.clone(),
        push_url: push_url(&session.config.base_url),
        db_path: session.db_path.clone(),
        server_available,
        local_records,
        unsynced_changes: session.has_unsynced_changes(),
    })
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
