// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bk_core::Record;

use crate::cli::OutputFormat;
use crate::display::format_record_list;
use crate::error::Result;

use super::{warn_last_error, Session};

pub async fn run(session: &Session, output: OutputFormat) -> Result<()> {
    let records = run_impl(session).await?;
    match output {
        OutputFormat::Text => println!("{}", format_record_list(&records)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&records)?),
    }
    warn_last_error(session).await;
    Ok(())
}

/// Loads the authoritative set, from the server when it can be used.
pub(crate) async fn run_impl(session: &Session) -> Result<Vec<Record>> {
    session.coordinator.load().await?;
    Ok(session.coordinator.records().await)
}

#[cfg(test)]
#[path = "list_tests.rs"]
mod tests;
