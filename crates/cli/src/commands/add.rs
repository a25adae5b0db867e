// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bk_core::{NewRecord, Record, RecordState};

use crate::cli::OutputFormat;
use crate::display::format_record_details;
use crate::error::{Error, Result};

use super::{parse_state, parse_time, require_field, warn_last_error, Session};

pub async fn run(
    session: &Session,
    owner: &str,
    with: &str,
    service: &str,
    at: &str,
    status: Option<&str>,
    output: OutputFormat,
) -> Result<()> {
    let draft = build_draft(owner, with, service, at, status)?;
    let record = run_impl(session, draft).await?;
    match output {
        OutputFormat::Text => println!("{}", format_record_details(&record)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    warn_last_error(session).await;
    Ok(())
}

/// Validates command-line input into a draft.
pub(crate) fn build_draft(
    owner: &str,
    with: &str,
    service: &str,
    at: &str,
    status: Option<&str>,
) -> Result<NewRecord> {
    let owner = require_field("owner", owner)?;
    let with = require_field("practitioner", with)?;
    let service = require_field("service", service)?;
    let occurs_at = parse_time(at)?;
    let state = match status {
        Some(status) => parse_state(status)?,
        None => RecordState::default(),
    };
    Ok(NewRecord::new(owner, with, service, occurs_at).with_state(state))
}

pub(crate) async fn run_impl(session: &Session, draft: NewRecord) -> Result<Record> {
    session
        .coordinator
        .create(draft)
        .await?
        .ok_or_else(|| Error::Task("another create is still in progress".to_string()))
}

#[cfg(test)]
#[path = "add_tests.rs"]
mod tests;
