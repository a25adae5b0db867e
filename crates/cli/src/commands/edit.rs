// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use bk_core::Record;

use crate::cli::OutputFormat;
use crate::display::format_record_details;
use crate::error::{Error, Result};

use super::{parse_state, parse_time, require_field, warn_last_error, Session};

/// Field changes requested on the command line.
#[derive(Debug, Default)]
pub struct RecordChanges<'a> {
    pub owner: Option<&'a str>,
    pub with: Option<&'a str>,
    pub service: Option<&'a str>,
    pub at: Option<&'a str>,
    pub status: Option<&'a str>,
}

impl RecordChanges<'_> {
    fn is_empty(&self) -> bool {
        self.owner.is_none()
            && self.with.is_none()
            && self.service.is_none()
            && self.at.is_none()
            && self.status.is_none()
    }

    /// Applies the changes to a copy of `record`. The identity is kept.
    pub(crate) fn apply(&self, record: &Record) -> Result<Record> {
        if self.is_empty() {
            return Err(Error::NothingToChange);
        }
        let mut updated = record.clone();
        if let Some(owner) = self.owner {
            updated.owner_id = require_field("owner", owner)?;
        }
        if let Some(with) = self.with {
            updated.subject_id = require_field("practitioner", with)?;
        }
        if let Some(service) = self.service {
            updated.label = require_field("service", service)?;
        }
        if let Some(at) = self.at {
            updated.occurs_at = parse_time(at)?;
        }
        if let Some(status) = self.status {
            updated.state = parse_state(status)?;
        }
        Ok(updated)
    }
}

pub async fn run(
    session: &Session,
    id: &str,
    changes: RecordChanges<'_>,
    output: OutputFormat,
) -> Result<()> {
    let record = run_impl(session, id, &changes).await?;
    match output {
        OutputFormat::Text => println!("{}", format_record_details(&record)),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&record)?),
    }
    warn_last_error(session).await;
    Ok(())
}

pub(crate) async fn run_impl(
    session: &Session,
    id: &str,
    changes: &RecordChanges<'_>,
) -> Result<Record> {
    // Validate before touching the network
    if changes.is_empty() {
        return Err(Error::NothingToChange);
    }
    session.coordinator.load().await?;
    let current = session
        .coordinator
        .records()
        .await
        .into_iter()
        .find(|r| r.id == id)
        .ok_or_else(|| Error::NotFound(id.to_string()))?;

    let updated = changes.apply(&current)?;
    session.coordinator.update(updated).await
}

#[cfg(test)]
#[path = "edit_tests.rs"]
mod tests;
