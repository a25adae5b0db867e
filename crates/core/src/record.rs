// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Core record types for the booker sync engine.
//!
//! A [`Record`] is one scheduled appointment. Its serde representation is
//! the wire format of the remote service (`userID`, `practitionerID`,
//! `service`, `date`, `status`), so the same type is used for REST bodies,
//! push frames, and local rows.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

/// Lifecycle state of an appointment.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RecordState {
    /// Booked and upcoming. Initial state for new records.
    #[default]
    #[serde(rename = "Booked")]
    Scheduled,
    /// Took place.
    Completed,
    /// Called off before it took place.
    Canceled,
}

impl RecordState {
    /// Returns the string representation used on the wire and in storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            RecordState::Scheduled => "Booked",
            RecordState::Completed => "Completed",
            RecordState::Canceled => "Canceled",
        }
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RecordState {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "booked" | "scheduled" => Ok(RecordState::Scheduled),
            "completed" => Ok(RecordState::Completed),
            "canceled" | "cancelled" => Ok(RecordState::Canceled),
            _ => Err(Error::InvalidState(s.to_string())),
        }
    }
}

/// Content hash of a record without its identity.
///
/// Two records with the same owner, subject, label, time and state share a
/// fingerprint. Used to recognize a create echoed back before its id is known.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Fingerprint(String);

impl Fingerprint {
    fn compute(
        owner_id: &str,
        subject_id: &str,
        label: &str,
        occurs_at: &DateTime<Utc>,
        state: RecordState,
    ) -> Self {
        let mut hasher = Sha256::new();
        for part in [
            owner_id,
            subject_id,
            label,
            &occurs_at.to_rfc3339_opts(SecondsFormat::Nanos, true),
            state.as_str(),
        ] {
            hasher.update(part.as_bytes());
            // Unit separator keeps ("ab", "c") distinct from ("a", "bc")
            hasher.update([0x1f]);
        }
        Fingerprint(hex::encode(hasher.finalize()))
    }

    /// Returns the hex digest.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An appointment, the unit of synchronization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Unique identifier, assigned by the server or generated locally.
    pub id: String,
    /// The client the appointment belongs to.
    #[serde(rename = "userID")]
    pub owner_id: String,
    /// The practitioner the appointment is with.
    #[serde(rename = "practitionerID")]
    pub subject_id: String,
    /// The booked service.
    #[serde(rename = "service")]
    pub label: String,
    /// When the appointment takes place.
    #[serde(rename = "date")]
    pub occurs_at: DateTime<Utc>,
    /// Current lifecycle state.
    #[serde(rename = "status")]
    pub state: RecordState,
}

impl Record {
    /// Returns the content fingerprint of this record.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            &self.owner_id,
            &self.subject_id,
            &self.label,
            &self.occurs_at,
            self.state,
        )
    }

    /// Returns the record's content without its identity.
    pub fn draft(&self) -> NewRecord {
        NewRecord {
            owner_id: self.owner_id.clone(),
            subject_id: self.subject_id.clone(),
            label: self.label.clone(),
            occurs_at: self.occurs_at,
            state: self.state,
        }
    }
}

/// A record that has not been assigned an identity yet.
///
/// This is the body of `POST /appointments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(rename = "userID")]
    pub owner_id: String,
    #[serde(rename = "practitionerID")]
    pub subject_id: String,
    #[serde(rename = "service")]
    pub label: String,
    #[serde(rename = "date")]
    pub occurs_at: DateTime<Utc>,
    #[serde(rename = "status", default)]
    pub state: RecordState,
}

impl NewRecord {
    /// Creates a new draft in the [`RecordState::Scheduled`] state.
    pub fn new(
        owner_id: impl Into<String>,
        subject_id: impl Into<String>,
        label: impl Into<String>,
        occurs_at: DateTime<Utc>,
    ) -> Self {
        NewRecord {
            owner_id: owner_id.into(),
            subject_id: subject_id.into(),
            label: label.into(),
            occurs_at,
            state: RecordState::Scheduled,
        }
    }

    /// Sets the initial state.
    pub fn with_state(mut self, state: RecordState) -> Self {
        self.state = state;
        self
    }

    /// Returns the content fingerprint the created record will have.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::compute(
            &self.owner_id,
            &self.subject_id,
            &self.label,
            &self.occurs_at,
            self.state,
        )
    }

    /// Assigns an identity, producing a full record.
    pub fn into_record(self, id: impl Into<String>) -> Record {
        Record {
            id: id.into(),
            owner_id: self.owner_id,
            subject_id: self.subject_id,
            label: self.label,
            occurs_at: self.occurs_at,
            state: self.state,
        }
    }
}

/// Sorts records by `occurs_at` ascending.
///
/// The sort is stable, so records at the same instant keep their order.
pub fn sort_records(records: &mut [Record]) {
    records.sort_by(|a, b| a.occurs_at.cmp(&b.occurs_at));
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
