// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Push-channel protocol frames.
//!
//! The server broadcasts one JSON text frame per successful mutation:
//!
//! ```json
//! {"type": "appointment_created", "appointment": { ... }}
//! {"type": "appointment_updated", "appointment": { ... }}
//! {"type": "appointment_deleted", "appointmentId": "..."}
//! ```
//!
//! Frames are decoded in two steps so that an unrecognized `type` can be
//! reported and dropped instead of failing the whole receive loop.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::record::Record;

/// Frame type for a created appointment.
pub const APPOINTMENT_CREATED: &str = "appointment_created";
/// Frame type for an updated appointment.
pub const APPOINTMENT_UPDATED: &str = "appointment_updated";
/// Frame type for a deleted appointment.
pub const APPOINTMENT_DELETED: &str = "appointment_deleted";

/// Raw push frame as it appears on the wire.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PushFrame {
    /// Discriminator, one of the `APPOINTMENT_*` constants.
    #[serde(rename = "type")]
    pub kind: String,
    /// The affected record for created/updated frames.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appointment: Option<Record>,
    /// The affected id for deleted frames.
    #[serde(
        rename = "appointmentId",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub appointment_id: Option<String>,
}

/// A decoded push event.
#[derive(Debug, Clone, PartialEq)]
pub enum PushEvent {
    /// A record was created on the server.
    Created(Record),
    /// A record was updated on the server.
    Updated(Record),
    /// A record was deleted on the server.
    Deleted(String),
}

/// Outcome of classifying a frame.
#[derive(Debug, Clone, PartialEq)]
pub enum Decoded {
    /// A recognized event.
    Event(PushEvent),
    /// A well-formed frame with a type this client does not handle.
    Unknown(String),
}

impl PushFrame {
    /// Deserializes a frame from JSON.
    pub fn from_json(s: &str) -> Result<Self> {
        Ok(serde_json::from_str(s)?)
    }

    /// Serializes the frame to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Classifies the frame by its `type`.
    ///
    /// Returns an error when a recognized type lacks its payload field.
    pub fn decode(self) -> Result<Decoded> {
        let event = match self.kind.as_str() {
            APPOINTMENT_CREATED => PushEvent::Created(
                self.appointment
                    .ok_or(Error::MissingField("appointment"))?,
            ),
            APPOINTMENT_UPDATED => PushEvent::Updated(
                self.appointment
                    .ok_or(Error::MissingField("appointment"))?,
            ),
            APPOINTMENT_DELETED => PushEvent::Deleted(
                self.appointment_id
                    .ok_or(Error::MissingField("appointmentId"))?,
            ),
            _ => return Ok(Decoded::Unknown(self.kind)),
        };
        Ok(Decoded::Event(event))
    }
}

impl PushEvent {
    /// Creates a Created event.
    pub fn created(record: Record) -> Self {
        PushEvent::Created(record)
    }

    /// Creates an Updated event.
    pub fn updated(record: Record) -> Self {
        PushEvent::Updated(record)
    }

    /// Creates a Deleted event.
    pub fn deleted(id: impl Into<String>) -> Self {
        PushEvent::Deleted(id.into())
    }

    /// Returns the wire frame for this event.
    pub fn to_frame(&self) -> PushFrame {
        match self {
            PushEvent::Created(record) => PushFrame {
                kind: APPOINTMENT_CREATED.to_string(),
                appointment: Some(record.clone()),
                appointment_id: None,
            },
            PushEvent::Updated(record) => PushFrame {
                kind: APPOINTMENT_UPDATED.to_string(),
                appointment: Some(record.clone()),
                appointment_id: None,
            },
            PushEvent::Deleted(id) => PushFrame {
                kind: APPOINTMENT_DELETED.to_string(),
                appointment: None,
                appointment_id: Some(id.clone()),
            },
        }
    }

    /// Serializes the event as a wire frame.
    pub fn to_json(&self) -> Result<String> {
        self.to_frame().to_json()
    }

    /// Parses and classifies a text frame.
    pub fn from_json(s: &str) -> Result<Decoded> {
        PushFrame::from_json(s)?.decode()
    }
}

#[cfg(test)]
#[path = "protocol_tests.rs"]
mod tests;
