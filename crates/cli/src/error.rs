// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use thiserror::Error;

use crate::sync::RemoteError;

/// All possible errors that can occur in the bkrs library.
///
/// Errors provide user-friendly messages with hints for common issues.
#[derive(Debug, Error)]
pub enum Error {
    #[error("appointment not found: {0}")]
    NotFound(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: booked, completed, canceled")]
    InvalidState(String),

    #[error("invalid date: '{0}'\n  hint: use RFC 3339, e.g. 2026-03-01T09:30:00Z")]
    InvalidDate(String),

    #[error("{field} cannot be empty")]
    FieldEmpty { field: &'static str },

    #[error("nothing to change\n  hint: pass at least one of --owner, --with, --service, --at, --status")]
    NothingToChange,

    #[error("local store error: {0}")]
    Store(bk_core::Error),

    #[error("{}", .0.user_message())]
    Remote(#[from] RemoteError),

    #[error("config error: {0}")]
    Config(String),

    #[error("background task failed: {0}")]
    Task(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for bkrs operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<bk_core::Error> for Error {
    fn from(e: bk_core::Error) -> Self {
        match e {
            bk_core::Error::NotFound(id) => Error::NotFound(id),
            bk_core::Error::InvalidState(s) => Error::InvalidState(s),
            bk_core::Error::Io(e) => Error::Io(e),
            other => Error::Store(other),
        }
    }
}

impl From<tokio::task::JoinError> for Error {
    fn from(e: tokio::task::JoinError) -> Self {
        Error::Task(e.to_string())
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
