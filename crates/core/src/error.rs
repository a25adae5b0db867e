// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for bk-core operations.

use thiserror::Error;

/// All possible errors that can occur in bk-core operations.
#[derive(Debug, Error)]
pub enum Error {
    #[error("appointment not found: {0}")]
    NotFound(String),

    #[error("appointment already exists: {0}")]
    Duplicate(String),

    #[error("invalid status: '{0}'\n  hint: valid statuses are: booked, completed, canceled")]
    InvalidState(String),

    #[error("missing field: {0}")]
    MissingField(&'static str),

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("corrupted data: {0}")]
    CorruptedData(String),

    #[error("store error: {0}")]
    Store(String),
}

/// A specialized Result type for bk-core operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
