// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bk-remote: reference appointment service for the booker sync engine.
//!
//! Serves the REST endpoints over the core SQLite store and broadcasts a
//! push frame to every websocket client after each successful mutation.

mod server;
mod state;

pub use server::{router, run, serve, ApiError};
pub use state::ServerState;
