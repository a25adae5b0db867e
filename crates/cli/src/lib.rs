// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bkrs - Offline-capable appointment client library.
//!
//! This crate provides the synchronization engine behind the `bk` CLI. It
//! keeps appointments consistent between a local SQLite store and a remote
//! REST service, and folds in push updates from other clients.
//!
//! # Main Components
//!
//! - [`sync::SyncCoordinator`] - Owns the authoritative set and routes every
//!   read and mutation to the server or the local store
//! - [`sync::HttpRemote`] - REST client for the appointment service
//! - [`sync::RealtimeChannel`] - Push channel with fixed-delay reconnect
//! - [`sync::ReachabilityMonitor`] - Turns network path changes into recovery
//! - [`Config`] - Client configuration (`config.toml`)
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use bkrs::sync::{HttpRemote, SyncCoordinator, CoordinatorOptions};
//!
//! let store = Arc::new(bk_core::SqliteStore::open(&db_path)?);
//! let remote = Arc::new(HttpRemote::new("http://127.0.0.1:8080"));
//! let coordinator = SyncCoordinator::new(remote, store, CoordinatorOptions::default());
//! coordinator.load().await?;
//! ```

mod cli;
mod commands;
mod display;

pub mod config;
pub mod env;
pub mod error;
pub mod sync;

pub use cli::{Cli, Command, OutputFormat};
pub use commands::edit::RecordChanges;
pub use commands::{Session, UnsyncedMarker};
pub use config::Config;
pub use error::{Error, Result};

/// Runs a parsed command line.
pub async fn run(cli: Cli) -> Result<()> {
    let session = Session::open(cli.config.as_deref())?;
    let result = dispatch(&session, cli.command).await;
    if let Err(e) = session.finish() {
        tracing::warn!("failed to record sync state: {}", e);
    }
    result
}

async fn dispatch(session: &Session, command: Command) -> Result<()> {
    match command {
        Command::List { output } => commands::list::run(session, output).await,
        Command::Add {
            owner,
            with,
            service,
            at,
            status,
            output,
        } => {
            commands::add::run(
                session,
                &owner,
                &with,
                &service,
                &at,
                status.as_deref(),
                output,
            )
            .await
        }
        Command::Edit {
            id,
            owner,
            with,
            service,
            at,
            status,
            output,
        } => {
            let changes = RecordChanges {
                owner: owner.as_deref(),
                with: with.as_deref(),
                service: service.as_deref(),
                at: at.as_deref(),
                status: status.as_deref(),
            };
            commands::edit::run(session, &id, changes, output).await
        }
        Command::Rm { id } => commands::rm::run(session, &id).await,
        Command::Sync { output } => commands::sync::run(session, output).await,
        Command::Watch { output } => commands::watch::run(session, output).await,
        Command::Status { output } => commands::status::run(session, output).await,
    }
}
