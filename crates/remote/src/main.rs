// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! bk-remote: reference appointment service.
//!
//! Serves the REST API and the push channel that `bk` clients sync with.

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use bk_remote::ServerState;

/// bk-remote: appointment service for booker clients
#[derive(Parser, Debug)]
#[command(name = "bk-remote")]
#[command(about = "REST and push server for booker appointment sync")]
struct Args {
    /// Address to bind the server to
    #[arg(short, long, default_value = "0.0.0.0:8080")]
    bind: SocketAddr,

    /// Directory for database storage (in-memory if omitted)
    #[arg(short, long)]
    data: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting bk-remote server");
    info!("  Bind address: {}", args.bind);

    let state = match &args.data {
        Some(dir) => {
            info!("  Data directory: {}", dir.display());
            std::fs::create_dir_all(dir)?;
            ServerState::open(dir)?
        }
        None => {
            info!("  Data directory: none (in-memory)");
            ServerState::in_memory()?
        }
    };

    bk_remote::run(args.bind, state).await
}
