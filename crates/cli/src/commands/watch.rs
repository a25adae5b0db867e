// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Long-running mode: keeps the push channel open, follows network path
//! changes, and prints the list whenever it changes.

use std::sync::Arc;

use crate::cli::OutputFormat;
use crate::display::format_record_list;
use crate::error::Result;
use crate::sync::{
    ChannelHandler, RealtimeChannel, ReachabilityMonitor, SyncSnapshot, TcpPathProbe,
};

use super::Session;

pub async fn run(session: &Session, output: OutputFormat) -> Result<()> {
    let coordinator = Arc::clone(&session.coordinator);
    let handler: Arc<dyn ChannelHandler> = Arc::clone(&coordinator) as Arc<dyn ChannelHandler>;
    let channel = Arc::new(RealtimeChannel::new(session.config.channel_config(), handler));

    let probe =
        TcpPathProbe::for_base_url(&session.config.base_url, session.config.reachability_poll())?;
    let (paths, probe_task) = probe.spawn();
    let monitor_task =
        ReachabilityMonitor::new(Arc::clone(&coordinator), Arc::clone(&channel)).spawn(paths);
    let store_task = coordinator.watch_store();

    let mut snapshots = coordinator.subscribe();
    coordinator.load().await?;
    // The channel retries on its own until the server accepts it
    channel.connect().await;
    tracing::info!(url = channel.url(), "watching for changes");

    let mut retry = tokio::time::interval(session.config.reachability_poll());
    retry.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    let mut printed: Option<SyncSnapshot> = None;
    let result = loop {
        let current = snapshots.borrow_and_update().clone();
        if printed.as_ref() != Some(&current) {
            if let Err(e) = print_snapshot(&current, printed.as_ref(), output) {
                break Err(e);
            }
            printed = Some(current);
        }

        tokio::select! {
            changed = snapshots.changed() => {
                if changed.is_err() {
                    break Ok(());
                }
            }
            _ = retry.tick() => {
                retry_pending(session).await;
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupted, shutting down");
                break Ok(());
            }
        }
    };

    channel.disconnect().await;
    probe_task.abort();
    monitor_task.abort();
    store_task.abort();
    result
}

/// Reconciles once the service is back if an earlier call fell back to
/// the local store and the network path has not changed since.
async fn retry_pending(session: &Session) {
    let coordinator = &session.coordinator;
    if !coordinator.server_was_unavailable() || !coordinator.is_reachable() {
        return;
    }
    if coordinator.probe_service().await {
        if let Err(e) = coordinator.reconcile().await {
            tracing::warn!("retrying sync failed: {}", e);
        }
    }
}

fn print_snapshot(
    current: &SyncSnapshot,
    previous: Option<&SyncSnapshot>,
    output: OutputFormat,
) -> Result<()> {
    match output {
        OutputFormat::Json => println!("{}", serde_json::to_string(current)?),
        OutputFormat::Text => {
            let records_changed = previous.is_none_or(|p| p.records != current.records);
            if records_changed {
                println!("{}\n", format_record_list(&current.records));
            }
            let error_changed = previous.is_none_or(|p| p.last_error != current.last_error);
            if error_changed {
                if let Some(error) = &current.last_error {
                    eprintln!("warning: {}", error);
                }
            }
        }
    }
    Ok(())
}
