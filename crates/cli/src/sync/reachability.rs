// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Network path monitoring.
//!
//! The monitor turns network-layer transitions into recovery actions on
//! the coordinator and the push channel. It only triggers; all state
//! lives in the coordinator.
//!
//! [`TcpPathProbe`] connects to the service's own host and port, so it
//! cannot tell the network path apart from the service by connecting
//! alone. A refused connection means the host answered and counts as a
//! satisfied path; the monitor's live probe then finds the service down.
//! Only timeouts and routing or resolution failures read as an
//! unsatisfied path.

use std::sync::Arc;
use std::time::Duration;

use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::channel::RealtimeChannel;
use super::coordinator::SyncCoordinator;
use crate::error::{Error, Result};

/// Default interval between path checks.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Whether the network can currently route to the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NetworkPath {
    Satisfied,
    Unsatisfied,
}

/// Reacts to network path transitions.
pub struct ReachabilityMonitor {
    coordinator: Arc<SyncCoordinator>,
    channel: Arc<RealtimeChannel>,
    last: Option<NetworkPath>,
}

impl ReachabilityMonitor {
    pub fn new(coordinator: Arc<SyncCoordinator>, channel: Arc<RealtimeChannel>) -> Self {
        ReachabilityMonitor {
            coordinator,
            channel,
            last: None,
        }
    }

    /// Handles one path observation. Repeats of the last path are ignored.
    pub async fn handle(&mut self, path: NetworkPath) {
        if self.last == Some(path) {
            return;
        }
        self.last = Some(path);
        tracing::info!(?path, "network path changed");

        match path {
            NetworkPath::Satisfied => {
                self.coordinator.set_reachable(true);
                // The path says nothing about the service itself
                if !self.coordinator.probe_service().await {
                    tracing::info!("network is back but the service is not");
                    return;
                }
                self.channel.connect().await;

                let result = if self.coordinator.has_loaded_once() {
                    self.coordinator.reconcile().await
                } else {
                    self.coordinator.load().await
                };
                if let Err(e) = result {
                    tracing::warn!("recovery after network change failed: {}", e);
                }
            }
            NetworkPath::Unsatisfied => {
                self.coordinator.set_reachable(false);
                self.channel.disconnect().await;
            }
        }
    }

    /// Consumes path observations until the sender goes away.
    pub fn spawn(mut self, mut paths: mpsc::Receiver<NetworkPath>) -> JoinHandle<()> {
        tokio::spawn(async move {
            while let Some(path) = paths.recv().await {
                self.handle(path).await;
            }
        })
    }
}

/// Path source that polls a TCP connect to the service host.
///
/// A stopped service on a reachable host reports [`NetworkPath::Satisfied`].
#[derive(Debug, Clone)]
pub struct TcpPathProbe {
    host: String,
    port: u16,
    interval: Duration,
    timeout: Duration,
}

impl TcpPathProbe {
    /// Builds a probe for the host and port of a REST base URL.
    pub fn for_base_url(base_url: &str, interval: Duration) -> Result<Self> {
        let url = reqwest::Url::parse(base_url)
            .map_err(|e| Error::Config(format!("invalid base_url '{}': {}", base_url, e)))?;
        let host = url
            .host_str()
            .ok_or_else(|| Error::Config(format!("base_url '{}' has no host", base_url)))?
            .to_string();
        let port = url
            .port_or_known_default()
            .ok_or_else(|| Error::Config(format!("base_url '{}' has no port", base_url)))?;

        Ok(TcpPathProbe {
            host,
            port,
            interval,
            timeout: Duration::from_secs(2),
        })
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Checks the path once.
    pub async fn check(&self) -> NetworkPath {
        let connect = TcpStream::connect((self.host.as_str(), self.port));
        match tokio::time::timeout(self.timeout, connect).await {
            Ok(Ok(_)) => NetworkPath::Satisfied,
            // The host answered; whether the service is up is the live probe's call
            Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                NetworkPath::Satisfied
            }
            Ok(Err(e)) => {
                tracing::debug!(host = %self.host, port = self.port, "path check failed: {}", e);
                NetworkPath::Unsatisfied
            }
            Err(_) => NetworkPath::Unsatisfied,
        }
    }

    /// Polls in the background and sends each change of path.
    ///
    /// The first observation is always sent.
    pub fn spawn(self) -> (mpsc::Receiver<NetworkPath>, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(8);
        let handle = tokio::spawn(async move {
            let mut last = None;
            loop {
                let path = self.check().await;
                if last != Some(path) {
                    last = Some(path);
                    if tx.send(path).await.is_err() {
                        break;
                    }
                }
                tokio::time::sleep(self.interval).await;
            }
        });
        (rx, handle)
    }
}

#[cfg(test)]
#[path = "reachability_tests.rs"]
mod tests;
