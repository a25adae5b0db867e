// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronization engine for appointments.
//!
//! Keeps the appointment list consistent between the local store and the
//! remote service, and folds in push updates from other clients.
//!
//! # Architecture
//!
//! ```text
//!                    ┌──────────────────┐
//!   load/create/ ───►│ SyncCoordinator  │◄─── ReachabilityMonitor
//!   update/delete    │ (authoritative   │         (path changes)
//!                    │   record set)    │
//!                    └──┬───────────┬───┘
//!                       │           │ ▲
//!                       ▼           ▼ │ push events
//!              ┌─────────────┐  ┌─────┴───────────┐
//!              │ RecordStore │  │ RemoteApi +     │
//!              │  (SQLite)   │  │ RealtimeChannel │
//!              └─────────────┘  └─────────────────┘
//! ```
//!
//! # Features
//!
//! - Remote-first mutations with local fallback
//! - Local store kept as a durable mirror
//! - Echo suppression for the client's own creates
//! - Reconciliation of local-only records once the service is back
//! - Push channel with fixed-delay reconnect
//! - Injectable remote and transport traits for testing

mod channel;
mod coordinator;
mod echo;
mod reachability;
mod remote;
mod transport;

pub use channel::{
    push_url, ChannelConfig, ChannelHandler, ChannelState, RealtimeChannel, TransportFactory,
    DEFAULT_RECONNECT_DELAY,
};
pub use coordinator::{
    CoordinatorOptions, SyncCoordinator, SyncFlags, SyncSnapshot, DEFAULT_STORE_SETTLE,
};
pub use echo::{EchoTracker, DEFAULT_ECHO_WINDOW};
pub use reachability::{NetworkPath, ReachabilityMonitor, TcpPathProbe, DEFAULT_POLL_INTERVAL};
pub use remote::{
    HttpRemote, RemoteApi, RemoteError, RemoteResult, DEFAULT_PROBE_TIMEOUT,
    DEFAULT_REQUEST_TIMEOUT,
};
pub use transport::{Frame, Transport, TransportError, TransportResult, WebSocketTransport};

#[cfg(test)]
pub(crate) mod test_helpers;
