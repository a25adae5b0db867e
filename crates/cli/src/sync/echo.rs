// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Recognition of push events caused by this client's own creates.
//!
//! A create is announced on the push channel at the same time as its HTTP
//! response comes back, so the event can arrive before or after the client
//! learns the new id. Before: the content fingerprint is still pending.
//! After: the id is in the recently-created window.

use std::collections::HashMap;
use std::time::Duration;

use bk_core::{Fingerprint, Record};
use tokio::time::Instant;

/// Default lifetime of a recently-created id.
pub const DEFAULT_ECHO_WINDOW: Duration = Duration::from_secs(3);

/// Bookkeeping for in-flight and just-finished creates.
#[derive(Debug)]
pub struct EchoTracker {
    window: Duration,
    /// Fingerprints of creates in flight, with multiplicity.
    pending: HashMap<Fingerprint, usize>,
    /// Ids returned by recent creates.
    created: HashMap<String, Instant>,
}

impl EchoTracker {
    pub fn new(window: Duration) -> Self {
        EchoTracker {
            window,
            pending: HashMap::new(),
            created: HashMap::new(),
        }
    }

    /// Marks a create with this content as in flight.
    pub fn register_pending(&mut self, fingerprint: Fingerprint) {
        *self.pending.entry(fingerprint).or_insert(0) += 1;
    }

    /// Marks one in-flight create with this content as finished.
    pub fn release_pending(&mut self, fingerprint: &Fingerprint) {
        if let Some(count) = self.pending.get_mut(fingerprint) {
            *count -= 1;
            if *count == 0 {
                self.pending.remove(fingerprint);
            }
        }
    }

    /// Returns true if a create with this content is in flight.
    pub fn is_pending(&self, fingerprint: &Fingerprint) -> bool {
        self.pending.contains_key(fingerprint)
    }

    /// Remembers an id the server just assigned to one of our creates.
    pub fn remember_created(&mut self, id: impl Into<String>) {
        self.prune();
        self.created.insert(id.into(), Instant::now());
    }

    /// Returns true if the id was created by us within the window.
    pub fn is_recent(&mut self, id: &str) -> bool {
        self.prune();
        self.created.contains_key(id)
    }

    /// Returns true if a pushed record is the echo of one of our creates.
    pub fn is_echo(&mut self, record: &Record) -> bool {
        self.is_recent(&record.id) || self.is_pending(&record.fingerprint())
    }

    /// Drops recently-created entries older than the window.
    pub fn prune(&mut self) {
        let window = self.window;
        self.created.retain(|_, inserted| inserted.elapsed() < window);
    }

    /// Number of live recently-created entries.
    pub fn recent_len(&self) -> usize {
        self.created.len()
    }
}

impl Default for EchoTracker {
    fn default() -> Self {
        Self::new(DEFAULT_ECHO_WINDOW)
    }
}

#[cfg(test)]
#[path = "echo_tests.rs"]
mod tests;
