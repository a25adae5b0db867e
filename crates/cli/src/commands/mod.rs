// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

pub mod add;
pub mod edit;
pub mod list;
pub mod rm;
pub mod status;
pub mod sync;
pub mod watch;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use bk_core::{RecordState, RecordStore, SqliteStore};
use chrono::{DateTime, Utc};

use crate::config::{default_config_path, state_dir, Config};
use crate::error::{Error, Result};
use crate::sync::{HttpRemote, RemoteApi, SyncCoordinator};

/// Records that this device may hold appointments the server has not seen.
///
/// The flag survives the process so the next session reconciles instead of
/// mirroring the server over the local store.
#[derive(Debug, Clone)]
pub struct UnsyncedMarker {
    path: PathBuf,
}

impl UnsyncedMarker {
    /// The marker belonging to the store at `db_path`.
    pub fn for_store(db_path: &Path) -> Self {
        let mut name = db_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".unsynced");
        UnsyncedMarker {
            path: db_path.with_file_name(name),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_set(&self) -> bool {
        self.path.exists()
    }

    pub fn set(&self) -> Result<()> {
        fs::write(&self.path, b"")?;
        Ok(())
    }

    pub fn clear(&self) -> Result<()> {
        match fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Everything a command needs: configuration, the local store, the remote
/// client and the coordinator tying them together.
pub struct Session {
    pub config: Config,
    pub db_path: PathBuf,
    pub store: Arc<SqliteStore>,
    pub remote: Arc<dyn RemoteApi>,
    pub coordinator: Arc<SyncCoordinator>,
    marker: UnsyncedMarker,
}

impl Session {
    /// Opens a session from the config file (or the default location).
    pub fn open(config_path: Option<&Path>) -> Result<Self> {
        let config_path = config_path
            .map(Path::to_path_buf)
            .unwrap_or_else(default_config_path);
        let config = Config::load(&config_path)?.with_env_overrides()?;
        let db_path = config.db_path_in(&state_dir());
        let remote = Arc::new(HttpRemote::with_timeouts(
            config.base_url.clone(),
            config.request_timeout(),
            config.probe_timeout(),
        ));
        Self::with_remote(config, db_path, remote)
    }

    /// Opens a session over the given remote.
    ///
    /// Failing to open the local store is fatal for the session.
    pub fn with_remote(
        config: Config,
        db_path: PathBuf,
        remote: Arc<dyn RemoteApi>,
    ) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let store = Arc::new(SqliteStore::open(&db_path)?);
        tracing::debug!(path = %db_path.display(), "opened local store");

        let coordinator = Arc::new(SyncCoordinator::new(
            Arc::clone(&remote),
            Arc::clone(&store) as Arc<dyn RecordStore>,
            config.coordinator_options(),
        ));

        let marker = UnsyncedMarker::for_store(&db_path);
        if marker.is_set() {
            tracing::info!("local changes from an earlier session are not synced yet");
            coordinator.mark_unavailable();
        }

        Ok(Session {
            config,
            db_path,
            store,
            remote,
            coordinator,
            marker,
        })
    }

    /// Whether local-only changes may still be waiting for the server.
    pub fn has_unsynced_changes(&self) -> bool {
        self.coordinator.server_was_unavailable()
    }

    /// Persists whether local-only changes are pending for the next session.
    pub fn finish(&self) -> Result<()> {
        if self.coordinator.server_was_unavailable() {
            self.marker.set()
        } else {
            self.marker.clear()
        }
    }
}

/// Parse an RFC 3339 timestamp.
pub fn parse_time(value: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(value.trim())
        .map(|t| t.with_timezone(&Utc))
        .map_err(|_| Error::InvalidDate(value.to_string()))
}

/// Parse a status name.
pub fn parse_state(value: &str) -> Result<RecordState> {
    Ok(value.trim().parse::<RecordState>()?)
}

/// Trim a field value, rejecting empty ones.
pub fn require_field(field: &'static str, value: &str) -> Result<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::FieldEmpty { field });
    }
    Ok(trimmed.to_string())
}

/// Print any error the coordinator recorded as a warning.
pub(crate) async fn warn_last_error(session: &Session) {
    if let Some(error) = session.coordinator.last_error().await {
        eprintln!("warning: {}", error);
    }
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
