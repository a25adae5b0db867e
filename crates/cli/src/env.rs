// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access.
//!
//! All runtime environment variables used by the CLI are defined here
//! with typed accessor functions. The variable name constants are generated
//! by `build.rs` and live in the [`vars`] submodule.

use std::path::PathBuf;

/// Generated environment variable name constants.
pub mod vars {
    include!(concat!(env!("OUT_DIR"), "/env_vars.rs"));
}

/// Returns the value of `BK_BASE_URL` if set and non-empty.
pub fn base_url() -> Option<String> {
    std::env::var(vars::BK_BASE_URL)
        .ok()
        .filter(|v| !v.trim().is_empty())
}

/// Returns the value of `BK_DB_PATH` if set.
pub fn db_path() -> Option<PathBuf> {
    std::env::var(vars::BK_DB_PATH).ok().map(PathBuf::from)
}

/// Returns the value of `BK_STATE_DIR` if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(vars::BK_STATE_DIR).ok().map(PathBuf::from)
}

/// Returns the value of `XDG_STATE_HOME` if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(vars::XDG_STATE_HOME).ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
