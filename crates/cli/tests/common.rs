// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

// Allow unused items: test helpers are shared across multiple test binaries,
// and not every test file uses every helper.
#![allow(dead_code)]
#![allow(unused_imports)]
#![allow(clippy::unwrap_used)]

use std::net::TcpListener;
use std::path::Path;

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;

pub use predicates::prelude::*;
pub use tempfile::TempDir;

/// An http URL on which nothing listens.
pub fn closed_url() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}", addr)
}

/// `bk` isolated in `home`, talking to `base_url`.
pub fn bk(home: &Path, base_url: &str) -> Command {
    let mut cmd = cargo_bin_cmd!("bk");
    cmd.arg("--config")
        .arg(home.join("config.toml"))
        .env("BK_STATE_DIR", home.join("state"))
        .env("BK_BASE_URL", base_url)
        .env_remove("BK_DB_PATH")
        .env_remove("RUST_LOG");
    cmd
}

/// Runs `bk add` and returns its stdout.
pub fn add(home: &Path, base_url: &str, service: &str, at: &str) -> String {
    let output = bk(home, base_url)
        .args(["add", "--owner", "u1", "--with", "p1", "--service", service, "--at", at])
        .output()
        .unwrap();
    assert!(output.status.success(), "{:?}", output);
    String::from_utf8(output.stdout).unwrap()
}
