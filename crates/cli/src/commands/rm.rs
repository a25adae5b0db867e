// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use crate::error::Result;

use super::{warn_last_error, Session};

pub async fn run(session: &Session, id: &str) -> Result<()> {
    session.coordinator.delete(id).await?;
    println!("Deleted {}", id);
    warn_last_error(session).await;
    Ok(())
}

#[cfg(test)]
#[path = "rm_tests.rs"]
mod tests;
