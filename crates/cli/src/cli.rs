// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands supporting structured output.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

const QUICKSTART_HELP: &str = "\
Get started:
  bk list                                   List appointments
  bk add --owner u1 --with p1 \\
         --service Checkup --at 2026-03-01T09:00:00Z
  bk edit <id> --status completed           Mark an appointment completed
  bk watch                                  Follow changes live";

#[derive(Parser)]
#[command(name = "bk", version)]
#[command(about = "Offline-capable appointment client that keeps a local store in sync")]
#[command(after_help = QUICKSTART_HELP)]
pub struct Cli {
    /// Path to config.toml (default: user config directory)
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Log sync activity to stderr (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// List appointments, syncing with the server when it is available
    List {
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Book a new appointment
    #[command(after_help = "Examples:\n  \
        bk add --owner u1 --with p1 --service Checkup --at 2026-03-01T09:00:00Z\n  \
        bk add --owner u1 --with p1 --service Follow-up --at 2026-03-08T10:30:00+01:00 -o json")]
    Add {
        /// Client the appointment belongs to
        #[arg(long)]
        owner: String,

        /// Practitioner the appointment is with
        #[arg(long = "with", value_name = "PRACTITIONER")]
        with: String,

        /// Booked service
        #[arg(long)]
        service: String,

        /// When the appointment takes place (RFC 3339)
        #[arg(long)]
        at: String,

        /// Initial status (booked, completed, canceled)
        #[arg(long)]
        status: Option<String>,

        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Change an appointment's properties
    #[command(after_help = "Examples:\n  \
        bk edit 3f2a... --status canceled\n  \
        bk edit 3f2a... --at 2026-03-02T14:00:00Z --service Checkup")]
    Edit {
        /// Appointment ID
        id: String,

        #[arg(long)]
        owner: Option<String>,

        #[arg(long = "with", value_name = "PRACTITIONER")]
        with: Option<String>,

        #[arg(long)]
        service: Option<String>,

        /// New time (RFC 3339)
        #[arg(long)]
        at: Option<String>,

        /// New status (booked, completed, canceled)
        #[arg(long)]
        status: Option<String>,

        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Delete an appointment
    Rm {
        /// Appointment ID
        id: String,
    },

    /// Push appointments created offline and reload from the server
    Sync {
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Stay connected and print the list whenever it changes
    Watch {
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },

    /// Show server availability and local store details
    Status {
        #[arg(long = "output", short = 'o', value_enum, default_value_t)]
        output: OutputFormat,
    },
}

#[cfg(test)]
#[path = "cli_tests.rs"]
mod tests;
