// Copyright 2025-present Harīṣh Tummalachērla
// SPDX-License-Identifier: Apache-2.0

//! CLI definitions for the uatrie command-line interface.
//!
//! Two subcommands: `inspect` to examine a catalogue container, and
//! `detect` to run a user-agent through it and dump the matched nodes
//! with their diagnostics.

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "uatrie",
    about = "Device catalogue inspection and user-agent detection",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a catalogue file's header and section layout
    Inspect {
        /// Path to the catalogue file
        file: String,
    },

    /// Match a user-agent against a catalogue
    Detect {
        /// Path to the catalogue file
        file: String,

        /// The user-agent string to match
        #[arg(long)]
        ua: String,

        /// Emit the detection as JSON instead of the readable dump
        #[arg(long)]
        json: bool,
    },
}
