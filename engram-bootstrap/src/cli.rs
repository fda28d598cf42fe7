// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Argument Parsing
//!
//! `engram serve` is the primary interface: it starts the MCP stdio
//! transport an assistant talks to. The remaining subcommands are
//! operator tools — provisioning a vault, checking health, and recovering
//! a lost master key — that don't go through MCP.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::logger::LogLevel;

#[derive(Debug, Parser)]
#[command(name = "engram", version, about = "Local-first, end-to-end-encrypted memory and secrets layer for AI assistants")]
pub struct Cli {
    /// Override the local store root (defaults to $ENGRAM_PATH or ~/.engram).
    #[arg(long, global = true)]
    pub engram_path: Option<PathBuf>,

    /// Override the remote sync backend URL.
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    #[arg(long, global = true, value_enum)]
    pub log_level: Option<LogLevel>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Start the MCP stdio server. This is what an assistant's client
    /// config should point at.
    Serve,

    /// Provision a new local vault: generate a master key, write the
    /// SQLite schema, and print a recovery phrase.
    Init {
        /// Split the generated key into an n-of-m Shamir recovery kit
        /// instead of printing a single mnemonic phrase.
        #[arg(long)]
        shamir: Option<String>,
    },

    /// Report whether the vault is initialized and reachable, and basic
    /// counts (memories, secrets, pending sync events).
    Status,

    /// Reconstruct the master key from a mnemonic phrase or a set of
    /// Shamir shares, re-wrapping the vault for this device.
    Recover {
        /// BIP39 mnemonic phrase. Mutually exclusive with `--share`.
        #[arg(long)]
        mnemonic: Option<String>,

        /// A `index:base64data` Shamir share. Repeat for each share; at
        /// least `threshold` are required.
        #[arg(long = "share")]
        shares: Vec<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_serve_with_global_overrides() {
        let cli = Cli::parse_from(["engram", "--api-url", "https://sync.example.com", "serve"]);
        assert_eq!(cli.api_url.as_deref(), Some("https://sync.example.com"));
        assert!(matches!(cli.command, Command::Serve));
    }

    #[test]
    fn parses_recover_with_repeated_shares() {
        let cli = Cli::parse_from(["engram", "recover", "--share", "1:AA==", "--share", "2:BB=="]);
        match cli.command {
            Command::Recover { shares, mnemonic } => {
                assert_eq!(shares, vec!["1:AA==".to_string(), "2:BB==".to_string()]);
                assert!(mnemonic.is_none());
            }
            _ => panic!("expected Recover"),
        }
    }
}
