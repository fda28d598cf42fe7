// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! `engram` binary entry point: parses CLI arguments, resolves
//! configuration, installs logging, and dispatches to the matching
//! presentation-layer handler.

use clap::Parser;
use engram::presentation::cli;
use engram_bootstrap::{AppConfig, Cli, Command};

#[tokio::main]
async fn main() -> std::process::ExitCode {
    let cli = Cli::parse();

    let config = AppConfig::from_env()
        .with_engram_path(cli.engram_path.clone())
        .with_api_url(cli.api_url.clone())
        .with_log_level(cli.log_level);

    engram_bootstrap::init_tracing(config.log_level);

    let result = match &cli.command {
        Command::Serve => cli::serve(&config).await,
        Command::Init { shamir } => cli::init(&config, shamir.as_deref()).await,
        Command::Status => cli::status(&config).await,
        Command::Recover { mnemonic, shares } => cli::recover(&config, mnemonic.as_deref(), shares).await,
    };

    engram_bootstrap::result_to_exit_code(result)
}
