// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap
//!
//! Sits outside the domain/application/infrastructure layers and owns
//! everything a binary entry point needs before the composition root can
//! build an [`engram`] engine: CLI parsing, configuration resolution,
//! logging setup, signal handling, and platform abstraction.
//!
//! ```text
//! ┌───────────────────────────────┐
//! │   BOOTSTRAP (this crate)      │  entry point, config, logging,
//! │                                │  signals, platform
//! └───────────────┬───────────────┘
//!                  ▼
//! ┌───────────────────────────────┐
//! │            engram             │  application + infrastructure
//! └───────────────┬───────────────┘
//!                  ▼
//! ┌───────────────────────────────┐
//! │        engram-domain          │  entities, value objects, ports
//! └───────────────────────────────┘
//! ```

pub mod cli;
pub mod config;
pub mod exit_code;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;

pub use cli::{Cli, Command};
pub use config::AppConfig;
pub use exit_code::{map_error_to_exit_code, result_to_exit_code, ExitCode};
pub use logger::{init_tracing, LogLevel};
pub use shutdown::ShutdownHandle;
