// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Device-to-device sync engines. Both the memory and secrets engines push
//! this device's local journal to the remote backend and pull events other
//! devices have pushed, tracking their own cursor in `sync_state` (spec
//! §4.7, §4.9). Neither engine decides *when* to run — that's the
//! responsibility of whatever schedules [`MemorySyncEngine::run_once`] /
//! [`SecretsSyncEngine::run_once`] (a timer, a CLI subcommand, a signal).

mod connection;
mod memory_sync;
mod secrets_sync;

pub use connection::SyncConnectionState;
pub use memory_sync::{MemorySyncEngine, MemorySyncReport};
pub use secrets_sync::{SecretsSyncEngine, SecretsSyncReport};
