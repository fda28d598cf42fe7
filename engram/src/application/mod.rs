// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Application services: the use cases that sit between the MCP/CLI
//! presentation layer and the domain ports, orchestrating repositories,
//! crypto, and the DLP sanitizer without knowing which concrete adapter
//! backs any of them.

pub mod indexing;
pub mod memory_store;
pub mod recovery_service;
pub mod secrets_store;
pub mod session_watcher;
pub mod sync;

pub use indexing::{IndexEvent, IndexStage, IndexingEvent, IndexingService};
pub use memory_store::{CreateMemoryInput, MemoryStore, UpdateMemoryPatch};
pub use recovery_service::{RecoveryService, VAULT_KEY_LABEL};
pub use secrets_store::SecretsStore;
pub use session_watcher::SessionWatcher;
pub use sync::{MemorySyncEngine, MemorySyncReport, SecretsSyncEngine, SecretsSyncReport, SyncConnectionState};
