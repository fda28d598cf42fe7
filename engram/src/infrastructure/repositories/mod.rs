// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite adapters for the domain's repository ports.

pub mod schema;
mod sqlite_indexing_event_log;
mod sqlite_memory_repository;
mod sqlite_secret_repository;
mod sqlite_sync_event_repository;
mod sqlite_sync_state_repository;

pub use sqlite_indexing_event_log::SqliteIndexingEventLog;
pub use sqlite_memory_repository::SqliteMemoryRepository;
pub use sqlite_secret_repository::SqliteSecretRepository;
pub use sqlite_sync_event_repository::{SqliteSecretSyncEventRepository, SqliteSyncEventRepository};
pub use sqlite_sync_state_repository::SqliteSyncStateRepository;
