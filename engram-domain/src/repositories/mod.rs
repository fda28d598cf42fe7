// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Repository ports: persistence seams the application layer depends on
//! and `engram`'s infrastructure layer implements against SQLite.

mod indexing_event_log;
mod memory_repository;
mod secret_repository;
mod sync_event_repository;
mod sync_state_repository;

pub use indexing_event_log::IndexingEventLog;
pub use memory_repository::MemoryRepository;
pub use secret_repository::SecretRepository;
pub use sync_event_repository::{SecretSyncEventRepository, SyncEventRepository};
pub use sync_state_repository::SyncStateRepository;
