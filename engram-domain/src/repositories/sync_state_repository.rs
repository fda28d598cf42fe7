// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sync State Repository
//!
//! A small key/value store for sync-engine watermarks: the remote cursor
//! each sync stream has pulled up to (spec §4.7, §4.9). Kept separate from
//! the event journals themselves since it's mutable state, not an
//! append-only log.

use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait SyncStateRepository: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, EngramError>;

    async fn set(&self, key: &str, value: &str) -> Result<(), EngramError>;
}
