// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sync Event Repositories
//!
//! Append-only journals backing memory and secret sync. Both journals
//! enforce the same discipline: a single writer assigns strictly
//! increasing, gapless sequence numbers, and readers only ever page
//! forward from a watermark.

use crate::events::{SecretSyncEvent, SyncEvent};
use crate::value_objects::SequenceNum;
use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait SyncEventRepository: Send + Sync {
    /// Appends `event`, which must already carry the next sequence number
    /// after `latest_sequence()`. Implementations are expected to hold a
    /// single-writer lock around the read-latest/append pair.
    async fn append(&self, event: &SyncEvent) -> Result<(), EngramError>;

    /// All events with `sequence_num > after`, in ascending order.
    async fn list_since(&self, after: SequenceNum) -> Result<Vec<SyncEvent>, EngramError>;

    /// The highest sequence number written so far, or `None` if the
    /// journal is empty.
    async fn latest_sequence(&self) -> Result<Option<SequenceNum>, EngramError>;
}

#[async_trait]
pub trait SecretSyncEventRepository: Send + Sync {
    async fn append(&self, event: &SecretSyncEvent) -> Result<(), EngramError>;

    async fn list_since(&self, after: SequenceNum) -> Result<Vec<SecretSyncEvent>, EngramError>;

    async fn latest_sequence(&self) -> Result<Option<SequenceNum>, EngramError>;

    /// The most recent event for a given blind index, used to check
    /// key-name uniqueness without decrypting every event in the journal.
    async fn find_latest_by_blind_id(&self, blind_id: &str) -> Result<Option<SecretSyncEvent>, EngramError>;
}
