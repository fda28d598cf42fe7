// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sync Events
//!
//! The append-only journal unit exchanged between devices. Every mutation
//! to a memory or a secret produces one event, assigned a strictly
//! increasing `sequence_num` by the single writer that owns the local
//! journal (spec §4.4, §4.5). Events carry ciphertext, never plaintext —
//! the sync transport and the remote backend never see decrypted content.

use crate::value_objects::{DeviceId, MemoryId, SecretId, SequenceNum};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    Add,
    Update,
    Delete,
}

/// A memory-journal event. `encrypted_data` is the full encrypted memory
/// record (content, vector, tags, etc. as defined by the sync wire format);
/// `checksum` is the SHA-256 of the plaintext that produced it, used by the
/// receiving device to detect corruption or tampering after decryption.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncEvent {
    pub id: MemoryId,
    pub kind: EventKind,
    pub memory_id: MemoryId,
    pub encrypted_data: String,
    pub checksum: String,
    pub origin_device: DeviceId,
    pub timestamp: DateTime<Utc>,
    pub sequence_num: SequenceNum,
}

/// A secrets-journal event. Secrets additionally carry the IV used for
/// their envelope (kept out-of-band from `encrypted_data` so a receiving
/// device can decrypt without re-parsing a nested envelope) and a blind
/// index derived from the secret's `key_name`, letting the remote backend
/// enforce per-user uniqueness without learning the name itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SecretSyncEvent {
    pub id: SecretId,
    pub kind: EventKind,
    pub secret_id: SecretId,
    pub encrypted_data: String,
    pub iv: String,
    pub checksum: String,
    pub blind_id: String,
    pub origin_device: DeviceId,
    pub timestamp: DateTime<Utc>,
    pub sequence_num: SequenceNum,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_kind_round_trips_through_serde() {
        let json = serde_json::to_string(&EventKind::Update).unwrap();
        let back: EventKind = serde_json::from_str(&json).unwrap();
        assert_eq!(back, EventKind::Update);
    }
}
