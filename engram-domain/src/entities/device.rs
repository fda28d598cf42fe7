// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Device Entity
//!
//! A peer authorized to participate in secrets sync. Devices are not
//! stored locally beyond the authorizing device's own record — this type
//! mirrors the remote `devices` collection the sync backend exposes, used
//! by the device-authorization flow to wrap a vault key for a new peer's
//! RSA public key.

use crate::value_objects::DeviceId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Device {
    pub id: DeviceId,
    pub name: String,
    /// PEM-encoded RSA-4096 public key used to wrap the vault key for this
    /// device during authorization (spec §4.6).
    pub public_key_pem: String,
    pub created_at: DateTime<Utc>,
    pub last_sync_at: Option<DateTime<Utc>>,
}

impl Device {
    pub fn new(id: DeviceId, name: String, public_key_pem: String, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            public_key_pem,
            created_at: now,
            last_sync_at: None,
        }
    }

    pub fn mark_synced(&mut self, now: DateTime<Utc>) {
        self.last_sync_at = Some(now);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_with_no_sync_history() {
        let device = Device::new(DeviceId::new(), "laptop".into(), "-----BEGIN PUBLIC KEY-----".into(), Utc::now());
        assert!(device.last_sync_at.is_none());
    }

    #[test]
    fn mark_synced_records_timestamp() {
        let mut device = Device::new(DeviceId::new(), "laptop".into(), "key".into(), Utc::now());
        let t = Utc::now();
        device.mark_synced(t);
        assert_eq!(device.last_sync_at, Some(t));
    }
}
