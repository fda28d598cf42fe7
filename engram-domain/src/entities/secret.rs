// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Entity
//!
//! An encrypted credential keyed by a unique `key_name`. The plaintext
//! never reaches this type or the repository layer beneath it — only the
//! `Envelope` produced by `CryptoService::encrypt`.

use crate::value_objects::{Envelope, SecretId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Secret {
    pub id: SecretId,
    pub key_name: String,
    pub envelope: Envelope,
    pub description: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Secret {
    pub fn new(
        id: SecretId,
        key_name: String,
        envelope: Envelope,
        description: Option<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            key_name,
            envelope,
            description,
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the envelope in place and bumps `updated_at`. `description`
    /// is only replaced when `Some`; a `None` keeps the existing
    /// description rather than clearing it. `key_name` is immutable once
    /// set — rotating it means deleting and recreating the secret.
    pub fn rotate(&mut self, envelope: Envelope, description: Option<String>, now: DateTime<Utc>) {
        self.envelope = envelope;
        self.description = description.or_else(|| self.description.take());
        self.updated_at = now;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rotate_replaces_envelope_and_bumps_updated_at() {
        let t0 = Utc::now();
        let mut secret = Secret::new(
            SecretId::new(),
            "github_token".into(),
            Envelope::new("YQ==.Yg==".into(), "aXY=".into()),
            None,
            t0,
        );
        let t1 = t0 + chrono::Duration::seconds(1);
        secret.rotate(
            Envelope::new("Yw==.ZA==".into(), "aXYy".into()),
            Some("rotated".into()),
            t1,
        );
        assert_eq!(secret.envelope.ciphertext, "Yw==.ZA==");
        assert_eq!(secret.description.as_deref(), Some("rotated"));
        assert_eq!(secret.updated_at, t1);
        assert_eq!(secret.created_at, t0);
    }

    #[test]
    fn rotate_with_null_description_keeps_existing_one() {
        let t0 = Utc::now();
        let mut secret = Secret::new(
            SecretId::new(),
            "github_token".into(),
            Envelope::new("YQ==.Yg==".into(), "aXY=".into()),
            Some("original description".into()),
            t0,
        );
        let t1 = t0 + chrono::Duration::seconds(1);
        secret.rotate(Envelope::new("Yw==.ZA==".into(), "aXYy".into()), None, t1);
        assert_eq!(secret.description.as_deref(), Some("original description"));
        assert_eq!(secret.envelope.ciphertext, "Yw==.ZA==");
    }
}
