// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Encrypted Envelope
//!
//! The wire representation produced by `CryptoService::encrypt`: a
//! base64-encoded AES-256-GCM ciphertext with its 16-byte auth tag appended
//! as `"." + base64(tag)`, plus the 12-byte IV transmitted alongside it.
//! This type is opaque to everything except the crypto service that produced
//! it — stores and sync engines pass it around without looking inside.

use crate::EngramError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    /// `base64(ciphertext) + "." + base64(auth_tag)`.
    pub ciphertext: String,
    /// `base64(iv)`, 12 random bytes per encryption.
    pub iv: String,
}

impl Envelope {
    pub fn new(ciphertext: String, iv: String) -> Self {
        Self { ciphertext, iv }
    }

    /// Splits the `ciphertext` field into its ciphertext and tag halves.
    /// Fails with `FormatError` if the `.`-delimiter is missing, per the
    /// contract that a malformed envelope is a decode-time error.
    pub fn split_ciphertext(&self) -> Result<(&str, &str), EngramError> {
        self.ciphertext
            .split_once('.')
            .ok_or_else(|| EngramError::format("envelope ciphertext missing tag delimiter"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn splits_on_delimiter() {
        let env = Envelope::new("Y2lwaGVy.dGFn".to_string(), "aXY=".to_string());
        let (ct, tag) = env.split_ciphertext().unwrap();
        assert_eq!(ct, "Y2lwaGVy");
        assert_eq!(tag, "dGFn");
    }

    #[test]
    fn rejects_missing_delimiter() {
        let env = Envelope::new("nodeliemiter".to_string(), "aXY=".to_string());
        assert!(env.split_ciphertext().is_err());
    }
}
