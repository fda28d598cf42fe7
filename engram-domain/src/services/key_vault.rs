// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Key Vault
//!
//! An external collaborator: the OS keychain (Keychain on macOS,
//! libsecret on Linux, Credential Manager on Windows) used to hold the
//! vault key's passphrase-derived wrapping key outside of SQLite. Engram
//! falls back to an encrypted-at-rest file under the local store path if
//! no OS keychain is available.

use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait KeyVault: Send + Sync {
    /// Stores `key_bytes` under `label`, overwriting any existing entry.
    async fn store(&self, label: &str, key_bytes: &[u8]) -> Result<(), EngramError>;

    /// Retrieves the bytes stored under `label`, or `NotInitialized` if
    /// absent.
    async fn retrieve(&self, label: &str) -> Result<Vec<u8>, EngramError>;

    /// Removes the entry under `label`, if any. Not an error if absent.
    async fn delete(&self, label: &str) -> Result<(), EngramError>;
}
