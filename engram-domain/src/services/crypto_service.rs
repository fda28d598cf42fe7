// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Crypto Service
//!
//! The single seam through which every cryptographic primitive in the
//! system is reached: AES-256-GCM envelope encryption, SHA-256 content
//! checksums, HMAC-SHA256 blind indexing, master-key derivation and
//! recovery (BIP39 mnemonic, Shamir shares), and RSA-4096-OAEP key
//! wrapping for device authorization.
//!
//! | Concern | Algorithm | Spec |
//! |---|---|---|
//! | Envelope encryption | AES-256-GCM | §4.1 |
//! | Checksum | SHA-256 | §4.4 |
//! | Blind index | HMAC-SHA256 | §4.5 |
//! | Key derivation | PBKDF2 / Argon2 | §4.1 |
//! | Mnemonic backup | BIP39 | §4.7 |
//! | Split-key recovery | Shamir (k-of-n) | §4.7 |
//! | Device wrap | RSA-4096-OAEP | §4.6 |
//!
//! Implementations must never log plaintext, key material, or mnemonic
//! phrases, and must hold key bytes behind `Zeroize`-on-drop wrappers.

use crate::entities::{RecoveryKit, RecoveryShare};
use crate::value_objects::Envelope;
use crate::EngramError;
use async_trait::async_trait;

/// A master key recovered from a mnemonic phrase or a threshold of Shamir
/// shares, along with which route produced it (useful for audit logging
/// without exposing the key itself).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoverySource {
    Mnemonic,
    ShamirShares,
}

pub struct RecoveredKey {
    pub key_bytes: Vec<u8>,
    pub source: RecoverySource,
}

#[async_trait]
pub trait CryptoService: Send + Sync {
    /// Encrypts `plaintext` under the active vault key with a freshly
    /// generated IV, producing `base64(ct) + "." + base64(tag)` alongside
    /// `base64(iv)`.
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, EngramError>;

    /// Decrypts an envelope produced by `encrypt`. Fails with `AuthError`
    /// if the GCM tag does not verify.
    async fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>, EngramError>;

    /// SHA-256 of arbitrary content, hex-encoded. Used for sync-event
    /// checksums and content-addressed lookups.
    fn sha256_hex(&self, content: &[u8]) -> String;

    /// HMAC-SHA256 of `value` under a dedicated blind-index key, hex
    /// encoded. Used to let the remote sync backend enforce per-user
    /// secret-name uniqueness without learning the name.
    fn blind_index(&self, value: &str) -> Result<String, EngramError>;

    /// Generates a fresh 256-bit master key.
    fn generate_master_key(&self) -> Vec<u8>;

    /// Derives a key-encryption key from a user passphrase and salt via
    /// PBKDF2 (or Argon2, implementation-chosen) for wrapping the master
    /// key at rest.
    fn derive_key_from_passphrase(&self, passphrase: &str, salt: &[u8]) -> Result<Vec<u8>, EngramError>;

    /// Encodes a master key as a BIP39 mnemonic phrase.
    fn key_to_mnemonic(&self, key_bytes: &[u8]) -> Result<String, EngramError>;

    /// Decodes a BIP39 mnemonic phrase back into key bytes.
    fn mnemonic_to_key(&self, phrase: &str) -> Result<Vec<u8>, EngramError>;

    /// Splits a master key into a `total`-share, `threshold`-of-`total`
    /// Shamir recovery kit.
    fn split_into_shares(
        &self,
        key_bytes: &[u8],
        user_id: String,
        threshold: u8,
        total: u8,
    ) -> Result<RecoveryKit, EngramError>;

    /// Reconstructs a master key from at least `threshold` shares. Fails
    /// with `RecoveryError` if too few shares are given or they don't
    /// agree on a reconstruction.
    fn recover_from_shares(&self, shares: &[RecoveryShare]) -> Result<RecoveredKey, EngramError>;

    /// Wraps the vault key under a device's RSA-4096 public key (PEM) for
    /// transmission during device authorization.
    fn wrap_vault_key_for_device(&self, vault_key: &[u8], device_public_key_pem: &str) -> Result<Vec<u8>, EngramError>;

    /// Unwraps a vault key that was wrapped for this device's own RSA
    /// keypair.
    fn unwrap_vault_key(&self, wrapped: &[u8], device_private_key_pem: &str) -> Result<Vec<u8>, EngramError>;
}
