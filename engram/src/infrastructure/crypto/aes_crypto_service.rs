// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # AES-256-GCM Crypto Service
//!
//! The concrete [`CryptoService`] implementation. Holds the active
//! 32-byte key material (vault key for secrets/sync, or master key for
//! device-local artifacts) behind a `Zeroize`-on-drop wrapper so it never
//! lingers in freed memory.
//!
//! Padding: plaintext is framed as `[4-byte BE original length][plaintext][random pad]`
//! before encryption, with total length rounded up to the next multiple
//! of 4096 bytes, so an observer of ciphertext size alone cannot infer
//! the length of a short secret.

use aes_gcm::aead::{Aead, KeyInit, Payload};
use aes_gcm::{Aes256Gcm, Key, Nonce};
use async_trait::async_trait;
use base64::Engine;
use engram_domain::entities::{RecoveryKit, RecoveryShare};
use engram_domain::services::{CryptoService, RecoveredKey, RecoverySource};
use engram_domain::value_objects::Envelope;
use engram_domain::EngramError;
use hmac::{Hmac, Mac};
use rand::RngCore;
use sha2::{Digest, Sha256};
use zeroize::Zeroize;

const PAD_BLOCK: usize = 4096;
const PBKDF2_ROUNDS: u32 = 600_000;

type HmacSha256 = Hmac<Sha256>;

/// Key material zeroized on drop. Holds both the primary key this
/// instance encrypts/decrypts under and the blind-index key (separate
/// per spec §4.1's key-hierarchy note, but both live device-side).
pub struct AesCryptoService {
    key_bytes: Vec<u8>,
    blind_index_key: Vec<u8>,
}

impl Drop for AesCryptoService {
    fn drop(&mut self) {
        self.key_bytes.zeroize();
        self.blind_index_key.zeroize();
    }
}

impl AesCryptoService {
    pub fn new(key_bytes: Vec<u8>, blind_index_key: Vec<u8>) -> Self {
        Self {
            key_bytes,
            blind_index_key,
        }
    }

    fn cipher(&self) -> Result<Aes256Gcm, EngramError> {
        if self.key_bytes.len() != 32 {
            return Err(EngramError::internal("active key is not 32 bytes"));
        }
        let key = Key::<Aes256Gcm>::from_slice(&self.key_bytes);
        Ok(Aes256Gcm::new(key))
    }

    fn pad(plaintext: &[u8]) -> Vec<u8> {
        let mut framed = Vec::with_capacity(plaintext.len() + 4);
        framed.extend_from_slice(&(plaintext.len() as u32).to_be_bytes());
        framed.extend_from_slice(plaintext);

        let total = framed.len().div_ceil(PAD_BLOCK) * PAD_BLOCK;
        let mut rng = rand::rng();
        let mut padding = vec![0u8; total - framed.len()];
        rng.fill_bytes(&mut padding);
        framed.extend_from_slice(&padding);
        framed
    }

    fn unpad(framed: &[u8]) -> Result<Vec<u8>, EngramError> {
        if framed.len() < 4 {
            return Err(EngramError::format("decrypted payload too short for length header"));
        }
        let len = u32::from_be_bytes(framed[0..4].try_into().unwrap()) as usize;
        if 4 + len > framed.len() {
            return Err(EngramError::format("length header exceeds decrypted payload size"));
        }
        Ok(framed[4..4 + len].to_vec())
    }
}

#[async_trait]
impl CryptoService for AesCryptoService {
    async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, EngramError> {
        let cipher = self.cipher()?;
        let mut iv_bytes = [0u8; 12];
        rand::rng().fill_bytes(&mut iv_bytes);
        let nonce = Nonce::from_slice(&iv_bytes);

        let framed = Self::pad(plaintext);
        let mut ciphertext = cipher
            .encrypt(nonce, Payload { msg: &framed, aad: &[] })
            .map_err(|_| EngramError::auth("AES-GCM encryption failed"))?;

        // aes-gcm appends the 16-byte tag to the ciphertext; split it back
        // out so the wire format keeps them independently base64-encoded.
        let tag_offset = ciphertext.len() - 16;
        let tag = ciphertext.split_off(tag_offset);

        let b64 = base64::engine::general_purpose::STANDARD;
        let ciphertext_field = format!("{}.{}", b64.encode(&ciphertext), b64.encode(&tag));
        Ok(Envelope::new(ciphertext_field, b64.encode(iv_bytes)))
    }

    async fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>, EngramError> {
        let (ct_b64, tag_b64) = envelope.split_ciphertext()?;
        let b64 = base64::engine::general_purpose::STANDARD;
        let mut ciphertext = b64
            .decode(ct_b64)
            .map_err(|e| EngramError::format(format!("bad ciphertext base64: {e}")))?;
        let tag = b64
            .decode(tag_b64)
            .map_err(|e| EngramError::format(format!("bad tag base64: {e}")))?;
        let iv_bytes = b64
            .decode(&envelope.iv)
            .map_err(|e| EngramError::format(format!("bad iv base64: {e}")))?;
        if iv_bytes.len() != 12 {
            return Err(EngramError::format("iv must be 12 bytes"));
        }

        ciphertext.extend_from_slice(&tag);
        let cipher = self.cipher()?;
        let nonce = Nonce::from_slice(&iv_bytes);

        let framed = cipher
            .decrypt(nonce, Payload { msg: &ciphertext, aad: &[] })
            .map_err(|_| EngramError::auth("AES-GCM tag verification failed"))?;

        Self::unpad(&framed)
    }

    fn sha256_hex(&self, content: &[u8]) -> String {
        let mut hasher = Sha256::new();
        hasher.update(content);
        hex::encode(hasher.finalize())
    }

    fn blind_index(&self, value: &str) -> Result<String, EngramError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.blind_index_key)
            .map_err(|e| EngramError::internal(format!("invalid blind index key: {e}")))?;
        mac.update(value.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    fn generate_master_key(&self) -> Vec<u8> {
        let mut key = vec![0u8; 32];
        rand::rng().fill_bytes(&mut key);
        key
    }

    fn derive_key_from_passphrase(&self, passphrase: &str, salt: &[u8]) -> Result<Vec<u8>, EngramError> {
        let mut out = [0u8; 32];
        pbkdf2::pbkdf2_hmac::<Sha256>(passphrase.as_bytes(), salt, PBKDF2_ROUNDS, &mut out);
        Ok(out.to_vec())
    }

    fn key_to_mnemonic(&self, key_bytes: &[u8]) -> Result<String, EngramError> {
        let mnemonic = bip39::Mnemonic::from_entropy(key_bytes)
            .map_err(|e| EngramError::format(format!("invalid key length for mnemonic: {e}")))?;
        Ok(mnemonic.to_string())
    }

    fn mnemonic_to_key(&self, phrase: &str) -> Result<Vec<u8>, EngramError> {
        let mnemonic = phrase
            .parse::<bip39::Mnemonic>()
            .map_err(|e| EngramError::format(format!("invalid recovery phrase: {e}")))?;
        Ok(mnemonic.to_entropy())
    }

    fn split_into_shares(
        &self,
        key_bytes: &[u8],
        user_id: String,
        threshold: u8,
        total: u8,
    ) -> Result<RecoveryKit, EngramError> {
        let sharks = sharks::Sharks(threshold);
        let dealer = sharks.dealer(key_bytes);
        let shares: Vec<RecoveryShare> = dealer
            .take(total as usize)
            .map(|share| RecoveryShare {
                index: Vec::from(&share)[0],
                data: Vec::from(&share),
            })
            .collect();

        RecoveryKit::new(user_id, total, threshold, shares)
    }

    fn recover_from_shares(&self, shares: &[RecoveryShare]) -> Result<RecoveredKey, EngramError> {
        if shares.is_empty() {
            return Err(EngramError::recovery("no shares provided"));
        }
        let threshold = shares.len() as u8;
        let sharks = sharks::Sharks(threshold);
        let parsed: Result<Vec<sharks::Share>, _> =
            shares.iter().map(|s| sharks::Share::try_from(s.data.as_slice())).collect();
        let parsed = parsed.map_err(|_| EngramError::recovery("malformed recovery share"))?;

        let key_bytes = sharks
            .recover(&parsed)
            .map_err(|e| EngramError::recovery(format!("share recovery failed: {e}")))?;

        Ok(RecoveredKey {
            key_bytes,
            source: RecoverySource::ShamirShares,
        })
    }

    fn wrap_vault_key_for_device(&self, vault_key: &[u8], device_public_key_pem: &str) -> Result<Vec<u8>, EngramError> {
        use rsa::pkcs8::DecodePublicKey;
        use rsa::Oaep;

        let public_key = rsa::RsaPublicKey::from_public_key_pem(device_public_key_pem)
            .map_err(|e| EngramError::format(format!("invalid device public key: {e}")))?;
        let padding = Oaep::new::<Sha256>();
        public_key
            .encrypt(&mut rsa::rand_core::OsRng, padding, vault_key)
            .map_err(|e| EngramError::auth(format!("RSA-OAEP wrap failed: {e}")))
    }

    fn unwrap_vault_key(&self, wrapped: &[u8], device_private_key_pem: &str) -> Result<Vec<u8>, EngramError> {
        use rsa::pkcs8::DecodePrivateKey;
        use rsa::Oaep;

        let private_key = rsa::RsaPrivateKey::from_pkcs8_pem(device_private_key_pem)
            .map_err(|e| EngramError::format(format!("invalid device private key: {e}")))?;
        let padding = Oaep::new::<Sha256>();
        private_key
            .decrypt(padding, wrapped)
            .map_err(|_| EngramError::auth("RSA-OAEP unwrap failed"))
    }
}
