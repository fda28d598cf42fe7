// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Recovery & Device Authorization Service
//!
//! Owns the vault master key's lifecycle: generation at `init`, mnemonic and
//! Shamir-kit backup, recovery onto a fresh device, and RSA-wrapped handoff
//! to newly authorized peers (spec §4.1, §4.6, §4.7, §4.9).

use engram_domain::entities::{RecoveryKit, RecoveryShare};
use engram_domain::services::{CryptoService, KeyVault, RecoverySource};
use engram_domain::EngramError;
use std::sync::Arc;

use crate::infrastructure::http::{DeviceListEntry, SyncHttpClient};

/// Label under which the vault master key is held in the OS keychain (or its
/// encrypted-file fallback).
pub const VAULT_KEY_LABEL: &str = "engram_vault_key";

pub struct RecoveryService {
    crypto: Arc<dyn CryptoService>,
    key_vault: Arc<dyn KeyVault>,
    remote: Option<Arc<SyncHttpClient>>,
}

impl RecoveryService {
    pub fn new(crypto: Arc<dyn CryptoService>, key_vault: Arc<dyn KeyVault>, remote: Option<Arc<SyncHttpClient>>) -> Self {
        Self { crypto, key_vault, remote }
    }

    /// Generates a fresh master key, stores it in the key vault, and returns
    /// its BIP39 mnemonic backup phrase. Called once by `engram init`.
    pub async fn initialize_vault(&self) -> Result<String, EngramError> {
        let key_bytes = self.crypto.generate_master_key();
        let mnemonic = self.crypto.key_to_mnemonic(&key_bytes)?;
        self.key_vault.store(VAULT_KEY_LABEL, &key_bytes).await?;
        Ok(mnemonic)
    }

    /// Splits the already-initialized vault key into a `threshold`-of-`total`
    /// Shamir recovery kit, for out-of-band distribution to trustees.
    pub async fn generate_recovery_kit(&self, user_id: String, threshold: u8, total: u8) -> Result<RecoveryKit, EngramError> {
        let key_bytes = self.key_vault.retrieve(VAULT_KEY_LABEL).await?;
        self.crypto.split_into_shares(&key_bytes, user_id, threshold, total)
    }

    /// Recovers the vault key from a mnemonic phrase, installing it as the
    /// active vault key. Used on a fresh device, or after a local key-vault
    /// loss.
    pub async fn recover_from_mnemonic(&self, phrase: &str) -> Result<(), EngramError> {
        let key_bytes = self.crypto.mnemonic_to_key(phrase)?;
        self.key_vault.store(VAULT_KEY_LABEL, &key_bytes).await
    }

    /// Recovers the vault key from a threshold of Shamir shares, installing
    /// it as the active vault key.
    pub async fn recover_from_shares(&self, shares: &[RecoveryShare]) -> Result<RecoverySource, EngramError> {
        let recovered = self.crypto.recover_from_shares(shares)?;
        self.key_vault.store(VAULT_KEY_LABEL, &recovered.key_bytes).await?;
        Ok(recovered.source)
    }

    /// Wraps the vault key under a newly-authorized device's RSA-4096
    /// public key and registers the device with the remote sync backend.
    pub async fn authorize_device(&self, device_id: &str, device_public_key_pem: &str) -> Result<(), EngramError> {
        let key_bytes = self.key_vault.retrieve(VAULT_KEY_LABEL).await?;
        let wrapped = self.crypto.wrap_vault_key_for_device(&key_bytes, device_public_key_pem)?;
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| EngramError::config("device authorization requires a configured remote sync backend"))?;

        use base64::Engine;
        let wrapped_b64 = base64::engine::general_purpose::STANDARD.encode(wrapped);
        remote.authorize_device(device_id, &wrapped_b64).await
    }

    pub async fn revoke_device(&self, device_id: &str) -> Result<(), EngramError> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| EngramError::config("device revocation requires a configured remote sync backend"))?;
        remote.revoke_device(device_id).await
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceListEntry>, EngramError> {
        let remote = self
            .remote
            .as_ref()
            .ok_or_else(|| EngramError::config("device listing requires a configured remote sync backend"))?;
        remote.list_devices().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use engram_domain::services::RecoveredKey;
    use engram_domain::value_objects::Envelope;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    #[derive(Default)]
    struct InMemoryKeyVault {
        entries: StdMutex<HashMap<String, Vec<u8>>>,
    }

    #[async_trait]
    impl KeyVault for InMemoryKeyVault {
        async fn store(&self, label: &str, key_bytes: &[u8]) -> Result<(), EngramError> {
            self.entries.lock().unwrap().insert(label.to_string(), key_bytes.to_vec());
            Ok(())
        }

        async fn retrieve(&self, label: &str) -> Result<Vec<u8>, EngramError> {
            self.entries
                .lock()
                .unwrap()
                .get(label)
                .cloned()
                .ok_or_else(|| EngramError::not_initialized(format!("no key stored under {label}")))
        }

        async fn delete(&self, label: &str) -> Result<(), EngramError> {
            self.entries.lock().unwrap().remove(label);
            Ok(())
        }
    }

    struct FixedCrypto;

    #[async_trait]
    impl CryptoService for FixedCrypto {
        async fn encrypt(&self, _plaintext: &[u8]) -> Result<Envelope, EngramError> {
            unimplemented!()
        }

        async fn decrypt(&self, _envelope: &Envelope) -> Result<Vec<u8>, EngramError> {
            unimplemented!()
        }

        fn sha256_hex(&self, _content: &[u8]) -> String {
            unimplemented!()
        }

        fn blind_index(&self, _value: &str) -> Result<String, EngramError> {
            unimplemented!()
        }

        fn generate_master_key(&self) -> Vec<u8> {
            vec![7u8; 32]
        }

        fn derive_key_from_passphrase(&self, _passphrase: &str, _salt: &[u8]) -> Result<Vec<u8>, EngramError> {
            unimplemented!()
        }

        fn key_to_mnemonic(&self, key_bytes: &[u8]) -> Result<String, EngramError> {
            Ok(format!("mnemonic-for-{}-bytes", key_bytes.len()))
        }

        fn mnemonic_to_key(&self, phrase: &str) -> Result<Vec<u8>, EngramError> {
            if phrase == "mnemonic-for-32-bytes" {
                Ok(vec![7u8; 32])
            } else {
                Err(EngramError::recovery("unknown phrase"))
            }
        }

        fn split_into_shares(
            &self,
            key_bytes: &[u8],
            user_id: String,
            threshold: u8,
            total: u8,
        ) -> Result<RecoveryKit, EngramError> {
            let shares = (1..=total)
                .map(|i| RecoveryShare {
                    index: i,
                    data: key_bytes.to_vec(),
                })
                .collect();
            RecoveryKit::new(user_id, total, threshold, shares)
        }

        fn recover_from_shares(&self, shares: &[RecoveryShare]) -> Result<RecoveredKey, EngramError> {
            if shares.len() < 3 {
                return Err(EngramError::recovery("need at least 3 shares"));
            }
            Ok(RecoveredKey {
                key_bytes: shares[0].data.clone(),
                source: RecoverySource::ShamirShares,
            })
        }

        fn wrap_vault_key_for_device(&self, vault_key: &[u8], _device_public_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            Ok(vault_key.to_vec())
        }

        fn unwrap_vault_key(&self, wrapped: &[u8], _device_private_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            Ok(wrapped.to_vec())
        }
    }

    fn make_service() -> RecoveryService {
        RecoveryService::new(Arc::new(FixedCrypto), Arc::new(InMemoryKeyVault::default()), None)
    }

    #[tokio::test]
    async fn initialize_then_recover_from_mnemonic_round_trips() {
        let service = make_service();
        let phrase = service.initialize_vault().await.unwrap();
        assert_eq!(phrase, "mnemonic-for-32-bytes");

        service.recover_from_mnemonic(&phrase).await.unwrap();
        let restored = service.key_vault.retrieve(VAULT_KEY_LABEL).await.unwrap();
        assert_eq!(restored, vec![7u8; 32]);
    }

    #[tokio::test]
    async fn generate_recovery_kit_splits_stored_key() {
        let service = make_service();
        service.initialize_vault().await.unwrap();
        let kit = service.generate_recovery_kit("user-1".to_string(), 3, 5).await.unwrap();
        assert_eq!(kit.total, 5);
        assert!(kit.can_reconstruct_from(3));
    }

    #[tokio::test]
    async fn authorize_device_without_remote_fails() {
        let service = make_service();
        service.initialize_vault().await.unwrap();
        let err = service.authorize_device("device-1", "pem").await.unwrap_err();
        assert!(matches!(err, EngramError::ConfigError(_)));
    }
}
