// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secrets Store
//!
//! CRUD over encrypted credentials, keyed by a unique `key_name`. Mirrors
//! every mutation to the secrets sync journal and, when a remote backend is
//! configured, pushes it there too — a push failure is logged and the local
//! write stands, since the journal is the device's own durable record and a
//! later sync pass reconciles (spec §4.4, §4.7).

use crate::infrastructure::http::{PushSecretRequest, SyncHttpClient};
use chrono::Utc;
use engram_domain::entities::Secret;
use engram_domain::events::{EventKind, SecretSyncEvent};
use engram_domain::repositories::{SecretRepository, SecretSyncEventRepository};
use engram_domain::services::CryptoService;
use engram_domain::value_objects::{DeviceId, Envelope, SecretId, SequenceNum};
use engram_domain::EngramError;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::warn;

/// Combines `key_name` and `value` into one plaintext before encryption, so
/// a sync event's ciphertext carries everything a receiving device needs to
/// materialize the secret locally — while the remote backend, which only
/// ever sees `blind_id`, still never learns `key_name` (spec §4.7).
fn encode_payload(key_name: &str, value: &str) -> String {
    format!("{key_name}\u{0}{value}")
}

fn decode_payload(payload: &str) -> Result<(&str, &str), EngramError> {
    payload
        .split_once('\u{0}')
        .ok_or_else(|| EngramError::format("secret payload missing key name separator"))
}

pub struct SecretsStore {
    repository: Arc<dyn SecretRepository>,
    sync_events: Arc<dyn SecretSyncEventRepository>,
    crypto: Arc<dyn CryptoService>,
    remote: Option<Arc<SyncHttpClient>>,
    device_id: DeviceId,
    write_lock: Mutex<()>,
}

impl SecretsStore {
    pub fn new(
        repository: Arc<dyn SecretRepository>,
        sync_events: Arc<dyn SecretSyncEventRepository>,
        crypto: Arc<dyn CryptoService>,
        remote: Option<Arc<SyncHttpClient>>,
        device_id: DeviceId,
    ) -> Self {
        Self {
            repository,
            sync_events,
            crypto,
            remote,
            device_id,
            write_lock: Mutex::new(()),
        }
    }

    /// Creates or replaces the secret stored under `key_name`.
    pub async fn set(&self, key_name: &str, value: &str, description: Option<String>) -> Result<Secret, EngramError> {
        if key_name.is_empty() {
            return Err(EngramError::format("secret key name must not be empty"));
        }

        let _guard = self.write_lock.lock().await;
        let payload = encode_payload(key_name, value);
        let envelope = self.crypto.encrypt(payload.as_bytes()).await?;
        let now = Utc::now();

        let secret = match self.repository.find_by_key_name(key_name).await? {
            Some(mut existing) => {
                existing.rotate(envelope, description, now);
                self.repository.update(&existing).await?;
                existing
            }
            None => {
                let secret = Secret::new(SecretId::new(), key_name.to_string(), envelope, description, now);
                self.repository.save(&secret).await?;
                secret
            }
        };

        self.emit_and_mirror(EventKind::Update, &secret, Some(&payload)).await?;
        Ok(secret)
    }

    pub async fn get(&self, key_name: &str) -> Result<Option<String>, EngramError> {
        let Some(secret) = self.repository.find_by_key_name(key_name).await? else {
            return Ok(None);
        };
        let plaintext_bytes = self.crypto.decrypt(&secret.envelope).await?;
        let payload = String::from_utf8(plaintext_bytes)
            .map_err(|e| EngramError::format(format!("secret value was not UTF-8: {e}")))?;
        let (_key_name, value) = decode_payload(&payload)?;
        Ok(Some(value.to_string()))
    }

    /// Applies a secrets sync event originated by another device. Never
    /// re-emits — that would echo the mutation back to its origin device
    /// (spec §4.3, mirroring [`crate::application::memory_store::MemoryStore::apply_encrypted_sync_event`]).
    pub async fn apply_remote_event(&self, event: &SecretSyncEvent) -> Result<(), EngramError> {
        let _guard = self.write_lock.lock().await;
        match event.kind {
            EventKind::Add | EventKind::Update => {
                let envelope = Envelope::new(event.encrypted_data.clone(), event.iv.clone());
                let plaintext_bytes = self.crypto.decrypt(&envelope).await?;
                let actual_checksum = self.crypto.sha256_hex(&plaintext_bytes);
                if actual_checksum != event.checksum {
                    return Err(EngramError::checksum_mismatch(format!(
                        "expected {}, got {}",
                        event.checksum, actual_checksum
                    )));
                }
                let payload = String::from_utf8(plaintext_bytes)
                    .map_err(|e| EngramError::format(format!("decrypted secret payload was not UTF-8: {e}")))?;
                let (key_name, _value) = decode_payload(&payload)?;
                let now = Utc::now();

                match self.repository.find_by_id(event.secret_id).await? {
                    Some(mut existing) => {
                        existing.rotate(envelope, existing.description.clone(), now);
                        self.repository.update(&existing).await?;
                    }
                    None => {
                        let secret = Secret::new(event.secret_id, key_name.to_string(), envelope, None, now);
                        self.repository.save(&secret).await?;
                    }
                }
                Ok(())
            }
            EventKind::Delete => {
                if let Some(existing) = self.repository.find_by_id(event.secret_id).await? {
                    self.repository.delete_by_key_name(&existing.key_name).await?;
                }
                Ok(())
            }
        }
    }

    /// Lists every stored secret's `key_name`, alphabetically, alongside its
    /// optional description. Values are never decrypted for a listing.
    pub async fn list(&self) -> Result<Vec<(String, Option<String>)>, EngramError> {
        let mut secrets = self.repository.list_all().await?;
        secrets.sort_by(|a, b| a.key_name.cmp(&b.key_name));
        Ok(secrets.into_iter().map(|s| (s.key_name, s.description)).collect())
    }

    pub async fn delete(&self, key_name: &str) -> Result<bool, EngramError> {
        let _guard = self.write_lock.lock().await;
        let Some(secret) = self.repository.find_by_key_name(key_name).await? else {
            return Ok(false);
        };

        self.repository.delete_by_key_name(key_name).await?;
        self.emit_and_mirror(EventKind::Delete, &secret, None).await?;
        Ok(true)
    }

    async fn emit_and_mirror(&self, kind: EventKind, secret: &Secret, plaintext: Option<&str>) -> Result<(), EngramError> {
        let blind_id = self.crypto.blind_index(&secret.key_name)?;
        let checksum = plaintext.map(|p| self.crypto.sha256_hex(p.as_bytes())).unwrap_or_default();

        let next = match self.sync_events.latest_sequence().await? {
            Some(seq) => seq.next(),
            None => SequenceNum::FIRST,
        };

        let event = SecretSyncEvent {
            id: SecretId::new(),
            kind,
            secret_id: secret.id,
            encrypted_data: secret.envelope.ciphertext.clone(),
            iv: secret.envelope.iv.clone(),
            checksum,
            blind_id,
            origin_device: self.device_id,
            timestamp: Utc::now(),
            sequence_num: next,
        };
        self.sync_events.append(&event).await?;

        if let Some(remote) = &self.remote {
            let request = PushSecretRequest {
                secret_id: secret.id.to_string(),
                event_type: match kind {
                    EventKind::Add => "add",
                    EventKind::Update => "update",
                    EventKind::Delete => "delete",
                }
                .to_string(),
                encrypted_data: (kind != EventKind::Delete).then(|| secret.envelope.ciphertext.clone()),
                iv: (kind != EventKind::Delete).then(|| secret.envelope.iv.clone()),
                checksum: (kind != EventKind::Delete).then(|| event.checksum.clone()),
                blind_id: event.blind_id.clone(),
            };
            if let Err(e) = remote.push_secret_event(&request).await {
                warn!(error = %e, key_name = %secret.key_name, "secret sync push failed, local write stands");
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use engram_domain::value_objects::Envelope;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct NoopCrypto;

    #[async_trait]
    impl CryptoService for NoopCrypto {
        async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, EngramError> {
            use base64::Engine;
            Ok(Envelope::new(
                base64::engine::general_purpose::STANDARD.encode(plaintext) + ".dGFn",
                "aXY=".to_string(),
            ))
        }

        async fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>, EngramError> {
            use base64::Engine;
            let (ct, _tag) = envelope.split_ciphertext()?;
            Ok(base64::engine::general_purpose::STANDARD.decode(ct).unwrap())
        }

        fn sha256_hex(&self, content: &[u8]) -> String {
            use sha2::{Digest, Sha256};
            hex::encode(Sha256::digest(content))
        }

        fn blind_index(&self, value: &str) -> Result<String, EngramError> {
            Ok(format!("blind:{value}"))
        }

        fn generate_master_key(&self) -> Vec<u8> {
            vec![0u8; 32]
        }

        fn derive_key_from_passphrase(&self, _passphrase: &str, _salt: &[u8]) -> Result<Vec<u8>, EngramError> {
            Ok(vec![0u8; 32])
        }

        fn key_to_mnemonic(&self, _key_bytes: &[u8]) -> Result<String, EngramError> {
            Ok(String::new())
        }

        fn mnemonic_to_key(&self, _phrase: &str) -> Result<Vec<u8>, EngramError> {
            Ok(vec![0u8; 32])
        }

        fn split_into_shares(
            &self,
            _key_bytes: &[u8],
            _user_id: String,
            _threshold: u8,
            _total: u8,
        ) -> Result<engram_domain::entities::RecoveryKit, EngramError> {
            unimplemented!()
        }

        fn recover_from_shares(
            &self,
            _shares: &[engram_domain::entities::RecoveryShare],
        ) -> Result<engram_domain::services::RecoveredKey, EngramError> {
            unimplemented!()
        }

        fn wrap_vault_key_for_device(&self, _vault_key: &[u8], _device_public_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            unimplemented!()
        }

        fn unwrap_vault_key(&self, _wrapped: &[u8], _device_private_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            unimplemented!()
        }
    }

    #[derive(Default)]
    struct InMemorySecretRepository {
        rows: StdMutex<HashMap<String, Secret>>,
    }

    #[async_trait]
    impl SecretRepository for InMemorySecretRepository {
        async fn save(&self, secret: &Secret) -> Result<(), EngramError> {
            self.rows.lock().unwrap().insert(secret.key_name.clone(), secret.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: SecretId) -> Result<Option<Secret>, EngramError> {
            Ok(self.rows.lock().unwrap().values().find(|s| s.id == id).cloned())
        }

        async fn find_by_key_name(&self, key_name: &str) -> Result<Option<Secret>, EngramError> {
            Ok(self.rows.lock().unwrap().get(key_name).cloned())
        }

        async fn list_all(&self) -> Result<Vec<Secret>, EngramError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, secret: &Secret) -> Result<(), EngramError> {
            self.rows.lock().unwrap().insert(secret.key_name.clone(), secret.clone());
            Ok(())
        }

        async fn delete_by_key_name(&self, key_name: &str) -> Result<(), EngramError> {
            self.rows.lock().unwrap().remove(key_name);
            Ok(())
        }

        async fn exists_by_key_name(&self, key_name: &str) -> Result<bool, EngramError> {
            Ok(self.rows.lock().unwrap().contains_key(key_name))
        }
    }

    #[derive(Default)]
    struct InMemorySecretSyncEventRepository {
        events: StdMutex<Vec<SecretSyncEvent>>,
    }

    #[async_trait]
    impl SecretSyncEventRepository for InMemorySecretSyncEventRepository {
        async fn append(&self, event: &SecretSyncEvent) -> Result<(), EngramError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn list_since(&self, after: SequenceNum) -> Result<Vec<SecretSyncEvent>, EngramError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .filter(|e| e.sequence_num > after)
                .cloned()
                .collect())
        }

        async fn latest_sequence(&self) -> Result<Option<SequenceNum>, EngramError> {
            Ok(self.events.lock().unwrap().iter().map(|e| e.sequence_num).max())
        }

        async fn find_latest_by_blind_id(&self, blind_id: &str) -> Result<Option<SecretSyncEvent>, EngramError> {
            Ok(self
                .events
                .lock()
                .unwrap()
                .iter()
                .rev()
                .find(|e| e.blind_id == blind_id)
                .cloned())
        }
    }

    fn make_store() -> SecretsStore {
        SecretsStore::new(
            Arc::new(InMemorySecretRepository::default()),
            Arc::new(InMemorySecretSyncEventRepository::default()),
            Arc::new(NoopCrypto),
            None,
            DeviceId::new(),
        )
    }

    #[tokio::test]
    async fn set_then_get_round_trips() {
        let store = make_store();
        store.set("github_token", "ghp_abc123", None).await.unwrap();
        assert_eq!(store.get("github_token").await.unwrap().as_deref(), Some("ghp_abc123"));
    }

    #[tokio::test]
    async fn set_is_idempotent_by_key_name() {
        let store = make_store();
        store.set("api_key", "first", None).await.unwrap();
        store.set("api_key", "second", None).await.unwrap();
        assert_eq!(store.get("api_key").await.unwrap().as_deref(), Some("second"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn list_is_alphabetical() {
        let store = make_store();
        store.set("zeta", "z", None).await.unwrap();
        store.set("alpha", "a", None).await.unwrap();
        let names: Vec<String> = store.list().await.unwrap().into_iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["alpha".to_string(), "zeta".to_string()]);
    }

    #[tokio::test]
    async fn delete_removes_secret() {
        let store = make_store();
        store.set("temp", "value", None).await.unwrap();
        assert!(store.delete("temp").await.unwrap());
        assert!(store.get("temp").await.unwrap().is_none());
        assert!(!store.delete("temp").await.unwrap());
    }

    #[tokio::test]
    async fn apply_remote_event_materializes_a_secret_from_another_device() {
        let origin = make_store();
        origin.set("deploy_key", "ssh-rsa AAAA...", None).await.unwrap();
        let event = {
            let events = origin.sync_events.list_since(SequenceNum::new(0)).await.unwrap();
            events.into_iter().next().unwrap()
        };

        let receiving = make_store();
        receiving.apply_remote_event(&event).await.unwrap();
        assert_eq!(receiving.get("deploy_key").await.unwrap().as_deref(), Some("ssh-rsa AAAA..."));
    }

    #[tokio::test]
    async fn apply_remote_event_rejects_checksum_mismatch() {
        let store = make_store();
        let mut tampered = {
            let origin = make_store();
            origin.set("k", "v", None).await.unwrap();
            origin.sync_events.list_since(SequenceNum::new(0)).await.unwrap().into_iter().next().unwrap()
        };
        tampered.checksum = "0".repeat(64);

        let err = store.apply_remote_event(&tampered).await.unwrap_err();
        assert!(matches!(err, EngramError::ChecksumMismatch(_)));
    }
}
