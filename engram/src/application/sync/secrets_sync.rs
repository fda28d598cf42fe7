// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secrets Sync Engine
//!
//! `SecretsStore::set`/`delete` already push outbound events as they
//! happen (spec §4.4), so this engine's only job is the pull side: fetch
//! events other devices pushed and apply them through
//! [`SecretsStore::apply_remote_event`].

use super::connection::SyncConnectionState;
use crate::application::secrets_store::SecretsStore;
use crate::infrastructure::http::SyncHttpClient;
use engram_domain::events::{EventKind, SecretSyncEvent};
use engram_domain::repositories::SyncStateRepository;
use engram_domain::value_objects::{DeviceId, SecretId, SequenceNum};
use engram_domain::EngramError;
use std::sync::{Arc, Mutex as StdMutex};
use tracing::warn;

const PULL_CURSOR_KEY: &str = "secrets_pull_cursor";

fn kind_from_wire(s: &str) -> Result<EventKind, EngramError> {
    match s {
        "add" => Ok(EventKind::Add),
        "update" => Ok(EventKind::Update),
        "delete" => Ok(EventKind::Delete),
        other => Err(EngramError::format(format!("unknown remote event type: {other}"))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SecretsSyncReport {
    pub pulled: usize,
}

pub struct SecretsSyncEngine {
    secrets_store: Arc<SecretsStore>,
    http: Arc<SyncHttpClient>,
    state_repo: Arc<dyn SyncStateRepository>,
    device_id: DeviceId,
    state: StdMutex<SyncConnectionState>,
}

impl SecretsSyncEngine {
    pub fn new(
        secrets_store: Arc<SecretsStore>,
        http: Arc<SyncHttpClient>,
        state_repo: Arc<dyn SyncStateRepository>,
        device_id: DeviceId,
    ) -> Self {
        Self {
            secrets_store,
            http,
            state_repo,
            device_id,
            state: StdMutex::new(SyncConnectionState::Disconnected),
        }
    }

    pub fn connection_state(&self) -> SyncConnectionState {
        *self.state.lock().unwrap()
    }

    fn mark(&self, state: SyncConnectionState) {
        *self.state.lock().unwrap() = state;
    }

    fn require_connected(&self) -> Result<(), EngramError> {
        if self.connection_state() == SyncConnectionState::Connected {
            Ok(())
        } else {
            Err(EngramError::config("secrets sync engine is not connected; call connect() first"))
        }
    }

    /// Performs a lightweight round trip to the remote backend and moves
    /// the engine from `Disconnected` to `Connected` on success (spec
    /// §4.9). Marks `Disconnected` again on failure.
    pub async fn connect(&self) -> Result<(), EngramError> {
        let cursor = self.cursor().await?;
        match self.http.pull_secret_events(Some(cursor)).await {
            Ok(_) => {
                self.mark(SyncConnectionState::Connected);
                Ok(())
            }
            Err(e) => {
                self.mark(SyncConnectionState::Disconnected);
                Err(e)
            }
        }
    }

    /// Drops the engine back to `Disconnected` without a network call.
    pub fn disconnect(&self) {
        self.mark(SyncConnectionState::Disconnected);
    }

    async fn cursor(&self) -> Result<u64, EngramError> {
        Ok(self.state_repo.get(PULL_CURSOR_KEY).await?.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    async fn pull_remote(&self) -> Result<usize, EngramError> {
        self.require_connected()?;
        let mut cursor = self.cursor().await?;
        let mut applied = 0usize;

        loop {
            let response = self.http.pull_secret_events(Some(cursor)).await?;
            for pulled in &response.events {
                let kind = kind_from_wire(&pulled.event_type)?;
                let event = SecretSyncEvent {
                    id: SecretId::new(),
                    kind,
                    secret_id: SecretId::parse(&pulled.secret_id).map_err(|e| EngramError::format(e.to_string()))?,
                    encrypted_data: pulled.encrypted_data.clone().unwrap_or_default(),
                    iv: pulled.iv.clone().unwrap_or_default(),
                    checksum: pulled.checksum.clone().unwrap_or_default(),
                    blind_id: String::new(),
                    origin_device: self.device_id,
                    timestamp: chrono::Utc::now(),
                    sequence_num: SequenceNum::new(pulled.sequence_num),
                };

                if let Err(e) = self.secrets_store.apply_remote_event(&event).await {
                    warn!(error = %e, secret_id = %event.secret_id, "dropping unapplyable remote secret event");
                    continue;
                }
                applied += 1;
            }

            cursor = response.cursor;
            self.state_repo.set(PULL_CURSOR_KEY, &cursor.to_string()).await?;
            if !response.has_more {
                break;
            }
        }

        Ok(applied)
    }

    pub async fn run_once(&self) -> Result<SecretsSyncReport, EngramError> {
        self.connect().await?;
        let result = self.pull_remote().await.map(|pulled| SecretsSyncReport { pulled });
        match &result {
            Ok(_) => self.mark(SyncConnectionState::Connected),
            Err(_) => self.mark(SyncConnectionState::Disconnected),
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::crypto::AesCryptoService;
    use crate::infrastructure::repositories::schema::open_pool;
    use crate::infrastructure::repositories::{SqliteSecretRepository, SqliteSecretSyncEventRepository, SqliteSyncStateRepository};

    #[tokio::test]
    async fn starts_disconnected() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let secrets_store = Arc::new(SecretsStore::new(
            Arc::new(SqliteSecretRepository::new(pool.clone())),
            Arc::new(SqliteSecretSyncEventRepository::new(pool.clone())),
            Arc::new(AesCryptoService::new(vec![1u8; 32], vec![2u8; 32])),
            None,
            DeviceId::new(),
        ));
        let engine = SecretsSyncEngine::new(
            secrets_store,
            Arc::new(SyncHttpClient::new("http://127.0.0.1:1")),
            Arc::new(SqliteSyncStateRepository::new(pool)),
            DeviceId::new(),
        );
        assert_eq!(engine.connection_state(), SyncConnectionState::Disconnected);
    }

    #[tokio::test]
    async fn run_once_fails_and_marks_disconnected_when_backend_unreachable() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let secrets_store = Arc::new(SecretsStore::new(
            Arc::new(SqliteSecretRepository::new(pool.clone())),
            Arc::new(SqliteSecretSyncEventRepository::new(pool.clone())),
            Arc::new(AesCryptoService::new(vec![1u8; 32], vec![2u8; 32])),
            None,
            DeviceId::new(),
        ));
        let engine = SecretsSyncEngine::new(
            secrets_store,
            Arc::new(SyncHttpClient::new("http://127.0.0.1:1")),
            Arc::new(SqliteSyncStateRepository::new(pool)),
            DeviceId::new(),
        );
        assert!(engine.run_once().await.is_err());
        assert_eq!(engine.connection_state(), SyncConnectionState::Disconnected);
    }
}
