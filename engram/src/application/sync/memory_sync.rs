// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory Sync Engine
//!
//! Pushes this device's unsynced memory journal entries to the remote
//! backend and pulls events other devices have pushed, applying them
//! through [`MemoryStore::apply_encrypted_sync_event`] so the checksum and
//! dimension checks run on every inbound event exactly as they would on a
//! locally-authored one (spec §4.4, §4.7).

use super::connection::SyncConnectionState;
use crate::application::memory_store::MemoryStore;
use crate::infrastructure::http::{PushEventRequest, SyncHttpClient};
use engram_domain::events::{EventKind, SyncEvent};
use engram_domain::repositories::SyncStateRepository;
use engram_domain::value_objects::{DeviceId, EmbeddingVector, MemoryId, SequenceNum};
use engram_domain::EngramError;
use std::sync::{Arc, Mutex as StdMutex};
use tracing::warn;

const PUSH_CURSOR_KEY: &str = "memory_push_cursor";
const PULL_CURSOR_KEY: &str = "memory_pull_cursor";
const PUSH_BATCH: usize = 100;

fn kind_to_wire(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Add => "add",
        EventKind::Update => "update",
        EventKind::Delete => "delete",
    }
}

fn kind_from_wire(s: &str) -> Result<EventKind, EngramError> {
    match s {
        "add" => Ok(EventKind::Add),
        "update" => Ok(EventKind::Update),
        "delete" => Ok(EventKind::Delete),
        other => Err(EngramError::format(format!("unknown remote event type: {other}"))),
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct MemorySyncReport {
    pub pushed: usize,
    pub pulled: usize,
}

pub struct MemorySyncEngine {
    memory_store: Arc<MemoryStore>,
    http: Arc<SyncHttpClient>,
    state_repo: Arc<dyn SyncStateRepository>,
    device_id: DeviceId,
    state: StdMutex<SyncConnectionState>,
}

impl MemorySyncEngine {
    pub fn new(
        memory_store: Arc<MemoryStore>,
        http: Arc<SyncHttpClient>,
        state_repo: Arc<dyn SyncStateRepository>,
        device_id: DeviceId,
    ) -> Self {
        Self {
            memory_store,
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
            Err(EngramError::config("memory sync engine is not connected; call connect() first"))
        }
    }

    /// Performs a lightweight round trip to the remote backend and moves
    /// the engine from `Disconnected` to `Connected` on success (spec
    /// §4.9). Marks `Disconnected` again on failure.
    pub async fn connect(&self) -> Result<(), EngramError> {
        let cursor = self.cursor(PULL_CURSOR_KEY).await?;
        match self.http.pull_memory_events(Some(cursor)).await {
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

    async fn cursor(&self, key: &str) -> Result<u64, EngramError> {
        Ok(self.state_repo.get(key).await?.and_then(|v| v.parse().ok()).unwrap_or(0))
    }

    /// Pushes every local event after the last pushed cursor, oldest
    /// first, advancing the cursor after each successful push so a
    /// mid-batch failure doesn't replay already-acknowledged events.
    async fn push_pending(&self) -> Result<usize, EngramError> {
        self.require_connected()?;
        let mut cursor = SequenceNum::new(self.cursor(PUSH_CURSOR_KEY).await?);
        let mut pushed = 0usize;

        loop {
            let batch = self.memory_store.get_sync_events_since(cursor, PUSH_BATCH).await?;
            if batch.is_empty() {
                break;
            }

            for event in &batch {
                let vector = match event.kind {
                    EventKind::Delete => None,
                    _ => self
                        .memory_store
                        .get(event.memory_id)
                        .await?
                        .map(|memory| memory.vector.as_slice().to_vec()),
                };

                let request = PushEventRequest {
                    id: event.id.to_string(),
                    event_type: kind_to_wire(event.kind).to_string(),
                    memory_id: event.memory_id.to_string(),
                    encrypted_data: (!event.encrypted_data.is_empty()).then(|| event.encrypted_data.clone()),
                    checksum: (!event.checksum.is_empty()).then(|| event.checksum.clone()),
                    vector,
                };
                self.http.push_memory_event(&request).await?;

                cursor = event.sequence_num;
                self.state_repo.set(PUSH_CURSOR_KEY, &cursor.value().to_string()).await?;
                pushed += 1;
            }

            if batch.len() < PUSH_BATCH {
                break;
            }
        }

        Ok(pushed)
    }

    /// Pulls every remote event after the last pulled cursor and applies
    /// it locally, skipping events this device originated itself (the
    /// remote backend fans events out to every device including the
    /// pusher).
    async fn pull_remote(&self) -> Result<usize, EngramError> {
        self.require_connected()?;
        let mut cursor = self.cursor(PULL_CURSOR_KEY).await?;
        let mut applied = 0usize;

        loop {
            let response = self.http.pull_memory_events(Some(cursor)).await?;
            for pulled in &response.events {
                let kind = kind_from_wire(&pulled.event_type)?;
                let memory_id = MemoryId::parse(&pulled.memory_id).map_err(|e| EngramError::format(e.to_string()))?;

                let event = SyncEvent {
                    id: MemoryId::parse(&pulled.id).map_err(|e| EngramError::format(e.to_string()))?,
                    kind,
                    memory_id,
                    encrypted_data: pulled.encrypted_data.clone().unwrap_or_default(),
                    checksum: pulled.checksum.clone().unwrap_or_default(),
                    origin_device: self.device_id,
                    timestamp: chrono::Utc::now(),
                    sequence_num: SequenceNum::new(pulled.sequence_num),
                };

                let vector = pulled.vector.clone().map(EmbeddingVector::new);
                if let Err(e) = self.memory_store.apply_encrypted_sync_event(&event, vector).await {
                    warn!(error = %e, memory_id = %memory_id, "dropping unapplyable remote memory event");
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

    /// Connects (if not already) and runs one full push-then-pull cycle.
    /// Marks the engine `Connected` on success and `Disconnected` if any
    /// phase fails, leaving progress already made (cursors already
    /// advanced) intact for the next run.
    pub async fn run_once(&self) -> Result<MemorySyncReport, EngramError> {
        self.connect().await?;

        let result = async {
            let pushed = self.push_pending().await?;
            let pulled = self.pull_remote().await?;
            Ok::<_, EngramError>(MemorySyncReport { pushed, pulled })
        }
        .await;

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
    use crate::infrastructure::dlp::RegexDlpSanitizer;
    use crate::infrastructure::repositories::schema::open_pool;
    use crate::infrastructure::repositories::{SqliteMemoryRepository, SqliteSyncEventRepository, SqliteSyncStateRepository};
    use crate::infrastructure::vector::BruteForceVectorIndex;
    use engram_domain::value_objects::EmbeddingVector as Vec32;

    async fn make_memory_store() -> Arc<MemoryStore> {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        BruteForceVectorIndex::bootstrap_schema(&pool).await.unwrap();
        Arc::new(MemoryStore::new(
            Arc::new(SqliteMemoryRepository::new(pool.clone())),
            Arc::new(BruteForceVectorIndex::new(pool.clone())),
            Arc::new(SqliteSyncEventRepository::new(pool.clone())),
            Arc::new(RegexDlpSanitizer::default()),
            Arc::new(AesCryptoService::new(vec![1u8; 32], vec![2u8; 32])),
            DeviceId::new(),
            2,
        ))
    }

    #[tokio::test]
    async fn starts_disconnected_and_has_no_pending_cursor() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let engine = MemorySyncEngine::new(
            make_memory_store().await,
            Arc::new(SyncHttpClient::new("http://127.0.0.1:1")),
            Arc::new(SqliteSyncStateRepository::new(pool)),
            DeviceId::new(),
        );
        assert_eq!(engine.connection_state(), SyncConnectionState::Disconnected);
        assert_eq!(engine.cursor(PUSH_CURSOR_KEY).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn run_once_marks_disconnected_when_the_backend_is_unreachable() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let store = make_memory_store().await;
        store
            .create(
                crate::application::memory_store::CreateMemoryInput {
                    content: "unsynced note".to_string(),
                    ..Default::default()
                },
                Vec32::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();

        let engine = MemorySyncEngine::new(
            store,
            Arc::new(SyncHttpClient::new("http://127.0.0.1:1")),
            Arc::new(SqliteSyncStateRepository::new(pool)),
            DeviceId::new(),
        );

        assert!(engine.run_once().await.is_err());
        assert_eq!(engine.connection_state(), SyncConnectionState::Disconnected);
    }
}
