// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Composition Root
//!
//! Wires every infrastructure adapter into the application services that
//! use them. This is the one place in the crate that knows every concrete
//! type; everything above `Engine` talks to traits.

use crate::application::indexing::parsers::default_parsers;
use crate::application::{
    IndexingService, MemoryStore, MemorySyncEngine, RecoveryService, SecretsStore, SecretsSyncEngine, SessionWatcher,
    VAULT_KEY_LABEL,
};
use crate::infrastructure::crypto::AesCryptoService;
use crate::infrastructure::dlp::RegexDlpSanitizer;
use crate::infrastructure::embedding::HashingEmbedder;
use crate::infrastructure::http::SyncHttpClient;
use crate::infrastructure::keyvault::FileKeyVault;
use crate::infrastructure::repositories::schema::open_pool;
use crate::infrastructure::repositories::{
    SqliteIndexingEventLog, SqliteMemoryRepository, SqliteSecretRepository, SqliteSecretSyncEventRepository,
    SqliteSyncEventRepository, SqliteSyncStateRepository,
};
use crate::infrastructure::vector::BruteForceVectorIndex;
use engram_bootstrap::AppConfig;
use engram_domain::repositories::SyncStateRepository;
use engram_domain::services::{Embedder, KeyVault};
use engram_domain::value_objects::DeviceId;
use engram_domain::EngramError;
use sha2::{Digest, Sha256};
use std::sync::Arc;

/// Domain separation suffix for deriving the blind-index HMAC key from the
/// vault master key, so only one secret ever needs to live in the key
/// vault (spec §4.1's key hierarchy describes VK and BK as siblings, but
/// nothing requires BK to be independently generated — deriving it from
/// VK means one fewer secret to back up).
const BLIND_INDEX_DERIVATION_CONTEXT: &[u8] = b"engram-blind-index-v1";

fn derive_blind_index_key(vault_key: &[u8]) -> Vec<u8> {
    let mut hasher = Sha256::new();
    hasher.update(vault_key);
    hasher.update(BLIND_INDEX_DERIVATION_CONTEXT);
    hasher.finalize().to_vec()
}

/// The fully-wired set of application services a running `engram serve`
/// (or any CLI command that needs the vault unlocked) operates against.
pub struct Engine {
    pub memory_store: Arc<MemoryStore>,
    pub secrets_store: Arc<SecretsStore>,
    pub recovery_service: Arc<RecoveryService>,
    pub memory_sync: Option<Arc<MemorySyncEngine>>,
    pub secrets_sync: Option<Arc<SecretsSyncEngine>>,
    pub indexing: Arc<IndexingService>,
    pub embedder: Arc<dyn Embedder>,
    pub device_id: DeviceId,
}

impl Engine {
    /// Default embedding dimension for the stand-in [`HashingEmbedder`].
    /// Real model-backed embedders would report their own native
    /// dimension here instead.
    const EMBEDDING_DIM: usize = 256;

    /// Builds every adapter and service, requiring the vault to already be
    /// initialized (`engram init` must have run first). Used by `serve`,
    /// `status`, and anything else that operates on an unlocked vault.
    pub async fn bootstrap(config: &AppConfig) -> Result<Self, EngramError> {
        std::fs::create_dir_all(&config.engram_path)
            .map_err(|e| EngramError::storage(format!("failed to create engram directory: {e}")))?;

        let database_url = format!("sqlite://{}", config.database_path().display());
        let pool = open_pool(&database_url).await?;
        BruteForceVectorIndex::bootstrap_schema(&pool).await?;

        let key_vault: Arc<dyn KeyVault> = Arc::new(FileKeyVault::new(config.engram_path.join("keyvault")));
        let vault_key = key_vault.retrieve(VAULT_KEY_LABEL).await?;
        let blind_index_key = derive_blind_index_key(&vault_key);
        let crypto = Arc::new(AesCryptoService::new(vault_key, blind_index_key));

        let state_repo: Arc<dyn SyncStateRepository> = Arc::new(SqliteSyncStateRepository::new(pool.clone()));
        let device_id = Self::load_or_create_device_id(&state_repo).await?;

        let remote = config.api_url.as_ref().map(|url| Arc::new(SyncHttpClient::new(url.clone())));

        let memory_store = Arc::new(MemoryStore::new(
            Arc::new(SqliteMemoryRepository::new(pool.clone())),
            Arc::new(BruteForceVectorIndex::new(pool.clone())),
            Arc::new(SqliteSyncEventRepository::new(pool.clone())),
            Arc::new(RegexDlpSanitizer::default()),
            crypto.clone(),
            device_id,
            Self::EMBEDDING_DIM,
        ));

        let secrets_store = Arc::new(SecretsStore::new(
            Arc::new(SqliteSecretRepository::new(pool.clone())),
            Arc::new(SqliteSecretSyncEventRepository::new(pool.clone())),
            crypto.clone(),
            remote.clone(),
            device_id,
        ));

        let recovery_service = Arc::new(RecoveryService::new(crypto.clone(), key_vault.clone(), remote.clone()));

        let (memory_sync, secrets_sync) = match &remote {
            Some(http) => (
                Some(Arc::new(MemorySyncEngine::new(memory_store.clone(), http.clone(), state_repo.clone(), device_id))),
                Some(Arc::new(SecretsSyncEngine::new(secrets_store.clone(), http.clone(), state_repo.clone(), device_id))),
            ),
            None => (None, None),
        };

        let embedder: Arc<dyn Embedder> = Arc::new(HashingEmbedder::new(Self::EMBEDDING_DIM));
        let event_log: Arc<dyn engram_domain::repositories::IndexingEventLog> =
            Arc::new(SqliteIndexingEventLog::new(pool.clone()));
        let indexing = Arc::new(IndexingService::new(default_parsers(), memory_store.clone(), embedder.clone(), Some(event_log)));

        Ok(Self {
            memory_store,
            secrets_store,
            recovery_service,
            memory_sync,
            secrets_sync,
            indexing,
            embedder,
            device_id,
        })
    }

    /// Starts the background session watcher over the assistant session
    /// directories under the user's home, if any exist. Missing roots are
    /// skipped rather than treated as an error — a fresh machine may not
    /// have every assistant installed.
    pub async fn start_session_watcher(&self) -> Result<Option<SessionWatcher>, EngramError> {
        let Some(home) = dirs_home() else {
            return Ok(None);
        };

        let candidate_roots = [home.join(".claude").join("projects"), home.join(".codex").join("sessions")];
        let roots: Vec<_> = candidate_roots.into_iter().filter(|root| root.exists()).collect();
        if roots.is_empty() {
            return Ok(None);
        }

        Ok(Some(SessionWatcher::start(self.indexing.clone(), roots).await?))
    }

    async fn load_or_create_device_id(state_repo: &Arc<dyn SyncStateRepository>) -> Result<DeviceId, EngramError> {
        const DEVICE_ID_KEY: &str = "device_id";
        match state_repo.get(DEVICE_ID_KEY).await? {
            Some(raw) => DeviceId::parse(&raw).map_err(|e| EngramError::format(format!("corrupt stored device id: {e}"))),
            None => {
                let id = DeviceId::new();
                state_repo.set(DEVICE_ID_KEY, &id.to_string()).await?;
                Ok(id)
            }
        }
    }
}

fn dirs_home() -> Option<std::path::PathBuf> {
    std::env::var_os("HOME").map(std::path::PathBuf::from)
}
