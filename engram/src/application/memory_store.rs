// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory Store
//!
//! CRUD and search over memory records. Owns DLP invocation, the
//! main-table/vector-index dual write, and sync-journal emission. A
//! `tokio::sync::Mutex` around every mutating operation gives this store
//! the single-writer discipline spec §5 and §9 assume: the
//! read-latest-sequence/assign-next/append triple is only safe without a
//! concurrent writer, and this lock is where that's enforced.

use chrono::Utc;
use engram_domain::entities::Memory;
use engram_domain::events::{EventKind, SyncEvent};
use engram_domain::repositories::{MemoryRepository, SyncEventRepository};
use engram_domain::services::{CryptoService, DlpSanitizer, VectorIndex};
use engram_domain::value_objects::{Confidence, DeviceId, EmbeddingVector, MemoryId, SequenceNum, TagList};
use engram_domain::EngramError;
use std::sync::Arc;
use tokio::sync::Mutex;

#[derive(Debug, Clone, Default)]
pub struct CreateMemoryInput {
    pub content: String,
    pub tags: Vec<String>,
    pub source: Option<String>,
    pub confidence: Option<f32>,
}

#[derive(Debug, Clone, Default)]
pub struct UpdateMemoryPatch {
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub source: Option<String>,
    pub confidence: Option<f32>,
    pub is_verified: Option<bool>,
}

pub struct MemoryStore {
    repository: Arc<dyn MemoryRepository>,
    vector_index: Arc<dyn VectorIndex>,
    sync_events: Arc<dyn SyncEventRepository>,
    sanitizer: Arc<dyn DlpSanitizer>,
    crypto: Arc<dyn CryptoService>,
    device_id: DeviceId,
    dimension: usize,
    write_lock: Mutex<()>,
}

impl MemoryStore {
    pub fn new(
        repository: Arc<dyn MemoryRepository>,
        vector_index: Arc<dyn VectorIndex>,
        sync_events: Arc<dyn SyncEventRepository>,
        sanitizer: Arc<dyn DlpSanitizer>,
        crypto: Arc<dyn CryptoService>,
        device_id: DeviceId,
        dimension: usize,
    ) -> Self {
        Self {
            repository,
            vector_index,
            sync_events,
            sanitizer,
            crypto,
            device_id,
            dimension,
            write_lock: Mutex::new(()),
        }
    }

    async fn append_event(&self, kind: EventKind, memory_id: MemoryId, plaintext: Option<&str>) -> Result<(), EngramError> {
        let (encrypted_data, checksum) = match plaintext {
            Some(text) => {
                let envelope = self.crypto.encrypt(text.as_bytes()).await?;
                let checksum = self.crypto.sha256_hex(text.as_bytes());
                (format!("{}|{}", envelope.ciphertext, envelope.iv), checksum)
            }
            None => (String::new(), String::new()),
        };

        let next = match self.sync_events.latest_sequence().await? {
            Some(seq) => seq.next(),
            None => SequenceNum::FIRST,
        };

        let event = SyncEvent {
            id: MemoryId::new(),
            kind,
            memory_id,
            encrypted_data,
            checksum,
            origin_device: self.device_id,
            timestamp: Utc::now(),
            sequence_num: next,
        };
        self.sync_events.append(&event).await
    }

    pub async fn create(&self, input: CreateMemoryInput, vector: EmbeddingVector) -> Result<Memory, EngramError> {
        vector.validate_dim(self.dimension)?;
        if input.content.is_empty() {
            return Err(EngramError::format("memory content must not be empty"));
        }

        let _guard = self.write_lock.lock().await;

        let sanitize_result = self.sanitizer.sanitize(&input.content);
        let mut tags = TagList::new(input.tags);
        if sanitize_result.redaction_count > 0 {
            tags.ensure_dlp_redacted();
        }

        let confidence = Confidence::new(input.confidence.unwrap_or(1.0))?;
        let memory = Memory::new(
            MemoryId::new(),
            sanitize_result.sanitized,
            vector.clone(),
            tags,
            input.source,
            confidence,
            false,
            Utc::now(),
        );

        self.repository.save(&memory).await?;
        self.vector_index.upsert(memory.id, &vector).await?;
        self.append_event(EventKind::Add, memory.id, Some(&memory.content)).await?;

        Ok(memory)
    }

    pub async fn get(&self, id: MemoryId) -> Result<Option<Memory>, EngramError> {
        self.repository.find_by_id(id).await
    }

    pub async fn update(
        &self,
        id: MemoryId,
        patch: UpdateMemoryPatch,
        new_vector: Option<EmbeddingVector>,
    ) -> Result<Option<Memory>, EngramError> {
        let _guard = self.write_lock.lock().await;

        let Some(mut memory) = self.repository.find_by_id(id).await? else {
            return Ok(None);
        };

        let had_redaction_tag = memory.tags.contains(engram_domain::value_objects::DLP_REDACTED_TAG);
        let mut needs_redaction_tag = had_redaction_tag;

        if let Some(content) = patch.content {
            let sanitize_result = self.sanitizer.sanitize(&content);
            memory.content = sanitize_result.sanitized;
            // New content decides the tag on its own merits — it's only
            // carried over from the prior state when content isn't touched.
            needs_redaction_tag = sanitize_result.redaction_count > 0;
        }

        if let Some(new_tags) = patch.tags {
            memory.tags = TagList::new(new_tags);
        }
        if needs_redaction_tag {
            memory.tags.ensure_dlp_redacted();
        }

        if let Some(source) = patch.source {
            memory.source = Some(source);
        }
        if let Some(confidence) = patch.confidence {
            memory.confidence = Confidence::new(confidence)?;
        }
        if let Some(is_verified) = patch.is_verified {
            memory.is_verified = is_verified;
        }
        if let Some(vector) = &new_vector {
            vector.validate_dim(self.dimension)?;
            memory.vector = vector.clone();
        }
        memory.updated_at = Utc::now();

        self.repository.update(&memory).await?;
        if let Some(vector) = &new_vector {
            self.vector_index.upsert(memory.id, vector).await?;
        }
        self.append_event(EventKind::Update, memory.id, Some(&memory.content)).await?;

        Ok(Some(memory))
    }

    pub async fn delete(&self, id: MemoryId) -> Result<bool, EngramError> {
        let _guard = self.write_lock.lock().await;

        if !self.repository.exists(id).await? {
            return Ok(false);
        }

        self.repository.delete(id).await?;
        self.vector_index.remove(id).await?;
        self.append_event(EventKind::Delete, id, None).await?;
        Ok(true)
    }

    pub async fn search(
        &self,
        query_vector: &EmbeddingVector,
        limit: usize,
        project_path: Option<&str>,
    ) -> Result<Vec<(Memory, f32)>, EngramError> {
        let fetch_limit = if project_path.is_some() { limit * 3 } else { limit };
        let hits = self.vector_index.search(query_vector, fetch_limit).await?;

        let mut results = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(memory) = self.repository.find_by_id(hit.memory_id).await? {
                let visible = match project_path {
                    None => true,
                    Some(path) => {
                        memory.is_global_plugin_source()
                            || !memory.has_project_scoped_source()
                            || memory.is_scoped_to_project(path)
                    }
                };
                if visible {
                    results.push((memory, hit.distance));
                }
            }
        }
        results.truncate(limit);
        Ok(results)
    }

    pub async fn hybrid_search(
        &self,
        query_vector: &EmbeddingVector,
        keywords: &[String],
        limit: usize,
    ) -> Result<Vec<(Memory, f32)>, EngramError> {
        let hits = self.vector_index.search(query_vector, limit * 2).await?;
        let lowered_keywords: Vec<String> = keywords.iter().map(|k| k.to_lowercase()).collect();

        let mut candidates = Vec::with_capacity(hits.len());
        for hit in hits {
            if let Some(memory) = self.repository.find_by_id(hit.memory_id).await? {
                candidates.push((memory, hit.distance));
            }
        }

        let matches_keyword = |memory: &Memory| {
            let content_lower = memory.content.to_lowercase();
            lowered_keywords.iter().any(|keyword| {
                content_lower.contains(keyword.as_str())
                    || memory.tags.as_slice().iter().any(|tag| tag.to_lowercase().contains(keyword.as_str()))
            })
        };

        let (mut matched, mut unmatched): (Vec<_>, Vec<_>) =
            candidates.into_iter().partition(|(memory, _)| matches_keyword(memory));

        matched.extend(unmatched.drain(..));
        matched.truncate(limit);
        Ok(matched)
    }

    pub async fn list(&self, limit: usize, offset: usize, source: Option<&str>) -> Result<Vec<Memory>, EngramError> {
        let all = self.repository.list_all().await?;
        let filtered: Vec<Memory> = match source {
            Some(source) => all.into_iter().filter(|m| m.source.as_deref() == Some(source)).collect(),
            None => all,
        };
        Ok(filtered.into_iter().skip(offset).take(limit).collect())
    }

    pub async fn count(&self) -> Result<u64, EngramError> {
        self.repository.count().await
    }

    pub async fn delete_older_than(&self, cutoff: chrono::DateTime<Utc>) -> Result<u64, EngramError> {
        let all = self.repository.list_all().await?;
        let mut deleted = 0u64;
        for memory in all {
            if memory.created_at < cutoff && self.delete(memory.id).await? {
                deleted += 1;
            }
        }
        Ok(deleted)
    }

    /// Applies a sync event originated by another device. Never emits a
    /// new event itself — that would re-broadcast the mutation back to
    /// its origin (spec §4.3).
    pub async fn apply_encrypted_sync_event(
        &self,
        event: &SyncEvent,
        vector: Option<EmbeddingVector>,
    ) -> Result<(), EngramError> {
        match event.kind {
            EventKind::Add => {
                if self.repository.exists(event.memory_id).await? {
                    return Ok(());
                }
                let plaintext = self.decrypt_and_verify(event).await?;
                let vector = vector.ok_or_else(|| EngramError::format("ADD sync event requires a vector"))?;
                vector.validate_dim(self.dimension)?;

                let memory = Memory::new(
                    event.memory_id,
                    plaintext,
                    vector.clone(),
                    TagList::default(),
                    Some("sync".to_string()),
                    Confidence::default(),
                    false,
                    event.timestamp,
                );
                self.repository.save(&memory).await?;
                self.vector_index.upsert(memory.id, &vector).await?;
                Ok(())
            }
            EventKind::Update => {
                let plaintext = self.decrypt_and_verify(event).await?;
                let _guard = self.write_lock.lock().await;
                let Some(mut memory) = self.repository.find_by_id(event.memory_id).await? else {
                    return Ok(());
                };
                memory.content = plaintext;
                memory.updated_at = Utc::now();
                if let Some(vector) = &vector {
                    vector.validate_dim(self.dimension)?;
                    memory.vector = vector.clone();
                }
                self.repository.update(&memory).await?;
                if let Some(vector) = &vector {
                    self.vector_index.upsert(memory.id, vector).await?;
                }
                Ok(())
            }
            EventKind::Delete => {
                let _guard = self.write_lock.lock().await;
                if self.repository.exists(event.memory_id).await? {
                    self.repository.delete(event.memory_id).await?;
                    self.vector_index.remove(event.memory_id).await?;
                }
                Ok(())
            }
        }
    }

    async fn decrypt_and_verify(&self, event: &SyncEvent) -> Result<String, EngramError> {
        let Some((ciphertext, iv)) = event.encrypted_data.split_once('|') else {
            return Err(EngramError::format("sync event payload missing envelope separator"));
        };
        let envelope = engram_domain::value_objects::Envelope::new(ciphertext.to_string(), iv.to_string());
        let plaintext_bytes = self.crypto.decrypt(&envelope).await?;
        let plaintext = String::from_utf8(plaintext_bytes)
            .map_err(|e| EngramError::format(format!("decrypted payload was not UTF-8: {e}")))?;

        let actual_checksum = self.crypto.sha256_hex(plaintext.as_bytes());
        if actual_checksum != event.checksum {
            return Err(EngramError::checksum_mismatch(format!(
                "expected {}, got {}",
                event.checksum, actual_checksum
            )));
        }
        Ok(plaintext)
    }

    pub async fn get_sync_events_since(&self, seq: SequenceNum, limit: usize) -> Result<Vec<SyncEvent>, EngramError> {
        let mut events = self.sync_events.list_since(seq).await?;
        events.truncate(limit);
        Ok(events)
    }

    pub async fn latest_sequence_num(&self) -> Result<Option<SequenceNum>, EngramError> {
        self.sync_events.latest_sequence().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use engram_domain::services::{DlpSanitizer, SanitizeResult, ScoredMemoryId};
    use engram_domain::value_objects::Envelope;
    use std::collections::HashMap;
    use std::sync::Mutex as StdMutex;

    struct NoopCrypto;

    #[async_trait]
    impl CryptoService for NoopCrypto {
        async fn encrypt(&self, plaintext: &[u8]) -> Result<Envelope, EngramError> {
            Ok(Envelope::new(
                base64_lite_encode(plaintext) + ".dGFn",
                "aXY=".to_string(),
            ))
        }

        async fn decrypt(&self, envelope: &Envelope) -> Result<Vec<u8>, EngramError> {
            let (ct, _tag) = envelope.split_ciphertext()?;
            Ok(base64_lite_decode(ct))
        }

        fn sha256_hex(&self, content: &[u8]) -> String {
            use sha2::{Digest, Sha256};
            hex::encode(Sha256::digest(content))
        }

        fn blind_index(&self, value: &str) -> Result<String, EngramError> {
            Ok(value.to_string())
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
            unimplemented!("not exercised by memory store tests")
        }

        fn recover_from_shares(
            &self,
            _shares: &[engram_domain::entities::RecoveryShare],
        ) -> Result<engram_domain::services::RecoveredKey, EngramError> {
            unimplemented!("not exercised by memory store tests")
        }

        fn wrap_vault_key_for_device(&self, _vault_key: &[u8], _device_public_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            unimplemented!("not exercised by memory store tests")
        }

        fn unwrap_vault_key(&self, _wrapped: &[u8], _device_private_key_pem: &str) -> Result<Vec<u8>, EngramError> {
            unimplemented!("not exercised by memory store tests")
        }
    }

    fn base64_lite_encode(bytes: &[u8]) -> String {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.encode(bytes)
    }

    fn base64_lite_decode(text: &str) -> Vec<u8> {
        use base64::Engine;
        base64::engine::general_purpose::STANDARD.decode(text).unwrap()
    }

    struct NoopSanitizer;

    impl DlpSanitizer for NoopSanitizer {
        fn sanitize(&self, content: &str) -> SanitizeResult {
            SanitizeResult {
                sanitized: content.to_string(),
                redaction_count: 0,
            }
        }
    }

    struct SecretLeakSanitizer;

    impl DlpSanitizer for SecretLeakSanitizer {
        fn sanitize(&self, content: &str) -> SanitizeResult {
            let sanitized = content.replace("sk-live-abc123", "{{SECRET:API_KEY}}");
            let redaction_count = usize::from(sanitized != content);
            SanitizeResult { sanitized, redaction_count }
        }
    }

    #[derive(Default)]
    struct InMemoryMemoryRepository {
        rows: StdMutex<HashMap<MemoryId, Memory>>,
    }

    #[async_trait]
    impl MemoryRepository for InMemoryMemoryRepository {
        async fn save(&self, memory: &Memory) -> Result<(), EngramError> {
            self.rows.lock().unwrap().insert(memory.id, memory.clone());
            Ok(())
        }

        async fn find_by_id(&self, id: MemoryId) -> Result<Option<Memory>, EngramError> {
            Ok(self.rows.lock().unwrap().get(&id).cloned())
        }

        async fn find_by_source_prefix(&self, source_prefix: &str) -> Result<Vec<Memory>, EngramError> {
            Ok(self
                .rows
                .lock()
                .unwrap()
                .values()
                .filter(|m| m.source.as_deref().is_some_and(|s| s.starts_with(source_prefix)))
                .cloned()
                .collect())
        }

        async fn list_all(&self) -> Result<Vec<Memory>, EngramError> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn update(&self, memory: &Memory) -> Result<(), EngramError> {
            self.rows.lock().unwrap().insert(memory.id, memory.clone());
            Ok(())
        }

        async fn delete(&self, id: MemoryId) -> Result<(), EngramError> {
            self.rows.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn exists(&self, id: MemoryId) -> Result<bool, EngramError> {
            Ok(self.rows.lock().unwrap().contains_key(&id))
        }

        async fn count(&self) -> Result<u64, EngramError> {
            Ok(self.rows.lock().unwrap().len() as u64)
        }
    }

    #[derive(Default)]
    struct InMemoryVectorIndex {
        rows: StdMutex<HashMap<MemoryId, EmbeddingVector>>,
    }

    #[async_trait]
    impl VectorIndex for InMemoryVectorIndex {
        async fn upsert(&self, id: MemoryId, vector: &EmbeddingVector) -> Result<(), EngramError> {
            self.rows.lock().unwrap().insert(id, vector.clone());
            Ok(())
        }

        async fn remove(&self, id: MemoryId) -> Result<(), EngramError> {
            self.rows.lock().unwrap().remove(&id);
            Ok(())
        }

        async fn search(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<ScoredMemoryId>, EngramError> {
            let mut scored: Vec<ScoredMemoryId> = self
                .rows
                .lock()
                .unwrap()
                .iter()
                .map(|(id, v)| ScoredMemoryId {
                    memory_id: *id,
                    distance: query.cosine_distance(v),
                })
                .collect();
            scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap());
            scored.truncate(k);
            Ok(scored)
        }
    }

    #[derive(Default)]
    struct InMemorySyncEventRepository {
        events: StdMutex<Vec<SyncEvent>>,
    }

    #[async_trait]
    impl SyncEventRepository for InMemorySyncEventRepository {
        async fn append(&self, event: &SyncEvent) -> Result<(), EngramError> {
            self.events.lock().unwrap().push(event.clone());
            Ok(())
        }

        async fn list_since(&self, after: SequenceNum) -> Result<Vec<SyncEvent>, EngramError> {
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
    }

    fn make_store(sanitizer: Arc<dyn DlpSanitizer>) -> MemoryStore {
        MemoryStore::new(
            Arc::new(InMemoryMemoryRepository::default()),
            Arc::new(InMemoryVectorIndex::default()),
            Arc::new(InMemorySyncEventRepository::default()),
            sanitizer,
            Arc::new(NoopCrypto),
            DeviceId::new(),
            2,
        )
    }

    #[tokio::test]
    async fn create_then_get_round_trips() {
        let store = make_store(Arc::new(NoopSanitizer));
        let memory = store
            .create(
                CreateMemoryInput {
                    content: "the build uses cargo workspaces".to_string(),
                    tags: vec!["rust".to_string()],
                    source: None,
                    confidence: None,
                },
                EmbeddingVector::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();

        let fetched = store.get(memory.id).await.unwrap().unwrap();
        assert_eq!(fetched.content, "the build uses cargo workspaces");
        assert_eq!(store.latest_sequence_num().await.unwrap(), Some(SequenceNum::FIRST));
    }

    #[tokio::test]
    async fn create_rejects_wrong_dimension() {
        let store = make_store(Arc::new(NoopSanitizer));
        let err = store
            .create(
                CreateMemoryInput {
                    content: "x".to_string(),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![1.0, 0.0, 0.0]),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, EngramError::VectorDimMismatch(_)));
    }

    #[tokio::test]
    async fn create_tags_secret_leaks_as_redacted() {
        let store = make_store(Arc::new(SecretLeakSanitizer));
        let memory = store
            .create(
                CreateMemoryInput {
                    content: "api key is sk-live-abc123".to_string(),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();

        assert!(memory.content.contains("{{SECRET:API_KEY}}"));
        assert!(memory.tags.contains(engram_domain::value_objects::DLP_REDACTED_TAG));
    }

    #[tokio::test]
    async fn update_with_clean_content_drops_the_redaction_tag() {
        let store = make_store(Arc::new(SecretLeakSanitizer));
        let memory = store
            .create(
                CreateMemoryInput {
                    content: "api key is sk-live-abc123".to_string(),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();
        assert!(memory.tags.contains(engram_domain::value_objects::DLP_REDACTED_TAG));

        let updated = store
            .update(
                memory.id,
                UpdateMemoryPatch {
                    content: Some("nothing sensitive here".to_string()),
                    tags: Some(vec!["note".to_string()]),
                    ..Default::default()
                },
                None,
            )
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.tags.contains(engram_domain::value_objects::DLP_REDACTED_TAG));
    }

    #[tokio::test]
    async fn delete_removes_memory_and_emits_event() {
        let store = make_store(Arc::new(NoopSanitizer));
        let memory = store
            .create(
                CreateMemoryInput {
                    content: "ephemeral note".to_string(),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![0.0, 1.0]),
            )
            .await
            .unwrap();

        assert!(store.delete(memory.id).await.unwrap());
        assert!(store.get(memory.id).await.unwrap().is_none());
        assert!(!store.delete(memory.id).await.unwrap());

        let events = store.get_sync_events_since(SequenceNum::new(0), 10).await.unwrap();
        assert_eq!(events.len(), 2);
    }

    #[tokio::test]
    async fn search_filters_project_scoped_sources() {
        let store = make_store(Arc::new(NoopSanitizer));
        store
            .create(
                CreateMemoryInput {
                    content: "project a secret".to_string(),
                    source: Some("/repo/a/.claude/notes.md".to_string()),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();
        store
            .create(
                CreateMemoryInput {
                    content: "global plugin note".to_string(),
                    source: Some("/home/me/.claude/plugins/foo/skill.md".to_string()),
                    ..Default::default()
                },
                EmbeddingVector::new(vec![1.0, 0.0]),
            )
            .await
            .unwrap();

        let query = EmbeddingVector::new(vec![1.0, 0.0]);
        let from_b = store.search(&query, 10, Some("/repo/b")).await.unwrap();
        assert_eq!(from_b.len(), 1);
        assert!(from_b[0].0.is_global_plugin_source());

        let from_a = store.search(&query, 10, Some("/repo/a")).await.unwrap();
        assert_eq!(from_a.len(), 2);
    }

    #[tokio::test]
    async fn apply_sync_event_rejects_checksum_mismatch() {
        let store = make_store(Arc::new(NoopSanitizer));
        let tampered = SyncEvent {
            id: MemoryId::new(),
            kind: EventKind::Add,
            memory_id: MemoryId::new(),
            encrypted_data: format!("{}|aXY=", base64_lite_encode(b"hello")),
            checksum: "0000000000000000000000000000000000000000000000000000000000000000".to_string(),
            origin_device: DeviceId::new(),
            timestamp: Utc::now(),
            sequence_num: SequenceNum::FIRST,
        };

        let err = store
            .apply_encrypted_sync_event(&tampered, Some(EmbeddingVector::new(vec![1.0, 0.0])))
            .await
            .unwrap_err();
        assert!(matches!(err, EngramError::ChecksumMismatch(_)));
    }
}
