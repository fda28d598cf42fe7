// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Indexing Service
//!
//! Drives one file through `started → parsed → embedded → stored`, or short-
//! circuits to `skipped` (no parser claims the path, or the parser found
//! nothing) or `error` (read, parse, embed, or store failure). Every
//! transition is broadcast live and kept in a bounded ring buffer for
//! `mcp_memory_status`; persistence to `indexing_events` is best-effort and
//! never blocks or fails the ingest itself (spec §4.5).

use super::parser::SessionParser;
use crate::application::memory_store::{CreateMemoryInput, MemoryStore, UpdateMemoryPatch};
use engram_domain::repositories::IndexingEventLog;
use engram_domain::services::Embedder;
use engram_domain::EngramError;
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex as StdMutex};
use tokio::sync::broadcast;

const RING_CAPACITY: usize = 200;
const BROADCAST_CAPACITY: usize = 256;

/// Which filesystem event drove an `ingest_file` call. Decides whether a
/// pre-existing record for the same `source` is left alone (`Add`, already
/// indexed) or refreshed in place (`Change`) — spec §3.2's one-canonical-
/// record-per-path invariant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexEvent {
    Add,
    Change,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexStage {
    Started,
    Parsed,
    Embedded,
    Stored,
    Skipped,
    Error,
}

impl IndexStage {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexStage::Started => "started",
            IndexStage::Parsed => "parsed",
            IndexStage::Embedded => "embedded",
            IndexStage::Stored => "stored",
            IndexStage::Skipped => "skipped",
            IndexStage::Error => "error",
        }
    }
}

#[derive(Debug, Clone)]
pub struct IndexingEvent {
    pub path: PathBuf,
    pub stage: IndexStage,
    pub detail: Option<String>,
}

pub struct IndexingService {
    parsers: Vec<Arc<dyn SessionParser>>,
    memory_store: Arc<MemoryStore>,
    embedder: Arc<dyn Embedder>,
    event_log: Option<Arc<dyn IndexingEventLog>>,
    events_tx: broadcast::Sender<IndexingEvent>,
    ring: StdMutex<VecDeque<IndexingEvent>>,
}

impl IndexingService {
    pub fn new(
        parsers: Vec<Arc<dyn SessionParser>>,
        memory_store: Arc<MemoryStore>,
        embedder: Arc<dyn Embedder>,
        event_log: Option<Arc<dyn IndexingEventLog>>,
    ) -> Self {
        let (events_tx, _) = broadcast::channel(BROADCAST_CAPACITY);
        Self {
            parsers,
            memory_store,
            embedder,
            event_log,
            events_tx,
            ring: StdMutex::new(VecDeque::with_capacity(RING_CAPACITY)),
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<IndexingEvent> {
        self.events_tx.subscribe()
    }

    /// The most recent events, oldest first, capped at the ring capacity.
    /// Backs `mcp_memory_status`'s recent-activity section.
    pub fn recent_events(&self) -> Vec<IndexingEvent> {
        self.ring.lock().unwrap().iter().cloned().collect()
    }

    async fn emit(&self, path: &Path, stage: IndexStage, detail: Option<String>) {
        let event = IndexingEvent {
            path: path.to_path_buf(),
            stage,
            detail: detail.clone(),
        };
        let _ = self.events_tx.send(event.clone());
        {
            let mut ring = self.ring.lock().unwrap();
            if ring.len() == RING_CAPACITY {
                ring.pop_front();
            }
            ring.push_back(event);
        }
        if let Some(log) = &self.event_log {
            let _ = log.record(&path.display().to_string(), stage.as_str(), detail.as_deref()).await;
        }
    }

    /// Runs one file through the full ingest pipeline. `event` decides how a
    /// pre-existing record for this path is treated: an `Add` on a path
    /// that's already indexed is a dedupe no-op (`skipped`, returns
    /// `false`); a `Change` refreshes the existing record's content and
    /// vector in place. Returns whether anything was stored or updated.
    pub async fn ingest_file(&self, path: &Path, event: IndexEvent) -> Result<bool, EngramError> {
        self.emit(path, IndexStage::Started, None).await;

        let Some(parser) = self.parsers.iter().find(|p| p.can_parse(path)) else {
            self.emit(path, IndexStage::Skipped, Some("no parser registered for this path".to_string()))
                .await;
            return Ok(false);
        };

        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                let detail = format!("read failed: {e}");
                self.emit(path, IndexStage::Error, Some(detail.clone())).await;
                return Err(EngramError::storage(detail));
            }
        };

        let facts = match parser.parse(path, &content) {
            Ok(facts) => facts,
            Err(e) => {
                self.emit(path, IndexStage::Error, Some(e.to_string())).await;
                return Err(e);
            }
        };

        if facts.is_empty() {
            self.emit(path, IndexStage::Skipped, Some(format!("{} parser found nothing to remember", parser.name())))
                .await;
            return Ok(false);
        }

        self.emit(path, IndexStage::Parsed, Some(format!("{} facts", facts.len()))).await;

        let source = path.display().to_string();
        let existing = self.memory_store.list(usize::MAX, 0, Some(&source)).await?;

        if event == IndexEvent::Add && !existing.is_empty() {
            self.emit(path, IndexStage::Skipped, Some("already indexed; ignoring add for existing source".to_string()))
                .await;
            return Ok(false);
        }

        let mut touched = false;
        let mut existing = existing.into_iter();
        for fact in facts {
            let vector = match self.embedder.embed(&fact.content).await {
                Ok(vector) => vector,
                Err(e) => {
                    self.emit(path, IndexStage::Error, Some(format!("embed failed: {e}"))).await;
                    continue;
                }
            };
            self.emit(path, IndexStage::Embedded, None).await;

            let confidence = fact.confidence;
            let result = match existing.next() {
                Some(memory) => self
                    .memory_store
                    .update(
                        memory.id,
                        UpdateMemoryPatch {
                            content: Some(fact.content),
                            tags: Some(fact.tags),
                            confidence: Some(confidence),
                            ..Default::default()
                        },
                        Some(vector),
                    )
                    .await
                    .map(|_| ()),
                None => {
                    let input = CreateMemoryInput {
                        content: fact.content,
                        tags: fact.tags,
                        source: Some(source.clone()),
                        confidence: Some(confidence),
                    };
                    self.memory_store.create(input, vector).await.map(|_| ())
                }
            };
            match result {
                Ok(()) => touched = true,
                Err(e) => {
                    self.emit(path, IndexStage::Error, Some(format!("store failed: {e}"))).await;
                }
            }
        }

        self.emit(path, IndexStage::Stored, Some(format!("touched={touched}"))).await;
        Ok(touched)
    }

    /// Removes every memory previously indexed from `path` (a file deleted
    /// or moved out of a watched tree).
    pub async fn remove_path(&self, path: &Path) -> Result<usize, EngramError> {
        let source_prefix = path.display().to_string();
        let stale = self.memory_store.list(usize::MAX, 0, Some(&source_prefix)).await?;
        let mut removed = 0usize;
        for memory in stale {
            if self.memory_store.delete(memory.id).await? {
                removed += 1;
            }
        }
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::indexing::parsers::FrontmatterParser;
    use crate::application::memory_store::MemoryStore;
    use crate::infrastructure::crypto::AesCryptoService;
    use crate::infrastructure::dlp::RegexDlpSanitizer;
    use crate::infrastructure::repositories::schema::open_pool;
    use crate::infrastructure::repositories::{SqliteMemoryRepository, SqliteSyncEventRepository};
    use crate::infrastructure::vector::BruteForceVectorIndex;
    use async_trait::async_trait;
    use engram_domain::value_objects::{DeviceId, EmbeddingVector};
    use tempfile::tempdir;

    struct FixedEmbedder;

    #[async_trait]
    impl Embedder for FixedEmbedder {
        async fn embed(&self, text: &str) -> Result<EmbeddingVector, EngramError> {
            Ok(EmbeddingVector::new(vec![text.len() as f32, 1.0]))
        }

        fn dimension(&self) -> usize {
            2
        }
    }

    async fn make_service() -> IndexingService {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        crate::infrastructure::vector::BruteForceVectorIndex::bootstrap_schema(&pool).await.unwrap();

        let memory_store = Arc::new(MemoryStore::new(
            Arc::new(SqliteMemoryRepository::new(pool.clone())),
            Arc::new(BruteForceVectorIndex::new(pool.clone())),
            Arc::new(SqliteSyncEventRepository::new(pool.clone())),
            Arc::new(RegexDlpSanitizer::default()),
            Arc::new(AesCryptoService::new(vec![9u8; 32], vec![3u8; 32])),
            DeviceId::new(),
            2,
        ));

        IndexingService::new(vec![Arc::new(FrontmatterParser)], memory_store, Arc::new(FixedEmbedder), None)
    }

    #[tokio::test]
    async fn ingests_a_skill_frontmatter_file() {
        let service = make_service().await;
        let dir = tempdir().unwrap();
        let skill_dir = dir.path().join(".claude/skills/deploy");
        tokio::fs::create_dir_all(&skill_dir).await.unwrap();
        let path = skill_dir.join("SKILL.md");
        tokio::fs::write(&path, "---\nname: deploy\ndescription: Deploys to staging\n---\nBody.\n")
            .await
            .unwrap();

        let stored = service.ingest_file(&path, IndexEvent::Add).await.unwrap();
        assert!(stored);

        let events = service.recent_events();
        assert!(events.iter().any(|e| e.stage == IndexStage::Stored));
    }

    #[tokio::test]
    async fn skips_files_no_parser_recognizes() {
        let service = make_service().await;
        let dir = tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        tokio::fs::write(&path, "just some notes").await.unwrap();

        let stored = service.ingest_file(&path, IndexEvent::Add).await.unwrap();
        assert!(!stored);
        assert!(service.recent_events().iter().any(|e| e.stage == IndexStage::Skipped));
    }

    #[tokio::test]
    async fn repeated_add_on_same_source_dedupes() {
        let service = make_service().await;
        let dir = tempdir().unwrap();
        let skill_dir = dir.path().join(".claude/skills/deploy");
        tokio::fs::create_dir_all(&skill_dir).await.unwrap();
        let path = skill_dir.join("SKILL.md");
        tokio::fs::write(&path, "---\nname: deploy\ndescription: Deploys to staging\n---\nBody.\n")
            .await
            .unwrap();

        assert!(service.ingest_file(&path, IndexEvent::Add).await.unwrap());
        assert!(!service.ingest_file(&path, IndexEvent::Add).await.unwrap());
        assert!(service.recent_events().iter().any(|e| e.stage == IndexStage::Skipped));
    }

    #[tokio::test]
    async fn change_on_existing_source_updates_in_place() {
        let service = make_service().await;
        let dir = tempdir().unwrap();
        let skill_dir = dir.path().join(".claude/skills/deploy");
        tokio::fs::create_dir_all(&skill_dir).await.unwrap();
        let path = skill_dir.join("SKILL.md");
        tokio::fs::write(&path, "---\nname: deploy\ndescription: Deploys to staging\n---\nBody.\n")
            .await
            .unwrap();
        assert!(service.ingest_file(&path, IndexEvent::Add).await.unwrap());

        tokio::fs::write(&path, "---\nname: deploy\ndescription: Deploys to production\n---\nBody.\n")
            .await
            .unwrap();
        assert!(service.ingest_file(&path, IndexEvent::Change).await.unwrap());

        let source = path.display().to_string();
        let memories = service.memory_store.list(10, 0, Some(&source)).await.unwrap();
        assert_eq!(memories.len(), 1);
        assert!(memories[0].content.contains("Deploys to production"));
    }
}
