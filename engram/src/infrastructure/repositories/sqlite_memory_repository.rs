// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`MemoryRepository`]. Vectors are stored as little-endian
//! f32 BLOBs alongside the row rather than in a separate ANN virtual
//! table — `VectorIndex` keeps its own copy for search, and this table
//! remains the source of truth for everything else about a memory.

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use engram_domain::entities::Memory;
use engram_domain::value_objects::{Confidence, EmbeddingVector, MemoryId, TagList};
use engram_domain::{repositories::MemoryRepository, EngramError};
use sqlx::{Row, SqlitePool};

pub struct SqliteMemoryRepository {
    pool: SqlitePool,
}

impl SqliteMemoryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_memory(row: &sqlx::sqlite::SqliteRow) -> Result<Memory, EngramError> {
        let id_str: String = row.try_get("id").map_err(row_err)?;
        let content: String = row.try_get("content").map_err(row_err)?;
        let vector_bytes: Vec<u8> = row.try_get("vector").map_err(row_err)?;
        let tags_json: String = row.try_get("tags").map_err(row_err)?;
        let source: Option<String> = row.try_get("source").map_err(row_err)?;
        let confidence: f64 = row.try_get("confidence").map_err(row_err)?;
        let is_verified: i64 = row.try_get("is_verified").map_err(row_err)?;
        let created_at: i64 = row.try_get("created_at").map_err(row_err)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(row_err)?;

        let tags: Vec<String> =
            serde_json::from_str(&tags_json).map_err(|e| EngramError::format(format!("bad tags json: {e}")))?;

        Ok(Memory {
            id: MemoryId::parse(&id_str).map_err(|e| EngramError::format(format!("bad memory id: {e}")))?,
            content,
            vector: EmbeddingVector::from_bytes(&vector_bytes)?,
            tags: TagList::new(tags),
            source,
            confidence: Confidence::new(confidence as f32)?,
            is_verified: is_verified != 0,
            created_at: millis_to_datetime(created_at),
            updated_at: millis_to_datetime(updated_at),
        })
    }
}

fn row_err(e: sqlx::Error) -> EngramError {
    EngramError::storage(format!("row decode failed: {e}"))
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
}

#[async_trait]
impl MemoryRepository for SqliteMemoryRepository {
    async fn save(&self, memory: &Memory) -> Result<(), EngramError> {
        let tags_json = serde_json::to_string(memory.tags.as_slice())
            .map_err(|e| EngramError::serialization(format!("tags encode failed: {e}")))?;

        sqlx::query(
            "INSERT INTO memories (id, content, vector, tags, source, confidence, is_verified, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(memory.id.to_string())
        .bind(&memory.content)
        .bind(memory.vector.to_bytes())
        .bind(tags_json)
        .bind(&memory.source)
        .bind(memory.confidence.value() as f64)
        .bind(memory.is_verified as i64)
        .bind(memory.created_at.timestamp_millis())
        .bind(memory.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("insert memory failed: {e}")))?;

        Ok(())
    }

    async fn find_by_id(&self, id: MemoryId) -> Result<Option<Memory>, EngramError> {
        let row = sqlx::query("SELECT * FROM memories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("find memory failed: {e}")))?;

        row.as_ref().map(Self::row_to_memory).transpose()
    }

    async fn find_by_source_prefix(&self, source_prefix: &str) -> Result<Vec<Memory>, EngramError> {
        let pattern = format!("{source_prefix}%");
        let rows = sqlx::query("SELECT * FROM memories WHERE source LIKE ?")
            .bind(pattern)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("find by source failed: {e}")))?;

        rows.iter().map(Self::row_to_memory).collect()
    }

    async fn list_all(&self) -> Result<Vec<Memory>, EngramError> {
        let rows = sqlx::query("SELECT * FROM memories ORDER BY created_at DESC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("list memories failed: {e}")))?;

        rows.iter().map(Self::row_to_memory).collect()
    }

    async fn update(&self, memory: &Memory) -> Result<(), EngramError> {
        let tags_json = serde_json::to_string(memory.tags.as_slice())
            .map_err(|e| EngramError::serialization(format!("tags encode failed: {e}")))?;

        let result = sqlx::query(
            "UPDATE memories SET content = ?, vector = ?, tags = ?, source = ?, confidence = ?, is_verified = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&memory.content)
        .bind(memory.vector.to_bytes())
        .bind(tags_json)
        .bind(&memory.source)
        .bind(memory.confidence.value() as f64)
        .bind(memory.is_verified as i64)
        .bind(memory.updated_at.timestamp_millis())
        .bind(memory.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("update memory failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(EngramError::storage(format!("memory {} not found for update", memory.id)));
        }
        Ok(())
    }

    async fn delete(&self, id: MemoryId) -> Result<(), EngramError> {
        sqlx::query("DELETE FROM memories WHERE id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("delete memory failed: {e}")))?;
        Ok(())
    }

    async fn exists(&self, id: MemoryId) -> Result<bool, EngramError> {
        let row = sqlx::query("SELECT 1 FROM memories WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("exists check failed: {e}")))?;
        Ok(row.is_some())
    }

    async fn count(&self) -> Result<u64, EngramError> {
        let row = sqlx::query("SELECT COUNT(*) as c FROM memories")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("count failed: {e}")))?;
        let count: i64 = row.try_get("c").map_err(row_err)?;
        Ok(count as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    async fn repo() -> SqliteMemoryRepository {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        SqliteMemoryRepository::new(pool)
    }

    fn sample() -> Memory {
        Memory::new(
            MemoryId::new(),
            "Rust uses ownership".into(),
            EmbeddingVector::new(vec![1.0, 0.0]),
            TagList::new(vec!["rust".into()]),
            None,
            Confidence::default(),
            false,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn save_then_find_round_trips() {
        let repo = repo().await;
        let memory = sample();
        repo.save(&memory).await.unwrap();

        let found = repo.find_by_id(memory.id).await.unwrap().unwrap();
        assert_eq!(found.content, memory.content);
        assert_eq!(found.tags, memory.tags);
    }

    #[tokio::test]
    async fn delete_then_exists_is_false() {
        let repo = repo().await;
        let memory = sample();
        repo.save(&memory).await.unwrap();
        repo.delete(memory.id).await.unwrap();
        assert!(!repo.exists(memory.id).await.unwrap());
    }

    #[tokio::test]
    async fn count_reflects_inserted_rows() {
        let repo = repo().await;
        repo.save(&sample()).await.unwrap();
        repo.save(&sample()).await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 2);
    }
}
