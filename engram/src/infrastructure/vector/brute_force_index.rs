// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Brute-Force Cosine KNN Index
//!
//! A deliberate substitution for a native ANN extension (e.g.
//! `sqlite-vec`): vectors live in a plain SQLite table as BLOBs and every
//! search scans the full set, computing cosine distance with `rayon` for
//! the scan itself. At Engram's target scale (a single user's personal
//! memory store, not a multi-tenant index) this is fast enough without
//! vendoring a native extension this crate cannot actually fetch; a
//! future ANN-backed implementation can replace this behind the same
//! `VectorIndex` port without touching callers.

use async_trait::async_trait;
use engram_domain::services::{ScoredMemoryId, VectorIndex};
use engram_domain::value_objects::{EmbeddingVector, MemoryId};
use engram_domain::EngramError;
use rayon::prelude::*;
use sqlx::{Row, SqlitePool};

pub struct BruteForceVectorIndex {
    pool: SqlitePool,
}

impl BruteForceVectorIndex {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), EngramError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS memories_vec (memory_id TEXT PRIMARY KEY, embedding BLOB NOT NULL)",
        )
        .execute(pool)
        .await
        .map_err(|e| EngramError::storage(format!("vector index schema bootstrap failed: {e}")))?;
        Ok(())
    }
}

#[async_trait]
impl VectorIndex for BruteForceVectorIndex {
    async fn upsert(&self, id: MemoryId, vector: &EmbeddingVector) -> Result<(), EngramError> {
        sqlx::query(
            "INSERT INTO memories_vec (memory_id, embedding) VALUES (?, ?)
             ON CONFLICT(memory_id) DO UPDATE SET embedding = excluded.embedding",
        )
        .bind(id.to_string())
        .bind(vector.to_bytes())
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("vector upsert failed: {e}")))?;
        Ok(())
    }

    async fn remove(&self, id: MemoryId) -> Result<(), EngramError> {
        sqlx::query("DELETE FROM memories_vec WHERE memory_id = ?")
            .bind(id.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("vector remove failed: {e}")))?;
        Ok(())
    }

    async fn search(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<ScoredMemoryId>, EngramError> {
        let rows = sqlx::query("SELECT memory_id, embedding FROM memories_vec")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("vector scan failed: {e}")))?;

        let candidates: Vec<(String, Vec<u8>)> = rows
            .iter()
            .map(|row| {
                let id: String = row.try_get("memory_id").unwrap_or_default();
                let embedding: Vec<u8> = row.try_get("embedding").unwrap_or_default();
                (id, embedding)
            })
            .collect();

        let mut scored: Vec<ScoredMemoryId> = candidates
            .into_par_iter()
            .filter_map(|(id_str, embedding_bytes)| {
                let candidate_vector = EmbeddingVector::from_bytes(&embedding_bytes).ok()?;
                let memory_id = MemoryId::parse(&id_str).ok()?;
                Some(ScoredMemoryId {
                    memory_id,
                    distance: query.cosine_distance(&candidate_vector),
                })
            })
            .collect();

        scored.sort_by(|a, b| a.distance.partial_cmp(&b.distance).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    async fn index() -> BruteForceVectorIndex {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        BruteForceVectorIndex::bootstrap_schema(&pool).await.unwrap();
        BruteForceVectorIndex::new(pool)
    }

    #[tokio::test]
    async fn search_orders_by_ascending_distance() {
        let idx = index().await;
        let close = MemoryId::new();
        let far = MemoryId::new();

        idx.upsert(close, &EmbeddingVector::new(vec![1.0, 0.0])).await.unwrap();
        idx.upsert(far, &EmbeddingVector::new(vec![0.0, 1.0])).await.unwrap();

        let results = idx.search(&EmbeddingVector::new(vec![1.0, 0.01]), 2).await.unwrap();
        assert_eq!(results[0].memory_id, close);
        assert!(results[0].distance < results[1].distance);
    }

    #[tokio::test]
    async fn remove_excludes_from_future_searches() {
        let idx = index().await;
        let id = MemoryId::new();
        idx.upsert(id, &EmbeddingVector::new(vec![1.0, 0.0])).await.unwrap();
        idx.remove(id).await.unwrap();

        let results = idx.search(&EmbeddingVector::new(vec![1.0, 0.0]), 5).await.unwrap();
        assert!(results.is_empty());
    }
}
