// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Best-effort SQLite log for indexing stage transitions. Never the source
//! of truth for anything — the in-process broadcast channel in
//! `engram::application::indexing` is.

use async_trait::async_trait;
use chrono::Utc;
use engram_domain::repositories::IndexingEventLog;
use engram_domain::EngramError;
use sqlx::SqlitePool;
use uuid::Uuid;

pub struct SqliteIndexingEventLog {
    pool: SqlitePool,
}

impl SqliteIndexingEventLog {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IndexingEventLog for SqliteIndexingEventLog {
    async fn record(&self, path: &str, stage: &str, detail: Option<&str>) -> Result<(), EngramError> {
        sqlx::query("INSERT INTO indexing_events (id, path, stage, detail, timestamp) VALUES (?, ?, ?, ?, ?)")
            .bind(Uuid::now_v7().to_string())
            .bind(path)
            .bind(stage)
            .bind(detail)
            .bind(Utc::now().timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("indexing event log insert failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    #[tokio::test]
    async fn records_a_stage_transition() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let log = SqliteIndexingEventLog::new(pool.clone());
        log.record("/tmp/session.jsonl", "parsed", Some("3 facts")).await.unwrap();

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM indexing_events")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(count, 1);
    }
}
