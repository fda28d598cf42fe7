// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed sync watermark store: a single `key`/`value` table
//! (`sync_state`) holding each sync stream's last-pulled cursor.

use async_trait::async_trait;
use engram_domain::repositories::SyncStateRepository;
use engram_domain::EngramError;
use sqlx::{Row, SqlitePool};

pub struct SqliteSyncStateRepository {
    pool: SqlitePool,
}

impl SqliteSyncStateRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SyncStateRepository for SqliteSyncStateRepository {
    async fn get(&self, key: &str) -> Result<Option<String>, EngramError> {
        let row = sqlx::query("SELECT value FROM sync_state WHERE key = ?")
            .bind(key)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("read sync state failed: {e}")))?;
        row.map(|r| r.try_get("value").map_err(|e| EngramError::storage(format!("row decode failed: {e}"))))
            .transpose()
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), EngramError> {
        sqlx::query("INSERT INTO sync_state (key, value) VALUES (?, ?) ON CONFLICT(key) DO UPDATE SET value = excluded.value")
            .bind(key)
            .bind(value)
            .execute(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("write sync state failed: {e}")))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    #[tokio::test]
    async fn round_trips_a_cursor_value() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let repo = SqliteSyncStateRepository::new(pool);

        assert_eq!(repo.get("memory_cursor").await.unwrap(), None);
        repo.set("memory_cursor", "42").await.unwrap();
        assert_eq!(repo.get("memory_cursor").await.unwrap(), Some("42".to_string()));
        repo.set("memory_cursor", "99").await.unwrap();
        assert_eq!(repo.get("memory_cursor").await.unwrap(), Some("99".to_string()));
    }
}
