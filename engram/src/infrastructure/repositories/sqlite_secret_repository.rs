// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed [`SecretRepository`].

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use engram_domain::entities::Secret;
use engram_domain::value_objects::{Envelope, SecretId};
use engram_domain::{repositories::SecretRepository, EngramError};
use sqlx::{Row, SqlitePool};

pub struct SqliteSecretRepository {
    pool: SqlitePool,
}

impl SqliteSecretRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    fn row_to_secret(row: &sqlx::sqlite::SqliteRow) -> Result<Secret, EngramError> {
        let id_str: String = row.try_get("id").map_err(row_err)?;
        let key_name: String = row.try_get("key_name").map_err(row_err)?;
        let ciphertext: String = row.try_get("encrypted_value").map_err(row_err)?;
        let iv: String = row.try_get("iv").map_err(row_err)?;
        let description: Option<String> = row.try_get("description").map_err(row_err)?;
        let created_at: i64 = row.try_get("created_at").map_err(row_err)?;
        let updated_at: i64 = row.try_get("updated_at").map_err(row_err)?;

        Ok(Secret {
            id: SecretId::parse(&id_str).map_err(|e| EngramError::format(format!("bad secret id: {e}")))?,
            key_name,
            envelope: Envelope::new(ciphertext, iv),
            description,
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
impl SecretRepository for SqliteSecretRepository {
    async fn save(&self, secret: &Secret) -> Result<(), EngramError> {
        sqlx::query(
            "INSERT INTO secrets (id, key_name, encrypted_value, iv, description, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(secret.id.to_string())
        .bind(&secret.key_name)
        .bind(&secret.envelope.ciphertext)
        .bind(&secret.envelope.iv)
        .bind(&secret.description)
        .bind(secret.created_at.timestamp_millis())
        .bind(secret.updated_at.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("insert secret failed: {e}")))?;
        Ok(())
    }

    async fn find_by_id(&self, id: SecretId) -> Result<Option<Secret>, EngramError> {
        let row = sqlx::query("SELECT * FROM secrets WHERE id = ?")
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("find secret failed: {e}")))?;
        row.as_ref().map(Self::row_to_secret).transpose()
    }

    async fn find_by_key_name(&self, key_name: &str) -> Result<Option<Secret>, EngramError> {
        let row = sqlx::query("SELECT * FROM secrets WHERE key_name = ?")
            .bind(key_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("find secret by name failed: {e}")))?;
        row.as_ref().map(Self::row_to_secret).transpose()
    }

    async fn list_all(&self) -> Result<Vec<Secret>, EngramError> {
        let rows = sqlx::query("SELECT * FROM secrets ORDER BY key_name ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("list secrets failed: {e}")))?;
        rows.iter().map(Self::row_to_secret).collect()
    }

    async fn update(&self, secret: &Secret) -> Result<(), EngramError> {
        let result = sqlx::query(
            "UPDATE secrets SET encrypted_value = ?, iv = ?, description = ?, updated_at = ? WHERE id = ?",
        )
        .bind(&secret.envelope.ciphertext)
        .bind(&secret.envelope.iv)
        .bind(&secret.description)
        .bind(secret.updated_at.timestamp_millis())
        .bind(secret.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("update secret failed: {e}")))?;

        if result.rows_affected() == 0 {
            return Err(EngramError::storage(format!("secret {} not found for update", secret.id)));
        }
        Ok(())
    }

    async fn delete_by_key_name(&self, key_name: &str) -> Result<(), EngramError> {
        sqlx::query("DELETE FROM secrets WHERE key_name = ?")
            .bind(key_name)
            .execute(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("delete secret failed: {e}")))?;
        Ok(())
    }

    async fn exists_by_key_name(&self, key_name: &str) -> Result<bool, EngramError> {
        let row = sqlx::query("SELECT 1 FROM secrets WHERE key_name = ?")
            .bind(key_name)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("exists check failed: {e}")))?;
        Ok(row.is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    async fn repo() -> SqliteSecretRepository {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        SqliteSecretRepository::new(pool)
    }

    fn sample() -> Secret {
        Secret::new(
            SecretId::new(),
            "github_token".into(),
            Envelope::new("YQ==.Yg==".into(), "aXY=".into()),
            None,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn save_then_find_by_key_name_round_trips() {
        let repo = repo().await;
        let secret = sample();
        repo.save(&secret).await.unwrap();

        let found = repo.find_by_key_name("github_token").await.unwrap().unwrap();
        assert_eq!(found.envelope.ciphertext, secret.envelope.ciphertext);
    }

    #[tokio::test]
    async fn upsert_via_update_changes_envelope() {
        let repo = repo().await;
        let mut secret = sample();
        repo.save(&secret).await.unwrap();

        secret.rotate(Envelope::new("Yw==.ZA==".into(), "aXYy".into()), None, Utc::now());
        repo.update(&secret).await.unwrap();

        let found = repo.find_by_key_name("github_token").await.unwrap().unwrap();
        assert_eq!(found.envelope.ciphertext, "Yw==.ZA==");
    }
}
