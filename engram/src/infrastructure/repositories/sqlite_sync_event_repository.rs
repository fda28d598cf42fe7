// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! SQLite-backed sync journals. Both repositories serialize appends
//! through a `tokio::sync::Mutex` so the read-latest/assign-next/insert
//! sequence is atomic under the single-writer discipline the domain
//! requires (spec §5, §9 open question (a)).

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use engram_domain::events::{EventKind, SecretSyncEvent, SyncEvent};
use engram_domain::repositories::{SecretSyncEventRepository, SyncEventRepository};
use engram_domain::value_objects::{DeviceId, MemoryId, SecretId, SequenceNum};
use engram_domain::EngramError;
use sqlx::{Row, SqlitePool};
use tokio::sync::Mutex;

fn kind_to_str(kind: EventKind) -> &'static str {
    match kind {
        EventKind::Add => "ADD",
        EventKind::Update => "UPDATE",
        EventKind::Delete => "DELETE",
    }
}

fn kind_from_str(s: &str) -> Result<EventKind, EngramError> {
    match s {
        "ADD" => Ok(EventKind::Add),
        "UPDATE" => Ok(EventKind::Update),
        "DELETE" => Ok(EventKind::Delete),
        other => Err(EngramError::format(format!("unknown event kind: {other}"))),
    }
}

fn row_err(e: sqlx::Error) -> EngramError {
    EngramError::storage(format!("row decode failed: {e}"))
}

fn millis_to_datetime(millis: i64) -> DateTime<Utc> {
    Utc.timestamp_millis_opt(millis).single().unwrap_or_else(Utc::now)
}

pub struct SqliteSyncEventRepository {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteSyncEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<SyncEvent, EngramError> {
        let id_str: String = row.try_get("id").map_err(row_err)?;
        let kind_str: String = row.try_get("event_type").map_err(row_err)?;
        let memory_id_str: String = row.try_get("memory_id").map_err(row_err)?;
        let encrypted_data: Option<String> = row.try_get("encrypted_data").map_err(row_err)?;
        let checksum: Option<String> = row.try_get("checksum").map_err(row_err)?;
        let origin_device_str: String = row.try_get("origin_device").map_err(row_err)?;
        let timestamp: i64 = row.try_get("timestamp").map_err(row_err)?;
        let sequence_num: i64 = row.try_get("sequence_num").map_err(row_err)?;

        Ok(SyncEvent {
            id: MemoryId::parse(&id_str).map_err(|e| EngramError::format(e.to_string()))?,
            kind: kind_from_str(&kind_str)?,
            memory_id: MemoryId::parse(&memory_id_str).map_err(|e| EngramError::format(e.to_string()))?,
            encrypted_data: encrypted_data.unwrap_or_default(),
            checksum: checksum.unwrap_or_default(),
            origin_device: DeviceId::parse(&origin_device_str).map_err(|e| EngramError::format(e.to_string()))?,
            timestamp: millis_to_datetime(timestamp),
            sequence_num: SequenceNum::new(sequence_num as u64),
        })
    }
}

#[async_trait]
impl SyncEventRepository for SqliteSyncEventRepository {
    async fn append(&self, event: &SyncEvent) -> Result<(), EngramError> {
        let _guard = self.write_lock.lock().await;

        sqlx::query(
            "INSERT INTO sync_events (id, event_type, memory_id, encrypted_data, checksum, origin_device, timestamp, sequence_num)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(kind_to_str(event.kind))
        .bind(event.memory_id.to_string())
        .bind(&event.encrypted_data)
        .bind(&event.checksum)
        .bind(event.origin_device.to_string())
        .bind(event.timestamp.timestamp_millis())
        .bind(event.sequence_num.value() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("append sync event failed: {e}")))?;

        Ok(())
    }

    async fn list_since(&self, after: SequenceNum) -> Result<Vec<SyncEvent>, EngramError> {
        let rows = sqlx::query("SELECT * FROM sync_events WHERE sequence_num > ? ORDER BY sequence_num ASC")
            .bind(after.value() as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("list sync events failed: {e}")))?;
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn latest_sequence(&self) -> Result<Option<SequenceNum>, EngramError> {
        let row = sqlx::query("SELECT MAX(sequence_num) as m FROM sync_events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("latest sequence failed: {e}")))?;
        let max: Option<i64> = row.try_get("m").map_err(row_err)?;
        Ok(max.map(|m| SequenceNum::new(m as u64)))
    }
}

pub struct SqliteSecretSyncEventRepository {
    pool: SqlitePool,
    write_lock: Mutex<()>,
}

impl SqliteSecretSyncEventRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            write_lock: Mutex::new(()),
        }
    }

    fn row_to_event(row: &sqlx::sqlite::SqliteRow) -> Result<SecretSyncEvent, EngramError> {
        let id_str: String = row.try_get("id").map_err(row_err)?;
        let kind_str: String = row.try_get("event_type").map_err(row_err)?;
        let secret_id_str: String = row.try_get("secret_id").map_err(row_err)?;
        let encrypted_data: String = row.try_get("encrypted_data").map_err(row_err)?;
        let iv: String = row.try_get("iv").map_err(row_err)?;
        let checksum: String = row.try_get("checksum").map_err(row_err)?;
        let blind_id: String = row.try_get("blind_id").map_err(row_err)?;
        let origin_device_str: String = row.try_get("origin_device").map_err(row_err)?;
        let timestamp: i64 = row.try_get("timestamp").map_err(row_err)?;
        let sequence_num: i64 = row.try_get("sequence_num").map_err(row_err)?;

        Ok(SecretSyncEvent {
            id: SecretId::parse(&id_str).map_err(|e| EngramError::format(e.to_string()))?,
            kind: kind_from_str(&kind_str)?,
            secret_id: SecretId::parse(&secret_id_str).map_err(|e| EngramError::format(e.to_string()))?,
            encrypted_data,
            iv,
            checksum,
            blind_id,
            origin_device: DeviceId::parse(&origin_device_str).map_err(|e| EngramError::format(e.to_string()))?,
            timestamp: millis_to_datetime(timestamp),
            sequence_num: SequenceNum::new(sequence_num as u64),
        })
    }
}

#[async_trait]
impl SecretSyncEventRepository for SqliteSecretSyncEventRepository {
    async fn append(&self, event: &SecretSyncEvent) -> Result<(), EngramError> {
        let _guard = self.write_lock.lock().await;

        sqlx::query(
            "INSERT INTO local_secret_sync_events (id, event_type, secret_id, encrypted_data, iv, checksum, blind_id, origin_device, timestamp, sequence_num)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(event.id.to_string())
        .bind(kind_to_str(event.kind))
        .bind(event.secret_id.to_string())
        .bind(&event.encrypted_data)
        .bind(&event.iv)
        .bind(&event.checksum)
        .bind(&event.blind_id)
        .bind(event.origin_device.to_string())
        .bind(event.timestamp.timestamp_millis())
        .bind(event.sequence_num.value() as i64)
        .execute(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("append secret sync event failed: {e}")))?;

        Ok(())
    }

    async fn list_since(&self, after: SequenceNum) -> Result<Vec<SecretSyncEvent>, EngramError> {
        let rows = sqlx::query(
            "SELECT * FROM local_secret_sync_events WHERE sequence_num > ? ORDER BY sequence_num ASC",
        )
        .bind(after.value() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("list secret sync events failed: {e}")))?;
        rows.iter().map(Self::row_to_event).collect()
    }

    async fn latest_sequence(&self) -> Result<Option<SequenceNum>, EngramError> {
        let row = sqlx::query("SELECT MAX(sequence_num) as m FROM local_secret_sync_events")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| EngramError::storage(format!("latest sequence failed: {e}")))?;
        let max: Option<i64> = row.try_get("m").map_err(row_err)?;
        Ok(max.map(|m| SequenceNum::new(m as u64)))
    }

    async fn find_latest_by_blind_id(&self, blind_id: &str) -> Result<Option<SecretSyncEvent>, EngramError> {
        let row = sqlx::query(
            "SELECT * FROM local_secret_sync_events WHERE blind_id = ? ORDER BY sequence_num DESC LIMIT 1",
        )
        .bind(blind_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| EngramError::storage(format!("find by blind id failed: {e}")))?;
        row.as_ref().map(Self::row_to_event).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::repositories::schema::open_pool;

    fn sample_event(seq: u64) -> SyncEvent {
        SyncEvent {
            id: MemoryId::new(),
            kind: EventKind::Add,
            memory_id: MemoryId::new(),
            encrypted_data: "YQ==.Yg==".into(),
            checksum: "deadbeef".into(),
            origin_device: DeviceId::new(),
            timestamp: Utc::now(),
            sequence_num: SequenceNum::new(seq),
        }
    }

    #[tokio::test]
    async fn sequence_numbers_are_assigned_in_append_order() {
        let pool = open_pool("sqlite::memory:").await.unwrap();
        let repo = SqliteSyncEventRepository::new(pool);

        repo.append(&sample_event(1)).await.unwrap();
        repo.append(&sample_event(2)).await.unwrap();

        let events = repo.list_since(SequenceNum::new(0)).await.unwrap();
        assert_eq!(events.len(), 2);
        assert!(events[0].sequence_num.value() < events[1].sequence_num.value());
        assert_eq!(repo.latest_sequence().await.unwrap(), Some(SequenceNum::new(2)));
    }
}
