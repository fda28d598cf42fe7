// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Schema Bootstrap
//!
//! Forward-only, additive DDL — there is no migration framework, only a
//! set of `CREATE TABLE IF NOT EXISTS` / `CREATE INDEX IF NOT EXISTS`
//! statements run once at pool construction. New columns get their own
//! future `ALTER TABLE ... ADD COLUMN` statement; existing columns are
//! never dropped or renamed.

use engram_domain::EngramError;
use sqlx::SqlitePool;

const SCHEMA_STATEMENTS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS memories (
        id TEXT PRIMARY KEY,
        content TEXT NOT NULL,
        vector BLOB NOT NULL,
        tags TEXT NOT NULL,
        source TEXT,
        confidence REAL NOT NULL,
        is_verified INTEGER NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_memories_created_at ON memories (created_at DESC)",
    "CREATE INDEX IF NOT EXISTS idx_memories_source ON memories (source)",
    r#"CREATE TABLE IF NOT EXISTS sync_events (
        id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        memory_id TEXT NOT NULL,
        encrypted_data TEXT,
        checksum TEXT,
        origin_device TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        sequence_num INTEGER NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_sync_events_seq ON sync_events (sequence_num)",
    r#"CREATE TABLE IF NOT EXISTS secrets (
        id TEXT PRIMARY KEY,
        key_name TEXT NOT NULL UNIQUE,
        encrypted_value TEXT NOT NULL,
        iv TEXT NOT NULL,
        description TEXT,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS local_secret_sync_events (
        id TEXT PRIMARY KEY,
        event_type TEXT NOT NULL,
        secret_id TEXT NOT NULL,
        encrypted_data TEXT NOT NULL,
        iv TEXT NOT NULL,
        checksum TEXT NOT NULL,
        blind_id TEXT NOT NULL,
        origin_device TEXT NOT NULL,
        timestamp INTEGER NOT NULL,
        sequence_num INTEGER NOT NULL
    )"#,
    "CREATE UNIQUE INDEX IF NOT EXISTS idx_secret_sync_events_seq ON local_secret_sync_events (sequence_num)",
    "CREATE INDEX IF NOT EXISTS idx_secret_sync_events_blind_id ON local_secret_sync_events (blind_id)",
    r#"CREATE TABLE IF NOT EXISTS sync_state (
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS local_vault_key (
        id TEXT PRIMARY KEY,
        vault_key BLOB NOT NULL,
        created_at INTEGER NOT NULL,
        updated_at INTEGER NOT NULL
    )"#,
    r#"CREATE TABLE IF NOT EXISTS indexing_events (
        id TEXT PRIMARY KEY,
        path TEXT NOT NULL,
        stage TEXT NOT NULL,
        detail TEXT,
        timestamp INTEGER NOT NULL
    )"#,
];

/// Opens (creating if absent) the SQLite database at `path` in WAL mode
/// and runs the bootstrap DDL. Idempotent — safe to call on every
/// process start.
pub async fn open_pool(database_url: &str) -> Result<SqlitePool, EngramError> {
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use std::str::FromStr;

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| EngramError::storage(format!("invalid database url: {e}")))?
        .create_if_missing(true)
        .journal_mode(sqlx::sqlite::SqliteJournalMode::Wal);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(|e| EngramError::storage(format!("failed to open database: {e}")))?;

    bootstrap_schema(&pool).await?;
    Ok(pool)
}

pub async fn bootstrap_schema(pool: &SqlitePool) -> Result<(), EngramError> {
    for statement in SCHEMA_STATEMENTS {
        sqlx::query(statement)
            .execute(pool)
            .await
            .map_err(|e| EngramError::storage(format!("schema bootstrap failed: {e}")))?;
    }
    Ok(())
}
