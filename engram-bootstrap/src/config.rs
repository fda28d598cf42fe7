// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Configuration
//!
//! Resolves `AppConfig` from, in increasing priority order: built-in
//! defaults, environment variables, then explicit CLI flags. None of the
//! fields here are secret — key material lives in the OS keychain or an
//! encrypted vault file, never in this struct.

use crate::logger::LogLevel;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Root directory for the local store (SQLite database, vault key
    /// file fallback). Defaults to `~/.engram`.
    pub engram_path: PathBuf,
    /// Directory the embedder implementation looks in for model weights.
    pub models_dir: PathBuf,
    /// Base URL of the remote sync backend, if sync is enabled.
    pub api_url: Option<String>,
    /// Secrets above this size are uploaded as a pre-signed blob rather
    /// than inlined into the sync event.
    pub sync_inline_blob_max_bytes: u64,
    /// TTL for pre-signed blob URLs returned by the sync backend.
    pub sync_blob_url_ttl_seconds: u64,
    pub log_level: LogLevel,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            engram_path: default_engram_path(),
            models_dir: default_engram_path().join("models"),
            api_url: None,
            sync_inline_blob_max_bytes: 262_144,
            sync_blob_url_ttl_seconds: 300,
            log_level: LogLevel::default(),
        }
    }
}

fn default_engram_path() -> PathBuf {
    dirs_home().join(".engram")
}

fn dirs_home() -> PathBuf {
    std::env::var_os("HOME")
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."))
}

impl AppConfig {
    /// Builds configuration from environment variables layered over
    /// defaults. CLI flags are applied afterward by the caller via the
    /// `with_*` setters, since clap owns argument parsing.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = std::env::var("ENGRAM_PATH") {
            config.engram_path = PathBuf::from(path);
        }
        if let Ok(path) = std::env::var("ENGRAM_MODELS_DIR") {
            config.models_dir = PathBuf::from(path);
        }
        if let Ok(url) = std::env::var("ENGRAM_API_URL") {
            config.api_url = Some(url);
        }
        if let Ok(raw) = std::env::var("SYNC_INLINE_BLOB_MAX_BYTES") {
            if let Ok(value) = raw.parse() {
                config.sync_inline_blob_max_bytes = value;
            }
        }
        if let Ok(raw) = std::env::var("SYNC_BLOB_URL_TTL_SECONDS") {
            if let Ok(value) = raw.parse() {
                config.sync_blob_url_ttl_seconds = value;
            }
        }

        config
    }

    pub fn with_engram_path(mut self, path: Option<PathBuf>) -> Self {
        if let Some(path) = path {
            self.engram_path = path;
        }
        self
    }

    pub fn with_api_url(mut self, url: Option<String>) -> Self {
        if url.is_some() {
            self.api_url = url;
        }
        self
    }

    pub fn with_log_level(mut self, level: Option<LogLevel>) -> Self {
        if let Some(level) = level {
            self.log_level = level;
        }
        self
    }

    pub fn database_path(&self) -> PathBuf {
        self.engram_path.join("engram.db")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_overrides_take_priority_over_defaults() {
        let config = AppConfig::default().with_api_url(Some("https://sync.example.com".into()));
        assert_eq!(config.api_url.as_deref(), Some("https://sync.example.com"));
    }

    #[test]
    fn database_path_is_nested_under_engram_path() {
        let config = AppConfig::default().with_engram_path(Some(PathBuf::from("/tmp/store")));
        assert_eq!(config.database_path(), PathBuf::from("/tmp/store/engram.db"));
    }
}
