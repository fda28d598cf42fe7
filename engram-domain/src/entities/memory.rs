// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory Entity
//!
//! A single stored fact. `content` is always the DLP-sanitized text (never
//! the raw input); the store is responsible for running the sanitizer
//! before constructing one of these. The vector dimension is fixed for the
//! lifetime of a store and is not re-validated here — `MemoryStore` checks
//! it against the configured dimension before this entity is built.

use crate::value_objects::{Confidence, EmbeddingVector, MemoryId, TagList};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Memory {
    pub id: MemoryId,
    pub content: String,
    pub vector: EmbeddingVector,
    pub tags: TagList,
    /// Origin path for indexed memories, or `Some("sync")` for memories
    /// materialized from a remote sync event. `None` for memories created
    /// directly by the assistant.
    pub source: Option<String>,
    pub confidence: Confidence,
    pub is_verified: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Memory {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        id: MemoryId,
        content: String,
        vector: EmbeddingVector,
        tags: TagList,
        source: Option<String>,
        confidence: Confidence,
        is_verified: bool,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            content,
            vector,
            tags,
            source,
            confidence,
            is_verified,
            created_at: now,
            updated_at: now,
        }
    }

    /// Whether this memory's `source` identifies it as belonging to a
    /// globally-visible plugin (`.claude/plugins/`), as opposed to a
    /// project-scoped or assistant-authored memory. Used by `search`'s
    /// project-path filtering (spec §4.3).
    pub fn is_global_plugin_source(&self) -> bool {
        self.source
            .as_deref()
            .map(|s| s.contains("/.claude/plugins/"))
            .unwrap_or(false)
    }

    /// Whether this memory's `source` is scoped to the given project path,
    /// i.e. matches `^{project_path}/.claude/...`.
    pub fn is_scoped_to_project(&self, project_path: &str) -> bool {
        self.source
            .as_deref()
            .map(|s| s.starts_with(&format!("{project_path}/.claude/")))
            .unwrap_or(false)
    }

    /// Whether this memory carries any project-like source at all (one
    /// that would be hidden from unrelated projects). A memory with no
    /// source, or a source that isn't under any `.claude/` tree, is always
    /// visible regardless of the caller's project path.
    pub fn has_project_scoped_source(&self) -> bool {
        self.source
            .as_deref()
            .map(|s| s.contains("/.claude/"))
            .unwrap_or(false)
            && !self.is_global_plugin_source()
    }
}
