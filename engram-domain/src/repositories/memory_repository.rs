// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Memory Repository
//!
//! Persistence for `Memory` entities. Vector search is a separate
//! concern (`VectorIndex`); this repository is the source of truth for a
//! memory's content, tags, and metadata.

use crate::entities::Memory;
use crate::value_objects::MemoryId;
use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait MemoryRepository: Send + Sync {
    async fn save(&self, memory: &Memory) -> Result<(), EngramError>;

    async fn find_by_id(&self, id: MemoryId) -> Result<Option<Memory>, EngramError>;

    /// All memories whose `source` starts with `source_prefix`. Used by
    /// the indexer to find stale entries after a file is deleted or moved.
    async fn find_by_source_prefix(&self, source_prefix: &str) -> Result<Vec<Memory>, EngramError>;

    async fn list_all(&self) -> Result<Vec<Memory>, EngramError>;

    async fn update(&self, memory: &Memory) -> Result<(), EngramError>;

    async fn delete(&self, id: MemoryId) -> Result<(), EngramError>;

    async fn exists(&self, id: MemoryId) -> Result<bool, EngramError>;

    async fn count(&self) -> Result<u64, EngramError>;
}
