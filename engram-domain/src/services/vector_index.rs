// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vector Index
//!
//! Nearest-neighbor search over memory embeddings. The reference
//! implementation in `engram::infrastructure::vector` is a brute-force
//! cosine-KNN scan over vectors kept as SQLite BLOBs — deliberately not a
//! `sqlite-vec` extension binding, since vendoring a native extension
//! would mean fabricating a dependency this crate cannot actually fetch.
//! The port is written so a future ANN-backed implementation is a drop-in
//! replacement.

use crate::value_objects::{EmbeddingVector, MemoryId};
use crate::EngramError;
use async_trait::async_trait;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoredMemoryId {
    pub memory_id: MemoryId,
    pub distance: f32,
}

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces the vector for `id`.
    async fn upsert(&self, id: MemoryId, vector: &EmbeddingVector) -> Result<(), EngramError>;

    /// Removes `id` from the index. Not an error if absent.
    async fn remove(&self, id: MemoryId) -> Result<(), EngramError>;

    /// Returns the `k` nearest neighbors to `query` by ascending cosine
    /// distance.
    async fn search(&self, query: &EmbeddingVector, k: usize) -> Result<Vec<ScoredMemoryId>, EngramError>;
}
