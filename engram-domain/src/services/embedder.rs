// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Embedder
//!
//! An external collaborator (spec §1, §9): text in, a fixed-dimension
//! embedding out. Engram treats the embedding model as out-of-process —
//! this trait's implementation shells out to, or calls over a local
//! socket into, whatever model runtime `ENGRAM_MODELS_DIR` points at.

use crate::value_objects::EmbeddingVector;
use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait Embedder: Send + Sync {
    /// Produces a single embedding for `text`. Implementations L2-normalize
    /// before returning, so `EmbeddingVector::new` is idempotent on the
    /// result.
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EngramError>;

    /// The dimension this embedder always produces. Stores use this at
    /// initialization to fix their configured dimension.
    fn dimension(&self) -> usize;

    /// Whether the embedder has finished whatever lazy initialization it
    /// needs (model weights loaded, warmed up) and can serve `embed()`
    /// without blocking. Implementations with no warm-up step are always
    /// ready.
    fn is_ready(&self) -> bool {
        true
    }

    /// Whether the embedder is still completing its lazy initialization.
    fn is_loading(&self) -> bool {
        false
    }
}
