// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Hashing Embedder
//!
//! The real embedding model runtime is an external collaborator consumed
//! as an opaque `Embedder` (spec §1, §9) and out of this crate's scope.
//! This adapter stands in for it: a deterministic, dependency-free
//! feature hash over whitespace-delimited word shingles, so the rest of
//! the stack (vector index, similarity search, sync vector transmission)
//! has something real to drive against without vendoring a model runtime
//! this crate cannot actually fetch.

use engram_domain::value_objects::EmbeddingVector;
use engram_domain::services::Embedder;
use engram_domain::EngramError;
use async_trait::async_trait;
use sha2::{Digest, Sha256};

pub struct HashingEmbedder {
    dimension: usize,
}

impl HashingEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }
}

impl Default for HashingEmbedder {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl Embedder for HashingEmbedder {
    async fn embed(&self, text: &str) -> Result<EmbeddingVector, EngramError> {
        let mut accum = vec![0f32; self.dimension];
        let normalized = text.to_lowercase();
        let tokens: Vec<&str> = normalized.split_whitespace().collect();

        if tokens.is_empty() {
            let mut fallback = vec![0f32; self.dimension];
            fallback[0] = 1.0;
            return Ok(EmbeddingVector::new(fallback));
        }

        for token in &tokens {
            let digest = Sha256::digest(token.as_bytes());
            for (i, slot) in accum.iter_mut().enumerate() {
                let byte = digest[i % digest.len()];
                let sign = if (byte & 0x01) == 0 { 1.0 } else { -1.0 };
                *slot += sign * (byte as f32 / 255.0);
            }
        }

        Ok(EmbeddingVector::new(accum))
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn embeds_to_the_configured_dimension() {
        let embedder = HashingEmbedder::new(16);
        let vector = embedder.embed("hello world").await.unwrap();
        assert_eq!(vector.as_slice().len(), 16);
    }

    #[tokio::test]
    async fn is_deterministic() {
        let embedder = HashingEmbedder::new(32);
        let a = embedder.embed("remember to rotate keys").await.unwrap();
        let b = embedder.embed("remember to rotate keys").await.unwrap();
        assert_eq!(a.as_slice(), b.as_slice());
    }

    #[tokio::test]
    async fn distinct_text_gives_distinct_vectors() {
        let embedder = HashingEmbedder::new(32);
        let a = embedder.embed("rust ownership rules").await.unwrap();
        let b = embedder.embed("shamir secret sharing").await.unwrap();
        assert_ne!(a.as_slice(), b.as_slice());
    }

    #[tokio::test]
    async fn empty_text_still_produces_a_unit_vector() {
        let embedder = HashingEmbedder::new(8);
        let vector = embedder.embed("").await.unwrap();
        assert_eq!(vector.as_slice().len(), 8);
    }
}
