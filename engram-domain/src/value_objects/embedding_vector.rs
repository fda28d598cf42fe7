// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Embedding Vector
//!
//! A fixed-dimension, L2-normalized float32 vector produced by the
//! (externally supplied) embedder. The store fixes the dimension at
//! initialization; every vector handed to `create`/`update`/search must
//! match it or the operation fails with `VectorDimMismatch`.

use crate::EngramError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddingVector(Vec<f32>);

/// The default embedding dimension used when a store is created without an
/// explicit override (spec §3.1: "default 384").
pub const DEFAULT_DIMENSION: usize = 384;

impl EmbeddingVector {
    /// Wraps raw components, L2-normalizing them in place. A zero vector is
    /// left as-is (normalizing it would divide by zero).
    pub fn new(components: Vec<f32>) -> Self {
        let mut v = components;
        let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for x in v.iter_mut() {
                *x /= norm;
            }
        }
        Self(v)
    }

    pub fn dim(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[f32] {
        &self.0
    }

    pub fn validate_dim(&self, expected: usize) -> Result<(), EngramError> {
        if self.dim() != expected {
            return Err(EngramError::vector_dim_mismatch(format!(
                "expected dimension {expected}, got {}",
                self.dim()
            )));
        }
        Ok(())
    }

    /// Cosine distance (`1 - cosine_similarity`) between two equal-length,
    /// normalized vectors. Smaller is more similar; `0.0` is identical,
    /// `2.0` is opposite.
    pub fn cosine_distance(&self, other: &EmbeddingVector) -> f32 {
        let dot: f32 = self.0.iter().zip(other.0.iter()).map(|(a, b)| a * b).sum();
        1.0 - dot.clamp(-1.0, 1.0)
    }

    /// Serializes as a little-endian f32 byte blob for BLOB storage.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(self.0.len() * 4);
        for x in &self.0 {
            bytes.extend_from_slice(&x.to_le_bytes());
        }
        bytes
    }

    /// Deserializes from a little-endian f32 byte blob. Does not
    /// re-normalize: the stored bytes are assumed already normalized.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, EngramError> {
        if !bytes.len().is_multiple_of(4) {
            return Err(EngramError::format("embedding blob length not a multiple of 4"));
        }
        let components = bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
            .collect();
        Ok(Self(components))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_on_construction() {
        let v = EmbeddingVector::new(vec![3.0, 4.0]);
        let norm: f32 = v.as_slice().iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-6);
    }

    #[test]
    fn identical_vectors_have_zero_distance() {
        let v = EmbeddingVector::new(vec![1.0, 2.0, 3.0]);
        assert!(v.cosine_distance(&v) < 1e-5);
    }

    #[test]
    fn orthogonal_vectors_have_unit_distance() {
        let a = EmbeddingVector::new(vec![1.0, 0.0]);
        let b = EmbeddingVector::new(vec![0.0, 1.0]);
        assert!((a.cosine_distance(&b) - 1.0).abs() < 1e-5);
    }

    #[test]
    fn round_trips_through_bytes() {
        let v = EmbeddingVector::new(vec![0.5, -0.25, 0.1]);
        let bytes = v.to_bytes();
        let restored = EmbeddingVector::from_bytes(&bytes).unwrap();
        assert_eq!(v, restored);
    }

    #[test]
    fn rejects_dimension_mismatch() {
        let v = EmbeddingVector::new(vec![1.0, 2.0]);
        assert!(v.validate_dim(3).is_err());
        assert!(v.validate_dim(2).is_ok());
    }
}
