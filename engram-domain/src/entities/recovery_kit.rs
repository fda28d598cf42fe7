// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Recovery Kit
//!
//! The output of splitting a master key into Shamir shares (spec §4.1,
//! §4.7). A kit is never persisted as a whole — it exists only long enough
//! to be displayed to the user and distributed to its `total` holders.
//! `user_id` is opaque to this crate; it identifies whose master key was
//! split, for display purposes only.

use crate::EngramError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryShare {
    /// The 1-based share index `sharks` assigns; required (along with
    /// `data`) to reconstruct the secret.
    pub index: u8,
    pub data: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecoveryKit {
    pub user_id: String,
    pub total: u8,
    pub threshold: u8,
    pub shares: Vec<RecoveryShare>,
}

impl RecoveryKit {
    pub fn new(
        user_id: String,
        total: u8,
        threshold: u8,
        shares: Vec<RecoveryShare>,
    ) -> Result<Self, EngramError> {
        if threshold == 0 || threshold > total {
            return Err(EngramError::config(format!(
                "threshold {threshold} must be in 1..={total}"
            )));
        }
        if shares.len() != total as usize {
            return Err(EngramError::internal(format!(
                "expected {total} shares, got {}",
                shares.len()
            )));
        }
        Ok(Self {
            user_id,
            total,
            threshold,
            shares,
        })
    }

    /// Whether the given subset of shares is large enough to reconstruct
    /// the master key. Does not validate the shares themselves — that's
    /// `CryptoService::recover_from_shares`'s job.
    pub fn can_reconstruct_from(&self, provided: usize) -> bool {
        provided >= self.threshold as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn shares(n: u8) -> Vec<RecoveryShare> {
        (1..=n)
            .map(|i| RecoveryShare {
                index: i,
                data: vec![i],
            })
            .collect()
    }

    #[test]
    fn rejects_threshold_above_total() {
        assert!(RecoveryKit::new("u".into(), 3, 5, shares(3)).is_err());
    }

    #[test]
    fn rejects_share_count_mismatch() {
        assert!(RecoveryKit::new("u".into(), 5, 3, shares(4)).is_err());
    }

    #[test]
    fn can_reconstruct_respects_threshold() {
        let kit = RecoveryKit::new("u".into(), 5, 3, shares(5)).unwrap();
        assert!(!kit.can_reconstruct_from(2));
        assert!(kit.can_reconstruct_from(3));
        assert!(kit.can_reconstruct_from(5));
    }
}
