// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Monotonic sequence numbers for the append-only sync journals.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Display};

/// A strictly-increasing, 1-based sequence number within one journal stream
/// (memory sync events and secret sync events each have their own domain).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SequenceNum(u64);

impl SequenceNum {
    pub const FIRST: SequenceNum = SequenceNum(1);

    pub fn new(value: u64) -> Self {
        Self(value)
    }

    pub fn value(&self) -> u64 {
        self.0
    }

    /// The sequence number that follows this one.
    pub fn next(&self) -> Self {
        Self(self.0 + 1)
    }
}

impl Display for SequenceNum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for SequenceNum {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<SequenceNum> for u64 {
    fn from(seq: SequenceNum) -> Self {
        seq.0
    }
}
