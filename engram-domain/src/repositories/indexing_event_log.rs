// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Indexing Event Log
//!
//! Best-effort persistence of the indexing pipeline's stage transitions
//! (spec §4.5). A write failure here never aborts indexing — it's observed
//! through the in-process broadcast channel regardless of whether it made
//! it to disk.

use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait IndexingEventLog: Send + Sync {
    async fn record(&self, path: &str, stage: &str, detail: Option<&str>) -> Result<(), EngramError>;
}
