// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Domain service ports. These are the seams infrastructure implements:
//! crypto, sanitization, embedding, OS key storage, and vector search. The
//! domain depends only on the trait; `engram`'s infrastructure layer
//! supplies concrete adapters.

mod crypto_service;
mod dlp_sanitizer;
mod embedder;
mod key_vault;
mod vector_index;

pub use crypto_service::{CryptoService, RecoveredKey, RecoverySource};
pub use dlp_sanitizer::{DlpSanitizer, SanitizeResult};
pub use embedder::Embedder;
pub use key_vault::KeyVault;
pub use vector_index::{ScoredMemoryId, VectorIndex};
