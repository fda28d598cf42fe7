// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Domain Error System
//!
//! A hierarchical error system for the memory and secrets engine. Errors are
//! categorized so that callers can distinguish crypto failures from storage
//! failures from configuration problems without parsing message strings.
//!
//! ## Error Categories
//!
//! - **Crypto**: `AuthError`, `FormatError`, `ChecksumMismatch`, `RecoveryError`
//! - **Storage**: `StorageError`, `VectorDimMismatch`
//! - **Network**: `NetworkError`
//! - **Setup**: `NotInitialized`, `ConfigError`
//! - **Catch-all**: `InternalError`, `SerializationError`
//!
//! Fallible operations return `Result<T, EngramError>`; the MCP facade is the
//! only layer that ever converts an error into a human-readable, non-fatal
//! response string (see `engram::presentation`). Every other layer propagates.

use thiserror::Error;

/// Stable, categorized error kinds for the Engram memory and secrets engine.
///
/// Each variant corresponds to one of the error kinds named in the system
/// design: crypto failures never leak partial plaintext, storage failures
/// carry enough context to diagnose a bad migration or disk issue, and
/// network failures are distinguished from local storage failures so callers
/// can decide whether a retry makes sense.
#[derive(Error, Debug, Clone)]
pub enum EngramError {
    /// Master or vault key absent when an operation required it.
    #[error("not initialized: {0}")]
    NotInitialized(String),

    /// AES-GCM tag verification failed, or RSA-OAEP unwrap failed.
    #[error("authentication failed: {0}")]
    AuthError(String),

    /// Malformed envelope, frontmatter, or recovery share.
    #[error("format error: {0}")]
    FormatError(String),

    /// A sync event's decrypted content did not match its stored checksum.
    #[error("checksum mismatch: {0}")]
    ChecksumMismatch(String),

    /// A vector's dimension did not match the store's configured dimension.
    #[error("vector dimension mismatch: {0}")]
    VectorDimMismatch(String),

    /// Database constraint violation or I/O failure.
    #[error("storage error: {0}")]
    StorageError(String),

    /// Non-2xx response (or transport failure) from a remote sync endpoint.
    #[error("network error: {0}")]
    NetworkError(String),

    /// Missing blind-index key, vault key, or sync configuration.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Insufficient or invalid Shamir shares during recovery.
    #[error("recovery error: {0}")]
    RecoveryError(String),

    /// Serialization/deserialization failure (JSON, frontmatter, etc).
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// Unexpected internal failure that doesn't fit another category.
    #[error("internal error: {0}")]
    InternalError(String),
}

impl EngramError {
    pub fn not_initialized(msg: impl Into<String>) -> Self {
        Self::NotInitialized(msg.into())
    }

    pub fn auth(msg: impl Into<String>) -> Self {
        Self::AuthError(msg.into())
    }

    pub fn format(msg: impl Into<String>) -> Self {
        Self::FormatError(msg.into())
    }

    pub fn checksum_mismatch(msg: impl Into<String>) -> Self {
        Self::ChecksumMismatch(msg.into())
    }

    pub fn vector_dim_mismatch(msg: impl Into<String>) -> Self {
        Self::VectorDimMismatch(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::StorageError(msg.into())
    }

    pub fn network(msg: impl Into<String>) -> Self {
        Self::NetworkError(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn recovery(msg: impl Into<String>) -> Self {
        Self::RecoveryError(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        Self::InternalError(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::SerializationError(msg.into())
    }

    /// Whether a caller might reasonably retry the operation that produced
    /// this error (transient network/storage conditions).
    pub fn is_recoverable(&self) -> bool {
        matches!(self, EngramError::NetworkError(_) | EngramError::StorageError(_))
    }

    /// Whether this error indicates a security-relevant failure (tampering,
    /// bad authentication, checksum mismatch) worth audit logging.
    pub fn is_security_error(&self) -> bool {
        matches!(
            self,
            EngramError::AuthError(_) | EngramError::ChecksumMismatch(_) | EngramError::RecoveryError(_)
        )
    }

    /// Single-word category name, used by the MCP facade's
    /// `"<Category> failed: <message>"` responses.
    pub fn category(&self) -> &'static str {
        match self {
            EngramError::NotInitialized(_) => "Initialization",
            EngramError::AuthError(_) => "Authentication",
            EngramError::FormatError(_) => "Format",
            EngramError::ChecksumMismatch(_) => "Integrity",
            EngramError::VectorDimMismatch(_) => "Vector",
            EngramError::StorageError(_) => "Storage",
            EngramError::NetworkError(_) => "Network",
            EngramError::ConfigError(_) => "Configuration",
            EngramError::RecoveryError(_) => "Recovery",
            EngramError::SerializationError(_) => "Serialization",
            EngramError::InternalError(_) => "Internal",
        }
    }
}
