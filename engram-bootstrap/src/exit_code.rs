// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Exit Codes
//!
//! BSD sysexits.h-style codes so a calling assistant's process supervisor
//! can distinguish "vault not initialized" from "bad config" from
//! "storage corrupted" without parsing stderr.

#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Ok = 0,
    Usage = 64,
    DataError = 65,
    Unavailable = 69,
    Software = 70,
    IoError = 74,
    Config = 78,
}

impl From<ExitCode> for std::process::ExitCode {
    fn from(code: ExitCode) -> Self {
        std::process::ExitCode::from(code as u8)
    }
}

pub fn map_error_to_exit_code(error: &engram_domain::EngramError) -> ExitCode {
    match error {
        engram_domain::EngramError::NotInitialized(_) => ExitCode::Unavailable,
        engram_domain::EngramError::ConfigError(_) => ExitCode::Config,
        engram_domain::EngramError::AuthError(_)
        | engram_domain::EngramError::FormatError(_)
        | engram_domain::EngramError::ChecksumMismatch(_)
        | engram_domain::EngramError::RecoveryError(_) => ExitCode::DataError,
        engram_domain::EngramError::StorageError(_) | engram_domain::EngramError::VectorDimMismatch(_) => {
            ExitCode::IoError
        }
        engram_domain::EngramError::NetworkError(_) => ExitCode::Unavailable,
        engram_domain::EngramError::SerializationError(_) | engram_domain::EngramError::InternalError(_) => {
            ExitCode::Software
        }
    }
}

pub fn result_to_exit_code(result: Result<(), engram_domain::EngramError>) -> std::process::ExitCode {
    match result {
        Ok(()) => ExitCode::Ok.into(),
        Err(e) => {
            tracing::error!(error = %e, category = e.category(), "engram exiting with error");
            map_error_to_exit_code(&e).into()
        }
    }
}
