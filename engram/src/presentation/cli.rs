// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Command Handlers
//!
//! Operator-facing subcommands (`init`, `status`, `recover`) that don't go
//! through MCP, plus `serve`'s startup sequence. Each handler prints its
//! user-facing output to stdout directly — none of these run concurrently
//! with the stdio MCP transport, so there's no framing to protect here.

use crate::application::{RecoveryService, VAULT_KEY_LABEL};
use crate::infrastructure::crypto::AesCryptoService;
use crate::infrastructure::keyvault::FileKeyVault;
use crate::presentation::mcp::run_stdio_server;
use crate::presentation::Engine;
use engram_bootstrap::{AppConfig, ShutdownHandle};
use engram_domain::entities::RecoveryShare;
use engram_domain::services::KeyVault;
use engram_domain::EngramError;
use std::sync::Arc;

/// `engram serve`: builds the composition root, starts the background
/// session watcher (best-effort), and runs the stdio MCP loop until EOF
/// or a shutdown signal.
pub async fn serve(config: &AppConfig) -> Result<(), EngramError> {
    let engine = Engine::bootstrap(config).await?;

    let _watcher = engine.start_session_watcher().await.unwrap_or_else(|e| {
        tracing::warn!(error = %e, "session watcher did not start");
        None
    });

    let shutdown = ShutdownHandle::new();
    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        engram_bootstrap::signals::wait_for_shutdown_signal().await;
        signal_shutdown.request_shutdown();
    });

    run_stdio_server(&engine, &shutdown)
        .await
        .map_err(|e| EngramError::internal(format!("stdio transport failed: {e}")))
}

/// `engram init`: generates a master key, stores it in the key vault, and
/// prints either a BIP39 mnemonic or a Shamir recovery kit depending on
/// `--shamir`.
pub async fn init(config: &AppConfig, shamir: Option<&str>) -> Result<(), EngramError> {
    std::fs::create_dir_all(&config.engram_path)
        .map_err(|e| EngramError::storage(format!("failed to create engram directory: {e}")))?;

    let key_vault: Arc<dyn KeyVault> = Arc::new(FileKeyVault::new(config.engram_path.join("keyvault")));
    let crypto = Arc::new(AesCryptoService::new(vec![0u8; 32], vec![0u8; 32]));
    let recovery = RecoveryService::new(crypto, key_vault, None);

    let mnemonic = recovery.initialize_vault().await?;

    match shamir {
        None => {
            println!("Vault initialized. Write down this recovery phrase and store it somewhere safe:");
            println!("{mnemonic}");
        }
        Some(spec) => {
            let (threshold, total) = parse_shamir_spec(spec)?;
            let kit = recovery.generate_recovery_kit("user".to_string(), threshold, total).await?;
            println!("Vault initialized. Distribute these {total} shares ({threshold} needed to recover):");
            for share in &kit.shares {
                use base64::Engine as _;
                println!("  share {}: {}", share.index, base64::engine::general_purpose::STANDARD.encode(&share.data));
            }
        }
    }

    Ok(())
}

/// Parses a `threshold-of-total` Shamir spec, e.g. `"3-of-5"`.
fn parse_shamir_spec(spec: &str) -> Result<(u8, u8), EngramError> {
    let (threshold_str, total_str) = spec
        .split_once("-of-")
        .ok_or_else(|| EngramError::format("--shamir expects \"<threshold>-of-<total>\", e.g. 3-of-5"))?;
    let threshold: u8 = threshold_str.trim().parse().map_err(|_| EngramError::format("invalid threshold"))?;
    let total: u8 = total_str.trim().parse().map_err(|_| EngramError::format("invalid total"))?;
    Ok((threshold, total))
}

/// `engram status`: reports whether the vault is initialized and, if so,
/// basic counts.
pub async fn status(config: &AppConfig) -> Result<(), EngramError> {
    let key_vault = FileKeyVault::new(config.engram_path.join("keyvault"));
    if key_vault.retrieve(VAULT_KEY_LABEL).await.is_err() {
        println!("Vault: not initialized (run `engram init`)");
        return Ok(());
    }

    let engine = Engine::bootstrap(config).await?;
    let memory_count = engine.memory_store.count().await?;
    let secrets = engine.secrets_store.list().await?;

    println!("Vault: initialized");
    println!("Device: {}", engine.device_id);
    println!("Memory count: {memory_count}");
    println!("Secret count: {}", secrets.len());
    println!("Sync backend: {}", if engine.memory_sync.is_some() { "configured" } else { "not configured" });

    Ok(())
}

/// `engram recover`: reinstalls the vault key from a mnemonic phrase or a
/// set of `index:base64data` Shamir shares.
pub async fn recover(config: &AppConfig, mnemonic: Option<&str>, raw_shares: &[String]) -> Result<(), EngramError> {
    std::fs::create_dir_all(&config.engram_path)
        .map_err(|e| EngramError::storage(format!("failed to create engram directory: {e}")))?;

    let key_vault: Arc<dyn KeyVault> = Arc::new(FileKeyVault::new(config.engram_path.join("keyvault")));
    let crypto = Arc::new(AesCryptoService::new(vec![0u8; 32], vec![0u8; 32]));
    let recovery = RecoveryService::new(crypto, key_vault, None);

    match (mnemonic, raw_shares.is_empty()) {
        (Some(phrase), _) => {
            recovery.recover_from_mnemonic(phrase).await?;
            println!("Vault key recovered from mnemonic.");
        }
        (None, false) => {
            let shares = raw_shares.iter().map(|s| parse_share(s)).collect::<Result<Vec<_>, _>>()?;
            let source = recovery.recover_from_shares(&shares).await?;
            println!("Vault key recovered from {} Shamir shares ({source:?}).", shares.len());
        }
        (None, true) => {
            return Err(EngramError::config("recover requires either --mnemonic or at least one --share"));
        }
    }

    Ok(())
}

/// Parses an `index:base64data` Shamir share.
fn parse_share(raw: &str) -> Result<RecoveryShare, EngramError> {
    let (index_str, data_b64) =
        raw.split_once(':').ok_or_else(|| EngramError::format("share must be \"<index>:<base64data>\""))?;
    let index: u8 = index_str.trim().parse().map_err(|_| EngramError::format("invalid share index"))?;

    use base64::Engine as _;
    let data = base64::engine::general_purpose::STANDARD
        .decode(data_b64.trim())
        .map_err(|e| EngramError::format(format!("invalid share data: {e}")))?;

    Ok(RecoveryShare { index, data })
}
