// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # File Key Vault
//!
//! The fallback `KeyVault` for platforms without an OS keychain binding
//! (spec §9 "the OS keychain ... consumed as an opaque `KeyVault`"):
//! one file per label under `<engram_path>/keyvault/`, base64-encoded,
//! with owner-only Unix permissions. Real OS-keychain adapters (macOS
//! Keychain, libsecret, Credential Manager) are out of this crate's scope
//! and would implement the same trait.

use async_trait::async_trait;
use base64::Engine;
use engram_domain::services::KeyVault;
use engram_domain::EngramError;
use std::path::PathBuf;

pub struct FileKeyVault {
    root: PathBuf,
}

impl FileKeyVault {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    fn path_for(&self, label: &str) -> PathBuf {
        self.root.join(format!("{label}.key"))
    }
}

#[async_trait]
impl KeyVault for FileKeyVault {
    async fn store(&self, label: &str, key_bytes: &[u8]) -> Result<(), EngramError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|e| EngramError::storage(format!("failed to create key vault directory: {e}")))?;

        let encoded = base64::engine::general_purpose::STANDARD.encode(key_bytes);
        let path = self.path_for(label);
        tokio::fs::write(&path, encoded.as_bytes())
            .await
            .map_err(|e| EngramError::storage(format!("failed to write key vault entry: {e}")))?;

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let perms = std::fs::Permissions::from_mode(0o600);
            tokio::fs::set_permissions(&path, perms)
                .await
                .map_err(|e| EngramError::storage(format!("failed to restrict key vault permissions: {e}")))?;
        }

        Ok(())
    }

    async fn retrieve(&self, label: &str) -> Result<Vec<u8>, EngramError> {
        let path = self.path_for(label);
        let encoded = tokio::fs::read_to_string(&path)
            .await
            .map_err(|_| EngramError::not_initialized(format!("no key stored under {label}")))?;
        base64::engine::general_purpose::STANDARD
            .decode(encoded.trim())
            .map_err(|e| EngramError::format(format!("corrupt key vault entry: {e}")))
    }

    async fn delete(&self, label: &str) -> Result<(), EngramError> {
        let path = self.path_for(label);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EngramError::storage(format!("failed to delete key vault entry: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn stores_and_retrieves_a_key() {
        let dir = tempdir().unwrap();
        let vault = FileKeyVault::new(dir.path().join("keyvault"));
        vault.store("engram_vault_key", &[1, 2, 3, 4]).await.unwrap();
        assert_eq!(vault.retrieve("engram_vault_key").await.unwrap(), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn retrieve_missing_label_is_not_initialized() {
        let dir = tempdir().unwrap();
        let vault = FileKeyVault::new(dir.path().join("keyvault"));
        let err = vault.retrieve("absent").await.unwrap_err();
        assert!(matches!(err, EngramError::NotInitialized(_)));
    }

    #[tokio::test]
    async fn delete_is_idempotent() {
        let dir = tempdir().unwrap();
        let vault = FileKeyVault::new(dir.path().join("keyvault"));
        vault.store("k", &[9]).await.unwrap();
        vault.delete("k").await.unwrap();
        vault.delete("k").await.unwrap();
        assert!(vault.retrieve("k").await.is_err());
    }
}
