// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Sync HTTP Client
//!
//! Thin wrapper over the remote sync backend (spec §6.4) — an external
//! collaborator this crate only consumes. Every request carries already
//! encrypted payloads; this client never sees plaintext.

use engram_domain::EngramError;
use reqwest::Client;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize)]
pub struct PushEventRequest {
    pub id: String,
    pub event_type: String,
    pub memory_id: String,
    pub encrypted_data: Option<String>,
    pub checksum: Option<String>,
    /// The memory's embedding, little-endian f32 components, so other
    /// devices can rebuild their vector index without re-embedding.
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PushEventResponse {
    pub blob_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PulledEvent {
    pub id: String,
    pub event_type: String,
    pub memory_id: String,
    pub encrypted_data: Option<String>,
    pub blob_url: Option<String>,
    pub checksum: Option<String>,
    pub sequence_num: u64,
    pub vector: Option<Vec<f32>>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullResponse {
    pub events: Vec<PulledEvent>,
    pub cursor: u64,
    pub has_more: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct PushSecretRequest {
    pub secret_id: String,
    pub event_type: String,
    pub encrypted_data: Option<String>,
    pub iv: Option<String>,
    pub checksum: Option<String>,
    pub blind_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PulledSecretEvent {
    pub secret_id: String,
    pub event_type: String,
    pub encrypted_data: Option<String>,
    pub iv: Option<String>,
    pub checksum: Option<String>,
    pub sequence_num: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PullSecretsResponse {
    pub events: Vec<PulledSecretEvent>,
    pub cursor: u64,
    pub has_more: bool,
}

pub struct SyncHttpClient {
    client: Client,
    base_url: String,
}

impl SyncHttpClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, EngramError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            Err(EngramError::network(format!(
                "remote sync backend returned {}",
                response.status()
            )))
        }
    }

    pub async fn push_memory_event(&self, request: &PushEventRequest) -> Result<PushEventResponse, EngramError> {
        let response = self
            .client
            .post(self.url("/api/sync/push"))
            .json(request)
            .send()
            .await
            .map_err(|e| EngramError::network(format!("push failed: {e}")))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| EngramError::network(format!("push response decode failed: {e}")))
    }

    pub async fn pull_memory_events(&self, cursor: Option<u64>) -> Result<PullResponse, EngramError> {
        let mut url = self.url("/api/sync/pull");
        if let Some(cursor) = cursor {
            url = format!("{url}?cursor={cursor}");
        }
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EngramError::network(format!("pull failed: {e}")))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| EngramError::network(format!("pull response decode failed: {e}")))
    }

    pub async fn fetch_blob(&self, blob_url: &str) -> Result<Vec<u8>, EngramError> {
        let response = self
            .client
            .get(blob_url)
            .send()
            .await
            .map_err(|e| EngramError::network(format!("blob fetch failed: {e}")))?;
        let response = Self::check_status(response).await?;
        response
            .bytes()
            .await
            .map(|b| b.to_vec())
            .map_err(|e| EngramError::network(format!("blob read failed: {e}")))
    }

    pub async fn push_secret_event(&self, request: &PushSecretRequest) -> Result<(), EngramError> {
        let response = self
            .client
            .post(self.url("/api/secrets/push"))
            .json(request)
            .send()
            .await
            .map_err(|e| EngramError::network(format!("secret push failed: {e}")))?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn pull_secret_events(&self, cursor: Option<u64>) -> Result<PullSecretsResponse, EngramError> {
        let mut url = self.url("/api/secrets/pull");
        if let Some(cursor) = cursor {
            url = format!("{url}?cursor={cursor}");
        }
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| EngramError::network(format!("secret pull failed: {e}")))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| EngramError::network(format!("secret pull response decode failed: {e}")))
    }

    pub async fn authorize_device(&self, device_id: &str, wrapped_vault_key_b64: &str) -> Result<(), EngramError> {
        #[derive(Serialize)]
        struct Body<'a> {
            device_id: &'a str,
            wrapped_vault_key: &'a str,
        }
        let response = self
            .client
            .post(self.url("/api/devices/authorize"))
            .json(&Body {
                device_id,
                wrapped_vault_key: wrapped_vault_key_b64,
            })
            .send()
            .await
            .map_err(|e| EngramError::network(format!("authorize failed: {e}")))?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn revoke_device(&self, device_id: &str) -> Result<(), EngramError> {
        let response = self
            .client
            .post(self.url(&format!("/api/devices/{device_id}/revoke")))
            .send()
            .await
            .map_err(|e| EngramError::network(format!("revoke failed: {e}")))?;
        Self::check_status(response).await?;
        Ok(())
    }

    pub async fn list_devices(&self) -> Result<Vec<DeviceListEntry>, EngramError> {
        let response = self
            .client
            .get(self.url("/api/devices"))
            .send()
            .await
            .map_err(|e| EngramError::network(format!("list devices failed: {e}")))?;
        let response = Self::check_status(response).await?;
        response
            .json()
            .await
            .map_err(|e| EngramError::network(format!("device list decode failed: {e}")))
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct DeviceListEntry {
    pub id: String,
    pub name: Option<String>,
    pub last_sync_at: Option<String>,
}
