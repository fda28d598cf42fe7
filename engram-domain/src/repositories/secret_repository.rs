// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secret Repository
//!
//! Persistence for `Secret` entities, keyed primarily by the unique
//! `key_name` the caller addresses them by.

use crate::entities::Secret;
use crate::value_objects::SecretId;
use crate::EngramError;
use async_trait::async_trait;

#[async_trait]
pub trait SecretRepository: Send + Sync {
    async fn save(&self, secret: &Secret) -> Result<(), EngramError>;

    async fn find_by_id(&self, id: SecretId) -> Result<Option<Secret>, EngramError>;

    async fn find_by_key_name(&self, key_name: &str) -> Result<Option<Secret>, EngramError>;

    async fn list_all(&self) -> Result<Vec<Secret>, EngramError>;

    async fn update(&self, secret: &Secret) -> Result<(), EngramError>;

    async fn delete_by_key_name(&self, key_name: &str) -> Result<(), EngramError>;

    async fn exists_by_key_name(&self, key_name: &str) -> Result<bool, EngramError>;
}
