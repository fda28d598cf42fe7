// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

mod sync_client;

pub use sync_client::{
    DeviceListEntry, PullResponse, PullSecretsResponse, PulledEvent, PulledSecretEvent, PushEventRequest,
    PushEventResponse, PushSecretRequest, SyncHttpClient,
};
