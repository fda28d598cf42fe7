// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Shutdown Coordination
//!
//! A single `tokio::sync::Notify`-backed token shared between the
//! signal-wait task and the MCP stdio loop. Cloning is cheap (an `Arc`
//! internally) so every long-running task can hold its own handle.

use std::sync::Arc;
use tokio::sync::Notify;

#[derive(Clone)]
pub struct ShutdownHandle {
    notify: Arc<Notify>,
    requested: Arc<std::sync::atomic::AtomicBool>,
}

impl ShutdownHandle {
    pub fn new() -> Self {
        Self {
            notify: Arc::new(Notify::new()),
            requested: Arc::new(std::sync::atomic::AtomicBool::new(false)),
        }
    }

    pub fn request_shutdown(&self) {
        self.requested.store(true, std::sync::atomic::Ordering::SeqCst);
        self.notify.notify_waiters();
    }

    pub fn is_shutdown_requested(&self) -> bool {
        self.requested.load(std::sync::atomic::Ordering::SeqCst)
    }

    pub async fn wait(&self) {
        if self.is_shutdown_requested() {
            return;
        }
        self.notify.notified().await;
    }
}

impl Default for ShutdownHandle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn wait_returns_immediately_after_request() {
        let handle = ShutdownHandle::new();
        handle.request_shutdown();
        tokio::time::timeout(std::time::Duration::from_millis(50), handle.wait())
            .await
            .expect("wait() should not block once shutdown was requested");
    }

    #[test]
    fn starts_without_shutdown_requested() {
        let handle = ShutdownHandle::new();
        assert!(!handle.is_shutdown_requested());
    }
}
