// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Engram
//!
//! Local-first, end-to-end-encrypted memory and secrets layer for AI
//! assistants. An assistant speaks to this crate over the stdio MCP
//! transport in [`presentation::mcp`]; everything underneath is layered
//! the way [`engram_domain`] defines it:
//!
//! ```text
//! presentation (MCP tools, CLI handlers)
//!        │
//!        ▼
//! application (MemoryStore, SecretsStore, IndexingService,
//!              SessionWatcher, sync engines, device authorization)
//!        │
//!        ▼
//! engram_domain (entities, value objects, ports)
//!        ▲
//!        │ implements ports
//! infrastructure (SQLite repositories, AES/RSA/Shamir crypto,
//!                 DLP sanitizer, brute-force vector index,
//!                 reqwest sync client)
//! ```

pub mod application;
pub mod infrastructure;
pub mod presentation;
