// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The MCP stdio surface: [`tools`] implements the twelve tools' response
//! formatting, [`transport`] frames them as line-delimited JSON-RPC.

pub mod tools;
pub mod transport;

pub use tools::{call_tool, tool_definitions, ToolResponse};
pub use transport::run_stdio_server;
