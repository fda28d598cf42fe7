// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stdio JSON-RPC Transport
//!
//! One JSON object per line on stdin, one per line on stdout (spec §6.1).
//! Stdout is reserved exclusively for this protocol — every log line
//! Engram emits goes to stderr (see `engram_bootstrap::logger`) so a
//! stray `println!` would be the only thing that could corrupt framing,
//! and there are none in this module.

use super::tools::{call_tool, tool_definitions};
use crate::presentation::Engine;
use engram_bootstrap::ShutdownHandle;
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};

const PROTOCOL_VERSION: &str = "2024-11-05";
const SERVER_NAME: &str = "engram";
const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

fn handle_initialize(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {
            "protocolVersion": PROTOCOL_VERSION,
            "serverInfo": {"name": SERVER_NAME, "version": SERVER_VERSION},
            "capabilities": {"tools": {}},
        },
    })
}

fn handle_tools_list(id: &Value) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {"tools": tool_definitions()},
    })
}

async fn handle_tools_call(engine: &Engine, id: &Value, params: &Value) -> Value {
    let name = params.get("name").and_then(Value::as_str).unwrap_or_default();
    let empty_args = json!({});
    let arguments = params.get("arguments").unwrap_or(&empty_args);

    let response = call_tool(engine, name, arguments).await;
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "result": {"content": response.content, "isError": response.is_error},
    })
}

fn method_not_found(id: &Value, method: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "error": {"code": -32601, "message": format!("method not found: {method}")},
    })
}

fn parse_error(raw: &str, err: &serde_json::Error) -> Value {
    tracing::warn!(line = raw, error = %err, "dropping unparseable JSON-RPC line");
    json!({
        "jsonrpc": "2.0",
        "id": Value::Null,
        "error": {"code": -32700, "message": "parse error"},
    })
}

/// Reads one JSON-RPC request per line from `stdin` until EOF or shutdown
/// is requested, dispatching each to the matching handler and writing
/// exactly one JSON-RPC response line back to `stdout`.
pub async fn run_stdio_server(engine: &Engine, shutdown: &ShutdownHandle) -> Result<(), std::io::Error> {
    let stdin = tokio::io::stdin();
    let mut stdout = tokio::io::stdout();
    let mut lines = BufReader::new(stdin).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = shutdown.wait() => {
                tracing::info!("shutdown requested, closing stdio transport");
                return Ok(());
            }
        };

        let Some(line) = line else {
            tracing::info!("stdin closed, shutting down");
            return Ok(());
        };
        if line.trim().is_empty() {
            continue;
        }

        let response = match serde_json::from_str::<Value>(&line) {
            Ok(request) => dispatch(engine, &request).await,
            Err(e) => parse_error(&line, &e),
        };

        let mut serialized = serde_json::to_string(&response).unwrap_or_else(|_| {
            json!({"jsonrpc": "2.0", "id": Value::Null, "error": {"code": -32603, "message": "internal error"}})
                .to_string()
        });
        serialized.push('\n');
        stdout.write_all(serialized.as_bytes()).await?;
        stdout.flush().await?;
    }
}

async fn dispatch(engine: &Engine, request: &Value) -> Value {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or_default();
    let empty_params = json!({});
    let params = request.get("params").unwrap_or(&empty_params);

    match method {
        "initialize" => handle_initialize(&id),
        "tools/list" => handle_tools_list(&id),
        "tools/call" => handle_tools_call(engine, &id, params).await,
        other => method_not_found(&id, other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initialize_advertises_tool_capability() {
        let response = handle_initialize(&json!(1));
        assert_eq!(response["result"]["capabilities"]["tools"], json!({}));
    }

    #[test]
    fn tools_list_returns_all_twelve_definitions() {
        let response = handle_tools_list(&json!(1));
        assert_eq!(response["result"]["tools"].as_array().unwrap().len(), 12);
    }

    #[test]
    fn unknown_method_is_reported_as_method_not_found() {
        let response = method_not_found(&json!(1), "bogus");
        assert_eq!(response["error"]["code"], json!(-32601));
    }
}
