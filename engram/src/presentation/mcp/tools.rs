// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # MCP Tools
//!
//! The twelve tools an assistant calls over the stdio transport (spec
//! §4.8). Every handler is a thin translation from JSON arguments to an
//! application-service call and back to a formatted text response; none
//! of them throws — [`call_tool`] catches every `EngramError` and turns
//! it into `{isError: true, content: [...]}` instead.

use crate::application::memory_store::CreateMemoryInput;
use crate::presentation::Engine;
use engram_domain::value_objects::MemoryId;
use engram_domain::EngramError;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Clone, Serialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub kind: String,
    pub text: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ToolResponse {
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError", skip_serializing_if = "std::ops::Not::not")]
    pub is_error: bool,
}

impl ToolResponse {
    fn ok(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem { kind: "text".to_string(), text: text.into() }],
            is_error: false,
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem { kind: "text".to_string(), text: text.into() }],
            is_error: true,
        }
    }
}

/// Takes the first `max_chars` characters of `s`, operating on `char`
/// boundaries so multi-byte UTF-8 content is never split mid-codepoint.
/// Callers append the ellipsis themselves (spec §4.8's formats always
/// show one, even when the content was shorter than the limit).
fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

fn arg_str<'a>(args: &'a Value, key: &str) -> Option<&'a str> {
    args.get(key).and_then(Value::as_str)
}

fn arg_usize(args: &Value, key: &str, default: usize) -> usize {
    args.get(key).and_then(Value::as_u64).map(|v| v as usize).unwrap_or(default)
}

fn arg_u8(args: &Value, key: &str, default: u8) -> u8 {
    args.get(key).and_then(Value::as_u64).map(|v| v as u8).unwrap_or(default)
}

fn arg_string_list(args: &Value, key: &str) -> Vec<String> {
    args.get(key)
        .and_then(Value::as_array)
        .map(|items| items.iter().filter_map(Value::as_str).map(str::to_string).collect())
        .unwrap_or_default()
}

/// The twelve supported tool names, in the order `tools/list` advertises
/// them.
pub const TOOL_NAMES: &[&str] = &[
    "mcp_save_memory",
    "mcp_read_memory",
    "mcp_delete_memory",
    "mcp_list_memories",
    "mcp_memory_status",
    "mcp_find_similar_sessions",
    "mcp_get_secret",
    "mcp_set_secret",
    "mcp_authorize_device",
    "mcp_revoke_device",
    "mcp_list_devices",
    "mcp_create_recovery_kit",
];

/// JSON-Schema input descriptors for `tools/list` (spec §6.1).
pub fn tool_definitions() -> Vec<Value> {
    vec![
        json!({
            "name": "mcp_save_memory",
            "description": "Save a new memory, sanitizing it for sensitive data first.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "content": {"type": "string"},
                    "tags": {"type": "array", "items": {"type": "string"}},
                },
                "required": ["content"],
            },
        }),
        json!({
            "name": "mcp_read_memory",
            "description": "Search stored memories by semantic similarity to a query.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "limit": {"type": "integer", "default": 5},
                },
                "required": ["query"],
            },
        }),
        json!({
            "name": "mcp_delete_memory",
            "description": "Delete a memory by id.",
            "inputSchema": {
                "type": "object",
                "properties": {"memory_id": {"type": "string"}},
                "required": ["memory_id"],
            },
        }),
        json!({
            "name": "mcp_list_memories",
            "description": "List recent memories, optionally filtered by source.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "limit": {"type": "integer", "default": 10},
                    "source": {"type": "string"},
                },
            },
        }),
        json!({
            "name": "mcp_memory_status",
            "description": "Report memory count and embedding model readiness.",
            "inputSchema": {"type": "object", "properties": {}},
        }),
        json!({
            "name": "mcp_find_similar_sessions",
            "description": "Find past assistant sessions related to a stated intent.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "intent": {"type": "string"},
                    "limit": {"type": "integer", "default": 3},
                },
                "required": ["intent"],
            },
        }),
        json!({
            "name": "mcp_get_secret",
            "description": "Retrieve a stored secret's plaintext value.",
            "inputSchema": {
                "type": "object",
                "properties": {"key_name": {"type": "string"}},
                "required": ["key_name"],
            },
        }),
        json!({
            "name": "mcp_set_secret",
            "description": "Store or update a secret.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "key_name": {"type": "string"},
                    "value": {"type": "string"},
                    "description": {"type": "string"},
                },
                "required": ["key_name", "value"],
            },
        }),
        json!({
            "name": "mcp_authorize_device",
            "description": "Authorize a new device to receive the vault key.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "device_id": {"type": "string"},
                    "device_public_key_pem": {"type": "string"},
                },
                "required": ["device_id", "device_public_key_pem"],
            },
        }),
        json!({
            "name": "mcp_revoke_device",
            "description": "Revoke a previously authorized device.",
            "inputSchema": {
                "type": "object",
                "properties": {"device_id": {"type": "string"}},
                "required": ["device_id"],
            },
        }),
        json!({
            "name": "mcp_list_devices",
            "description": "List devices authorized for this vault.",
            "inputSchema": {"type": "object", "properties": {}},
        }),
        json!({
            "name": "mcp_create_recovery_kit",
            "description": "Split the vault key into a Shamir recovery kit.",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "shares": {"type": "integer", "default": 5},
                    "threshold": {"type": "integer", "default": 3},
                },
            },
        }),
    ]
}

/// Dispatches `name` to its handler, catching any `EngramError` so the
/// transport never sees an exception (spec §4.8).
pub async fn call_tool(engine: &Engine, name: &str, arguments: &Value) -> ToolResponse {
    let result = match name {
        "mcp_save_memory" => save_memory(engine, arguments).await,
        "mcp_read_memory" => read_memory(engine, arguments).await,
        "mcp_delete_memory" => delete_memory(engine, arguments).await,
        "mcp_list_memories" => list_memories(engine, arguments).await,
        "mcp_memory_status" => memory_status(engine).await,
        "mcp_find_similar_sessions" => find_similar_sessions(engine, arguments).await,
        "mcp_get_secret" => get_secret(engine, arguments).await,
        "mcp_set_secret" => set_secret(engine, arguments).await,
        "mcp_authorize_device" => authorize_device(engine, arguments).await,
        "mcp_revoke_device" => revoke_device(engine, arguments).await,
        "mcp_list_devices" => list_devices(engine).await,
        "mcp_create_recovery_kit" => create_recovery_kit(engine, arguments).await,
        other => Err(EngramError::format(format!("unknown tool: {other}"))),
    };

    match result {
        Ok(text) => ToolResponse::ok(text),
        Err(e) => ToolResponse::error(format!("{} failed: {}", e.category(), e)),
    }
}

async fn save_memory(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let content = arg_str(args, "content").ok_or_else(|| EngramError::format("content is required"))?;
    let tags = arg_string_list(args, "tags");

    let vector = engine.embedder.embed(content).await?;
    let memory = engine
        .memory_store
        .create(CreateMemoryInput { content: content.to_string(), tags, source: None, confidence: None }, vector)
        .await?;

    Ok(format!("Remembered: \"{}\u{2026}\" (ID: {})", truncate(&memory.content, 100), memory.id))
}

async fn read_memory(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let query = arg_str(args, "query").ok_or_else(|| EngramError::format("query is required"))?;
    let limit = arg_usize(args, "limit", 5);

    let vector = engine.embedder.embed(query).await?;
    let hits = engine.memory_store.search(&vector, limit, None).await?;
    if hits.is_empty() {
        return Ok("No relevant memories found.".to_string());
    }

    let lines: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, (memory, distance))| {
            let mut line = format!("{}. {}", i + 1, memory.content);
            if !memory.tags.is_empty() {
                line.push_str(&format!(" [{}]", memory.tags.as_slice().join(", ")));
            }
            if memory.is_verified {
                line.push_str(" (verified)");
            }
            line.push_str(&format!(" (similarity: {:.3})", 1.0 - distance));
            line
        })
        .collect();

    Ok(lines.join("\n"))
}

async fn delete_memory(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let raw_id = arg_str(args, "memory_id").ok_or_else(|| EngramError::format("memory_id is required"))?;
    let id = MemoryId::parse(raw_id).map_err(|e| EngramError::format(e.to_string()))?;

    if engine.memory_store.delete(id).await? {
        Ok(format!("Memory {raw_id} has been deleted."))
    } else {
        Ok(format!("Memory {raw_id} not found."))
    }
}

async fn list_memories(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let limit = arg_usize(args, "limit", 10);
    let source = arg_str(args, "source");

    let memories = engine.memory_store.list(limit, 0, source).await?;
    if memories.is_empty() {
        return Ok("No memories stored.".to_string());
    }

    let lines: Vec<String> = memories
        .iter()
        .enumerate()
        .map(|(i, memory)| {
            let date = memory.created_at.format("%Y-%m-%d");
            let tags = memory.tags.as_slice().join(", ");
            format!("{}. [{}] {}\u{2026} [{}]", i + 1, date, truncate(&memory.content, 80), tags)
        })
        .collect();

    Ok(lines.join("\n"))
}

async fn memory_status(engine: &Engine) -> Result<String, EngramError> {
    let count = engine.memory_store.count().await?;
    let embedding_status = if engine.embedder.is_loading() {
        "Loading..."
    } else if engine.embedder.is_ready() {
        "Ready"
    } else {
        "Not loaded"
    };

    Ok(format!("Memory count: {count}\nEmbedding model: {embedding_status}"))
}

async fn find_similar_sessions(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    const SESSION_INDEX_TAG: &str = "session-index";

    let intent = arg_str(args, "intent").ok_or_else(|| EngramError::format("intent is required"))?;
    let limit = arg_usize(args, "limit", 3);

    let vector = engine.embedder.embed(intent).await?;
    let hits = engine.memory_store.search(&vector, limit * 2, None).await?;

    let matches: Vec<String> = hits
        .into_iter()
        .filter(|(memory, _)| memory.tags.contains(SESSION_INDEX_TAG))
        .take(limit)
        .enumerate()
        .map(|(i, (memory, distance))| {
            let mut line = format!("{}. {}\nSimilarity: {:.2}", i + 1, memory.content, 1.0 - distance);
            if let Some(source) = &memory.source {
                line.push_str(&format!("\nPath: {source}"));
            }
            line
        })
        .collect();

    if matches.is_empty() {
        Ok("No relevant sessions found.".to_string())
    } else {
        Ok(matches.join("\n\n"))
    }
}

async fn get_secret(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let key_name = arg_str(args, "key_name").ok_or_else(|| EngramError::format("key_name is required"))?;
    match engine.secrets_store.get(key_name).await? {
        Some(value) => Ok(value),
        None => Ok(format!("Secret \"{key_name}\" not found.")),
    }
}

async fn set_secret(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let key_name = arg_str(args, "key_name").ok_or_else(|| EngramError::format("key_name is required"))?;
    let value = arg_str(args, "value").ok_or_else(|| EngramError::format("value is required"))?;
    let description = arg_str(args, "description").map(str::to_string);

    engine.secrets_store.set(key_name, value, description).await?;
    Ok(format!("Secret \"{key_name}\" has been set."))
}

async fn authorize_device(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let device_id = arg_str(args, "device_id").ok_or_else(|| EngramError::format("device_id is required"))?;
    let device_public_key_pem =
        arg_str(args, "device_public_key_pem").ok_or_else(|| EngramError::format("device_public_key_pem is required"))?;

    engine.recovery_service.authorize_device(device_id, device_public_key_pem).await?;
    Ok(format!("Device {device_id} has been authorized."))
}

async fn revoke_device(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let device_id = arg_str(args, "device_id").ok_or_else(|| EngramError::format("device_id is required"))?;
    engine.recovery_service.revoke_device(device_id).await?;
    Ok(format!("Device {device_id} has been revoked."))
}

async fn list_devices(engine: &Engine) -> Result<String, EngramError> {
    let devices = engine.recovery_service.list_devices().await?;
    if devices.is_empty() {
        return Ok("No authorized devices.".to_string());
    }

    let lines: Vec<String> = devices
        .iter()
        .map(|d| format!("{} ({})", d.name.as_deref().unwrap_or("unnamed"), d.id))
        .collect();
    Ok(lines.join("\n"))
}

async fn create_recovery_kit(engine: &Engine, args: &Value) -> Result<String, EngramError> {
    let total = arg_u8(args, "shares", 5);
    let threshold = arg_u8(args, "threshold", 3);

    let kit = engine.recovery_service.generate_recovery_kit("user".to_string(), threshold, total).await?;

    use base64::Engine as _;
    let mut lines = vec![format!("Recovery kit: {} of {} shares required to recover.", kit.threshold, kit.total)];
    for share in &kit.shares {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&share.data);
        lines.push(format!("Share {}: {}\u{2026}", share.index, truncate(&encoded, 20)));
    }
    lines.push("Distribute each share to a different trustee. Do not store them together.".to_string());

    Ok(lines.join("\n"))
}
