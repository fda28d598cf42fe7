// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Parses Cursor's exported chat JSON: a top-level `messages` array, each
//! entry a `{"role": ..., "text": ...}` object rather than the content-block
//! shape the other assistants use.

use super::super::parser::{ParsedFact, SessionParser};
use engram_domain::EngramError;
use serde_json::Value;
use std::path::Path;

pub struct CursorSessionParser;

impl SessionParser for CursorSessionParser {
    fn name(&self) -> &'static str {
        "cursor"
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.to_string_lossy().contains("/.cursor/") && path.extension().is_some_and(|ext| ext == "json")
    }

    fn parse(&self, _path: &Path, content: &str) -> Result<Vec<ParsedFact>, EngramError> {
        let Ok(doc) = serde_json::from_str::<Value>(content) else {
            return Err(EngramError::format("cursor chat export was not valid JSON"));
        };
        let Some(messages) = doc.get("messages").and_then(Value::as_array) else {
            return Ok(Vec::new());
        };

        let facts = messages
            .iter()
            .filter(|m| m.get("role").and_then(Value::as_str) == Some("assistant"))
            .filter_map(|m| m.get("text").and_then(Value::as_str))
            .map(str::trim)
            .filter(|text| !text.is_empty())
            .map(|text| ParsedFact {
                content: text.to_string(),
                tags: vec!["cursor".to_string()],
                confidence: 0.7,
            })
            .collect();
        Ok(facts)
    }
}
