// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Parses OpenCode's `~/.local/share/opencode/project/**/storage/message/*.json`
//! message files: one JSON object per file with `role` and a `parts` array
//! of content blocks.

use super::super::parser::{ParsedFact, SessionParser};
use engram_domain::EngramError;
use serde_json::Value;
use std::path::Path;

pub struct OpenCodeSessionParser;

impl SessionParser for OpenCodeSessionParser {
    fn name(&self) -> &'static str {
        "opencode"
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.to_string_lossy().contains("/opencode/") && path.extension().is_some_and(|ext| ext == "json")
    }

    fn parse(&self, _path: &Path, content: &str) -> Result<Vec<ParsedFact>, EngramError> {
        let Ok(message) = serde_json::from_str::<Value>(content) else {
            return Err(EngramError::format("opencode message file was not valid JSON"));
        };
        if message.get("role").and_then(Value::as_str) != Some("assistant") {
            return Ok(Vec::new());
        }
        let text = message
            .get("parts")
            .and_then(Value::as_array)
            .map(|parts| {
                parts
                    .iter()
                    .filter(|p| p.get("type").and_then(Value::as_str) == Some("text"))
                    .filter_map(|p| p.get("text").and_then(Value::as_str))
                    .collect::<Vec<_>>()
                    .join("\n")
            })
            .unwrap_or_default();
        let text = text.trim();
        if text.is_empty() {
            return Ok(Vec::new());
        }
        Ok(vec![ParsedFact {
            content: text.to_string(),
            tags: vec!["opencode".to_string()],
            confidence: 0.7,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_text_parts_from_assistant_message() {
        let parser = OpenCodeSessionParser;
        let content = r#"{"role":"assistant","parts":[{"type":"text","text":"use pnpm, not npm"}]}"#;
        let facts = parser.parse(Path::new("msg_1.json"), content).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "use pnpm, not npm");
    }

    #[test]
    fn ignores_user_messages() {
        let parser = OpenCodeSessionParser;
        let content = r#"{"role":"user","parts":[{"type":"text","text":"hi"}]}"#;
        assert!(parser.parse(Path::new("msg_0.json"), content).unwrap().is_empty());
    }
}
