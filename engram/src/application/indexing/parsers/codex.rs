// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Parses Codex CLI's `~/.codex/sessions/**/*.jsonl` rollouts: one JSON
//! object per line with a `role` and `content` field, mirroring the OpenAI
//! chat message shape rather than Claude Code's `type`/`message` nesting.

use super::super::parser::{ParsedFact, SessionParser};
use engram_domain::EngramError;
use serde_json::Value;
use std::path::Path;

pub struct CodexSessionParser;

impl SessionParser for CodexSessionParser {
    fn name(&self) -> &'static str {
        "codex"
    }

    fn can_parse(&self, path: &Path) -> bool {
        path.to_string_lossy().contains("/.codex/sessions/") && path.extension().is_some_and(|ext| ext == "jsonl")
    }

    fn parse(&self, _path: &Path, content: &str) -> Result<Vec<ParsedFact>, EngramError> {
        let mut facts = Vec::new();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Ok(turn) = serde_json::from_str::<Value>(line) else {
                continue;
            };
            if turn.get("role").and_then(Value::as_str) != Some("assistant") {
                continue;
            }
            let text = turn.get("content").and_then(Value::as_str).unwrap_or_default().trim();
            if text.is_empty() {
                continue;
            }
            facts.push(ParsedFact {
                content: text.to_string(),
                tags: vec!["codex".to_string()],
                confidence: 0.7,
            });
        }
        Ok(facts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_assistant_role_turns() {
        let parser = CodexSessionParser;
        let content = "{\"role\":\"user\",\"content\":\"hi\"}\n{\"role\":\"assistant\",\"content\":\"tests live under tests/\"}\n";
        let facts = parser.parse(Path::new("rollout.jsonl"), content).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "tests live under tests/");
    }
}
