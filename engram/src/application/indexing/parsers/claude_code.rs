// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Parses Claude Code's `~/.claude/projects/**/*.jsonl` transcripts (also
//! recognized under a bare `claude-code` directory): one JSON object per
//! line, each a turn with a `type` of `user`/`assistant`/`summary`/
//! `progress`/`file-history-snapshot` and a `message.content` that is
//! either a plain string or an array of content blocks. Only user/assistant
//! turns carry anything worth remembering, and they're folded into a
//! single per-file summary rather than one fact per line — nobody wants
//! a memory per chat turn.

use super::super::parser::{ParsedFact, SessionParser};
use engram_domain::EngramError;
use serde_json::Value;
use std::path::Path;

const FIRST_USER_MESSAGE_LIMIT: usize = 200;
const LAST_ASSISTANT_TEXT_LIMIT: usize = 100;

pub struct ClaudeCodeSessionParser;

fn extract_text(content: &Value) -> String {
    match content {
        Value::String(s) => s.clone(),
        Value::Array(blocks) => blocks
            .iter()
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => String::new(),
    }
}

fn truncate(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let mut truncated: String = text.chars().take(limit).collect();
        truncated.push('\u{2026}');
        truncated
    }
}

/// The project name Claude Code would show in its own UI: the last
/// component of the first turn's `cwd`, falling back to the transcript
/// file's parent directory name when no turn carries one.
fn project_name(turns: &[Value], path: &Path) -> String {
    turns
        .iter()
        .find_map(|t| t.get("cwd").and_then(Value::as_str))
        .map(|cwd| Path::new(cwd).file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_else(|| cwd.to_string()))
        .or_else(|| path.parent().and_then(Path::file_name).map(|n| n.to_string_lossy().into_owned()))
        .unwrap_or_else(|| "unknown".to_string())
}

fn git_branch(turns: &[Value]) -> Option<String> {
    turns.iter().find_map(|t| t.get("gitBranch").and_then(Value::as_str)).map(str::to_string)
}

impl SessionParser for ClaudeCodeSessionParser {
    fn name(&self) -> &'static str {
        "claude-code"
    }

    fn can_parse(&self, path: &Path) -> bool {
        let path_str = path.to_string_lossy();
        (path_str.contains("/.claude/projects/") || path_str.contains("/claude-code/"))
            && path.extension().is_some_and(|ext| ext == "jsonl")
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<ParsedFact>, EngramError> {
        let turns: Vec<Value> = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .filter_map(|line| serde_json::from_str::<Value>(line).ok())
            .collect();

        let messages: Vec<(&str, String)> = turns
            .iter()
            .filter_map(|turn| {
                let kind = turn.get("type").and_then(Value::as_str)?;
                if kind != "user" && kind != "assistant" {
                    return None;
                }
                let text = turn.get("message").and_then(|m| m.get("content")).map(extract_text).unwrap_or_default();
                let text = text.trim().to_string();
                if text.is_empty() {
                    None
                } else {
                    Some((kind, text))
                }
            })
            .collect();

        if messages.is_empty() {
            return Ok(Vec::new());
        }

        let first_user = messages.iter().find(|(kind, _)| *kind == "user").map(|(_, text)| text.as_str());
        let last_assistant = messages.iter().rev().find(|(kind, _)| *kind == "assistant").map(|(_, text)| text.as_str());

        let mut summary = format!(
            "claude code session in {} ({} messages)",
            project_name(&turns, path),
            messages.len()
        );
        if let Some(branch) = git_branch(&turns) {
            summary.push_str(&format!(", branch {branch}"));
        }
        if let Some(first_user) = first_user {
            summary.push_str(&format!(". started with: {}", truncate(first_user, FIRST_USER_MESSAGE_LIMIT)));
        }
        if let Some(last_assistant) = last_assistant {
            summary.push_str(&format!(". last reply: {}", truncate(last_assistant, LAST_ASSISTANT_TEXT_LIMIT)));
        }

        Ok(vec![ParsedFact {
            content: summary,
            tags: vec!["claude-code".to_string()],
            confidence: 0.7,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summarizes_a_session_into_one_fact() {
        let parser = ClaudeCodeSessionParser;
        let content = concat!(
            r#"{"type":"user","cwd":"/home/me/repos/widget","gitBranch":"main","message":{"content":"how do I run the tests"}}"#,
            "\n",
            r#"{"type":"assistant","message":{"content":"cargo test --workspace"}}"#,
            "\n",
        );
        let facts = parser.parse(Path::new("/home/me/.claude/projects/widget/session.jsonl"), content).unwrap();
        assert_eq!(facts.len(), 1);
        let content = &facts[0].content;
        assert!(content.contains("widget"));
        assert!(content.contains("2 messages"));
        assert!(content.contains("branch main"));
        assert!(content.contains("how do I run the tests"));
        assert!(content.contains("cargo test --workspace"));
    }

    #[test]
    fn truncates_long_first_and_last_messages() {
        let parser = ClaudeCodeSessionParser;
        let long_user = "x".repeat(300);
        let long_assistant = "y".repeat(300);
        let content = format!(
            "{{\"type\":\"user\",\"message\":{{\"content\":\"{long_user}\"}}}}\n{{\"type\":\"assistant\",\"message\":{{\"content\":\"{long_assistant}\"}}}}\n"
        );
        let facts = parser.parse(Path::new("session.jsonl"), &content).unwrap();
        assert_eq!(facts.len(), 1);
        assert!(!facts[0].content.contains(&long_user));
        assert!(!facts[0].content.contains(&long_assistant));
    }

    #[test]
    fn ignores_non_message_turn_types() {
        let parser = ClaudeCodeSessionParser;
        let content = r#"{"type":"summary","summary":"unrelated"}"#;
        assert!(parser.parse(Path::new("session.jsonl"), content).unwrap().is_empty());
    }

    #[test]
    fn claims_claude_projects_and_claude_code_jsonl() {
        let parser = ClaudeCodeSessionParser;
        assert!(parser.can_parse(Path::new("/home/me/.claude/projects/foo/session.jsonl")));
        assert!(parser.can_parse(Path::new("/home/me/claude-code/foo/session.jsonl")));
        assert!(!parser.can_parse(Path::new("/home/me/.codex/sessions/foo.jsonl")));
    }
}
