// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pattern-Based DLP Sanitizer
//!
//! Patterns are tried in registration order. Each pattern's matches are
//! all replaced before moving to the next pattern, so a later pattern
//! never re-matches text a prior pattern already substituted — the
//! registration order *is* the documented resolution for overlapping
//! matches (spec §9, open question (c)).

use engram_domain::services::{DlpSanitizer, SanitizeResult};
use regex::Regex;

struct Pattern {
    label: &'static str,
    regex: Regex,
}

pub struct RegexDlpSanitizer {
    patterns: Vec<Pattern>,
}

impl RegexDlpSanitizer {
    /// Builds the sanitizer with the minimum pattern set spec §4.2
    /// requires. Custom patterns may be appended afterward with
    /// [`RegexDlpSanitizer::with_pattern`]; order of registration is
    /// preserved.
    pub fn new() -> Self {
        let mut sanitizer = Self { patterns: Vec::new() };
        sanitizer
            .register("OPENAI_KEY", r"sk-[A-Za-z0-9]{48}")
            .register("OPENAI_PROJECT_KEY", r"sk-proj-[A-Za-z0-9_-]{20,}")
            .register("ANTHROPIC_KEY", r"sk-ant-[A-Za-z0-9_-]{20,}")
            .register("GITHUB_TOKEN", r"ghp_[A-Za-z0-9]{36}")
            .register("GITHUB_FINE_GRAINED_PAT", r"github_pat_[A-Za-z0-9_]{20,}")
            .register("STRIPE_LIVE_KEY", r"(sk|rk)_live_[A-Za-z0-9]{20,}")
            .register("AWS_ACCESS_KEY_ID", r"(AKIA|ASIA)[A-Z0-9]{16}")
            .register("SLACK_TOKEN", r"xox[baprs]-[A-Za-z0-9-]{10,}")
            .register("GOOGLE_API_KEY", r"AIza[A-Za-z0-9_-]{35}")
            .register("DATABASE_URL", r"[a-z][a-z0-9+.-]*://[^\s:@/]+:[^\s:@/]+@[^\s/]+")
            .register("PEM_PRIVATE_KEY", r"-----BEGIN [A-Z ]*PRIVATE KEY-----[\s\S]*?-----END [A-Z ]*PRIVATE KEY-----")
            .register("BEARER_TOKEN", r"Bearer [A-Za-z0-9._-]{20,}");
        sanitizer
    }

    /// Registers an additional pattern after the built-in set, preserving
    /// insertion order.
    pub fn register(&mut self, label: &'static str, pattern: &str) -> &mut Self {
        let regex = Regex::new(pattern).unwrap_or_else(|e| panic!("invalid DLP pattern {label}: {e}"));
        self.patterns.push(Pattern { label, regex });
        self
    }
}

impl Default for RegexDlpSanitizer {
    fn default() -> Self {
        Self::new()
    }
}

impl DlpSanitizer for RegexDlpSanitizer {
    fn sanitize(&self, content: &str) -> SanitizeResult {
        let mut sanitized = content.to_string();
        let mut redaction_count = 0;

        for pattern in &self.patterns {
            let placeholder = format!("{{{{SECRET:{}}}}}", pattern.label);
            let mut matched = false;
            let rewritten = pattern.regex.replace_all(&sanitized, |_: &regex::Captures| {
                matched = true;
                redaction_count += 1;
                placeholder.clone()
            });
            if matched {
                sanitized = rewritten.into_owned();
            }
        }

        SanitizeResult {
            sanitized,
            redaction_count,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_is_untouched() {
        let result = RegexDlpSanitizer::new().sanitize("");
        assert_eq!(result.sanitized, "");
        assert_eq!(result.redaction_count, 0);
    }

    #[test]
    fn redacts_an_openai_key_without_leaking_it() {
        let key = format!("sk-{}", "a".repeat(48));
        let content = format!("My OpenAI key is {key} and I use it daily");
        let result = RegexDlpSanitizer::new().sanitize(&content);
        assert!(!result.sanitized.contains(&key));
        assert!(result.sanitized.contains("{{SECRET:OPENAI_KEY}}"));
        assert_eq!(result.redaction_count, 1);
    }

    #[test]
    fn sanitizing_twice_is_idempotent() {
        let key = format!("sk-{}", "b".repeat(48));
        let sanitizer = RegexDlpSanitizer::new();
        let first = sanitizer.sanitize(&format!("key: {key}"));
        let second = sanitizer.sanitize(&first.sanitized);
        assert_eq!(second.sanitized, first.sanitized);
        assert_eq!(second.redaction_count, 0);
    }

    #[test]
    fn clean_text_has_zero_redactions() {
        let result = RegexDlpSanitizer::new().sanitize("Rust uses ownership and borrowing");
        assert_eq!(result.redaction_count, 0);
        assert_eq!(result.sanitized, "Rust uses ownership and borrowing");
    }
}
