// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Tag List
//!
//! An ordered list of tag strings attached to a memory. Order is preserved
//! (it's user- and caller-meaningful) but duplicates are never allowed, and
//! the `dlp-redacted` sentinel tag is managed here rather than scattered
//! across the memory store.

use serde::{Deserialize, Serialize};

/// Sentinel tag the memory store adds whenever the DLP sanitizer fires.
pub const DLP_REDACTED_TAG: &str = "dlp-redacted";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TagList(Vec<String>);

impl TagList {
    pub fn new(tags: Vec<String>) -> Self {
        let mut list = Self::default();
        for tag in tags {
            list.push(tag);
        }
        list
    }

    /// Appends a tag, skipping it if already present.
    pub fn push(&mut self, tag: impl Into<String>) {
        let tag = tag.into();
        if !self.0.contains(&tag) {
            self.0.push(tag);
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.0.iter().any(|t| t == tag)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.0
    }

    pub fn into_vec(self) -> Vec<String> {
        self.0
    }

    /// Ensures `dlp-redacted` is present exactly once. Called whenever the
    /// sanitizer reports at least one substitution, whether on create or on
    /// an update that supplies a fresh tag list omitting it.
    pub fn ensure_dlp_redacted(&mut self) {
        self.push(DLP_REDACTED_TAG);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl IntoIterator for TagList {
    type Item = String;
    type IntoIter = std::vec::IntoIter<String>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_deduplicates() {
        let mut tags = TagList::new(vec!["rust".into(), "rust".into()]);
        assert_eq!(tags.as_slice(), &["rust".to_string()]);
        tags.push("rust");
        assert_eq!(tags.len(), 1);
    }

    #[test]
    fn ensure_dlp_redacted_is_idempotent() {
        let mut tags = TagList::new(vec!["programming".into()]);
        tags.ensure_dlp_redacted();
        tags.ensure_dlp_redacted();
        assert_eq!(
            tags.as_slice(),
            &["programming".to_string(), DLP_REDACTED_TAG.to_string()]
        );
    }

    #[test]
    fn preserves_insertion_order() {
        let tags = TagList::new(vec!["b".into(), "a".into(), "c".into()]);
        assert_eq!(tags.as_slice(), &["b".to_string(), "a".to_string(), "c".to_string()]);
    }
}
