// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Parses `.claude/{skills,agents,commands}/**/*.md` frontmatter, including
//! the plugin-provided variant `.claude/plugins/.../{skills,agents,commands}/`
//! (spec's own "global scope" example). Only the flat `key: value` fields
//! these files actually use (`name`, `description`) are needed, so this
//! reads the `---`-delimited header by hand rather than pulling in a full
//! YAML parser for two scalar fields.

use super::super::parser::{ParsedFact, SessionParser};
use engram_domain::EngramError;
use std::path::Path;

pub struct FrontmatterParser;

fn kind_from_path(path: &Path) -> Option<&'static str> {
    let path_str = path.to_string_lossy();
    if path_str.contains("/.claude/skills/") || path_str.contains("/.claude/plugins/") && path_str.contains("/skills/") {
        Some("skill")
    } else if path_str.contains("/.claude/agents/") || path_str.contains("/.claude/plugins/") && path_str.contains("/agents/")
    {
        Some("agent")
    } else if path_str.contains("/.claude/commands/")
        || path_str.contains("/.claude/plugins/") && path_str.contains("/commands/")
    {
        Some("command")
    } else {
        None
    }
}

fn parse_frontmatter_fields(content: &str) -> Option<(Option<String>, Option<String>)> {
    let content = content.strip_prefix("---\n")?;
    let end = content.find("\n---")?;
    let header = &content[..end];

    let mut name = None;
    let mut description = None;
    for line in header.lines() {
        if let Some(value) = line.strip_prefix("name:") {
            name = Some(value.trim().trim_matches('"').to_string());
        } else if let Some(value) = line.strip_prefix("description:") {
            description = Some(value.trim().trim_matches('"').to_string());
        }
    }
    Some((name, description))
}

impl SessionParser for FrontmatterParser {
    fn name(&self) -> &'static str {
        "frontmatter"
    }

    fn can_parse(&self, path: &Path) -> bool {
        kind_from_path(path).is_some() && path.extension().is_some_and(|ext| ext == "md")
    }

    fn parse(&self, path: &Path, content: &str) -> Result<Vec<ParsedFact>, EngramError> {
        let kind = kind_from_path(path).unwrap_or("frontmatter");
        let Some((name, description)) = parse_frontmatter_fields(content) else {
            return Ok(Vec::new());
        };
        let Some(description) = description else {
            return Ok(Vec::new());
        };

        let fact_content = match name {
            Some(name) => format!("{kind} \"{name}\": {description}"),
            None => format!("{kind}: {description}"),
        };
        Ok(vec![ParsedFact {
            content: fact_content,
            tags: vec![kind.to_string()],
            confidence: 0.9,
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_name_and_description_from_skill_frontmatter() {
        let parser = FrontmatterParser;
        let content = "---\nname: deploy\ndescription: Deploys the current branch to staging\n---\n\nBody text.\n";
        let facts = parser.parse(Path::new("/repo/.claude/skills/deploy/SKILL.md"), content).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "skill \"deploy\": Deploys the current branch to staging");
        assert_eq!(facts[0].tags, vec!["skill".to_string()]);
    }

    #[test]
    fn ignores_files_outside_claude_dirs() {
        let parser = FrontmatterParser;
        assert!(!parser.can_parse(Path::new("/repo/README.md")));
    }

    #[test]
    fn recognizes_plugin_provided_skills() {
        let parser = FrontmatterParser;
        let path = Path::new("/home/me/.claude/plugins/foo/skills/bar.md");
        assert!(parser.can_parse(path));
        let content = "---\nname: bar\ndescription: Plugin-provided skill\n---\nBody.\n";
        let facts = parser.parse(path, content).unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "skill \"bar\": Plugin-provided skill");
    }

    #[test]
    fn skips_files_without_description() {
        let parser = FrontmatterParser;
        let content = "---\nname: deploy\n---\nBody.\n";
        let facts = parser.parse(Path::new("/repo/.claude/agents/deploy.md"), content).unwrap();
        assert!(facts.is_empty());
    }
}
