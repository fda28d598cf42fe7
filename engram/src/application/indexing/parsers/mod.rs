// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

mod claude_code;
mod codex;
mod cursor;
mod frontmatter;
mod opencode;

pub use claude_code::ClaudeCodeSessionParser;
pub use codex::CodexSessionParser;
pub use cursor::CursorSessionParser;
pub use frontmatter::FrontmatterParser;
pub use opencode::OpenCodeSessionParser;

use super::parser::SessionParser;
use std::sync::Arc;

/// The default parser set, tried in this order against every ingested path.
pub fn default_parsers() -> Vec<Arc<dyn SessionParser>> {
    vec![
        Arc::new(ClaudeCodeSessionParser),
        Arc::new(CodexSessionParser),
        Arc::new(OpenCodeSessionParser),
        Arc::new(CursorSessionParser),
        Arc::new(FrontmatterParser),
    ]
}
