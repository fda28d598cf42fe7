// /////////////////////////////////////////////////////////////////////////////
// Engram
// Copyright (c) 2025 Michael Gardner, A Bit of Help, Inc.
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Session Watcher
//!
//! Bridges `notify`'s filesystem events into `IndexingService::ingest_file`/
//! `remove_path` calls. Every watched root is scanned once at startup so
//! files written before Engram was running still get indexed (spec §4.6);
//! after that, only live filesystem events drive ingestion.

use crate::application::indexing::{IndexEvent, IndexingService};
use engram_domain::EngramError;
use notify::{Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

/// Whether `path`'s own filename looks like a hidden/editor-temp file
/// (`.foo.swp`, `.DS_Store`). Applied to the final path segment only, so a
/// dotfile-named watch root like `~/.claude` is never excluded by this
/// check — only files emitted from *within* it are.
fn is_hidden_entry(path: &Path) -> bool {
    path.file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.starts_with('.'))
}

async fn scan_existing(root: &Path, indexing: &IndexingService) {
    let mut stack = vec![root.to_path_buf()];
    while let Some(dir) = stack.pop() {
        let Ok(mut entries) = tokio::fs::read_dir(&dir).await else {
            continue;
        };
        while let Ok(Some(entry)) = entries.next_entry().await {
            let path = entry.path();
            if is_hidden_entry(&path) {
                continue;
            }
            match entry.file_type().await {
                Ok(ft) if ft.is_dir() => stack.push(path),
                Ok(ft) if ft.is_file() => {
                    if let Err(e) = indexing.ingest_file(&path, IndexEvent::Add).await {
                        warn!(error = %e, path = %path.display(), "initial scan ingest failed");
                    }
                }
                _ => {}
            }
        }
    }
}

pub struct SessionWatcher {
    watcher: RecommendedWatcher,
    _dispatch: JoinHandle<()>,
}

impl SessionWatcher {
    /// Starts watching `roots` recursively, spawning a background task
    /// that drives every subsequent filesystem event into `indexing`.
    pub async fn start(indexing: Arc<IndexingService>, roots: Vec<PathBuf>) -> Result<Self, EngramError> {
        let (tx, mut rx) = mpsc::unbounded_channel::<Event>();

        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                let _ = tx.send(event);
            }
            Err(e) => warn!(error = %e, "filesystem watch error"),
        })
        .map_err(|e| EngramError::internal(format!("failed to start filesystem watcher: {e}")))?;

        for root in &roots {
            watcher
                .watch(root, RecursiveMode::Recursive)
                .map_err(|e| EngramError::config(format!("failed to watch {}: {e}", root.display())))?;
            scan_existing(root, &indexing).await;
        }

        let dispatch_indexing = indexing.clone();
        let dispatch = tokio::spawn(async move {
            while let Some(event) = rx.recv().await {
                for path in &event.paths {
                    if is_hidden_entry(path) {
                        continue;
                    }
                    match event.kind {
                        EventKind::Remove(_) => {
                            if let Err(e) = dispatch_indexing.remove_path(path).await {
                                warn!(error = %e, path = %path.display(), "remove_path failed");
                            }
                        }
                        EventKind::Create(_) => {
                            if let Err(e) = dispatch_indexing.ingest_file(path, IndexEvent::Add).await {
                                warn!(error = %e, path = %path.display(), "ingest_file failed");
                            }
                        }
                        EventKind::Modify(_) => {
                            if let Err(e) = dispatch_indexing.ingest_file(path, IndexEvent::Change).await {
                                warn!(error = %e, path = %path.display(), "ingest_file failed");
                            }
                        }
                        _ => {}
                    }
                }
            }
        });

        Ok(Self {
            watcher,
            _dispatch: dispatch,
        })
    }

    pub fn add_path(&mut self, path: &Path) -> Result<(), EngramError> {
        self.watcher
            .watch(path, RecursiveMode::Recursive)
            .map_err(|e| EngramError::config(format!("failed to watch {}: {e}", path.display())))
    }

    pub fn remove_path(&mut self, path: &Path) -> Result<(), EngramError> {
        self.watcher
            .unwatch(path)
            .map_err(|e| EngramError::config(format!("failed to unwatch {}: {e}", path.display())))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hidden_entries_are_detected_by_basename_only() {
        assert!(is_hidden_entry(Path::new("/home/me/.claude/projects/.foo.swp")));
        assert!(!is_hidden_entry(Path::new("/home/me/.claude/projects/foo.jsonl")));
    }
}
