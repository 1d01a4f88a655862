//! Definition lookup for functions and reports.
//!
//! A word is looked up as a `REPORT` when its line starts, feeds or
//! finishes a report, and as a `FUNCTION` otherwise. The current document
//! is searched first, then the other source files of the workspace.

use std::path::{Path, PathBuf};

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::{debug, trace};

use crate::config::WorkspaceConfig;
use crate::parser::blocks::scan;
use crate::parser::types::ScopeKind;
use crate::workspace::{read_source, source_files};

static REPORT_CALL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:START\s+REPORT|OUTPUT\s+TO\s+REPORT|FINISH\s+REPORT)\b")
        .unwrap_or_else(|e| panic!("invalid report call pattern: {e}"))
});

/// Where a definition lives.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Location {
    pub path: PathBuf,
    /// Header line (0-based).
    pub line: usize,
}

/// What is being looked up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target {
    pub kind: ScopeKind,
    /// Name with any `module.` qualifier removed.
    pub name: String,
}

impl Target {
    /// Classifies `word` using the text of the line it appears on.
    pub fn from_word(word: &str, line: &str) -> Self {
        let name = word.rsplit('.').next().unwrap_or(word).to_string();
        let kind = if REPORT_CALL.is_match(line) {
            ScopeKind::Report
        } else {
            ScopeKind::Function
        };
        Self { kind, name }
    }

    /// Returns the header line of the matching scope in `text`.
    pub fn find_in(&self, text: &str) -> Option<usize> {
        scan(text)
            .find(self.kind, &self.name)
            .map(|scope| scope.start_line)
    }
}

/// Looks up the definition of `word`, which appears on line `line` of the
/// document at `path` with contents `text`.
pub fn find_definition(
    word: &str,
    line: usize,
    path: &Path,
    text: &str,
    root: &Path,
    workspace: &WorkspaceConfig,
) -> Option<Location> {
    let line_text = text.lines().nth(line).unwrap_or_default();
    let target = Target::from_word(word, line_text);
    debug!(name = %target.name, kind = %target.kind, "looking up definition");

    if let Some(found) = target.find_in(text) {
        return Some(Location {
            path: path.to_path_buf(),
            line: found,
        });
    }

    let current = path.canonicalize().ok();
    for candidate in source_files(root, workspace)
        .into_iter()
        .take(workspace.max_files)
    {
        if candidate.canonicalize().ok() == current && current.is_some() {
            continue;
        }
        let Ok(other) = read_source(&candidate) else {
            trace!(path = %candidate.display(), "unreadable file skipped");
            continue;
        };
        if let Some(found) = target.find_in(&other) {
            return Some(Location {
                path: candidate,
                line: found,
            });
        }
    }

    debug!(name = %target.name, "no definition found");
    None
}
