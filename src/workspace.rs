//! Directory walking and per-file analysis.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};
use walkdir::WalkDir;

use crate::analysis::{analyze, Diagnostic};
use crate::config::{Config, WorkspaceConfig};

/// Errors that can occur while analyzing files on disk.
#[derive(Error, Debug)]
pub enum WorkspaceError {
    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Path not found: {0}")]
    NotFound(PathBuf),
}

/// Result type for workspace operations.
pub type WorkspaceResult<T> = Result<T, WorkspaceError>;

/// Analysis results for one file.
#[derive(Debug, Clone, Serialize)]
pub struct FileReport {
    pub path: PathBuf,
    pub diagnostics: Vec<Diagnostic>,
    /// Nodes in the recovered scope tree.
    pub node_count: usize,
}

/// Reads a source file, replacing invalid UTF-8.
///
/// Legacy 4GL sources are often stored in a local code page; the keywords
/// the analyzer looks at are ASCII either way.
pub fn read_source(path: &Path) -> WorkspaceResult<String> {
    let bytes = fs::read(path).map_err(|source| WorkspaceError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Analyzes one file.
pub fn analyze_file(path: &Path, config: &Config) -> WorkspaceResult<FileReport> {
    let text = read_source(path)?;
    let analysis = analyze(&text);
    let diagnostics = if config.diagnostics.enable {
        analysis.diagnostics
    } else {
        Vec::new()
    };
    Ok(FileReport {
        path: path.to_path_buf(),
        diagnostics,
        node_count: analysis.tree.node_count(),
    })
}

/// Lists the source files under `root` in a stable order.
pub fn source_files(root: &Path, workspace: &WorkspaceConfig) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(root)
        .into_iter()
        .filter_entry(|e| !is_ignored_dir(e, workspace))
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.into_path())
        .filter(|p| workspace.is_source_file(p))
        .collect();
    files.sort();
    files
}

/// Analyzes a single file or every source file below a directory.
///
/// Inside a directory an unreadable file is logged and skipped.
pub fn analyze_path(path: &Path, config: &Config) -> WorkspaceResult<Vec<FileReport>> {
    if path.is_file() {
        return analyze_file(path, config).map(|report| vec![report]);
    }
    if !path.is_dir() {
        return Err(WorkspaceError::NotFound(path.to_path_buf()));
    }

    let mut reports = Vec::new();
    for file in source_files(path, &config.workspace) {
        match analyze_file(&file, config) {
            Ok(report) => reports.push(report),
            Err(e) => {
                // Log error but continue with other files
                warn!("Failed to analyze {}: {}", file.display(), e);
            }
        }
    }
    info!(files = reports.len(), root = %path.display(), "analysis complete");
    Ok(reports)
}

/// Check if a directory should be skipped during traversal.
fn is_ignored_dir(entry: &walkdir::DirEntry, workspace: &WorkspaceConfig) -> bool {
    if !entry.file_type().is_dir() || entry.depth() == 0 {
        return false;
    }
    workspace.is_ignored_dir(&entry.file_name().to_string_lossy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, rel: &str, text: &str) -> PathBuf {
        let path = dir.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(&path, text).unwrap();
        path
    }

    #[test]
    fn test_analyze_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(
            dir.path(),
            "main.4gl",
            "MAIN\n  DEFINE a, b INTEGER\n  LET a = 1\nEND MAIN\n",
        );
        let report = analyze_file(&path, &Config::default()).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
        assert_eq!(report.diagnostics[0].variable, "b");
        assert_eq!(report.node_count, 3);
    }

    #[test]
    fn test_disabled_diagnostics() {
        let dir = tempfile::tempdir().unwrap();
        let path = write(dir.path(), "main.4gl", "MAIN\n  DEFINE a INTEGER\nEND MAIN\n");
        let mut config = Config::default();
        config.diagnostics.enable = false;
        let report = analyze_file(&path, &config).unwrap();
        assert!(report.diagnostics.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_tolerated() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("legacy.4gl");
        let mut bytes = b"MAIN\n  DEFINE a INTEGER # ".to_vec();
        bytes.extend_from_slice(&[0xb5, 0xa5, 0xff]);
        bytes.extend_from_slice(b"\nEND MAIN\n");
        fs::write(&path, bytes).unwrap();
        let report = analyze_file(&path, &Config::default()).unwrap();
        assert_eq!(report.diagnostics.len(), 1);
    }

    #[test]
    fn test_source_files_skip_ignored_dirs() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.4gl", "");
        write(dir.path(), "lib/b.4GL", "");
        write(dir.path(), "lib/form.per", "");
        write(dir.path(), "node_modules/c.4gl", "");
        let files = source_files(dir.path(), &WorkspaceConfig::default());
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.4gl", "b.4GL"]);
    }

    #[test]
    fn test_analyze_path_missing() {
        let dir = tempfile::tempdir().unwrap();
        let result = analyze_path(&dir.path().join("nope"), &Config::default());
        assert!(matches!(result, Err(WorkspaceError::NotFound(_))));
    }

    #[test]
    fn test_analyze_directory() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.4gl", "MAIN\n  DEFINE x INTEGER\nEND MAIN\n");
        write(
            dir.path(),
            "sub/b.4gl",
            "FUNCTION f()\n  DEFINE y INTEGER\n  RETURN y\nEND FUNCTION\n",
        );
        let reports = analyze_path(dir.path(), &Config::default()).unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].diagnostics.len(), 1);
        assert!(reports[1].diagnostics.is_empty());
    }
}
