//! Source analysis module for fglscope.
//!
//! This module runs the unused-variable check on top of the scope tree
//! recovered by [`crate::parser`].
//!
//! # Features
//!
//! - Ordered usage rules (`LET`, expressions, `CALL` arguments, SQL
//!   `INTO`, `INITIALIZE`, ...) with the matching rule reported per name
//! - Per-scope candidate selection: `MAIN` locals and function locals,
//!   never parameters, record fields, globals or module variables
//! - Diagnostics in a serializable form for the exporters
//!
//! # Example
//!
//! ```ignore
//! use fglscope::analysis::analyze;
//!
//! let analysis = analyze("MAIN\n  DEFINE a, b INTEGER\n  LET a = 1\nEND MAIN");
//! for diag in &analysis.diagnostics {
//!     println!("{}: {}", diag.line + 1, diag.message);
//! }
//! ```

pub mod unused;
pub mod usage;

use serde::Serialize;

use crate::parser::blocks::BlockScanner;
use crate::parser::types::{split_lines, ScopeTree, SourceLine};

// Re-export main types for convenience
pub use unused::{report_unused, Diagnostic, Severity, UNUSED_VARIABLE};
pub use usage::{is_used, scan_usage, UsageMatcher, UsageResult, UsageRule};

/// The result of analyzing one document.
#[derive(Debug, Clone, Serialize)]
pub struct DocumentAnalysis {
    #[serde(skip)]
    pub lines: Vec<SourceLine>,
    pub tree: ScopeTree,
    pub diagnostics: Vec<Diagnostic>,
}

/// Scans a document and reports its unused variables.
///
/// Never fails: malformed input yields a partial tree and fewer findings.
pub fn analyze(text: &str) -> DocumentAnalysis {
    let lines = split_lines(text);
    let tree = BlockScanner::new(&lines).scan();
    let diagnostics = report_unused(&lines, &tree);
    DocumentAnalysis {
        lines,
        tree,
        diagnostics,
    }
}
