//! Unused variable reporting.
//!
//! Walks the `MAIN` scope first and then every function in source order.
//! Only variables declared directly in those scopes are candidates: record
//! fields, globals, module variables and function parameters are never
//! reported.

use std::collections::HashSet;
use std::fmt;

use serde::Serialize;
use tracing::debug;

use super::usage::scan_usage;
use crate::parser::signature::FunctionSignature;
use crate::parser::types::{Declaration, Scope, ScopeKind, ScopeTree, SourceLine};

/// Diagnostic code attached to every unused-variable finding.
pub const UNUSED_VARIABLE: &str = "unused-variable";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Warning => write!(f, "warning"),
        }
    }
}

/// One finding, anchored at the declaring line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    /// Declaring line (0-based).
    pub line: usize,
    pub message: String,
    pub severity: Severity,
    pub code: &'static str,
    /// The unused variable.
    pub variable: String,
    /// The enclosing function, absent for `MAIN`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub function: Option<String>,
}

impl Diagnostic {
    fn unused(decl: &Declaration, function: Option<&str>) -> Self {
        let message = match function {
            Some(f) => format!("function '{}': unused variable '{}'", f, decl.name),
            None => format!("unused variable '{}'", decl.name),
        };
        Self {
            line: decl.start_line,
            message,
            severity: Severity::Warning,
            code: UNUSED_VARIABLE,
            variable: decl.name.clone(),
            function: function.map(str::to_string),
        }
    }
}

/// Lines of a scope that may contain usages.
///
/// Excludes the header through `header_end` and every line spanned by a
/// declaration or nested record type. The terminator line is left in and
/// skipped by the usage scan, which matters for a `MAIN` that runs to EOF.
fn body_lines(scope: &Scope, header_end: usize) -> Vec<usize> {
    let mut excluded: HashSet<usize> = HashSet::new();
    for node in &scope.children {
        excluded.extend(node.start_line()..=node.end_line());
    }
    (header_end + 1..=scope.end_line)
        .filter(|k| !excluded.contains(k))
        .collect()
}

fn unused_in(
    lines: &[SourceLine],
    candidates: &[&Declaration],
    body: Vec<usize>,
    function: Option<&str>,
) -> Vec<Diagnostic> {
    let names: Vec<&str> = candidates.iter().map(|d| d.name.as_str()).collect();
    let usage = scan_usage(lines, body, &names);
    candidates
        .iter()
        .filter(|d| !usage.is_used(&d.name))
        .map(|d| Diagnostic::unused(d, function))
        .collect()
}

/// Reports unused variables in `MAIN`.
pub fn unused_in_main(lines: &[SourceLine], main: &Scope) -> Vec<Diagnostic> {
    let candidates: Vec<&Declaration> = main.declarations().filter(|d| d.is_variable()).collect();
    unused_in(lines, &candidates, body_lines(main, main.start_line), None)
}

/// Reports unused locals of one function, excluding its parameters.
pub fn unused_in_function(lines: &[SourceLine], function: &Scope) -> Vec<Diagnostic> {
    let signature = FunctionSignature::resolve(lines, function);
    let header_end = signature
        .as_ref()
        .map_or(function.start_line, |s| s.header_end);

    let candidates: Vec<&Declaration> = function
        .declarations()
        .filter(|d| d.is_variable())
        .filter(|d| !signature.as_ref().is_some_and(|s| s.is_parameter(&d.name)))
        .collect();

    unused_in(
        lines,
        &candidates,
        body_lines(function, header_end),
        Some(&function.name),
    )
}

/// Produces the unused-variable diagnostics for a scanned document.
pub fn report_unused(lines: &[SourceLine], tree: &ScopeTree) -> Vec<Diagnostic> {
    let mut diagnostics = Vec::new();
    for main in tree.scopes_of_kind(ScopeKind::Main) {
        diagnostics.extend(unused_in_main(lines, main));
    }
    for function in tree.scopes_of_kind(ScopeKind::Function) {
        diagnostics.extend(unused_in_function(lines, function));
    }
    debug!(count = diagnostics.len(), "unused variables reported");
    diagnostics
}
