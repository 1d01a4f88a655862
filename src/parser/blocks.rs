//! Block scanner.
//!
//! Recovers the scope tree of a document by recognizing block openers and
//! their `END` terminators line by line. A block that never finds its
//! terminator is dropped and scanning resumes on the line after its header,
//! so one broken function does not hide the rest of the file.

use tracing::{debug, trace};

use super::define::{parse_define, parse_type};
use super::patterns::{
    self, DEFINE_START, FUNCTION_START, GLOBALS_START, MAIN_START, MODULE_VARIABLE_START,
    REPORT_START, TYPE_START,
};
use super::types::{split_lines, Node, Scope, ScopeKind, ScopeTree, SourceLine};

/// A recognized block header.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Opener {
    Block { kind: ScopeKind, name: String },
    /// `GLOBALS "file"` pulls declarations from elsewhere; nothing to scan.
    GlobalsInclude,
}

impl ScopeKind {
    /// The keyword that follows `END` for this kind of block.
    fn terminator(&self) -> &'static str {
        match self {
            ScopeKind::Module => "MODULE_VARIABLE",
            ScopeKind::Globals => "GLOBALS",
            ScopeKind::Main => "MAIN",
            ScopeKind::Function => "FUNCTION",
            ScopeKind::Report => "REPORT",
            ScopeKind::Record => "RECORD",
        }
    }
}

fn opener(code: &str) -> Option<Opener> {
    if MAIN_START.is_match(code) {
        return Some(Opener::Block {
            kind: ScopeKind::Main,
            name: "MAIN".to_string(),
        });
    }
    if let Some(caps) = FUNCTION_START.captures(code) {
        return Some(Opener::Block {
            kind: ScopeKind::Function,
            name: caps[1].to_string(),
        });
    }
    if let Some(caps) = REPORT_START.captures(code) {
        // `REPORT TO ...` is an output redirection, not a definition.
        if !caps[1].eq_ignore_ascii_case("TO") {
            return Some(Opener::Block {
                kind: ScopeKind::Report,
                name: caps[1].to_string(),
            });
        }
    }
    if let Some(caps) = GLOBALS_START.captures(code) {
        if patterns::is_globals_include(&caps[1]) {
            return Some(Opener::GlobalsInclude);
        }
        return Some(Opener::Block {
            kind: ScopeKind::Globals,
            name: "GLOBALS".to_string(),
        });
    }
    if MODULE_VARIABLE_START.is_match(code) {
        return Some(Opener::Block {
            kind: ScopeKind::Module,
            name: "MODULE_VARIABLE".to_string(),
        });
    }
    None
}

/// Returns true if `code` ends a top-level block other than `kind`.
fn ends_other_block(code: &str, kind: ScopeKind) -> bool {
    patterns::end_block(code).is_some_and(|block| {
        block != "RECORD" && !block.eq_ignore_ascii_case(kind.terminator())
    })
}

/// Line-oriented scanner over one document.
pub struct BlockScanner<'a> {
    lines: &'a [SourceLine],
}

impl<'a> BlockScanner<'a> {
    pub fn new(lines: &'a [SourceLine]) -> Self {
        Self { lines }
    }

    /// Scans the whole document into a scope tree.
    pub fn scan(&self) -> ScopeTree {
        let mut nodes = Vec::new();
        let mut i = 0;

        while i < self.lines.len() {
            let code = self.lines[i].code.as_str();
            if code.is_empty() {
                i += 1;
                continue;
            }

            match opener(code) {
                Some(Opener::Block { kind, name }) => match self.parse_block(kind, name, i) {
                    Some((scope, next)) => {
                        debug!(
                            kind = scope.kind.label(),
                            name = %scope.name,
                            start = scope.start_line,
                            end = scope.end_line,
                            "scope recovered"
                        );
                        nodes.push(Node::Scope(scope));
                        i = next;
                    }
                    None => {
                        debug!(line = i, "unterminated block header skipped");
                        i += 1;
                    }
                },
                Some(Opener::GlobalsInclude) => {
                    trace!(line = i, "GLOBALS include skipped");
                    i += 1;
                }
                None => i = self.parse_declaration(i, ScopeKind::Module, &mut nodes),
            }
        }

        ScopeTree { nodes }
    }

    /// Handles a `DEFINE` or `TYPE` statement at `i`, returning the next
    /// line to scan.
    fn parse_declaration(&self, i: usize, scope: ScopeKind, nodes: &mut Vec<Node>) -> usize {
        let code = self.lines[i].code.as_str();
        if DEFINE_START.is_match(code) {
            let (declarations, next) = parse_define(self.lines, i, scope);
            nodes.extend(declarations.into_iter().map(Node::Declaration));
            return next.max(i + 1);
        }
        if TYPE_START.is_match(code) {
            if let Some((node, next)) = parse_type(self.lines, i, scope) {
                nodes.push(node);
                return next.max(i + 1);
            }
        }
        i + 1
    }

    /// Parses the block whose header sits at `start`.
    ///
    /// `MAIN` only closes at `END MAIN` and falls back to the last line of
    /// the document. Every other block is abandoned when EOF, another
    /// top-level header or a foreign `END` comes first.
    fn parse_block(
        &self,
        kind: ScopeKind,
        name: String,
        start: usize,
    ) -> Option<(Scope, usize)> {
        let mut scope = Scope::new(kind, name, start);
        let mut k = start + 1;

        while k < self.lines.len() {
            let code = self.lines[k].code.as_str();
            if code.is_empty() {
                k += 1;
                continue;
            }

            if patterns::is_end_of(code, kind.terminator()) {
                scope.end_line = k;
                return Some((scope, k + 1));
            }

            if kind != ScopeKind::Main
                && (matches!(opener(code), Some(Opener::Block { .. }))
                    || ends_other_block(code, kind))
            {
                trace!(line = k, "{} {} interrupted", kind, scope.name);
                return None;
            }

            k = self.parse_declaration(k, kind, &mut scope.children);
        }

        if kind == ScopeKind::Main {
            scope.end_line = self.lines.len().saturating_sub(1).max(start);
            return Some((scope, self.lines.len()));
        }
        None
    }
}

/// Scans document text into a scope tree.
pub fn scan(text: &str) -> ScopeTree {
    let lines = split_lines(text);
    BlockScanner::new(&lines).scan()
}
