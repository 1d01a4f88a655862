//! Shared types for recovered 4GL program structure.
//!
//! This module defines the scope tree produced by the block scanner and
//! the declarations extracted from `DEFINE`/`TYPE` statements.

use serde::Serialize;
use std::fmt;

use super::comment::strip_comment;

/// A physical source line together with its comment-stripped form.
///
/// Ranges in the scope tree always index the raw lines; keyword tests
/// run against [`SourceLine::code`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLine {
    /// The line exactly as it appears in the document.
    pub raw: String,
    /// The line with trailing comments removed and whitespace trimmed.
    pub code: String,
}

impl SourceLine {
    /// Creates a source line, normalizing it for keyword tests.
    pub fn new(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let code = strip_comment(&raw).trim().to_string();
        Self { raw, code }
    }

    /// Returns true if the line carries no code (blank or comment only).
    pub fn is_blank(&self) -> bool {
        self.code.is_empty()
    }

    /// Returns true if the raw line starts with leading whitespace.
    pub fn is_indented(&self) -> bool {
        self.raw.starts_with([' ', '\t'])
    }
}

/// Splits document text into source lines on `\r?\n`.
pub fn split_lines(text: &str) -> Vec<SourceLine> {
    text.split('\n')
        .map(|l| SourceLine::new(l.strip_suffix('\r').unwrap_or(l)))
        .collect()
}

/// The kind of a lexical region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScopeKind {
    /// The implicit file-level scope, or an explicit `MODULE_VARIABLE` block.
    Module,
    /// A `GLOBALS ... END GLOBALS` block.
    Globals,
    /// The `MAIN ... END MAIN` program entry.
    Main,
    /// A `FUNCTION ... END FUNCTION` block.
    Function,
    /// A `REPORT ... END REPORT` block.
    Report,
    /// A `RECORD ... END RECORD` body.
    Record,
}

impl ScopeKind {
    /// Returns a short label for the scope kind.
    pub fn label(&self) -> &'static str {
        match self {
            ScopeKind::Module => "module",
            ScopeKind::Globals => "globals",
            ScopeKind::Main => "main",
            ScopeKind::Function => "function",
            ScopeKind::Report => "report",
            ScopeKind::Record => "record",
        }
    }
}

impl fmt::Display for ScopeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ScopeKind::Module => "MODULE",
            ScopeKind::Globals => "GLOBALS",
            ScopeKind::Main => "MAIN",
            ScopeKind::Function => "FUNCTION",
            ScopeKind::Report => "REPORT",
            ScopeKind::Record => "RECORD",
        };
        write!(f, "{}", s)
    }
}

/// What a declaration introduces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeclarationKind {
    /// A variable introduced by `DEFINE`.
    Variable,
    /// A field inside a `RECORD` body.
    Field,
    /// A named type introduced by `TYPE` (non-record form).
    TypeAlias,
}

/// A named variable, record field or type alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Declaration {
    /// The declared identifier as written.
    pub name: String,
    /// Raw type annotation, e.g. `INTEGER`, `LIKE t.col`, `RECORD LIKE t.*`.
    #[serde(rename = "type")]
    pub type_text: String,
    pub kind: DeclarationKind,
    /// First line of the declaration (0-based).
    pub start_line: usize,
    /// Last line of the declaration; differs from `start_line` only for
    /// record blocks.
    pub end_line: usize,
    /// The scope that owns this declaration.
    pub scope: ScopeKind,
    /// Fields of a block-form `RECORD`.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Declaration>,
}

impl Declaration {
    /// Creates a single-line declaration.
    pub fn new(
        name: impl Into<String>,
        type_text: impl Into<String>,
        kind: DeclarationKind,
        line: usize,
        scope: ScopeKind,
    ) -> Self {
        Self {
            name: name.into(),
            type_text: type_text.into(),
            kind,
            start_line: line,
            end_line: line,
            scope,
            children: Vec::new(),
        }
    }

    /// Returns true for variables (the only unused-variable candidates).
    pub fn is_variable(&self) -> bool {
        self.kind == DeclarationKind::Variable
    }
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.name, self.type_text)
    }
}

/// A named lexical region with a line-range boundary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Scope {
    pub kind: ScopeKind,
    /// Identifier, or a fixed label for `MAIN`, `GLOBALS` and `MODULE_VARIABLE`.
    pub name: String,
    /// Header line (0-based, inclusive).
    pub start_line: usize,
    /// Terminator line (0-based, inclusive).
    pub end_line: usize,
    /// Nested scopes and declarations in source order.
    pub children: Vec<Node>,
}

impl Scope {
    /// Creates an empty scope spanning a single line.
    pub fn new(kind: ScopeKind, name: impl Into<String>, start_line: usize) -> Self {
        Self {
            kind,
            name: name.into(),
            start_line,
            end_line: start_line,
            children: Vec::new(),
        }
    }

    /// Iterates over the declarations directly owned by this scope.
    pub fn declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.children.iter().filter_map(Node::as_declaration)
    }

    /// Iterates over the scopes nested directly in this scope.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.children.iter().filter_map(Node::as_scope)
    }
}

/// A node of the scope tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "node", rename_all = "lowercase")]
pub enum Node {
    Scope(Scope),
    Declaration(Declaration),
}

impl Node {
    pub fn as_scope(&self) -> Option<&Scope> {
        match self {
            Node::Scope(scope) => Some(scope),
            Node::Declaration(_) => None,
        }
    }

    pub fn as_declaration(&self) -> Option<&Declaration> {
        match self {
            Node::Scope(_) => None,
            Node::Declaration(decl) => Some(decl),
        }
    }

    /// The identifier of the scope or declaration.
    pub fn name(&self) -> &str {
        match self {
            Node::Scope(scope) => &scope.name,
            Node::Declaration(decl) => &decl.name,
        }
    }

    /// The first line covered by this node.
    pub fn start_line(&self) -> usize {
        match self {
            Node::Scope(scope) => scope.start_line,
            Node::Declaration(decl) => decl.start_line,
        }
    }

    /// The last line covered by this node.
    pub fn end_line(&self) -> usize {
        match self {
            Node::Scope(scope) => scope.end_line,
            Node::Declaration(decl) => decl.end_line,
        }
    }
}

/// The ordered forest of top-level nodes recovered from one document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScopeTree {
    pub nodes: Vec<Node>,
}

impl ScopeTree {
    /// Iterates over top-level scopes.
    pub fn scopes(&self) -> impl Iterator<Item = &Scope> {
        self.nodes.iter().filter_map(Node::as_scope)
    }

    /// Iterates over top-level scopes of one kind.
    pub fn scopes_of_kind(&self, kind: ScopeKind) -> impl Iterator<Item = &Scope> {
        self.scopes().filter(move |s| s.kind == kind)
    }

    /// Declarations attributed to the implicit module scope.
    pub fn module_declarations(&self) -> impl Iterator<Item = &Declaration> {
        self.nodes.iter().filter_map(Node::as_declaration)
    }

    /// Finds the first top-level scope with the given kind and name
    /// (case-insensitive).
    pub fn find(&self, kind: ScopeKind, name: &str) -> Option<&Scope> {
        self.scopes_of_kind(kind)
            .find(|s| s.name.eq_ignore_ascii_case(name))
    }

    /// Total number of nodes, counting nested scopes, declarations and fields.
    pub fn node_count(&self) -> usize {
        fn count_decl(decl: &Declaration) -> usize {
            1 + decl.children.iter().map(count_decl).sum::<usize>()
        }
        fn count(nodes: &[Node]) -> usize {
            nodes
                .iter()
                .map(|n| match n {
                    Node::Scope(s) => 1 + count(&s.children),
                    Node::Declaration(d) => count_decl(d),
                })
                .sum()
        }
        count(&self.nodes)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_lines_handles_crlf() {
        let lines = split_lines("MAIN\r\n  DEFINE a INTEGER # note\r\nEND MAIN");
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0].raw, "MAIN");
        assert_eq!(lines[1].code, "DEFINE a INTEGER");
        assert!(lines[1].is_indented());
        assert_eq!(lines[2].raw, "END MAIN");
    }

    #[test]
    fn test_comment_only_line_is_blank() {
        assert!(SourceLine::new("   # just a note").is_blank());
        assert!(SourceLine::new("-- another").is_blank());
        assert!(!SourceLine::new("LET a = 1").is_blank());
    }

    #[test]
    fn test_scope_kind_display() {
        assert_eq!(format!("{}", ScopeKind::Function), "FUNCTION");
        assert_eq!(ScopeKind::Globals.label(), "globals");
    }

    #[test]
    fn test_node_count_includes_fields() {
        let mut rec = Declaration::new("r", "RECORD", DeclarationKind::Variable, 1, ScopeKind::Main);
        rec.children.push(Declaration::new(
            "f",
            "INTEGER",
            DeclarationKind::Field,
            2,
            ScopeKind::Record,
        ));
        let mut main = Scope::new(ScopeKind::Main, "MAIN", 0);
        main.children.push(Node::Declaration(rec));
        let tree = ScopeTree {
            nodes: vec![Node::Scope(main)],
        };
        assert_eq!(tree.node_count(), 3);
        assert!(tree.find(ScopeKind::Main, "main").is_some());
    }
}
