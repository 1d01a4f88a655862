//! Text outline of a scope tree.
//!
//! Flattens the tree into rows and draws them with box connectors, the
//! way an editor symbol view nests functions, records and their fields.

use crate::parser::types::{Declaration, DeclarationKind, Node, ScopeKind, ScopeTree};

/// A flattened row of the outline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutlineRow {
    pub label: String,
    /// Type text or scope kind shown after the label.
    pub detail: String,
    /// Header line (0-based).
    pub line: usize,
    /// Depth in the tree
    pub depth: usize,
    /// Whether this is the last child of its parent
    pub is_last_child: bool,
}

impl OutlineRow {
    /// Build the tree prefix (indentation and branch lines)
    pub fn tree_prefix(&self, ancestors_are_last: &[bool]) -> String {
        let mut prefix = String::new();

        // Top-level rows draw no column of their own.
        for &is_last in ancestors_are_last
            .iter()
            .skip(1)
            .take(self.depth.saturating_sub(1))
        {
            prefix.push_str(if is_last { "    " } else { "│   " });
        }

        if self.depth > 0 {
            prefix.push_str(if self.is_last_child {
                "└── "
            } else {
                "├── "
            });
        }

        prefix
    }
}

fn declaration_label(decl: &Declaration) -> &'static str {
    match decl.kind {
        DeclarationKind::Variable => "var",
        DeclarationKind::Field => "field",
        DeclarationKind::TypeAlias => "type",
    }
}

fn push_declaration(rows: &mut Vec<OutlineRow>, decl: &Declaration, depth: usize, is_last: bool) {
    rows.push(OutlineRow {
        label: format!("{} {}", declaration_label(decl), decl.name),
        detail: decl.type_text.clone(),
        line: decl.start_line,
        depth,
        is_last_child: is_last,
    });
    let count = decl.children.len();
    for (i, field) in decl.children.iter().enumerate() {
        push_declaration(rows, field, depth + 1, i + 1 == count);
    }
}

fn push_nodes(rows: &mut Vec<OutlineRow>, nodes: &[Node], depth: usize) {
    let count = nodes.len();
    for (i, node) in nodes.iter().enumerate() {
        let is_last = i + 1 == count;
        match node {
            Node::Scope(scope) => {
                let label = match scope.kind {
                    ScopeKind::Main | ScopeKind::Globals => scope.kind.to_string(),
                    ScopeKind::Module => scope.name.clone(),
                    _ => format!("{} {}", scope.kind.label(), scope.name),
                };
                rows.push(OutlineRow {
                    label,
                    detail: format!("lines {}-{}", scope.start_line + 1, scope.end_line + 1),
                    line: scope.start_line,
                    depth,
                    is_last_child: is_last,
                });
                push_nodes(rows, &scope.children, depth + 1);
            }
            Node::Declaration(decl) => push_declaration(rows, decl, depth, is_last),
        }
    }
}

/// Flattens the tree in source order.
pub fn flatten(tree: &ScopeTree) -> Vec<OutlineRow> {
    let mut rows = Vec::new();
    push_nodes(&mut rows, &tree.nodes, 0);
    rows
}

/// Renders the tree as indented text, one node per line.
pub fn render(tree: &ScopeTree) -> String {
    let mut out = String::new();
    let mut ancestors_are_last: Vec<bool> = Vec::new();

    for row in flatten(tree) {
        ancestors_are_last.truncate(row.depth);
        out.push_str(&format!(
            "{}{}  {}  :{}\n",
            row.tree_prefix(&ancestors_are_last),
            row.label,
            row.detail,
            row.line + 1
        ));
        ancestors_are_last.push(row.is_last_child);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::scan;

    const SOURCE: &str = "DEFINE m_cnt INTEGER\nMAIN\n  DEFINE rec RECORD\n    a INTEGER,\n    b STRING\n  END RECORD\nEND MAIN\nFUNCTION f()\nEND FUNCTION";

    #[test]
    fn test_flatten_order_and_depth() {
        let rows = flatten(&scan(SOURCE));
        let summary: Vec<_> = rows.iter().map(|r| (r.label.as_str(), r.depth)).collect();
        assert_eq!(
            summary,
            vec![
                ("var m_cnt", 0),
                ("MAIN", 0),
                ("var rec", 1),
                ("field a", 2),
                ("field b", 2),
                ("function f", 0),
            ]
        );
        assert!(rows[4].is_last_child);
        assert!(rows[5].is_last_child);
    }

    #[test]
    fn test_render() {
        let text = render(&scan(SOURCE));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines[0], "var m_cnt  INTEGER  :1");
        assert_eq!(lines[1], "MAIN  lines 2-7  :2");
        assert_eq!(lines[2], "└── var rec  RECORD  :3");
        assert_eq!(lines[3], "    ├── field a  INTEGER  :4");
        assert_eq!(lines[4], "    └── field b  STRING  :5");
        assert_eq!(lines[5], "function f  lines 8-9  :8");
    }

    #[test]
    fn test_render_empty() {
        assert_eq!(render(&ScopeTree::default()), "");
    }
}
