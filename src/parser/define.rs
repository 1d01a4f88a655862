//! `DEFINE` and `TYPE` statement extraction.
//!
//! A `DEFINE` statement may list several names on one line, share one type
//! between a run of bare names, open a `RECORD` block, or continue over
//! following lines. Names are never emitted without a type.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::patterns::{
    self, DECLARATION_BOUNDARY, DEFINE_START, IDENT, NAME_SEGMENT, NON_DEFINE_STATEMENT,
    RECORD_OPENER, STRICT_TYPED_SEGMENT, TYPED_SEGMENT, TYPE_RECORD_BODY, TYPE_START,
};
use super::record::{normalize_space, parse_record_body};
use super::types::{Declaration, DeclarationKind, Node, Scope, ScopeKind, SourceLine};

/// `name user_type`, a declaration typed by a named `TYPE`.
static USER_TYPED_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^({IDENT})\s+([A-Za-z_][A-Za-z0-9_]*)$"))
        .unwrap_or_else(|e| panic!("invalid user type pattern: {e}"))
});

/// One comma-separated item of a `DEFINE` list.
#[derive(Debug, PartialEq, Eq)]
enum Segment<'a> {
    /// `name TYPE`
    Typed(&'a str, &'a str),
    /// A bare name waiting for the next type.
    Name(&'a str),
    /// `name [ARRAY OF] RECORD` opening a block.
    RecordOpener(&'a str, &'a str),
    Unrecognized,
}

/// Classifies a trimmed segment.
///
/// `strict` requires the type to end the segment; `user_types` also
/// accepts a bare identifier as the type.
fn classify(segment: &str, strict: bool, user_types: bool) -> Segment<'_> {
    if let Some(caps) = RECORD_OPENER.captures(segment) {
        let (name, kind) = (caps.get(1), caps.get(2));
        if let (Some(name), Some(kind)) = (name, kind) {
            return Segment::RecordOpener(name.as_str(), kind.as_str());
        }
    }
    let typed = if strict {
        &STRICT_TYPED_SEGMENT
    } else {
        &TYPED_SEGMENT
    };
    let mut candidates = vec![&**typed];
    if user_types {
        candidates.push(&*USER_TYPED_SEGMENT);
    }
    for regex in candidates {
        if let Some(caps) = regex.captures(segment) {
            if let (Some(name), Some(ty)) = (caps.get(1), caps.get(2)) {
                return Segment::Typed(name.as_str(), ty.as_str());
            }
        }
    }
    match NAME_SEGMENT.captures(segment).and_then(|c| c.get(1)) {
        Some(name) => Segment::Name(name.as_str()),
        None => Segment::Unrecognized,
    }
}

/// Accumulates the declarations of one statement across lines.
struct DefineStatement<'a> {
    lines: &'a [SourceLine],
    scope: ScopeKind,
    pending: Vec<(String, usize)>,
    declarations: Vec<Declaration>,
}

/// Where feeding a line left the statement.
struct Fed {
    /// First line after everything consumed.
    next: usize,
    /// The consumed text ended with a comma.
    trailing_comma: bool,
    /// The statement cannot continue past this point.
    closed: bool,
}

impl<'a> DefineStatement<'a> {
    fn new(lines: &'a [SourceLine], scope: ScopeKind) -> Self {
        Self {
            lines,
            scope,
            pending: Vec::new(),
            declarations: Vec::new(),
        }
    }

    fn emit(&mut self, name: &str, type_text: &str, line: usize) {
        let type_text = normalize_space(type_text);
        for (pending, at) in std::mem::take(&mut self.pending) {
            self.declarations.push(Declaration::new(
                pending,
                type_text.clone(),
                DeclarationKind::Variable,
                at,
                self.scope,
            ));
        }
        if !patterns::is_artifact_name(name) {
            self.declarations.push(Declaration::new(
                name,
                type_text,
                DeclarationKind::Variable,
                line,
                self.scope,
            ));
        }
    }

    fn feed(&mut self, text: &str, line: usize, strict: bool, user_types: bool) -> Fed {
        let segments = patterns::split_top_level_commas(text);
        let trailing_comma = segments.len() > 1
            && segments.last().is_some_and(|s| s.trim().is_empty());

        for segment in segments.iter().map(|s| s.trim()).filter(|s| !s.is_empty()) {
            match classify(segment, strict, user_types) {
                Segment::RecordOpener(name, kind) => {
                    return self.open_record(name, kind, line);
                }
                Segment::Typed(name, ty) => self.emit(name, ty, line),
                Segment::Name(name) => {
                    if !patterns::is_artifact_name(name) {
                        self.pending.push((name.to_string(), line));
                    }
                }
                Segment::Unrecognized => {
                    trace!(line, segment, "skipping unrecognized DEFINE item");
                }
            }
        }

        Fed {
            next: line + 1,
            trailing_comma,
            closed: false,
        }
    }

    fn open_record(&mut self, name: &str, kind: &str, line: usize) -> Fed {
        let Some(body) = parse_record_body(self.lines, line) else {
            trace!(line, name, "unterminated RECORD block dropped");
            self.pending.clear();
            return Fed {
                next: line + 1,
                trailing_comma: false,
                closed: true,
            };
        };

        let type_text = normalize_space(kind);
        let mut names = std::mem::take(&mut self.pending);
        names.push((name.to_string(), line));
        for (record_name, _) in names {
            if patterns::is_artifact_name(&record_name) {
                continue;
            }
            self.declarations.push(Declaration {
                name: record_name,
                type_text: type_text.clone(),
                kind: DeclarationKind::Variable,
                start_line: line,
                end_line: body.end_line,
                scope: self.scope,
                children: body.fields.clone(),
            });
        }

        let closer = &self.lines[body.end_line].code;
        Fed {
            next: body.end_line + 1,
            trailing_comma: closer.ends_with(','),
            closed: false,
        }
    }
}

/// Returns true if `code` reads as another line of an open `DEFINE` list.
///
/// Named user types are only trusted right after a trailing comma.
fn is_continuation(code: &str, after_comma: bool) -> bool {
    if code.is_empty()
        || patterns::is_control_like(code)
        || DECLARATION_BOUNDARY.is_match(code)
        || NON_DEFINE_STATEMENT.is_match(code)
    {
        return false;
    }

    let segments = patterns::split_top_level_commas(code);
    let trailing_comma = segments.len() > 1
        && segments.last().is_some_and(|s| s.trim().is_empty());
    let items: Vec<&str> = segments
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();

    let mut typed = false;
    for (i, item) in items.iter().enumerate() {
        match classify(item, true, after_comma) {
            Segment::RecordOpener(name, _) if i + 1 == items.len() => {
                if patterns::is_reserved_name(name) {
                    return false;
                }
                typed = true;
            }
            Segment::Typed(name, ty) => {
                if patterns::is_reserved_name(name) || patterns::is_reserved_name(ty) {
                    return false;
                }
                typed = true;
            }
            Segment::Name(name) if !patterns::is_reserved_name(name) => {}
            _ => return false,
        }
    }

    typed || trailing_comma
}

/// Parses the `DEFINE` statement starting at `start`.
///
/// Returns the declarations found and the index of the first line after
/// the statement. Blank and comment-only lines inside a multi-line list
/// do not end it.
pub fn parse_define(
    lines: &[SourceLine],
    start: usize,
    scope: ScopeKind,
) -> (Vec<Declaration>, usize) {
    let Some(rest) = lines
        .get(start)
        .and_then(|l| DEFINE_START.captures(&l.code))
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
    else {
        return (Vec::new(), start + 1);
    };

    let mut statement = DefineStatement::new(lines, scope);
    let mut fed = statement.feed(rest, start, false, true);
    let mut next = fed.next;

    while !fed.closed {
        let mut k = next;
        while k < lines.len() && lines[k].is_blank() {
            k += 1;
        }
        let Some(line) = lines.get(k) else { break };
        let after_comma = fed.trailing_comma;
        if !(line.is_indented() || after_comma) || !is_continuation(&line.code, after_comma) {
            break;
        }
        fed = statement.feed(&line.code, k, true, after_comma);
        next = fed.next;
    }

    if !statement.pending.is_empty() {
        trace!(
            count = statement.pending.len(),
            "dropping names declared without a type"
        );
    }
    (statement.declarations, next)
}

/// Parses a `TYPE` statement at `start`.
///
/// `TYPE name RECORD ... END RECORD` yields a record scope; any other form
/// yields a type alias declaration. Returns `None` for an unterminated
/// record type.
pub fn parse_type(lines: &[SourceLine], start: usize, scope: ScopeKind) -> Option<(Node, usize)> {
    let caps = TYPE_START.captures(&lines.get(start)?.code)?;
    let name = caps.get(1)?.as_str();
    let rest = caps.get(2)?.as_str().trim();

    if TYPE_RECORD_BODY.is_match(rest) {
        let body = parse_record_body(lines, start)?;
        let mut record = Scope::new(ScopeKind::Record, name, start);
        record.end_line = body.end_line;
        record.children = body.fields.into_iter().map(Node::Declaration).collect();
        return Some((Node::Scope(record), body.end_line + 1));
    }

    let alias = Declaration::new(
        name,
        normalize_space(rest.trim_end_matches(',')),
        DeclarationKind::TypeAlias,
        start,
        scope,
    );
    Some((Node::Declaration(alias), start + 1))
}

/// Extracts every `DEFINE` declaration in `lines[start..=end]`.
pub fn extract_declarations(
    lines: &[SourceLine],
    start: usize,
    end: usize,
    scope: ScopeKind,
) -> Vec<Declaration> {
    let mut declarations = Vec::new();
    let mut k = start;
    while k <= end && k < lines.len() {
        if DEFINE_START.is_match(&lines[k].code) {
            let (found, next) = parse_define(lines, k, scope);
            declarations.extend(found);
            k = next.max(k + 1);
        } else {
            k += 1;
        }
    }
    declarations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::split_lines;

    fn names(decls: &[Declaration]) -> Vec<&str> {
        decls.iter().map(|d| d.name.as_str()).collect()
    }

    fn define(text: &str) -> (Vec<Declaration>, usize) {
        let lines = split_lines(text);
        parse_define(&lines, 0, ScopeKind::Function)
    }

    // ===== Single Line Tests =====

    #[test]
    fn test_shared_type_for_name_list() {
        let (decls, next) = define("DEFINE a, b, c INTEGER");
        assert_eq!(names(&decls), vec!["a", "b", "c"]);
        assert!(decls.iter().all(|d| d.type_text == "INTEGER"));
        assert!(decls.iter().all(|d| d.scope == ScopeKind::Function));
        assert_eq!(next, 1);
    }

    #[test]
    fn test_mixed_types_on_one_line() {
        let (decls, _) = define("DEFINE a STRING, b, c DECIMAL(10,2), d LIKE t.col");
        assert_eq!(names(&decls), vec!["a", "b", "c", "d"]);
        assert_eq!(decls[1].type_text, "DECIMAL(10,2)");
        assert_eq!(decls[3].type_text, "LIKE t.col");
    }

    #[test]
    fn test_record_like_is_single_line() {
        let (decls, next) = define("DEFINE l_oga RECORD LIKE oga_file.*\nLET x = 1");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].type_text, "RECORD LIKE oga_file.*");
        assert!(decls[0].children.is_empty());
        assert_eq!(next, 1);
    }

    #[test]
    fn test_user_type() {
        let (decls, _) = define("DEFINE r t_order, n om.DomNode");
        assert_eq!(names(&decls), vec!["r", "n"]);
        assert_eq!(decls[0].type_text, "t_order");
    }

    #[test]
    fn test_untyped_names_are_dropped() {
        let (decls, _) = define("DEFINE a, b");
        assert!(decls.is_empty());
    }

    #[test]
    fn test_trailing_attributes_are_ignored() {
        let (decls, _) = define("DEFINE a INTEGER ATTRIBUTE(json_name='x')");
        assert_eq!(names(&decls), vec!["a"]);
        assert_eq!(decls[0].type_text, "INTEGER");
    }

    // ===== Record Block Tests =====

    #[test]
    fn test_record_block() {
        let (decls, next) = define(
            "DEFINE rec RECORD\n    name1 LIKE t.a,   # first\n    name2 INTEGER\nEND RECORD\nLET rec.name1 = 1",
        );
        assert_eq!(decls.len(), 1);
        let rec = &decls[0];
        assert_eq!(rec.name, "rec");
        assert_eq!(rec.type_text, "RECORD");
        assert_eq!((rec.start_line, rec.end_line), (0, 3));
        assert_eq!(names(&rec.children), vec!["name1", "name2"]);
        assert!(rec.children.iter().all(|f| f.scope == ScopeKind::Record));
        assert_eq!(next, 4);
    }

    #[test]
    fn test_array_of_record_block() {
        let (decls, _) = define("DEFINE arr DYNAMIC ARRAY OF RECORD\n  id INTEGER\nEND RECORD");
        assert_eq!(decls[0].type_text, "DYNAMIC ARRAY OF RECORD");
        assert_eq!(decls[0].children.len(), 1);
    }

    #[test]
    fn test_unterminated_record_emits_nothing() {
        let (decls, next) = define("DEFINE rec RECORD\n  a INTEGER\nEND FUNCTION");
        assert!(decls.is_empty());
        assert_eq!(next, 1);
    }

    // ===== Continuation Tests =====

    #[test]
    fn test_multi_line_define() {
        let (decls, next) = define(
            "DEFINE a INTEGER,\n       b STRING,\n\n       # note\n       c DATE\nLET a = 1",
        );
        assert_eq!(names(&decls), vec!["a", "b", "c"]);
        assert_eq!(decls[1].start_line, 1);
        assert_eq!(decls[2].start_line, 4);
        assert_eq!(next, 5);
    }

    #[test]
    fn test_indented_continuation_without_comma() {
        let (decls, _) = define("DEFINE a INTEGER\n   b STRING\n   LET a = 1");
        assert_eq!(names(&decls), vec!["a", "b"]);
    }

    #[test]
    fn test_continuation_stops_at_statements() {
        let (decls, next) = define("DEFINE a INTEGER,\n   CALL f(a)\n   b STRING");
        assert_eq!(names(&decls), vec!["a"]);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_continuation_stops_at_boundary() {
        let (decls, _) = define("DEFINE a INTEGER\n  DEFINE b STRING");
        assert_eq!(names(&decls), vec!["a"]);
    }

    #[test]
    fn test_unindented_line_without_comma_stops() {
        let (decls, next) = define("DEFINE a INTEGER\nb STRING");
        assert_eq!(names(&decls), vec!["a"]);
        assert_eq!(next, 1);
    }

    #[test]
    fn test_continuation_record_block() {
        let (decls, next) = define(
            "DEFINE a INTEGER,\n   r RECORD\n      x INTEGER\n   END RECORD,\n   z STRING",
        );
        assert_eq!(names(&decls), vec!["a", "r", "z"]);
        assert_eq!(decls[1].children.len(), 1);
        assert_eq!(next, 5);
    }

    #[test]
    fn test_reserved_name_rejected_on_continuation() {
        assert!(!is_continuation("NULL INTEGER", false));
        assert!(!is_continuation("exit_flag", false));
        assert!(is_continuation("exit_flag,", false));
        assert!(is_continuation("x INTEGER", false));
    }

    #[test]
    fn test_user_type_continuation_needs_comma() {
        assert!(!is_continuation("CLEAR FORM", false));
        assert!(is_continuation("l_cust t_customer", true));
        let (decls, _) = define("DEFINE a INTEGER,\n   l_cust t_customer\n   CLEAR FORM");
        assert_eq!(names(&decls), vec!["a", "l_cust"]);
    }

    // ===== TYPE Tests =====

    #[test]
    fn test_type_record_is_scope() {
        let lines = split_lines("TYPE t_cust RECORD\n  id INTEGER,\n  name STRING\nEND RECORD");
        let (node, next) = parse_type(&lines, 0, ScopeKind::Module).unwrap();
        let scope = node.as_scope().unwrap();
        assert_eq!(scope.kind, ScopeKind::Record);
        assert_eq!(scope.name, "t_cust");
        assert_eq!(scope.end_line, 3);
        assert_eq!(scope.declarations().count(), 2);
        assert_eq!(next, 4);
    }

    #[test]
    fn test_type_alias() {
        let lines = split_lines("TYPE t_list DYNAMIC ARRAY OF STRING");
        let (node, _) = parse_type(&lines, 0, ScopeKind::Module).unwrap();
        let alias = node.as_declaration().unwrap();
        assert_eq!(alias.kind, DeclarationKind::TypeAlias);
        assert_eq!(alias.type_text, "DYNAMIC ARRAY OF STRING");
    }

    #[test]
    fn test_extract_declarations_in_range() {
        let lines = split_lines(
            "FUNCTION f()\n  DEFINE a INTEGER\n  LET a = 1\n  DEFINE b STRING\nEND FUNCTION",
        );
        let decls = extract_declarations(&lines, 1, 4, ScopeKind::Function);
        assert_eq!(names(&decls), vec!["a", "b"]);
    }
}
