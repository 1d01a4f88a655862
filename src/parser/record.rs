//! Field extraction for `RECORD ... END RECORD` bodies.
//!
//! Each body line is tried against an ordered list of field shapes; the
//! first shape that matches produces the field. Lines matching no shape
//! contribute nothing.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

use super::patterns::{self, IDENT, PRIMITIVE_TYPES, RECORD_OPENER, SIZED_TYPES};
use super::types::{Declaration, DeclarationKind, ScopeKind, SourceLine};

/// The recognized shapes of a record field line, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldShape {
    /// `name LIKE table.column`
    Like,
    /// `name INTEGER` and the other primitive keywords
    Primitive,
    /// `name CHAR(n)`, `name VARCHAR(n)`, `name DECIMAL(p,s)`
    Sized,
    /// `name ARRAY[n] OF type`
    Array,
    /// `name RECORD LIKE table.*`
    RecordLike,
    /// `name DYNAMIC ARRAY OF type`
    DynamicArray,
    /// `name om.DomNode`
    Qualified,
}

impl FieldShape {
    pub const ALL: [FieldShape; 7] = [
        FieldShape::Like,
        FieldShape::Primitive,
        FieldShape::Sized,
        FieldShape::Array,
        FieldShape::RecordLike,
        FieldShape::DynamicArray,
        FieldShape::Qualified,
    ];

    fn regex(&self) -> &'static Regex {
        static LIKE: Lazy<Regex> = Lazy::new(|| field_regex(r"LIKE\s+[A-Za-z0-9_.]+"));
        static PRIMITIVE: Lazy<Regex> = Lazy::new(|| {
            field_regex(&format!(
                r"(?:{})\b(?:\s+[A-Za-z]+\s+TO\s+[A-Za-z]+(?:\s*\(\d+\))?)?",
                PRIMITIVE_TYPES.join("|")
            ))
        });
        static SIZED: Lazy<Regex> =
            Lazy::new(|| field_regex(&format!(r"(?:{})\s*\([^)]+\)", SIZED_TYPES.join("|"))));
        static ARRAY: Lazy<Regex> =
            Lazy::new(|| field_regex(r"ARRAY\s*\[\s*\d*\s*\]\s*OF\s+\w+"));
        static RECORD_LIKE: Lazy<Regex> =
            Lazy::new(|| field_regex(r"RECORD\s+LIKE\s+[A-Za-z0-9_.]+\*?"));
        static DYNAMIC_ARRAY: Lazy<Regex> =
            Lazy::new(|| field_regex(r"DYNAMIC\s+ARRAY\s+OF\s+[A-Za-z0-9_.]+"));
        static QUALIFIED: Lazy<Regex> =
            Lazy::new(|| field_regex(r"[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)+"));

        match self {
            FieldShape::Like => &LIKE,
            FieldShape::Primitive => &PRIMITIVE,
            FieldShape::Sized => &SIZED,
            FieldShape::Array => &ARRAY,
            FieldShape::RecordLike => &RECORD_LIKE,
            FieldShape::DynamicArray => &DYNAMIC_ARRAY,
            FieldShape::Qualified => &QUALIFIED,
        }
    }

    /// Matches a normalized line, returning `(name, type)`.
    pub fn capture<'a>(&self, code: &'a str) -> Option<(&'a str, &'a str)> {
        let caps = self.regex().captures(code)?;
        let name = caps.get(1)?.as_str();
        let type_text = caps.get(2)?.as_str();
        Some((name, type_text))
    }
}

fn field_regex(type_pattern: &str) -> Regex {
    Regex::new(&format!(r"(?i)^({IDENT})\s+({type_pattern})\s*,?$"))
        .unwrap_or_else(|e| panic!("invalid field pattern: {e}"))
}

/// Classifies one normalized body line as a field, if any shape matches.
pub fn match_field(code: &str) -> Option<(FieldShape, &str, &str)> {
    if code.is_empty() || patterns::is_control_like(code) {
        return None;
    }
    FieldShape::ALL
        .iter()
        .find_map(|shape| shape.capture(code).map(|(n, t)| (*shape, n, t)))
}

/// A parsed record body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordBody {
    pub fields: Vec<Declaration>,
    /// Index of the `END RECORD` line.
    pub end_line: usize,
}

/// Deepest `RECORD` nesting accepted inside one body.
pub const MAX_RECORD_DEPTH: usize = 64;

/// A nested record whose `END RECORD` has not been seen yet.
struct OpenRecord {
    name: String,
    type_text: String,
    start_line: usize,
    fields: Vec<Declaration>,
}

/// Parses the body of a record whose opener sits at `opener`.
///
/// Nested record blocks become fields carrying their own fields. Returns
/// `None` when no `END RECORD` is found before EOF or before a line that
/// closes an enclosing block, or when nesting exceeds [`MAX_RECORD_DEPTH`].
pub fn parse_record_body(lines: &[SourceLine], opener: usize) -> Option<RecordBody> {
    let mut fields = Vec::new();
    let mut open: Vec<OpenRecord> = Vec::new();
    let mut k = opener + 1;

    while k < lines.len() {
        let code = lines[k].code.as_str();

        if let Some(block) = patterns::end_block(code) {
            if block != "RECORD" {
                trace!(line = k, "record body closed by END {}", block);
                return None;
            }
            let Some(inner) = open.pop() else {
                return Some(RecordBody { fields, end_line: k });
            };
            let field = Declaration {
                name: inner.name,
                type_text: inner.type_text,
                kind: DeclarationKind::Field,
                start_line: inner.start_line,
                end_line: k,
                scope: ScopeKind::Record,
                children: inner.fields,
            };
            match open.last_mut() {
                Some(parent) => parent.fields.push(field),
                None => fields.push(field),
            }
            k += 1;
            continue;
        }

        if closes_record_search(code) {
            return None;
        }

        if let Some(caps) = RECORD_OPENER.captures(code) {
            if open.len() + 1 >= MAX_RECORD_DEPTH {
                trace!(line = k, "record nesting too deep");
                return None;
            }
            open.push(OpenRecord {
                name: caps[1].to_string(),
                type_text: normalize_space(&caps[2]),
                start_line: k,
                fields: Vec::new(),
            });
            k += 1;
            continue;
        }

        if let Some((_, name, type_text)) = match_field(code) {
            let field =
                Declaration::new(name, type_text, DeclarationKind::Field, k, ScopeKind::Record);
            match open.last_mut() {
                Some(parent) => parent.fields.push(field),
                None => fields.push(field),
            }
        }
        k += 1;
    }

    None
}

/// Lines that can only appear outside a record body.
fn closes_record_search(code: &str) -> bool {
    patterns::MAIN_START.is_match(code)
        || patterns::FUNCTION_START.is_match(code)
        || patterns::DEFINE_START.is_match(code)
}

/// Collapses internal runs of whitespace to single spaces.
pub fn normalize_space(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
