//! Keyword vocabulary and compiled line patterns.
//!
//! Every heuristic in the scanner and extractors draws its keywords from
//! the tables here, so extending the recognized language means editing
//! one list. Patterns run against comment-stripped, trimmed lines and are
//! ASCII case-insensitive.

use once_cell::sync::Lazy;
use regex::Regex;

/// Identifier characters accepted for names.
pub const IDENT: &str = r"[A-Za-z0-9_]+";

/// Primitive type keywords.
pub const PRIMITIVE_TYPES: &[&str] = &[
    "STRING", "INTEGER", "SMALLINT", "BIGINT", "DATETIME", "DATE", "CHAR", "VARCHAR", "DECIMAL",
    "FLOAT", "REAL", "MONEY", "BOOLEAN", "BYTE", "TEXT",
];

/// Primitive types that take a size argument in record fields.
pub const SIZED_TYPES: &[&str] = &["CHAR", "VARCHAR", "DECIMAL"];

/// Statement starters that can never begin a declaration or record field.
pub const CONTROL_KEYWORDS: &[&str] = &[
    "IF", "LET", "FOR", "WHILE", "RETURN", "CALL", "END", "ELSE", "ELSIF", "DO", "EXIT", "NEXT",
    "BREAK", "CONTINUE", "CASE", "WHEN", "OTHERWISE",
];

/// Statement starters that close a multi-line `DEFINE`.
pub const NON_DEFINE_STATEMENTS: &[&str] = &[
    "LET", "MESSAGE", "DISPLAY", "PRINT", "CALL", "IF", "ELSE", "CASE", "WHEN", "FOR", "FOREACH",
    "WHILE", "RETURN", "OPEN", "CLOSE", "PREPARE", "EXECUTE", "SELECT", "INSERT", "UPDATE",
    "DELETE", "INITIALIZE", "CONSTRUCT", "INPUT", "MENU", "PROMPT", "SLEEP", "ERROR", "WARN",
    "INFO", "OPTIONS", "GLOBALS",
];

/// Top-level keywords that also close a multi-line `DEFINE`.
pub const DECLARATION_BOUNDARIES: &[&str] = &[
    "FUNCTION", "REPORT", "MAIN", "IMPORT", "DATABASE", "GLOBALS", "DEFINE", "TYPE", "PUBLIC",
    "PRIVATE", "STATIC",
];

/// Tokens that the extractor picks up as names by accident.
pub const ARTIFACT_NAMES: &[&str] = &["DEFINE", "END", "RECORD"];

/// Keywords never accepted as the name of a continuation line.
pub const RESERVED_NAMES: &[&str] = &[
    "END", "IF", "THEN", "ELSE", "ELSEIF", "FOR", "WHILE", "CASE", "WHEN", "RETURN", "CALL", "LET",
    "DISPLAY", "PRINT", "MESSAGE", "CONTINUE", "EXIT", "FUNCTION", "MAIN", "RECORD", "TYPE",
    "DEFINE", "GLOBAL", "GLOBALS", "LIKE", "TO", "FROM", "WHERE", "SELECT", "INSERT", "UPDATE",
    "DELETE", "NULL", "TRUE", "FALSE",
];

fn alternation(words: &[&str]) -> String {
    words.join("|")
}

fn compile(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("invalid built-in pattern {pattern:?}: {e}"))
}

fn starts_with_keyword(words: &[&str]) -> Regex {
    compile(&format!(r"(?i)^(?:{})\b", alternation(words)))
}

/// Reference to a table column or record (`t.col`, `t.*`, `pkg.Type`).
const REFERENCE: &str = r"[A-Za-z0-9_.]+\*?";

/// Element type of an array declaration.
static ARRAY_ELEMENT: Lazy<String> = Lazy::new(|| {
    format!(r"(?:RECORD\s+LIKE\s+{REFERENCE}|LIKE\s+{REFERENCE}|[A-Za-z0-9_.]+(?:\s*\([^)]*\))?)")
});

/// A complete type annotation as written after a declared name.
pub static TYPE_EXPR: Lazy<String> = Lazy::new(|| {
    format!(
        concat!(
            r"(?:RECORD\s+LIKE\s+{reference}",
            r"|LIKE\s+{reference}",
            r"|DYNAMIC\s+ARRAY\s+OF\s+{element}",
            r"|ARRAY\s*\[[^\]]*\]\s*OF\s+{element}",
            r"|(?:{primitives})\b(?:\s*\([^)]*\))?(?:\s+[A-Za-z]+\s+TO\s+[A-Za-z]+(?:\s*\(\d+\))?)?",
            r"|[A-Za-z_][A-Za-z0-9_]*(?:\.[A-Za-z0-9_]+)+)"
        ),
        reference = REFERENCE,
        element = *ARRAY_ELEMENT,
        primitives = alternation(PRIMITIVE_TYPES),
    )
});

pub static MAIN_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^MAIN\b"));

pub static FUNCTION_START: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^(?:(?:PUBLIC|PRIVATE|STATIC)\s+)?FUNCTION\s+({IDENT})\b"
    ))
});

pub static FUNCTION_SIGNATURE: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^(?:(?:PUBLIC|PRIVATE|STATIC)\s+)?FUNCTION\s+({IDENT})\s*\(([^)]*)\)"
    ))
});

pub static REPORT_START: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^(?:(?:PUBLIC|PRIVATE)\s+)?REPORT\s+({IDENT})\b"
    ))
});

pub static GLOBALS_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^GLOBALS\b(.*)$"));

pub static MODULE_VARIABLE_START: Lazy<Regex> =
    Lazy::new(|| compile(r"(?i)^MODULE_VARIABLE\b"));

/// `END <block>` terminators; group 1 names the block.
pub static END_BLOCK: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^END\s+(MAIN|FUNCTION|REPORT|GLOBALS|RECORD|MODULE_VARIABLE)\b")
});

pub static DEFINE_START: Lazy<Regex> = Lazy::new(|| compile(r"(?i)^DEFINE\b\s*(.*)$"));

pub static TYPE_START: Lazy<Regex> =
    Lazy::new(|| compile(&format!(r"(?i)^TYPE\s+({IDENT})\s+(.+)$")));

/// `name [DYNAMIC ARRAY OF | ARRAY[n] OF] RECORD` with nothing after `RECORD`.
///
/// The anchored end is what separates the block form from
/// `name RECORD LIKE t.*`.
pub static RECORD_OPENER: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(
        r"(?i)^({IDENT})\s+((?:DYNAMIC\s+ARRAY\s+OF\s+|ARRAY\s*\[[^\]]*\]\s*OF\s+)?RECORD)\s*$"
    ))
});

/// `TYPE name [DYNAMIC ARRAY OF] RECORD` block opener, matched on the text after `TYPE`.
pub static TYPE_RECORD_BODY: Lazy<Regex> = Lazy::new(|| {
    compile(r"(?i)^(?:DYNAMIC\s+ARRAY\s+OF\s+|ARRAY\s*\[[^\]]*\]\s*OF\s+)?RECORD\s*$")
});

/// `name TYPE` followed by anything (used on segments of a `DEFINE` line).
pub static TYPED_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"(?i)^({IDENT})\s+({})(?:\s.*)?$", *TYPE_EXPR))
});

/// `name TYPE` and nothing else (used on continuation lines).
pub static STRICT_TYPED_SEGMENT: Lazy<Regex> = Lazy::new(|| {
    compile(&format!(r"(?i)^({IDENT})\s+({})\s*$", *TYPE_EXPR))
});

pub static NAME_SEGMENT: Lazy<Regex> = Lazy::new(|| compile(&format!(r"^({IDENT})$")));

pub static CONTROL_LIKE: Lazy<Regex> = Lazy::new(|| starts_with_keyword(CONTROL_KEYWORDS));

pub static NON_DEFINE_STATEMENT: Lazy<Regex> =
    Lazy::new(|| starts_with_keyword(NON_DEFINE_STATEMENTS));

pub static DECLARATION_BOUNDARY: Lazy<Regex> =
    Lazy::new(|| starts_with_keyword(DECLARATION_BOUNDARIES));

/// Returns the block name if the line is an `END <block>` terminator.
pub fn end_block(code: &str) -> Option<String> {
    END_BLOCK
        .captures(code)
        .map(|caps| caps[1].to_ascii_uppercase())
}

/// Returns true if the line terminates the given block keyword.
pub fn is_end_of(code: &str, block: &str) -> bool {
    end_block(code).is_some_and(|b| b.eq_ignore_ascii_case(block))
}

/// Returns true if `code` is a control statement.
pub fn is_control_like(code: &str) -> bool {
    CONTROL_LIKE.is_match(code)
}

/// Returns true if `name` is a parsing artifact rather than an identifier.
pub fn is_artifact_name(name: &str) -> bool {
    ARTIFACT_NAMES.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// Returns true if `name` is a reserved word.
pub fn is_reserved_name(name: &str) -> bool {
    RESERVED_NAMES.iter().any(|k| k.eq_ignore_ascii_case(name))
}

/// Detects the include form of `GLOBALS`, given the text after the keyword.
///
/// `GLOBALS "common.4gl"`, `GLOBALS ../lib/common` and `GLOBALS top.global`
/// are includes; a bare `GLOBALS` opens a block.
pub fn is_globals_include(rest: &str) -> bool {
    let rest = rest.trim();
    if rest.is_empty() {
        return false;
    }
    let quoted = rest.len() >= 2
        && ['"', '\'']
            .iter()
            .any(|&q| rest.starts_with(q) && rest.ends_with(q));
    if quoted {
        return true;
    }
    let token = rest.split_whitespace().next().unwrap_or_default();
    if token.contains('/') {
        return true;
    }
    let single_token = rest.split_whitespace().count() == 1;
    single_token
        && token
            .rsplit_once('.')
            .is_some_and(|(stem, ext)| {
                !stem.is_empty()
                    && !ext.is_empty()
                    && ext.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
            })
}

/// Splits on commas that are not nested in parentheses or brackets.
///
/// `a, b DECIMAL(10,2), c` yields `["a", " b DECIMAL(10,2)", " c"]`.
pub fn split_top_level_commas(text: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (i, ch) in text.char_indices() {
        match ch {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);
    parts
}
