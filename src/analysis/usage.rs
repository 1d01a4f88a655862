//! Variable usage detection.
//!
//! A name counts as used on a line when any of an ordered list of usage
//! rules matches the comment-stripped line. The rules are tried in order
//! and the first match is reported, which keeps results explainable when
//! debugging a false report.

use std::collections::HashMap;

use regex::Regex;
use serde::Serialize;
use tracing::trace;

use crate::parser::patterns::{self, DEFINE_START, FUNCTION_START, MAIN_START, REPORT_START};
use crate::parser::types::SourceLine;

/// The ways a line can use a variable, in the order they are tried.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UsageRule {
    /// `LET name = ...`, `LET name.field = ...`, `LET name[i] = ...`
    Assignment,
    /// The name between operators, parentheses or whitespace.
    Expression,
    /// `CALL f(..., name, ...)`
    CallArgument,
    /// `IF ... name ...`
    Condition,
    /// `DISPLAY`, `PRINT` or `MESSAGE` followed by the name.
    Output,
    /// `... INTO name` or `INTO name.*`
    SqlInto,
    /// `INITIALIZE name[.*] TO ...`
    Initialize,
    /// `INSERT INTO t ... VALUES (..., name, ...)`
    InsertValues,
    /// `UPDATE t SET ... name`
    UpdateSet,
    /// Any whole-word occurrence.
    Reference,
}

impl UsageRule {
    pub const ALL: [UsageRule; 10] = [
        UsageRule::Assignment,
        UsageRule::Expression,
        UsageRule::CallArgument,
        UsageRule::Condition,
        UsageRule::Output,
        UsageRule::SqlInto,
        UsageRule::Initialize,
        UsageRule::InsertValues,
        UsageRule::UpdateSet,
        UsageRule::Reference,
    ];

    /// Builds the case-insensitive pattern of this rule for an escaped name.
    ///
    /// Inside the wider rules the name is matched as a whole word so that
    /// `l_a` is not found inside `l_ab`.
    fn pattern(&self, name: &str) -> String {
        let word = format!(r"\b{name}\b");
        let body = match self {
            UsageRule::Assignment => format!(r"\bLET\s+{name}(?:\.\w+)?\s*[=\[]"),
            UsageRule::Expression => format!(r"[=+\-*/()\s]{name}[=+\-*/()\s]"),
            UsageRule::CallArgument => format!(r"\bCALL\s+\w+\s*\([^)]*{word}[^)]*\)"),
            UsageRule::Condition => format!(r"\bIF\s+.*{word}"),
            UsageRule::Output => format!(r"\b(?:DISPLAY|PRINT|MESSAGE)\s+.*{word}"),
            UsageRule::SqlInto => format!(r"\bINTO\s+.*{word}(?:\.\*)?"),
            UsageRule::Initialize => format!(r"\bINITIALIZE\s+{name}(?:\.\*)?\s+TO\b"),
            UsageRule::InsertValues => {
                format!(r"\bINSERT\s+INTO\s+.*VALUES\s*\([^)]*{word}(?:\.\*)?[^)]*\)")
            }
            UsageRule::UpdateSet => format!(r"\bUPDATE\s+.*\bSET\s+.*{word}"),
            UsageRule::Reference => word,
        };
        format!("(?i){body}")
    }
}

/// The compiled usage rules for one variable name.
#[derive(Debug, Clone)]
pub struct UsageMatcher {
    name: String,
    rules: Vec<(UsageRule, Regex)>,
}

impl UsageMatcher {
    pub fn new(name: &str) -> Self {
        let escaped = regex::escape(name);
        let rules = UsageRule::ALL
            .iter()
            .filter_map(|rule| {
                Regex::new(&rule.pattern(&escaped))
                    .ok()
                    .map(|regex| (*rule, regex))
            })
            .collect();
        Self {
            name: name.to_string(),
            rules,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the first rule that matches the comment-stripped line.
    ///
    /// The line is padded with a space on both sides so that the
    /// expression rule also sees names at the very start or end.
    pub fn match_line(&self, code: &str) -> Option<UsageRule> {
        let padded = format!(" {code} ");
        self.rules
            .iter()
            .find(|(_, regex)| regex.is_match(&padded))
            .map(|(rule, _)| *rule)
    }
}

/// Returns true for lines that never count as usage: comment-only lines,
/// `DEFINE` lines and block headers or terminators.
pub fn is_skipped_line(line: &SourceLine) -> bool {
    let code = line.code.as_str();
    code.is_empty()
        || DEFINE_START.is_match(code)
        || MAIN_START.is_match(code)
        || FUNCTION_START.is_match(code)
        || REPORT_START.is_match(code)
        || patterns::end_block(code)
            .is_some_and(|b| matches!(b.as_str(), "MAIN" | "FUNCTION" | "REPORT"))
}

/// Usage verdicts keyed by variable name as declared.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UsageResult {
    used: HashMap<String, Option<(UsageRule, usize)>>,
}

impl UsageResult {
    /// Returns true if the name was seen on some line.
    pub fn is_used(&self, name: &str) -> bool {
        self.used.get(name).is_some_and(Option::is_some)
    }

    /// The rule and line of the first usage, if any.
    pub fn first_usage(&self, name: &str) -> Option<(UsageRule, usize)> {
        self.used.get(name).copied().flatten()
    }

    /// Names that were never seen.
    pub fn unused(&self) -> impl Iterator<Item = &str> {
        self.used
            .iter()
            .filter(|(_, hit)| hit.is_none())
            .map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.used.len()
    }

    pub fn is_empty(&self) -> bool {
        self.used.is_empty()
    }
}

/// Scans the given lines of a document for every name.
///
/// `body` yields line indices into `lines`; skipped lines (see
/// [`is_skipped_line`]) never count. Each name stops being tested once its
/// first usage is found.
pub fn scan_usage<I>(lines: &[SourceLine], body: I, names: &[&str]) -> UsageResult
where
    I: IntoIterator<Item = usize>,
{
    let matchers: Vec<UsageMatcher> = names.iter().map(|n| UsageMatcher::new(n)).collect();
    let mut used: HashMap<String, Option<(UsageRule, usize)>> =
        names.iter().map(|n| (n.to_string(), None)).collect();

    for k in body {
        let Some(line) = lines.get(k) else { continue };
        if is_skipped_line(line) {
            continue;
        }
        for matcher in &matchers {
            let slot = used.entry(matcher.name().to_string()).or_insert(None);
            if slot.is_some() {
                continue;
            }
            if let Some(rule) = matcher.match_line(&line.code) {
                trace!(name = matcher.name(), line = k, ?rule, "usage found");
                *slot = Some((rule, k));
            }
        }
        if used.values().all(Option::is_some) {
            break;
        }
    }

    UsageResult { used }
}

/// Returns true if `name` is used on any of the given lines.
pub fn is_used(name: &str, lines: &[SourceLine]) -> bool {
    scan_usage(lines, 0..lines.len(), &[name]).is_used(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::types::split_lines;

    fn rule(name: &str, line: &str) -> Option<UsageRule> {
        UsageMatcher::new(name).match_line(line)
    }

    // ===== Rule Tests =====

    #[test]
    fn test_assignment_rule() {
        assert_eq!(rule("a", "LET a = 1"), Some(UsageRule::Assignment));
        assert_eq!(rule("rec", "LET rec.name1 = 'x'"), Some(UsageRule::Assignment));
        assert_eq!(rule("arr", "LET arr[1] = 2"), Some(UsageRule::Assignment));
    }

    #[test]
    fn test_expression_rule() {
        assert_eq!(rule("b", "LET a = b + 1"), Some(UsageRule::Expression));
        assert_eq!(rule("b", "LET a = (b)"), Some(UsageRule::Expression));
    }

    #[test]
    fn test_statement_rules() {
        assert_eq!(rule("x", "CALL f(1,x,2)"), Some(UsageRule::CallArgument));
        assert_eq!(rule("x", "IF x>0 THEN"), Some(UsageRule::Condition));
        assert_eq!(rule("x", "DISPLAY 'v:',x"), Some(UsageRule::Output));
        assert_eq!(rule("rec", "SELECT * INTO rec.* FROM t"), Some(UsageRule::SqlInto));
        assert_eq!(rule("rec", "INITIALIZE rec.* TO NULL"), Some(UsageRule::Initialize));
        assert_eq!(rule("v", "UPDATE t SET c=v,d=1"), Some(UsageRule::UpdateSet));
    }

    #[test]
    fn test_earlier_rule_wins() {
        assert_eq!(
            rule("rec", "INSERT INTO t VALUES(rec.*)"),
            Some(UsageRule::SqlInto)
        );
        assert_eq!(rule("v", "UPDATE t SET c=v"), Some(UsageRule::Expression));
    }

    #[test]
    fn test_reference_rule() {
        assert_eq!(rule("x", "RETURN x"), Some(UsageRule::Expression));
        assert_eq!(rule("x", "FOREACH c INTO x,y"), Some(UsageRule::SqlInto));
        assert_eq!(rule("cnt", "NEXT FIELD cnt"), Some(UsageRule::Expression));
        assert_eq!(rule("cnt", "EXIT cnt,"), Some(UsageRule::Reference));
    }

    #[test]
    fn test_matching_is_case_insensitive() {
        assert_eq!(rule("l_Count", "let L_COUNT = 0"), Some(UsageRule::Assignment));
    }

    #[test]
    fn test_no_partial_word_match() {
        assert_eq!(rule("l_a", "LET l_ab = 1"), None);
        assert_eq!(rule("l_a", "CALL f(l_ab)"), None);
        assert_eq!(rule("a", "DISPLAY 'hello'"), None);
    }

    #[test]
    fn test_special_characters_are_escaped() {
        assert_eq!(rule("a.b", "LET axb = 1"), None);
    }

    // ===== Scan Tests =====

    #[test]
    fn test_scan_skips_define_and_comment_lines() {
        let lines = split_lines(
            "FUNCTION f()\n  DEFINE a, b INTEGER\n  # LET a = 1\n  LET b = 2 -- a\nEND FUNCTION",
        );
        let result = scan_usage(&lines, 0..lines.len(), &["a", "b"]);
        assert!(!result.is_used("a"));
        assert!(result.is_used("b"));
        assert_eq!(result.first_usage("b"), Some((UsageRule::Assignment, 3)));
        assert_eq!(result.unused().collect::<Vec<_>>(), vec!["a"]);
        assert_eq!(result.len(), 2);
    }

    #[test]
    fn test_header_does_not_count_as_usage() {
        let lines = split_lines("FUNCTION p_id(p_id)\nEND FUNCTION");
        assert!(!is_used("p_id", &lines));
    }

    #[test]
    fn test_is_used() {
        let lines = split_lines("LET c = 1");
        assert!(is_used("c", &lines));
        assert!(!is_used("a", &lines));
    }
}
