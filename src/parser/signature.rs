//! Function parameter resolution.

use serde::Serialize;

use super::define::extract_declarations;
use super::patterns::FUNCTION_SIGNATURE;
use super::types::{Scope, ScopeKind, SourceLine};

/// How far past the header a parameter list may wrap.
const MAX_HEADER_LINES: usize = 10;

/// The parameters of one function.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FunctionSignature {
    pub name: String,
    /// Names listed between the header parentheses.
    pub bracket_parameters: Vec<String>,
    /// Bracket parameters that are also typed by a `DEFINE` in the body.
    pub define_parameters: Vec<String>,
    /// Union of both lists, without duplicates.
    pub all_parameters: Vec<String>,
    /// Index of the line that closes the parameter list.
    #[serde(skip)]
    pub header_end: usize,
}

impl FunctionSignature {
    /// Resolves the signature of a function scope.
    ///
    /// Returns `None` if the header carries no parenthesized list.
    pub fn resolve(lines: &[SourceLine], scope: &Scope) -> Option<Self> {
        let (header, header_end) = joined_header(lines, scope.start_line, scope.end_line);
        let caps = FUNCTION_SIGNATURE.captures(&header)?;
        let name = caps.get(1)?.as_str().to_string();

        let bracket_parameters: Vec<String> = caps
            .get(2)?
            .as_str()
            .split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect();

        let mut define_parameters: Vec<String> = Vec::new();
        let body_start = header_end + 1;
        if body_start <= scope.end_line {
            for decl in extract_declarations(lines, body_start, scope.end_line, ScopeKind::Function)
            {
                let is_param = bracket_parameters
                    .iter()
                    .any(|p| p.eq_ignore_ascii_case(&decl.name));
                if is_param && !contains(&define_parameters, &decl.name) {
                    define_parameters.push(decl.name);
                }
            }
        }

        let mut all_parameters = bracket_parameters.clone();
        for p in &define_parameters {
            if !contains(&all_parameters, p) {
                all_parameters.push(p.clone());
            }
        }
        all_parameters.dedup_by(|a, b| a.eq_ignore_ascii_case(b));

        Some(Self {
            name,
            bracket_parameters,
            define_parameters,
            all_parameters,
            header_end,
        })
    }

    /// Returns true if `name` is a parameter (case-insensitive).
    pub fn is_parameter(&self, name: &str) -> bool {
        contains(&self.all_parameters, name)
    }
}

fn contains(list: &[String], name: &str) -> bool {
    list.iter().any(|p| p.eq_ignore_ascii_case(name))
}

/// Joins the header with the lines a wrapped parameter list spills onto.
fn joined_header(lines: &[SourceLine], start: usize, end: usize) -> (String, usize) {
    let mut header = String::new();
    let limit = end.min(start + MAX_HEADER_LINES).min(lines.len().saturating_sub(1));
    for k in start..=limit {
        if !header.is_empty() {
            header.push(' ');
        }
        header.push_str(&lines[k].code);
        if !header.contains('(') || header.contains(')') {
            return (header, k);
        }
    }
    (lines.get(start).map(|l| l.code.clone()).unwrap_or_default(), start)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::blocks::BlockScanner;
    use crate::parser::types::split_lines;

    fn signature_of(text: &str) -> FunctionSignature {
        let lines = split_lines(text);
        let tree = BlockScanner::new(&lines).scan();
        let scope = tree.scopes_of_kind(ScopeKind::Function).next().unwrap();
        FunctionSignature::resolve(&lines, scope).unwrap()
    }

    #[test]
    fn test_bracket_and_define_parameters() {
        let sig = signature_of(
            "FUNCTION load(p_id, p_row)\n  DEFINE p_id INTEGER\n  DEFINE p_row RECORD LIKE oea_file.*\n  DEFINE l_n INTEGER\nEND FUNCTION",
        );
        assert_eq!(sig.name, "load");
        assert_eq!(sig.bracket_parameters, vec!["p_id", "p_row"]);
        assert_eq!(sig.define_parameters, vec!["p_id", "p_row"]);
        assert_eq!(sig.all_parameters, vec!["p_id", "p_row"]);
        assert!(sig.is_parameter("P_ID"));
        assert!(!sig.is_parameter("l_n"));
    }

    #[test]
    fn test_empty_parameter_list() {
        let sig = signature_of("FUNCTION f()\nEND FUNCTION");
        assert!(sig.all_parameters.is_empty());
        assert_eq!(sig.header_end, 0);
    }

    #[test]
    fn test_wrapped_parameter_list() {
        let sig = signature_of("FUNCTION f(a,\n           b)\n  DEFINE a, b INTEGER\nEND FUNCTION");
        assert_eq!(sig.bracket_parameters, vec!["a", "b"]);
        assert_eq!(sig.header_end, 1);
    }

    #[test]
    fn test_missing_parentheses() {
        let lines = split_lines("FUNCTION f\nEND FUNCTION");
        let tree = BlockScanner::new(&lines).scan();
        let scope = tree.scopes().next().unwrap();
        assert!(FunctionSignature::resolve(&lines, scope).is_none());
    }
}
