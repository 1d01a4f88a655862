//! Parser module for fglscope.
//!
//! This module recovers the structure of Genero/Informix 4GL sources from
//! line-level heuristics: no grammar, no tokens, just keyword shapes
//! matched against comment-stripped lines.
//!
//! # Pipeline
//!
//! - **comment** - strips `#` and `--` line comments
//! - **blocks** - recognizes `MAIN`, `FUNCTION`, `REPORT`, `GLOBALS` and
//!   `MODULE_VARIABLE` blocks and builds the scope tree
//! - **define** - extracts `DEFINE` and `TYPE` declarations
//! - **record** - extracts the fields of `RECORD ... END RECORD` bodies
//! - **signature** - resolves function parameters
//!
//! # Example
//!
//! ```ignore
//! use fglscope::parser::{scan, ScopeKind};
//!
//! let tree = scan("MAIN\n  DEFINE a INTEGER\nEND MAIN");
//! let main = tree.find(ScopeKind::Main, "MAIN").unwrap();
//! for decl in main.declarations() {
//!     println!("{}: {}", decl.name, decl.type_text);
//! }
//! ```

pub mod blocks;
pub mod comment;
pub mod define;
pub mod patterns;
pub mod record;
pub mod signature;
pub mod types;

// Re-export commonly used types for convenience
pub use blocks::{scan, BlockScanner};
pub use comment::{comment_start, strip_comment};
pub use define::{extract_declarations, parse_define, parse_type};
pub use record::{match_field, parse_record_body, FieldShape, RecordBody};
pub use signature::FunctionSignature;
pub use types::{
    split_lines, Declaration, DeclarationKind, Node, Scope, ScopeKind, ScopeTree, SourceLine,
};
