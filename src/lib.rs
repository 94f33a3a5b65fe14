//! Project script lexer, parser, and glob matcher for the `shipper` build
//! tool.
//!
//! A project script is a list of `key = value, value` statements. Keys may
//! be dotted to build nested tables, and a key assigned a list more than
//! once keeps one group per statement. Glob patterns written in the script
//! pick the files a build works on.
//!
//! # Quick start
//!
//! ## Parse a project script
//!
//! ```
//! use shipper::{parse, Value};
//!
//! let doc = parse("name = demo\nflags = '-O2', '-g'\nflags = '-Wall'\n").unwrap();
//! assert_eq!(doc.get("name"), Some(&Value::from("demo")));
//! assert_eq!(doc.get("flags").unwrap().flatten(), ["-O2", "-g", "-Wall"]);
//! ```
//!
//! ## Match paths against a glob
//!
//! ```
//! use shipper::Glob;
//!
//! let glob = Glob::new("src/*.rs").unwrap();
//! assert!(glob.test("src/main.rs", true));
//! assert!(!glob.test("src/main.c", true));
//! ```

// Allow noisy pedantic lints that don't add value for
// a library crate.
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::module_name_repetitions
)]

pub mod diagnostic;
pub mod glob;
pub mod lexer;
pub mod parser;
pub mod path;
pub mod project;
pub mod token;
pub mod value;

pub use glob::{Glob, GlobError, GlobErrorKind, Segment, SegmentKind};
pub use lexer::{LexError, LexErrorKind, Lexer, tokenize};
pub use parser::{Document, ErrorCategory, ParseError, ParseErrorKind, parse};
pub use path::resolve;
pub use project::{CommandMacro, Project, ProjectError};
pub use token::{Location, Token, TokenKind};
pub use value::{Table, Value, ValueKind};

/// Unified error type covering lexing, parsing, and glob compilation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    /// A lexer error.
    #[error("{0}")]
    Lex(#[from] LexError),
    /// A parser error.
    #[error("{0}")]
    Parse(#[from] ParseError),
    /// A glob compile error.
    #[error("{0}")]
    Glob(#[from] GlobError),
}

impl Error {
    /// Render the error against the text it was produced from: the script
    /// for lex and parse errors. Glob errors carry their own pattern.
    #[must_use]
    pub fn render(&self, source: &str) -> String {
        match self {
            Self::Lex(e) => diagnostic::render(source, e.offset..e.offset + 1, &e.kind.to_string()),
            Self::Parse(e) => {
                diagnostic::render(source, e.offset..e.offset + 1, &e.kind.to_string())
            }
            Self::Glob(e) => diagnostic::render(&e.pattern, e.span.clone(), &e.kind.to_string()),
        }
    }
}
