use std::fmt;

use crate::lexer::{Lexer, string_value};
use crate::token::{Location, Token, TokenKind};
use crate::value::{self, Table, Value, ValueKind};

/// Classifies a parser error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseErrorKind {
    /// Quoted string without its closing delimiter.
    UnterminatedString,
    /// Statement does not start with a key name.
    ExpectedKey,
    /// Key not followed by `=`.
    ExpectedAssignment,
    /// `=` or `,` not followed by a value.
    ExpectedValue,
    /// Two values not separated by `,`.
    ExpectedComma,
    /// A non-final key segment already holds a non-table value.
    NotATable { key: String, found: ValueKind },
    /// The target of an assignment is a table.
    AssignToTable { key: String },
    /// Key path with an empty segment, such as `a..b`.
    EmptyKeySegment { key: String },
}

/// Broad error family, independent of the exact token that failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Lexical,
    Syntax,
    KeyPath,
}

impl ParseErrorKind {
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::UnterminatedString => ErrorCategory::Lexical,
            Self::ExpectedKey
            | Self::ExpectedAssignment
            | Self::ExpectedValue
            | Self::ExpectedComma => ErrorCategory::Syntax,
            Self::NotATable { .. } | Self::AssignToTable { .. } | Self::EmptyKeySegment { .. } => {
                ErrorCategory::KeyPath
            }
        }
    }
}

impl fmt::Display for ParseErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => write!(f, "unterminated quoted string"),
            Self::ExpectedKey => write!(f, "expected a key name"),
            Self::ExpectedAssignment => write!(f, "expected '=' after the key name"),
            Self::ExpectedValue => write!(f, "expected a value"),
            Self::ExpectedComma => {
                write!(f, "expected a comma to separate values")
            }
            Self::NotATable { key, found } => {
                write!(f, "'{key}' is a {found}, not a table")
            }
            Self::AssignToTable { key } => {
                write!(f, "'{key}' is a table and cannot be assigned a value")
            }
            Self::EmptyKeySegment { key } => {
                write!(f, "key '{key}' has an empty segment")
            }
        }
    }
}

/// Error produced during parsing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", location.line, location.column)]
pub struct ParseError {
    pub kind: ParseErrorKind,
    /// Byte offset of the offending token.
    pub offset: usize,
    pub location: Location,
}

impl ParseError {
    fn at(source: &str, offset: usize, kind: ParseErrorKind) -> Self {
        Self {
            kind,
            offset,
            location: Location::of(source, offset),
        }
    }

    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        self.kind.category()
    }
}

/// A parsed project script: top-level key name to value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    entries: Table,
}

impl Document {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Table::new(),
        }
    }

    /// Look up a dotted key path, e.g. `"build.flags"`.
    #[must_use]
    pub fn get(&self, path: &str) -> Option<&Value> {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path, None),
        };
        let value = self.entries.get(head)?;
        match rest {
            Some(rest) => value.get(rest),
            None => Some(value),
        }
    }

    #[must_use]
    pub fn contains_key(&self, path: &str) -> bool {
        self.get(path).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub const fn as_table(&self) -> &Table {
        &self.entries
    }

    #[must_use]
    pub fn into_table(self) -> Table {
        self.entries
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.entries
            .iter()
            .try_for_each(|(key, value)| value::write_entry(f, key, value))
    }
}

/// Parse a project script into a `Document`.
///
/// # Errors
///
/// Returns `ParseError` on the first lexical, syntax, or key path error.
/// Nothing of the partially built document is kept.
pub fn parse(source: &str) -> Result<Document, ParseError> {
    let document = Parser::new(source).parse()?;
    tracing::debug!(entries = document.len(), "parsed project script");
    Ok(document)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    ExpectingKey,
    ExpectingAssignment,
    ExpectingValue,
    ExpectingCommaOrTermination,
}

struct Parser<'a> {
    source: &'a str,
    document: Document,
    /// Key path of the statement being parsed.
    target: Vec<String>,
}

impl<'a> Parser<'a> {
    const fn new(source: &'a str) -> Self {
        Self {
            source,
            document: Document::new(),
            target: Vec::new(),
        }
    }

    fn parse(mut self) -> Result<Document, ParseError> {
        let mut state = State::ExpectingKey;
        let tokens = Lexer::new(self.source).filter(|t| t.kind != TokenKind::Whitespace);

        for token in tokens {
            if token.is_unterminated() {
                return Err(self.error(token.range.start, ParseErrorKind::UnterminatedString));
            }
            state = match state {
                State::ExpectingKey => self.expect_key(&token)?,
                State::ExpectingAssignment => self.expect_assignment(&token)?,
                State::ExpectingValue => self.expect_value(&token)?,
                State::ExpectingCommaOrTermination => self.expect_comma(&token)?,
            };
        }

        if state == State::ExpectingAssignment {
            return Err(self.error(self.source.len(), ParseErrorKind::ExpectedAssignment));
        }

        Ok(self.document)
    }

    fn error(&self, offset: usize, kind: ParseErrorKind) -> ParseError {
        ParseError::at(self.source, offset, kind)
    }

    fn expect_key(&mut self, token: &Token) -> Result<State, ParseError> {
        if token.kind == TokenKind::NewLine {
            return Ok(State::ExpectingKey);
        }
        if !token.is_string() {
            return Err(self.error(token.range.start, ParseErrorKind::ExpectedKey));
        }

        let key = string_value(token, self.source);
        let path: Vec<String> = key.split('.').map(str::to_string).collect();
        if path.iter().any(String::is_empty) {
            return Err(self.error(
                token.range.start,
                ParseErrorKind::EmptyKeySegment {
                    key: key.into_owned(),
                },
            ));
        }

        let source = self.source;
        let slot = self
            .slot(&path)
            .map_err(|kind| ParseError::at(source, token.range.start, kind))?;
        match slot {
            Value::Table(_) => {
                return Err(ParseError::at(
                    source,
                    token.range.start,
                    ParseErrorKind::AssignToTable {
                        key: key.into_owned(),
                    },
                ));
            }
            // Reassigning a list key starts a new group.
            slot => slot.begin_group(),
        }

        self.target = path;
        Ok(State::ExpectingAssignment)
    }

    fn expect_assignment(&self, token: &Token) -> Result<State, ParseError> {
        if token.kind == TokenKind::Assignment {
            Ok(State::ExpectingValue)
        } else {
            Err(self.error(token.range.start, ParseErrorKind::ExpectedAssignment))
        }
    }

    fn expect_value(&mut self, token: &Token) -> Result<State, ParseError> {
        if token.kind == TokenKind::NewLine {
            return Ok(State::ExpectingKey);
        }
        if !token.is_string() {
            return Err(self.error(token.range.start, ParseErrorKind::ExpectedValue));
        }

        let source = self.source;
        let text = string_value(token, source).into_owned();
        let path = std::mem::take(&mut self.target);
        let pushed = self
            .slot(&path)
            .and_then(|slot| {
                slot.push(text).map_err(|_| ParseErrorKind::AssignToTable {
                    key: path.join("."),
                })
            })
            .map_err(|kind| ParseError::at(source, token.range.start, kind));
        self.target = path;
        pushed?;

        Ok(State::ExpectingCommaOrTermination)
    }

    fn expect_comma(&self, token: &Token) -> Result<State, ParseError> {
        match token.kind {
            TokenKind::NewLine => Ok(State::ExpectingKey),
            TokenKind::Comma => Ok(State::ExpectingValue),
            _ => Err(self.error(token.range.start, ParseErrorKind::ExpectedComma)),
        }
    }

    /// Resolve `path` to its value slot, creating missing tables on the way
    /// and a `None` value at the end.
    fn slot(&mut self, path: &[String]) -> Result<&mut Value, ParseErrorKind> {
        let Some((last, parents)) = path.split_last() else {
            return Err(ParseErrorKind::ExpectedKey);
        };

        let mut table = &mut self.document.entries;
        for (depth, segment) in parents.iter().enumerate() {
            let value = table
                .entry(segment.clone())
                .or_insert_with(|| Value::Table(Table::new()));
            table = match value {
                Value::Table(inner) => inner,
                other => {
                    return Err(ParseErrorKind::NotATable {
                        key: path[..=depth].join("."),
                        found: other.kind(),
                    });
                }
            };
        }

        Ok(table.entry(last.clone()).or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn scalar_assignment() {
        let doc = parse("name = demo\n").expect("parse failed");
        assert_eq!(doc.get("name"), Some(&Value::from("demo")));
    }

    #[test]
    fn comma_separated_list() {
        let doc = parse("k = \"1\", \"2\"").expect("parse failed");
        assert_eq!(doc.get("k"), Some(&Value::List(strings(&["1", "2"]))));
    }

    #[test]
    fn repeated_list_key_groups() {
        let doc = parse("k = \"1\", \"2\"\nk = \"3\"\n").expect("parse failed");
        let value = doc.get("k").expect("k");
        assert_eq!(
            value,
            &Value::DeepList(vec![strings(&["1", "2"]), strings(&["3"])])
        );
        assert_eq!(value.flatten(), strings(&["1", "2", "3"]));
    }

    #[test]
    fn repeated_scalar_key_becomes_list() {
        let doc = parse("k = a\nk = b\n").expect("parse failed");
        assert_eq!(doc.get("k"), Some(&Value::List(strings(&["a", "b"]))));
    }

    #[test]
    fn dotted_key_creates_table() {
        let doc = parse("a.b = \"v\"").expect("parse failed");
        let table = doc.get("a").and_then(Value::as_table).expect("table");
        assert_eq!(table.get("b"), Some(&Value::from("v")));
        assert_eq!(doc.get("a.b"), Some(&Value::from("v")));
    }

    #[test]
    fn dotted_key_through_scalar_fails() {
        let err = parse("a = \"v\"\na.b = \"w\"").expect_err("should fail");
        assert_eq!(
            err.kind,
            ParseErrorKind::NotATable {
                key: "a".to_string(),
                found: ValueKind::String,
            }
        );
        assert_eq!(err.category(), ErrorCategory::KeyPath);
        assert_eq!(err.location, Location { line: 2, column: 1 });
    }

    #[test]
    fn assigning_table_fails() {
        let err = parse("a.b = x\na = y").expect_err("should fail");
        assert!(matches!(err.kind, ParseErrorKind::AssignToTable { .. }));
    }

    #[test]
    fn empty_statement_declares_none() {
        let doc = parse("k =\n").expect("parse failed");
        assert_eq!(doc.get("k"), Some(&Value::None));
    }

    #[test]
    fn missing_assignment() {
        let err = parse("k v").expect_err("should fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedAssignment);
        assert_eq!(err.location.column, 3);
    }

    #[test]
    fn key_at_end_of_input() {
        let err = parse("k").expect_err("should fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedAssignment);
    }

    #[test]
    fn missing_comma() {
        let err = parse("k = a b").expect_err("should fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedComma);
        assert_eq!(err.offset, 6);
    }

    #[test]
    fn missing_value_after_comma() {
        let err = parse("k = a, =").expect_err("should fail");
        assert_eq!(err.kind, ParseErrorKind::ExpectedValue);
    }

    #[test]
    fn unterminated_string() {
        let err = parse("k = \"abc").expect_err("should fail");
        assert_eq!(err.kind, ParseErrorKind::UnterminatedString);
        assert_eq!(err.offset, 4);
        assert_eq!(err.category(), ErrorCategory::Lexical);
    }

    #[test]
    fn comments_and_blank_lines() {
        let doc = parse("# header\n\nk = v # trailing\n\n").expect("parse failed");
        assert_eq!(doc.len(), 1);
    }
}
