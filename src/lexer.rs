use std::borrow::Cow;
use std::fmt;

use crate::token::{Location, Quote, Token, TokenKind, UNTERMINATED};

/// Classifies a lexer error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexErrorKind {
    /// Quoted string without its closing delimiter.
    UnterminatedString,
}

impl fmt::Display for LexErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnterminatedString => {
                write!(f, "unterminated quoted string")
            }
        }
    }
}

/// Error produced during lexing.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} at line {}, column {}", location.line, location.column)]
pub struct LexError {
    pub kind: LexErrorKind,
    /// Byte offset of the opening quote.
    pub offset: usize,
    pub location: Location,
}

impl LexError {
    #[must_use]
    pub fn unterminated(source: &str, offset: usize) -> Self {
        Self {
            kind: LexErrorKind::UnterminatedString,
            offset,
            location: Location::of(source, offset),
        }
    }
}

/// Tokenize a whole project script.
///
/// Whitespace and newline tokens are kept; comments are dropped.
///
/// # Errors
///
/// Returns `LexError` on the first unterminated quoted string.
pub fn tokenize(input: &str) -> Result<Vec<Token>, LexError> {
    Lexer::new(input)
        .map(|token| {
            if token.is_unterminated() {
                Err(LexError::unterminated(input, token.range.start))
            } else {
                Ok(token)
            }
        })
        .collect()
}

/// Lazy token stream over a project script.
///
/// Every byte is visited once. Dropping the iterator early is fine; the
/// remaining input is simply never scanned.
#[derive(Debug, Clone)]
pub struct Lexer<'a> {
    source: &'a str,
    pos: usize,
}

impl<'a> Lexer<'a> {
    #[must_use]
    pub const fn new(source: &'a str) -> Self {
        Self { source, pos: 0 }
    }

    #[must_use]
    pub const fn source(&self) -> &'a str {
        self.source
    }

    /// Byte offset of the next unread character.
    #[must_use]
    pub const fn position(&self) -> usize {
        self.pos
    }

    fn rest(&self) -> &'a str {
        &self.source[self.pos..]
    }

    fn run(&mut self, kind: TokenKind, pred: impl Fn(char) -> bool) -> Token {
        let start = self.pos;
        self.pos += run_len(self.rest(), pred);
        Token::new(kind, start..self.pos)
    }

    fn single(&mut self, kind: TokenKind, ch: char) -> Token {
        let start = self.pos;
        self.pos += ch.len_utf8();
        Token::new(kind, start..self.pos)
    }

    fn skip_comment(&mut self) {
        self.pos += run_len(self.rest(), |c| !is_newline(c));
    }

    fn read_string(&mut self) -> Token {
        let bytes = self.source.as_bytes();
        let start = self.pos;
        let delim = bytes[start];
        let kind = if delim == b'"' {
            TokenKind::String
        } else {
            TokenKind::LiteralString
        };
        let quote = quote_style(bytes, start);
        let width = quote.width();
        let escapes = delim == b'"';

        let mut i = start + width;
        while i + width <= bytes.len() {
            if escapes && bytes[i] == b'\\' {
                i += 2;
                continue;
            }
            if bytes[i] == delim && repeat_len(bytes, i, delim) >= width {
                self.pos = i + width;
                return Token {
                    kind,
                    range: start + width..i,
                    quote,
                };
            }
            i += 1;
        }

        self.pos = self.source.len();
        Token {
            kind,
            range: start..UNTERMINATED,
            quote,
        }
    }
}

impl Iterator for Lexer<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        loop {
            let ch = self.rest().chars().next()?;

            if is_newline(ch) {
                return Some(self.run(TokenKind::NewLine, is_newline));
            }
            if ch.is_whitespace() {
                return Some(self.run(TokenKind::Whitespace, |c| {
                    c.is_whitespace() && !is_newline(c)
                }));
            }

            match ch {
                '=' => return Some(self.single(TokenKind::Assignment, ch)),
                ',' => return Some(self.single(TokenKind::Comma, ch)),
                '"' | '\'' => return Some(self.read_string()),
                '#' => {
                    self.skip_comment();
                    continue;
                }
                _ => {}
            }

            if run_len(self.rest(), is_identifier_char) == 0 {
                return Some(self.single(TokenKind::Unknown, ch));
            }
            return Some(self.run(TokenKind::String, is_identifier_char));
        }
    }
}

/// The text a string token stands for.
///
/// Double-quoted strings have their escapes processed; literal strings and
/// bare identifiers are returned as written.
#[must_use]
pub fn string_value<'s>(token: &Token, source: &'s str) -> Cow<'s, str> {
    let text = token.text(source);
    if token.kind == TokenKind::String && token.quote != Quote::None {
        unescape(text)
    } else {
        Cow::Borrowed(text)
    }
}

/// Process backslash escapes. Unknown escapes keep their backslash so that
/// Windows paths survive unharmed.
#[must_use]
pub fn unescape(text: &str) -> Cow<'_, str> {
    if !text.contains('\\') {
        return Cow::Borrowed(text);
    }

    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            out.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => out.push('\n'),
            Some('t') => out.push('\t'),
            Some('r') => out.push('\r'),
            Some(c @ ('"' | '\\')) => out.push(c),
            Some(c) => {
                out.push('\\');
                out.push(c);
            }
            None => out.push('\\'),
        }
    }
    Cow::Owned(out)
}

#[must_use]
pub const fn is_newline(c: char) -> bool {
    c == '\n' || c == '\r'
}

/// Characters allowed in a bare key or value.
#[must_use]
pub fn is_identifier_char(c: char) -> bool {
    c.is_alphanumeric() || c == '.' || c == '-' || c == '_'
}

fn run_len(text: &str, pred: impl Fn(char) -> bool) -> usize {
    text.find(|c: char| !pred(c)).unwrap_or(text.len())
}

fn repeat_len(bytes: &[u8], from: usize, b: u8) -> usize {
    bytes[from..].iter().take_while(|&&x| x == b).count()
}

/// Triple delimiters need room for both the opening and closing run.
fn quote_style(bytes: &[u8], start: usize) -> Quote {
    let rest = &bytes[start..];
    if rest.len() >= 6 && rest[1] == rest[0] && rest[2] == rest[0] {
        Quote::Triple
    } else {
        Quote::Single
    }
}
