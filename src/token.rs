use std::ops::Range;

/// Line and column of a byte offset, both 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Location {
    pub line: usize,
    pub column: usize,
}

impl Location {
    /// Locate `offset` inside `source`.
    ///
    /// Columns count characters, not bytes. A `\r\n` pair counts as a
    /// single line break; a lone `\r` counts as one too.
    #[must_use]
    pub fn of(source: &str, offset: usize) -> Self {
        let mut line = 1;
        let mut column = 1;
        let mut chars = source.char_indices().peekable();

        while let Some((i, ch)) = chars.next() {
            if i >= offset {
                break;
            }
            match ch {
                '\r' => {
                    if matches!(chars.peek(), Some(&(j, '\n')) if j < offset) {
                        chars.next();
                    }
                    line += 1;
                    column = 1;
                }
                '\n' => {
                    line += 1;
                    column = 1;
                }
                _ => column += 1,
            }
        }

        Self { line, column }
    }
}

/// Token kinds produced by the lexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Run of non-newline whitespace.
    Whitespace,
    /// Run of `\n`/`\r` characters.
    NewLine,
    /// Double-quoted string or bare identifier.
    String,
    /// Single-quoted string (`'...'`), no escapes.
    LiteralString,
    /// `=`.
    Assignment,
    /// `,`.
    Comma,
    /// A single character that starts no other token.
    Unknown,
}

/// Shape of a quoted string token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quote {
    /// Bare identifier, not quoted at all.
    None,
    /// `"..."` or `'...'`.
    Single,
    /// `"""..."""` or `'''...'''`.
    Triple,
}

impl Quote {
    /// Length of one delimiter run in bytes.
    #[must_use]
    pub const fn width(self) -> usize {
        match self {
            Self::None => 0,
            Self::Single => 1,
            Self::Triple => 3,
        }
    }
}

/// A single token: its kind and the byte range it covers.
///
/// For quoted strings the range covers the content only, delimiters
/// stripped. An unterminated string has `range.end == UNTERMINATED` and
/// `range.start` pointing at the opening quote.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub range: Range<usize>,
    pub quote: Quote,
}

/// End sentinel of an unterminated string token.
pub const UNTERMINATED: usize = usize::MAX;

impl Token {
    #[must_use]
    pub const fn new(kind: TokenKind, range: Range<usize>) -> Self {
        Self {
            kind,
            range,
            quote: Quote::None,
        }
    }

    /// Whether this token can name a key or carry a value.
    #[must_use]
    pub const fn is_string(&self) -> bool {
        matches!(self.kind, TokenKind::String | TokenKind::LiteralString)
    }

    /// Whether the token is a string whose closing delimiter was never found.
    #[must_use]
    pub const fn is_unterminated(&self) -> bool {
        self.range.end == UNTERMINATED
    }

    /// Raw source text of the token. Empty for unterminated strings.
    #[must_use]
    pub fn text<'s>(&self, source: &'s str) -> &'s str {
        source.get(self.range.clone()).unwrap_or_default()
    }
}
