//! Glob patterns used to pick files out of a project tree.
//!
//! A pattern is compiled once into segments that partition its source text,
//! then tested against any number of paths:
//!
//! | Pattern    | Segment              | Matches                               |
//! |------------|----------------------|---------------------------------------|
//! | `abc`      | `Text`               | the same characters                   |
//! | `/`, `\\`  | `DirectorySeparator` | a run of one or more separators       |
//! | `[abc]`    | `CharSelect`         | one character from the set            |
//! | `[!abc]`   | `CharSelectNot`      | one character outside the set         |
//! | `???`      | `AnyChar(3)`         | exactly three characters              |
//! | `*`        | `AnyName`            | everything up to the next segment     |
//! | `**`, `***` | `AnyPath`           | same as `*`                           |
//!
//! Wildcards pick one split point, the last position where the following
//! segment matches, and never backtrack. `**` does not treat separators
//! specially, so `a/**` and `a/*` match the same paths.

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

/// Largest number of characters a `[...]` class may list.
pub const MAX_SELECTED_CHARS: usize = 64;

/// Classifies a glob compile error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GlobErrorKind {
    /// Character class lists more than `MAX_SELECTED_CHARS` characters.
    TooManyCharacters,
    /// `[` without a closing `]`.
    UnterminatedClass,
}

impl fmt::Display for GlobErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TooManyCharacters => {
                write!(
                    f,
                    "selected too many characters, max is {MAX_SELECTED_CHARS}"
                )
            }
            Self::UnterminatedClass => {
                write!(f, "expected a terminating ']'")
            }
        }
    }
}

/// Error produced while compiling a glob pattern.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{kind} in pattern '{pattern}' at column {}", span.start + 1)]
pub struct GlobError {
    pub kind: GlobErrorKind,
    /// Byte span of the offending class within `pattern`.
    pub span: Range<usize>,
    pub pattern: String,
}

/// What a segment matches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SegmentKind {
    /// Literal text, `len` characters long.
    Text { len: usize },
    DirectorySeparator,
    CharSelect(Vec<char>),
    CharSelectNot(Vec<char>),
    /// A run of `?`.
    AnyChar(usize),
    /// `*`.
    AnyName,
    /// `**`.
    AnyPath,
}

/// One classified piece of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub kind: SegmentKind,
    /// Byte span in the pattern source.
    pub span: Range<usize>,
}

impl Segment {
    /// Characters the segment needs to match at a position. `None` for
    /// wildcards, which take whatever is left over.
    #[must_use]
    pub const fn width(&self) -> Option<usize> {
        match self.kind {
            SegmentKind::Text { len } | SegmentKind::AnyChar(len) => Some(len),
            SegmentKind::DirectorySeparator
            | SegmentKind::CharSelect(_)
            | SegmentKind::CharSelectNot(_) => Some(1),
            SegmentKind::AnyName | SegmentKind::AnyPath => None,
        }
    }

    #[must_use]
    pub const fn is_wildcard(&self) -> bool {
        matches!(self.kind, SegmentKind::AnyName | SegmentKind::AnyPath)
    }
}

/// A compiled glob pattern. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Glob {
    source: String,
    segments: Vec<Segment>,
}

impl Glob {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns `GlobError` for an unterminated or oversized `[...]` class.
    pub fn new(pattern: &str) -> Result<Self, GlobError> {
        let mut segments = Vec::new();
        let mut pos = 0;

        while pos < pattern.len() {
            let segment = next_segment(pattern, pos)?;
            pos = segment.span.end;
            if !segment.span.is_empty() {
                segments.push(segment);
            }
        }

        tracing::trace!(pattern, segments = segments.len(), "compiled glob");
        Ok(Self {
            source: pattern.to_string(),
            segments,
        })
    }

    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Test `path` against the pattern.
    ///
    /// Without `strict`, a pattern that runs out of segments before the
    /// path ends still matches; with `strict` the whole path must be
    /// consumed.
    #[must_use]
    pub fn test(&self, path: &str, strict: bool) -> bool {
        let path: Vec<char> = path.chars().collect();
        let last = self.segments.len().saturating_sub(1);
        let mut cursor = 0;

        for index in 0..self.segments.len() {
            let consumed = self.consume(index, &path, cursor);
            if consumed == 0 {
                return false;
            }
            cursor += consumed;
            if cursor >= path.len() {
                return index == last;
            }
        }

        !strict || cursor == path.len()
    }

    /// Characters of `path` the segment at `index` matches starting at
    /// `cursor`; 0 is a mismatch.
    fn consume(&self, index: usize, path: &[char], cursor: usize) -> usize {
        let segment = &self.segments[index];
        let rest = path.get(cursor..).unwrap_or_default();

        match &segment.kind {
            SegmentKind::Text { len } => {
                let literal = &self.source[segment.span.clone()];
                if rest.len() >= *len && literal.chars().zip(rest).all(|(a, &b)| a == b) {
                    *len
                } else {
                    0
                }
            }
            SegmentKind::DirectorySeparator => {
                rest.iter().take_while(|&&c| is_separator(c)).count()
            }
            SegmentKind::CharSelect(set) => {
                usize::from(rest.first().is_some_and(|c| set.contains(c)))
            }
            SegmentKind::CharSelectNot(set) => {
                usize::from(rest.first().is_some_and(|c| !set.contains(c)))
            }
            SegmentKind::AnyChar(count) => {
                if rest.len() >= *count {
                    *count
                } else {
                    0
                }
            }
            SegmentKind::AnyName | SegmentKind::AnyPath => {
                if index + 1 == self.segments.len() {
                    return rest.len();
                }
                // Without a split point the next segment reports the mismatch.
                self.split_point(index + 1, path, cursor)
                    .map_or(rest.len(), |pos| pos - cursor)
            }
        }
    }

    /// Last position at or after `cursor` where segment `next` matches.
    fn split_point(&self, next: usize, path: &[char], cursor: usize) -> Option<usize> {
        let width = self.segments[next].width()?;
        let last_start = path.len().checked_sub(width)?;
        (cursor..=last_start)
            .rev()
            .find(|&pos| self.consume(next, path, pos) != 0)
    }
}

impl FromStr for Glob {
    type Err = GlobError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl fmt::Display for Glob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[must_use]
pub const fn is_separator(c: char) -> bool {
    c == '/' || c == '\\'
}

const fn is_special(c: char) -> bool {
    matches!(c, '[' | '*' | '?') || is_separator(c)
}

fn run_end(pattern: &str, start: usize, pred: impl Fn(char) -> bool) -> usize {
    pattern[start..]
        .find(|c: char| !pred(c))
        .map_or(pattern.len(), |i| start + i)
}

fn next_segment(pattern: &str, start: usize) -> Result<Segment, GlobError> {
    let rest = &pattern[start..];
    let Some(ch) = rest.chars().next() else {
        return Ok(Segment {
            kind: SegmentKind::Text { len: 0 },
            span: start..start,
        });
    };

    let segment = match ch {
        '*' => {
            let end = run_end(pattern, start, |c| c == '*');
            let kind = if end - start == 1 {
                SegmentKind::AnyName
            } else {
                SegmentKind::AnyPath
            };
            Segment {
                kind,
                span: start..end,
            }
        }
        '[' => return char_class(pattern, start),
        c if is_separator(c) => Segment {
            kind: SegmentKind::DirectorySeparator,
            span: start..run_end(pattern, start, is_separator),
        },
        '?' => {
            let end = run_end(pattern, start, |c| c == '?');
            Segment {
                kind: SegmentKind::AnyChar(end - start),
                span: start..end,
            }
        }
        _ => {
            let end = run_end(pattern, start, |c| !is_special(c));
            Segment {
                kind: SegmentKind::Text {
                    len: pattern[start..end].chars().count(),
                },
                span: start..end,
            }
        }
    };
    Ok(segment)
}

/// Parse `[...]` or `[!...]` starting at the `[`.
fn char_class(pattern: &str, start: usize) -> Result<Segment, GlobError> {
    let error = |kind, end: usize| GlobError {
        kind,
        span: start..end,
        pattern: pattern.to_string(),
    };

    let mut body = start + 1;
    let negated = pattern[body..].starts_with('!');
    if negated {
        body += 1;
    }

    let mut selected = Vec::new();
    let mut chars = pattern[body..].char_indices();
    while let Some((i, c)) = chars.next() {
        let at = body + i;
        match c {
            ']' => {
                let kind = if negated {
                    SegmentKind::CharSelectNot(selected)
                } else {
                    SegmentKind::CharSelect(selected)
                };
                return Ok(Segment {
                    kind,
                    span: start..at + 1,
                });
            }
            _ if selected.len() == MAX_SELECTED_CHARS => {
                return Err(error(GlobErrorKind::TooManyCharacters, at + c.len_utf8()));
            }
            '\\' => match chars.next() {
                Some((_, escaped)) => selected.push(escaped),
                None => break,
            },
            c => selected.push(c),
        }
    }

    Err(error(GlobErrorKind::UnterminatedClass, pattern.len()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn glob(pattern: &str) -> Glob {
        Glob::new(pattern).expect("should compile")
    }

    #[test]
    fn segments_partition_source() {
        let g = glob("src/**/[!_]*.rs");
        let mut pos = 0;
        for segment in g.segments() {
            assert_eq!(segment.span.start, pos);
            pos = segment.span.end;
        }
        assert_eq!(pos, g.source().len());
    }

    #[test]
    fn classification() {
        let g = glob("a//b??*[xy]**");
        let kinds: Vec<_> = g.segments().iter().map(|s| s.kind.clone()).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Text { len: 1 },
                SegmentKind::DirectorySeparator,
                SegmentKind::Text { len: 1 },
                SegmentKind::AnyChar(2),
                SegmentKind::AnyName,
                SegmentKind::CharSelect(vec!['x', 'y']),
                SegmentKind::AnyPath,
            ]
        );
    }

    #[test]
    fn escaped_class_members() {
        let g = glob(r"[\]\\]");
        assert_eq!(
            g.segments()[0].kind,
            SegmentKind::CharSelect(vec![']', '\\'])
        );
    }

    #[test]
    fn unterminated_class() {
        let err = Glob::new("file[ab").expect_err("should fail");
        assert_eq!(err.kind, GlobErrorKind::UnterminatedClass);
        assert_eq!(err.span, 4..7);
        assert_eq!(err.pattern, "file[ab");
    }

    #[test]
    fn too_many_characters() {
        let pattern = format!("[{}]", "a".repeat(MAX_SELECTED_CHARS + 1));
        let err = Glob::new(&pattern).expect_err("should fail");
        assert_eq!(err.kind, GlobErrorKind::TooManyCharacters);

        let pattern = format!("[{}]", "a".repeat(MAX_SELECTED_CHARS));
        assert!(Glob::new(&pattern).is_ok());
    }

    #[test]
    fn star_suffix() {
        let g = glob("*.txt");
        assert!(g.test("report.txt", true));
        assert!(!g.test("report.txt.bak", true));
        assert!(g.test("report.txt.bak", false));
        assert!(!g.test(".txt", false));
    }

    #[test]
    fn char_classes() {
        assert!(glob("[abc]all.json").test("ball.json", true));
        assert!(!glob("[abc]all.json").test("dall.json", true));
        assert!(glob("[!abc]all.json").test("dall.json", true));
        assert!(!glob("[!abc]all.json").test("ball.json", true));
    }

    #[test]
    fn any_char_run() {
        let g = glob("v??.bin");
        assert!(g.test("v12.bin", true));
        assert!(!g.test("v1.bin", true));
    }

    #[test]
    fn separator_runs() {
        let g = glob("a/b");
        assert!(g.test("a//b", true));
        assert!(g.test(r"a\b", true));
        assert!(!g.test("ab", true));
    }

    #[test]
    fn path_shorter_than_pattern() {
        assert!(!glob("abc").test("ab", false));
        assert!(!glob("a/b").test("a/", false));
    }

    #[test]
    fn star_runs_merge() {
        let g = glob("a***");
        assert_eq!(g.segments().len(), 2);
        assert_eq!(g.segments()[1].kind, SegmentKind::AnyPath);
        assert!(g.test("a/b", true));
    }

    #[test]
    fn empty_pattern() {
        let g = glob("");
        assert!(g.segments().is_empty());
        assert!(g.test("anything", false));
        assert!(!g.test("anything", true));
        assert!(g.test("", true));
    }

    #[test]
    fn from_str_and_display() {
        let g: Glob = "src/*.rs".parse().expect("should compile");
        assert_eq!(g.to_string(), "src/*.rs");
    }
}
