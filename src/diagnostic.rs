//! Plain-text rendering of errors that point into source text.

use std::fmt::Write as _;
use std::ops::Range;

/// Render the line holding `span`, a caret underline beneath the span, and
/// `message`:
///
/// ```text
/// src/[ab
///     ^^^
/// expected a terminating ']'
/// ```
///
/// Spans crossing a line break are cut at the end of their first line. An
/// empty span gets a single caret.
#[must_use]
pub fn render(source: &str, span: Range<usize>, message: &str) -> String {
    let start = floor_char_boundary(source, span.start.min(source.len()));
    let line_start = source[..start].rfind(['\n', '\r']).map_or(0, |i| i + 1);
    let line_end = source[start..]
        .find(['\n', '\r'])
        .map_or(source.len(), |i| start + i);
    let end = floor_char_boundary(source, span.end.clamp(start, line_end));

    let line = &source[line_start..line_end];
    let pad = source[line_start..start].chars().count();
    let width = source[start..end].chars().count().max(1);

    let mut out = String::new();
    let _ = writeln!(out, "{line}");
    let _ = writeln!(out, "{}{}", " ".repeat(pad), "^".repeat(width));
    let _ = write!(out, "{message}");
    out
}

fn floor_char_boundary(source: &str, mut index: usize) -> usize {
    while !source.is_char_boundary(index) {
        index -= 1;
    }
    index
}
