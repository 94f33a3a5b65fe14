//! Path normalization against a base directory.
//!
//! Paths are plain strings here; both `/` and `\` separate segments and the
//! output always uses `/`.

use crate::glob::is_separator;

/// Canonical separator of resolved paths.
pub const SEPARATOR: char = '/';

/// Characters that end a path; anything after one is dropped.
#[must_use]
pub fn is_invalid_path_char(c: char) -> bool {
    matches!(c, '"' | '<' | '>' | '|') || c.is_control()
}

/// Split `path` into its non-empty segments, stopping at the first invalid
/// path character.
#[must_use]
pub fn segments(path: &str) -> Vec<&str> {
    let end = path.find(is_invalid_path_char).unwrap_or(path.len());
    path[..end]
        .split(is_separator)
        .filter(|s| !s.is_empty())
        .collect()
}

/// Resolve `.` and `..` segments of `path` against `base`.
///
/// The result starts out as `base` (itself normalized) unless `path` is
/// absolute. Then, segment by segment:
///
/// - `.` leaves the current base unchanged.
/// - Each `..` of a run walks one level up. Walking above the root stops
///   at the root; a relative result keeps the `..` it cannot walk up.
/// - Any other segment is appended.
///
/// The output uses `/` only and has no trailing separator. A UNC root
/// (`\\server`) keeps both leading separators.
#[must_use]
pub fn resolve(path: &str, base: &str) -> String {
    let (root, mut parts) = if is_absolute(path) {
        (root_of(path), Vec::new())
    } else {
        let root = root_of(base);
        let mut parts = Vec::new();
        fold(&mut parts, segments(base), !root.is_empty());
        (root, parts)
    };
    fold(&mut parts, segments(path), !root.is_empty());

    format!("{root}{}", parts.join(&SEPARATOR.to_string()))
}

fn root_of(path: &str) -> &'static str {
    let mut chars = path.chars();
    match (chars.next(), chars.next()) {
        (Some(a), Some(b)) if is_separator(a) && is_separator(b) => "//",
        (Some(a), _) if is_separator(a) => "/",
        _ => "",
    }
}

fn fold<'a>(parts: &mut Vec<&'a str>, segments: Vec<&'a str>, rooted: bool) {
    for segment in segments {
        match segment {
            "." => {}
            ".." => {
                let last = parts.last().copied();
                if last.is_some_and(|l| l != ".." && !is_drive(l)) {
                    parts.pop();
                } else if !rooted && !last.is_some_and(is_drive) {
                    parts.push("..");
                }
            }
            other => parts.push(other),
        }
    }
}

/// `/x`, `\\server\x` or `C:\x`.
#[must_use]
pub fn is_absolute(path: &str) -> bool {
    path.starts_with(is_separator) || segments(path).first().is_some_and(|s| is_drive(s))
}

fn is_drive(segment: &str) -> bool {
    let mut chars = segment.chars();
    matches!(
        (chars.next(), chars.next(), chars.next()),
        (Some(letter), Some(':'), None) if letter.is_ascii_alphabetic()
    )
}

/// Everything before the last separator, ignoring trailing separators.
/// Empty when there is no separator.
#[must_use]
pub fn parent(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    trimmed.rfind(is_separator).map_or("", |i| &trimmed[..i])
}

/// Text after the last separator, ignoring trailing separators.
#[must_use]
pub fn name(path: &str) -> &str {
    let trimmed = path.trim_end_matches(is_separator);
    trimmed
        .rfind(is_separator)
        .map_or(trimmed, |i| &trimmed[i + 1..])
}

/// File name without its extension.
#[must_use]
pub fn base_name(path: &str) -> &str {
    let name = name(path);
    name.rfind('.').map_or(name, |i| &name[..i])
}

/// Text after the last `.` of the file name; empty when there is none.
#[must_use]
pub fn extension(path: &str) -> &str {
    let name = name(path);
    name.rfind('.').map_or("", |i| &name[i + 1..])
}
