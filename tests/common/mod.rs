#![allow(dead_code)]

use std::fs;
use std::path::Path;

use shipper::{Document, Lexer, TokenKind, parse};

pub fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

/// Parse `input`, panicking with the rendered diagnostic on failure.
pub fn parse_ok(input: &str) -> Document {
    parse(input).unwrap_or_else(|e| {
        let rendered = shipper::Error::from(e.clone()).render(input);
        panic!("parse failed: {e}\n{rendered}")
    })
}

/// Token kinds of `input`, whitespace dropped.
pub fn kinds(input: &str) -> Vec<TokenKind> {
    Lexer::new(input)
        .map(|t| t.kind)
        .filter(|k| *k != TokenKind::Whitespace)
        .collect()
}

/// Create `files` (relative paths) under `root` with parent directories.
pub fn write_tree(root: &Path, files: &[&str]) {
    for file in files {
        let path = root.join(file);
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).expect("create dir");
        }
        fs::write(&path, "").expect("write file");
    }
}
