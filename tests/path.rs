//! Path resolution properties.

use shipper::path::{base_name, extension, is_absolute, name, parent};
use shipper::resolve;

#[test]
fn resolve_is_idempotent() {
    for (path, base) in [
        ("./a/../b", "/root"),
        ("x/y/../../z", "/p/q"),
        (r"..\..\up", r"C:\deep\tree"),
        ("/abs/./path/", "/ignored"),
    ] {
        let once = resolve(path, base);
        assert_eq!(resolve(&once, base), once, "{path} against {base}");
        assert_eq!(resolve(&once, ""), once, "{path} against {base}");
    }
}

#[test]
fn resolve_output_uses_forward_slashes() {
    let out = resolve(r"a\b\c", r"\\server\share");
    assert!(!out.contains('\\'));
    assert_eq!(out, "//server/share/a/b/c");
}

#[test]
fn resolve_has_no_trailing_separator() {
    assert_eq!(resolve("dir/", "/base/"), "/base/dir");
    assert_eq!(resolve(".", "/base/"), "/base");
}

#[test]
fn resolve_double_dot_run() {
    assert_eq!(resolve("../../../x", "/a/b/c/d"), "/a/x");
}

#[test]
fn resolve_relative_base() {
    assert_eq!(resolve("../x", "proj/src"), "proj/x");
    assert_eq!(resolve("../../../x", "proj/src"), "../x");
}

#[test]
fn resolve_stops_at_invalid_character() {
    assert_eq!(resolve("a/b<c/d", "/r"), "/r/a/b");
    assert_eq!(resolve("a\nb", "/r"), "/r/a");
}

#[test]
fn absolute_detection() {
    assert!(is_absolute("/x"));
    assert!(is_absolute(r"\\server\x"));
    assert!(is_absolute("c:/x"));
    assert!(!is_absolute("x/y"));
    assert!(!is_absolute("ab:/x"));
}

#[test]
fn name_parts() {
    assert_eq!(parent(r"C:\a\b.txt"), r"C:\a");
    assert_eq!(name(r"C:\a\b.txt"), "b.txt");
    assert_eq!(base_name("archive.tar.gz"), "archive.tar");
    assert_eq!(extension("archive.tar.gz"), "gz");
    assert_eq!(extension("dir.d/file"), "");
}
