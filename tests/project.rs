//! Loading projects from disk and selecting their files.

mod common;

use std::fs;

use common::write_tree;
use shipper::project::{BASE_MACRO, TARGET_MACRO};
use shipper::{CommandMacro, Project, ProjectError, ValueKind};

const SCRIPT: &str = "\
# headers shipped with the library
base = './include'
target = '__location__/dist'
header_match = '*.h', '*.hpp'
header_unmatch = '*_impl.h'
command = copy, '__base__', '__target__'
";

#[test]
fn load_resolves_paths_against_script_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("project.ship");
    fs::write(&script, SCRIPT).expect("write script");

    let project = Project::load(&script).expect("load");
    assert!(project.base.ends_with("/include"), "{}", project.base);
    assert_eq!(project.base, format!("{}/include", project.location));
    assert_eq!(
        project.target.as_deref(),
        Some(format!("{}/dist", project.location).as_str())
    );
    assert_eq!(project.macros().get(BASE_MACRO), Some(project.base.as_str()));
    assert_eq!(
        project.commands,
        vec![CommandMacro {
            name: "copy".into(),
            args: vec![
                project.base.clone(),
                project.macros().get(TARGET_MACRO).unwrap_or_default().to_string(),
            ],
        }]
    );
}

#[test]
fn header_files_applies_include_and_exclude() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("project.ship"), SCRIPT).expect("write script");
    write_tree(
        dir.path(),
        &[
            "include/api.h",
            "include/api_impl.h",
            "include/detail/vector.hpp",
            "include/notes.txt",
            "src/main.c",
        ],
    );

    let project = Project::load(&dir.path().join("project.ship")).expect("load");
    let base = &project.base;
    assert_eq!(
        project.header_files().expect("walk"),
        vec![format!("{base}/api.h"), format!("{base}/detail/vector.hpp")]
    );
    assert_eq!(project.available_files().expect("walk").len(), 4);
}

#[test]
fn missing_base_selects_nothing() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("project.ship");
    fs::write(&script, "base = missing\nheader_match = '*'\n").expect("write script");

    let project = Project::load(&script).expect("load");
    assert!(project.header_files().expect("walk").is_empty());
}

#[test]
fn missing_script_is_io_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let err = Project::load(&dir.path().join("absent.ship")).unwrap_err();
    assert!(matches!(err, ProjectError::Io { .. }));
}

#[test]
fn broken_script_is_parse_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("project.ship");
    fs::write(&script, "base = 'open\n").expect("write script");

    let err = Project::load(&script).unwrap_err();
    assert!(matches!(err, ProjectError::Parse { .. }));
    assert!(err.to_string().contains("unterminated"), "{err}");
}

#[test]
fn table_target_is_rejected() {
    let dir = tempfile::tempdir().expect("tempdir");
    let script = dir.path().join("project.ship");
    fs::write(&script, "target.debug = out\n").expect("write script");

    let err = Project::load(&script).unwrap_err();
    assert!(matches!(
        err,
        ProjectError::ExpectedString {
            found: ValueKind::Table,
            ..
        }
    ));
}
