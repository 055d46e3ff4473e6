use std::fs;
use std::path::PathBuf;

use funcgen_codegen::{ArtifactKind, GeneratedArtifact};

use crate::error::Error;
use crate::writer::{ensure_directories, is_up_to_date, stale_artifacts, write_artifacts};

fn artifact(path: PathBuf, contents: &str) -> GeneratedArtifact {
    GeneratedArtifact { kind: ArtifactKind::Header, path, contents: contents.to_string() }
}

#[test]
fn test_writes_new_files() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.h");

    let report = write_artifacts(&[artifact(path.clone(), "int a;\n")]).unwrap();

    assert_eq!(report.written, [path.clone()]);
    assert!(report.unchanged.is_empty());
    assert_eq!(fs::read_to_string(&path).unwrap(), "int a;\n");
}

#[test]
fn test_identical_content_is_not_rewritten() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.h");
    fs::write(&path, "int a;\n").unwrap();
    let before = fs::metadata(&path).unwrap().modified().unwrap();

    let report = write_artifacts(&[artifact(path.clone(), "int a;\n")]).unwrap();

    assert!(report.is_noop());
    assert_eq!(report.unchanged, [path.clone()]);
    assert_eq!(fs::metadata(&path).unwrap().modified().unwrap(), before);
}

#[test]
fn test_changed_content_is_replaced() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.h");
    fs::write(&path, "int a;\n").unwrap();

    let report = write_artifacts(&[artifact(path.clone(), "int b;\n")]).unwrap();

    assert_eq!(report.written, [path.clone()]);
    assert_eq!(fs::read_to_string(&path).unwrap(), "int b;\n");
    // No temporary files left behind.
    assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
}

#[test]
fn test_missing_directory_fails_before_any_write() {
    let dir = tempfile::tempdir().unwrap();
    let good = dir.path().join("a.h");
    let missing = dir.path().join("missing");

    let result = write_artifacts(&[artifact(good.clone(), "int a;\n"), artifact(missing.join("b.h"), "int b;\n")]);

    match result {
        Err(Error::MissingDirectory { path }) => assert_eq!(path, missing),
        other => panic!("expected missing directory, got {other:?}"),
    }
    assert!(!good.exists());
    assert!(!missing.exists());
}

#[test]
fn test_ensure_directories_accepts_existing() {
    let dir = tempfile::tempdir().unwrap();
    ensure_directories(&[artifact(dir.path().join("a.h"), "")]).unwrap();
}

#[test]
fn test_up_to_date_compares_raw_bytes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("a.h");
    fs::write(&path, "int a;\r\n").unwrap();

    assert!(!is_up_to_date(&artifact(path.clone(), "int a;\n")).unwrap());
    assert!(is_up_to_date(&artifact(path.clone(), "int a;\r\n")).unwrap());
    assert!(!is_up_to_date(&artifact(dir.path().join("none.h"), "")).unwrap());
}

#[test]
fn test_stale_artifacts() {
    let dir = tempfile::tempdir().unwrap();
    let fresh = dir.path().join("fresh.h");
    let old = dir.path().join("old.h");
    let absent = dir.path().join("absent.h");
    fs::write(&fresh, "x").unwrap();
    fs::write(&old, "x").unwrap();

    let stale = stale_artifacts(&[artifact(fresh, "x"), artifact(old.clone(), "y"), artifact(absent.clone(), "z")]).unwrap();
    assert_eq!(stale, [old, absent]);
}

#[cfg(unix)]
mod permissions {
    use std::fs;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    use super::artifact;
    use crate::writer::write_artifacts;

    fn mode(path: &Path) -> u32 {
        fs::metadata(path).unwrap().permissions().mode() & 0o777
    }

    #[test]
    fn test_rewrite_keeps_existing_mode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");
        fs::write(&path, "int a;\n").unwrap();
        fs::set_permissions(&path, fs::Permissions::from_mode(0o664)).unwrap();

        write_artifacts(&[artifact(path.clone(), "int b;\n")]).unwrap();

        assert_eq!(fs::read_to_string(&path).unwrap(), "int b;\n");
        assert_eq!(mode(&path), 0o664);
    }

    #[test]
    fn test_new_file_is_world_readable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.h");

        write_artifacts(&[artifact(path.clone(), "int a;\n")]).unwrap();

        assert_eq!(mode(&path), 0o644);
    }
}
