//! File Writer.
//!
//! Writes rendered artifacts to disk. Every target directory is checked before
//! the first write, files whose content is already byte-identical are left
//! alone, and each write goes through a temporary file in the target
//! directory followed by an atomic rename that keeps the replaced file's
//! permissions.

use std::fs::{self, Permissions};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use funcgen_codegen::GeneratedArtifact;
use snafu::{ResultExt, ensure};
use tempfile::NamedTempFile;

use crate::error::{IoSnafu, MissingDirectorySnafu, Result};

/// Outcome of [`write_artifacts`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriteReport {
    /// Paths whose content changed (or that did not exist).
    pub written: Vec<PathBuf>,

    /// Paths that already had the generated content.
    pub unchanged: Vec<PathBuf>,
}

impl WriteReport {
    /// Whether the run touched no file.
    pub fn is_noop(&self) -> bool {
        self.written.is_empty()
    }
}

fn target_dir(path: &Path) -> &Path {
    match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    }
}

/// Fail with `MissingDirectory` unless every artifact's directory exists.
pub fn ensure_directories(artifacts: &[GeneratedArtifact]) -> Result<()> {
    for artifact in artifacts {
        let dir = target_dir(&artifact.path);
        ensure!(dir.is_dir(), MissingDirectorySnafu { path: dir });
    }
    Ok(())
}

/// Whether the file at `artifact.path` already holds `artifact.contents`.
pub fn is_up_to_date(artifact: &GeneratedArtifact) -> Result<bool> {
    match fs::read(&artifact.path) {
        Ok(existing) => Ok(existing == artifact.contents.as_bytes()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e).context(IoSnafu { action: "read", path: &artifact.path }),
    }
}

/// Artifacts whose file is missing or differs from the rendered content.
pub fn stale_artifacts(artifacts: &[GeneratedArtifact]) -> Result<Vec<PathBuf>> {
    let mut stale = Vec::new();
    for artifact in artifacts {
        if !is_up_to_date(artifact)? {
            stale.push(artifact.path.clone());
        }
    }
    Ok(stale)
}

/// Write every artifact, skipping unchanged ones.
#[tracing::instrument(skip_all, fields(artifacts = artifacts.len()))]
pub fn write_artifacts(artifacts: &[GeneratedArtifact]) -> Result<WriteReport> {
    ensure_directories(artifacts)?;

    let mut report = WriteReport::default();
    for artifact in artifacts {
        if is_up_to_date(artifact)? {
            tracing::debug!(path = %artifact.path.display(), "unchanged, skipping write");
            report.unchanged.push(artifact.path.clone());
            continue;
        }

        write_atomic(&artifact.path, artifact.contents.as_bytes())?;
        tracing::debug!(path = %artifact.path.display(), bytes = artifact.contents.len(), "written");
        report.written.push(artifact.path.clone());
    }
    Ok(report)
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<()> {
    let permissions = target_permissions(path)?;
    let mut file = NamedTempFile::new_in(target_dir(path)).context(IoSnafu { action: "create temporary file for", path })?;
    if let Some(permissions) = permissions {
        file.as_file().set_permissions(permissions).context(IoSnafu { action: "set permissions of", path })?;
    }
    file.write_all(contents).context(IoSnafu { action: "write", path })?;
    file.persist(path).map_err(|e| e.error).context(IoSnafu { action: "replace", path })?;
    Ok(())
}

/// Permissions the replacement file gets: those of the file it replaces, or
/// `rw-r--r--` for a new one. Temporary files start out owner-only.
fn target_permissions(path: &Path) -> Result<Option<Permissions>> {
    match fs::metadata(path) {
        Ok(metadata) => Ok(Some(metadata.permissions())),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(new_file_permissions()),
        Err(e) => Err(e).context(IoSnafu { action: "inspect", path }),
    }
}

#[cfg(unix)]
fn new_file_permissions() -> Option<Permissions> {
    use std::os::unix::fs::PermissionsExt;

    Some(Permissions::from_mode(0o644))
}

#[cfg(not(unix))]
fn new_file_permissions() -> Option<Permissions> {
    None
}
