//! Error types for the generator pipeline.

use std::path::PathBuf;

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during one generation run.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Schema failed to load or resolve.
    #[snafu(display("Schema error: {source}"))]
    Schema { source: funcgen_schema::Error },

    /// Artifact rendering failed.
    #[snafu(display("Codegen error: {source}"))]
    Codegen { source: funcgen_codegen::Error },

    /// Schema path is not a regular file.
    #[snafu(display("Schema file {} is not a regular file", path.display()))]
    SchemaNotFound { path: PathBuf },

    /// Output directory does not exist. The generator never creates it.
    #[snafu(display("Could not locate the output directory {}", path.display()))]
    MissingDirectory { path: PathBuf },

    /// Filesystem failure on an artifact.
    #[snafu(display("Failed to {action} {}: {source}", path.display()))]
    Io { action: &'static str, path: PathBuf, source: std::io::Error },

    /// Check mode found artifacts that differ from what would be generated.
    #[snafu(display("{} generated file(s) out of date: {}", paths.len(), display_paths(paths)))]
    Stale { paths: Vec<PathBuf> },
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", ")
}
