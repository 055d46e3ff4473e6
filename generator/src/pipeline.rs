//! Pipeline driver: load, resolve, emit, write.
//!
//! Nothing reaches the output directory until the schema is fully resolved
//! and all four artifacts are rendered.

use funcgen_codegen::{GeneratedArtifact, backend_by_name, emit};
use funcgen_schema::{load_schema, resolve};
use snafu::{ResultExt, ensure};

use crate::config::GeneratorConfig;
use crate::error::{CodegenSnafu, Result, SchemaNotFoundSnafu, SchemaSnafu, StaleSnafu};
use crate::writer::{WriteReport, ensure_directories, stale_artifacts, write_artifacts};

/// Render every artifact in memory.
#[tracing::instrument(skip_all, fields(schema = %config.schema_path().display(), backend = %config.backend))]
pub fn render(config: &GeneratorConfig) -> Result<Vec<GeneratedArtifact>> {
    let backend = backend_by_name(&config.backend).context(CodegenSnafu)?;

    let path = config.schema_path();
    ensure!(path.is_file(), SchemaNotFoundSnafu { path });

    let schema = load_schema(&path).context(SchemaSnafu)?;
    let resolved = resolve(&schema).context(SchemaSnafu)?;
    tracing::debug!(operators = resolved.operators.len(), "schema resolved");

    emit(&resolved, backend.as_ref(), &config.layout()).context(CodegenSnafu)
}

/// Generate and write all artifacts.
pub fn generate(config: &GeneratorConfig) -> Result<WriteReport> {
    let artifacts = render(config)?;
    let report = write_artifacts(&artifacts)?;
    tracing::info!(written = report.written.len(), unchanged = report.unchanged.len(), "generation finished");
    Ok(report)
}

/// Fail with `Stale` if any artifact on disk differs from what would be
/// generated. Writes nothing.
pub fn check(config: &GeneratorConfig) -> Result<()> {
    let artifacts = render(config)?;
    ensure_directories(&artifacts)?;
    let stale = stale_artifacts(&artifacts)?;
    ensure!(stale.is_empty(), StaleSnafu { paths: stale });
    Ok(())
}
