//! Generator configuration.
//!
//! Provides typed configuration with a bon builder and environment variable
//! fallbacks. Command line flags are applied on top by the CLI.

use std::path::{Path, PathBuf};

use bon::bon;
use funcgen_codegen::ArtifactLayout;

/// Schema location relative to the project source directory.
pub const DEFAULT_SCHEMA: &str = "oneflow/api/python/functional/functional_api.yaml";

/// Output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "oneflow/api/python/functional";

pub const DEFAULT_BACKEND: &str = "cpp";

/// Everything one generation run needs to know.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratorConfig {
    /// Project source root; the schema path is resolved against it.
    pub project_source_dir: PathBuf,

    /// Schema file, relative to `project_source_dir` unless absolute.
    pub schema: PathBuf,

    /// Directory receiving the four artifacts. Must already exist.
    pub output_dir: PathBuf,

    /// Backend name passed to [`funcgen_codegen::backend_by_name`].
    pub backend: String,
}

#[bon]
impl GeneratorConfig {
    /// Create a configuration with builder pattern.
    #[builder]
    pub fn builder(
        #[builder(into)] project_source_dir: PathBuf,
        #[builder(into, default = PathBuf::from(DEFAULT_SCHEMA))] schema: PathBuf,
        #[builder(into, default = PathBuf::from(DEFAULT_OUTPUT_DIR))] output_dir: PathBuf,
        #[builder(into, default = DEFAULT_BACKEND.to_string())] backend: String,
    ) -> Self {
        Self { project_source_dir, schema, output_dir, backend }
    }

    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// * `FUNCGEN_SCHEMA` - Schema path (default: `oneflow/api/python/functional/functional_api.yaml`)
    /// * `FUNCGEN_OUTPUT_DIR` - Output directory (default: `oneflow/api/python/functional`)
    /// * `FUNCGEN_BACKEND` - Backend name (default: `cpp`)
    pub fn from_env(project_source_dir: impl Into<PathBuf>) -> Self {
        Self::from_lookup(project_source_dir, |key| std::env::var(key).ok())
    }

    /// Like [`Self::from_env`] with an explicit variable lookup.
    pub fn from_lookup(project_source_dir: impl Into<PathBuf>, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let var = |key: &str| lookup(key).filter(|value| !value.is_empty());

        Self {
            project_source_dir: project_source_dir.into(),
            schema: var("FUNCGEN_SCHEMA").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_SCHEMA)),
            output_dir: var("FUNCGEN_OUTPUT_DIR").map(PathBuf::from).unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            backend: var("FUNCGEN_BACKEND").unwrap_or_else(|| DEFAULT_BACKEND.to_string()),
        }
    }

    /// Full path of the schema file.
    pub fn schema_path(&self) -> PathBuf {
        self.project_source_dir.join(&self.schema)
    }

    /// Artifact file name stem: the schema file name, extension included.
    pub fn stem(&self) -> String {
        self.schema.file_name().map(|name| name.to_string_lossy().into_owned()).unwrap_or_default()
    }

    /// Schema path as printed in the generated notice.
    pub fn source_label(&self) -> String {
        relative_to(&self.schema, &self.project_source_dir).display().to_string()
    }

    /// Include directory of the artifacts.
    ///
    /// A relative output directory is used as written. An absolute one is made
    /// relative to the project source directory when it lies inside it;
    /// otherwise artifacts include each other by bare file name.
    pub fn include_prefix(&self) -> String {
        let dir = relative_to(&self.output_dir, &self.project_source_dir);
        if dir.is_absolute() { String::new() } else { dir.to_string_lossy().replace('\\', "/") }
    }

    pub fn layout(&self) -> ArtifactLayout {
        ArtifactLayout {
            output_dir: self.output_dir.clone(),
            stem: self.stem(),
            include_prefix: self.include_prefix(),
            source: self.source_label(),
        }
    }
}

fn relative_to<'a>(path: &'a Path, base: &Path) -> &'a Path {
    if path.is_absolute() { path.strip_prefix(base).unwrap_or(path) } else { path }
}
