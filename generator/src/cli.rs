//! Command line interface.

use std::path::PathBuf;

use clap::Parser;

use crate::config::GeneratorConfig;
use crate::error::Result;
use crate::pipeline::{check, generate};

/// Initialize tracing subscriber for logging.
///
/// Honors `RUST_LOG`, defaults to `warn`, and writes to stderr.
pub fn init_logging(disable: bool) {
    use tracing_subscriber::EnvFilter;

    if disable {
        return;
    }

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

#[derive(Debug, Parser)]
#[command(name = "funcgen", about = "Generate functional API bindings from an operator schema")]
pub struct Args {
    /// The project source code directory.
    #[arg(long, visible_alias = "project_source_dir")]
    pub project_source_dir: PathBuf,

    /// Schema file relative to the project source directory [env: FUNCGEN_SCHEMA]
    #[arg(long)]
    pub schema: Option<PathBuf>,

    /// Directory receiving the generated files; must exist [env: FUNCGEN_OUTPUT_DIR]
    #[arg(long)]
    pub output_dir: Option<PathBuf>,

    /// Code generation backend [env: FUNCGEN_BACKEND]
    #[arg(long)]
    pub backend: Option<String>,

    /// Only report whether generated files are up to date
    #[arg(long)]
    pub check: bool,

    /// Suppress all logging
    #[arg(long)]
    pub log_disable: bool,
}

impl Args {
    /// Environment first, then flags on top.
    pub fn config(&self) -> GeneratorConfig {
        let mut config = GeneratorConfig::from_env(&self.project_source_dir);
        if let Some(schema) = &self.schema {
            config.schema = schema.clone();
        }
        if let Some(output_dir) = &self.output_dir {
            config.output_dir = output_dir.clone();
        }
        if let Some(backend) = &self.backend {
            config.backend = backend.clone();
        }
        config
    }
}

/// Run the command described by `args`, returning a one-line summary.
pub fn run(args: &Args) -> Result<String> {
    let config = args.config();

    if args.check {
        check(&config)?;
        return Ok("generated files are up to date".to_string());
    }

    let report = generate(&config)?;
    Ok(format!("{} file(s) written, {} unchanged", report.written.len(), report.unchanged.len()))
}
