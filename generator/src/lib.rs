//! Functional API binding generator.
//!
//! Runs the full pipeline: the YAML operator schema is loaded and resolved
//! by `funcgen-schema`, rendered into four artifacts by `funcgen-codegen`,
//! and written here.
//!
//! # Module Organization
//!
//! - [`config`] - GeneratorConfig with builder and environment fallbacks
//! - [`pipeline`] - `render`, `generate` and `check`
//! - [`writer`] - Directory checks, unchanged-content skipping, atomic writes
//! - [`cli`] - Command line arguments and logging setup
//! - [`error`] - Error types and result handling

pub mod cli;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod writer;


pub use config::GeneratorConfig;
pub use error::{Error, Result};
pub use pipeline::{check, generate, render};
pub use writer::{WriteReport, write_artifacts};
