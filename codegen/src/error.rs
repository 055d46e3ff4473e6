//! Error types for code generation.

use snafu::Snafu;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur during code generation.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Malformed artifact template.
    #[snafu(display("Template error at byte {offset}: {reason}"))]
    Template { offset: usize, reason: String },

    /// No backend registered under this name.
    #[snafu(display("Unknown backend '{name}' (available: {available})"))]
    UnknownBackend { name: String, available: String },
}
