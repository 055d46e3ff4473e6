//! Error types for schema loading and overload resolution.

use std::path::PathBuf;

use snafu::Snafu;

use crate::signature::SignatureError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur while loading or resolving a schema.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Schema file could not be read.
    #[snafu(display("failed to read schema file {}: {source}", path.display()))]
    ReadSchema { path: PathBuf, source: std::io::Error },

    /// Schema document is not a sequence of operator entries.
    #[snafu(display("malformed schema document: {source}"))]
    Document { source: serde_yaml::Error },

    /// Operator entry is malformed as a whole.
    #[snafu(display("operator '{op}': {reason}"))]
    InvalidEntry { op: String, reason: String },

    /// A signature string failed to parse.
    #[snafu(display("operator '{op}' overload #{index} `{signature}`: {source}"))]
    Parse { op: String, index: usize, signature: String, source: SignatureError },

    /// Unknown type token in a signature.
    #[snafu(display("operator '{op}' overload #{index} `{signature}`: unknown type `{token}`"))]
    UnknownType { op: String, index: usize, signature: String, token: String },

    /// A required positional parameter follows one with a default.
    #[snafu(display(
        "operator '{op}' overload #{index} `{signature}`: required parameter '{param}' follows a parameter with a default value"
    ))]
    ParameterOrder { op: String, index: usize, signature: String, param: String },

    /// Two overloads cannot be told apart at call time.
    #[snafu(display(
        "operator '{op}': overloads #{first} `{first_signature}` and #{second} `{second_signature}` are ambiguous for {arity} positional argument(s)"
    ))]
    AmbiguousOverload {
        op: String,
        first: usize,
        second: usize,
        first_signature: String,
        second_signature: String,
        arity: usize,
    },

    /// One native function and parameter list declared with two return types.
    #[snafu(display(
        "native function '{function}' is declared by '{first_op}' and '{second_op}' with the same parameters but different return types"
    ))]
    ConflictingFunction { function: String, first_op: String, second_op: String },
}

impl Error {
    /// Build the error for a failed signature, lifting unknown types into
    /// their own variant.
    pub(crate) fn from_signature(op: &str, index: usize, signature: &str, source: SignatureError) -> Self {
        match source {
            SignatureError::UnknownType { token } => {
                Self::UnknownType { op: op.to_string(), index, signature: signature.to_string(), token }
            }
            source => Self::Parse { op: op.to_string(), index, signature: signature.to_string(), source },
        }
    }

    /// Whether this error is one of the ambiguity errors.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::AmbiguousOverload { .. })
    }
}
