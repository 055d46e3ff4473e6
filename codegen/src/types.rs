//! Types for code generation.

use std::path::PathBuf;

use strum::{AsRefStr, Display, EnumIter};

/// The four files produced by one generation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, AsRefStr, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum ArtifactKind {
    /// Native function declarations.
    Header,
    /// Native function definitions.
    Source,
    /// Binding-layer schema declarations.
    BindingHeader,
    /// Binding-layer definitions and registrations.
    BindingSource,
}

impl ArtifactKind {
    pub fn is_binding(self) -> bool {
        matches!(self, Self::BindingHeader | Self::BindingSource)
    }
}

/// A rendered artifact ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    pub kind: ArtifactKind,

    /// Target file path.
    pub path: PathBuf,

    /// Full file contents.
    pub contents: String,
}

/// Binding-layer output of one operator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BindingFragment {
    /// Goes into the binding header body.
    pub declaration: String,

    /// Goes into the binding source body.
    pub definition: String,

    /// Registration statement exposing the operator under its public name.
    pub registration: String,
}
