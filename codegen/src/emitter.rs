//! Code Emitter.
//!
//! Collects the fragments a [`Backend`] renders for every operator and wraps
//! them in the backend's artifact templates. All four artifacts are rendered
//! in memory; nothing here touches the filesystem.

use std::path::PathBuf;

use funcgen_schema::ResolvedSchema;
use strum::IntoEnumIterator;

use crate::template::{TemplateContext, render_template};
use crate::types::{ArtifactKind, GeneratedArtifact};
use crate::{Backend, Result};

/// Where artifacts go and how they refer to each other.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactLayout {
    /// Directory every artifact is written to.
    pub output_dir: PathBuf,

    /// File name stem, normally the schema file name (`functional_api.yaml`).
    pub stem: String,

    /// Include directory of the artifacts as seen from the build root.
    pub include_prefix: String,

    /// Schema path shown in the "generated from" notice.
    pub source: String,
}

impl ArtifactLayout {
    pub fn file_name(&self, backend: &dyn Backend, kind: ArtifactKind) -> String {
        format!("{}{}", self.stem, backend.file_suffix(kind))
    }

    pub fn path(&self, backend: &dyn Backend, kind: ArtifactKind) -> PathBuf {
        self.output_dir.join(self.file_name(backend, kind))
    }

    /// `#include` path of an artifact.
    pub fn include(&self, backend: &dyn Backend, kind: ArtifactKind) -> String {
        let name = self.file_name(backend, kind);
        if self.include_prefix.is_empty() { name } else { format!("{}/{name}", self.include_prefix.trim_end_matches('/')) }
    }

    /// Include guard derived from the header include path.
    pub fn guard(&self, backend: &dyn Backend) -> String {
        let mut guard: String = self
            .include(backend, ArtifactKind::Header)
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();
        guard.push('_');
        guard
    }
}

/// Fragments gathered per artifact before templating.
#[derive(Debug, Default)]
struct Bodies {
    declarations: Vec<String>,
    definitions: Vec<String>,
    binding_declarations: Vec<String>,
    binding_definitions: Vec<String>,
    registrations: Vec<String>,
}

/// Render all artifacts for `schema`.
///
/// Declarations and definitions are emitted once per native function, in
/// schema order. Operators with `bind_python: false` get no binding output.
#[tracing::instrument(skip_all, fields(backend = backend.name(), operators = schema.operators.len()))]
pub fn emit(schema: &ResolvedSchema, backend: &dyn Backend, layout: &ArtifactLayout) -> Result<Vec<GeneratedArtifact>> {
    let mut bodies = Bodies::default();

    for op in &schema.operators {
        for overload in op.overloads.iter().filter(|o| o.declares_function) {
            bodies.declarations.push(backend.render_declaration(overload)?);
            bodies.definitions.push(backend.render_definition(overload)?);
        }

        if op.bind_python {
            let fragment = backend.render_binding(op)?;
            bodies.binding_declarations.push(fragment.declaration);
            bodies.binding_definitions.push(fragment.definition);
            bodies.registrations.push(fragment.registration);
        } else {
            tracing::debug!(op = %op.name, "binding skipped");
        }
    }

    let header = layout.include(backend, ArtifactKind::Header);
    let binding_header = layout.include(backend, ArtifactKind::BindingHeader);
    let guard = layout.guard(backend);
    let registrations = bodies.registrations.join("\n");

    ArtifactKind::iter()
        .map(|kind| {
            let body = match kind {
                ArtifactKind::Header => bodies.declarations.join("\n"),
                ArtifactKind::Source => bodies.definitions.join("\n\n"),
                ArtifactKind::BindingHeader => bodies.binding_declarations.join("\n\n"),
                ArtifactKind::BindingSource => bodies.binding_definitions.join("\n\n"),
            };
            let ctx = TemplateContext {
                source: &layout.source,
                header: &header,
                binding_header: &binding_header,
                guard: &guard,
                body: &body,
                registrations: &registrations,
            };
            let contents = render_template(backend.template(kind), &ctx)?;
            tracing::debug!(kind = kind.as_ref(), bytes = contents.len(), "artifact rendered");
            Ok(GeneratedArtifact { kind, path: layout.path(backend, kind), contents })
        })
        .collect()
}
