//! Core traits for code generation.

use funcgen_schema::{ResolvedOperator, ResolvedOverload};

use crate::cpp::CppBackend;
use crate::error::{Result, UnknownBackendSnafu};
use crate::types::{ArtifactKind, BindingFragment};

/// Target language interface.
///
/// A backend turns resolved overloads into text fragments and supplies the
/// boilerplate each artifact is wrapped in. The emitter decides which
/// fragments go where; backends never see more than one operator at a time.
pub trait Backend {
    /// Backend name as selected on the command line (e.g. "cpp").
    fn name(&self) -> &str;

    /// File name suffix appended to the schema file name for `kind`.
    fn file_suffix(&self, kind: ArtifactKind) -> &str;

    /// Boilerplate template for `kind`.
    ///
    /// See [`crate::template`] for the placeholder syntax.
    fn template(&self, kind: ArtifactKind) -> &str;

    /// Native function declaration of one overload.
    fn render_declaration(&self, overload: &ResolvedOverload) -> Result<String>;

    /// Native function definition of one overload, forwarding to the runtime
    /// function library.
    fn render_definition(&self, overload: &ResolvedOverload) -> Result<String>;

    /// Binding-layer schemas and the registration of one operator.
    fn render_binding(&self, op: &ResolvedOperator) -> Result<BindingFragment>;
}

/// Names accepted by [`backend_by_name`].
pub const BACKENDS: &[&str] = &["cpp"];

/// Look up a backend by name.
pub fn backend_by_name(name: &str) -> Result<Box<dyn Backend>> {
    match name {
        "cpp" => Ok(Box::new(CppBackend::new())),
        _ => UnknownBackendSnafu { name, available: BACKENDS.join(", ") }.fail(),
    }
}
