//! Code generation for funcgen operator schemas.
//!
//! This crate turns a resolved schema into the four generated artifacts:
//! native declarations, native definitions, binding declarations and binding
//! registrations.
//!
//! # Architecture
//!
//! - **Traits**: Backend-agnostic interface (`Backend`)
//! - **Template**: Placeholder substitution for artifact boilerplate
//! - **Emitter**: Fragment collection and artifact assembly
//! - **C++**: C++ declarations/definitions with pybind11 glue
//!
//! # Usage
//!
//! ```ignore
//! use funcgen_codegen::{ArtifactLayout, backend_by_name, emit};
//!
//! let backend = backend_by_name("cpp")?;
//! let artifacts = emit(&resolved, backend.as_ref(), &layout)?;
//! ```

pub mod cpp;
pub mod emitter;
pub mod error;
pub mod template;
pub mod traits;
pub mod types;

#[cfg(test)]
pub mod test;

pub use emitter::{ArtifactLayout, emit};
pub use error::*;
pub use traits::*;
pub use types::*;
