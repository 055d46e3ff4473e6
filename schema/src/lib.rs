//! Operator schema model for the funcgen binding generator.
//!
//! This crate owns everything that happens before code is rendered: the
//! declarative operator schema is loaded from YAML, each signature string is
//! parsed against a fixed type grammar, and overloads are resolved into a
//! dispatch order.
//!
//! # Module Organization
//!
//! - [`types`] - TypeDescriptor, default values, parameters and signatures
//! - [`signature`] - Signature string grammar
//! - [`loader`] - YAML schema loading
//! - [`resolver`] - Canonical types, parameter order, overload precedence
//! - [`error`] - Error types and result handling

pub mod error;
pub mod loader;
pub mod resolver;
pub mod signature;
pub mod types;


pub use error::{Error, Result};
pub use loader::{load_schema, parse_schema};
pub use resolver::{ResolvedOperator, ResolvedOverload, ResolvedSchema, RuntimeClass, resolve};
pub use signature::{ParsedSignature, SignatureError, parse_signature};
pub use types::{
    DefaultValue, FloatWidth, IntWidth, OperatorSchemaEntry, OverloadSignature, Parameter, Schema, TypeDescriptor,
    pascal_case,
};
