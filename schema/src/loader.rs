//! Schema Loader.
//!
//! Reads the YAML operator schema into a [`Schema`]. The document is a
//! sequence of entries:
//!
//! ```yaml
//! - name: "add"
//!   signature:
//!     - "Tensor (Tensor x, Tensor y) => Add"
//!     - "Tensor (Tensor x, Scalar alpha=1) => ScalarAdd"
//! - name: "relu"
//!   signature: "Tensor (Tensor x, *, Bool inplace=False) => Relu"
//!   bind_python: false
//! ```
//!
//! Loading is a pure read: nothing is written and nothing is cached.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use snafu::{ResultExt, ensure};

use crate::error::{AmbiguousOverloadSnafu, DocumentSnafu, Error, InvalidEntrySnafu, ReadSchemaSnafu, Result};
use crate::signature::parse_signature;
use crate::types::{OperatorSchemaEntry, OverloadSignature, Schema, TypeDescriptor, pascal_case};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawEntry {
    name: String,
    signature: RawSignatures,
    #[serde(default = "default_bind_python")]
    bind_python: bool,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawSignatures {
    One(String),
    Many(Vec<String>),
}

impl RawSignatures {
    fn into_vec(self) -> Vec<String> {
        match self {
            Self::One(signature) => vec![signature],
            Self::Many(signatures) => signatures,
        }
    }
}

fn default_bind_python() -> bool {
    true
}

/// Load and parse the schema file at `path`.
#[tracing::instrument(skip_all, fields(path = %path.display()))]
pub fn load_schema(path: &Path) -> Result<Schema> {
    let text = fs::read_to_string(path).context(ReadSchemaSnafu { path })?;
    let schema = parse_schema(&text)?;
    tracing::debug!(operators = schema.len(), "schema loaded");
    Ok(schema)
}

/// Parse schema text.
pub fn parse_schema(text: &str) -> Result<Schema> {
    if text.trim().is_empty() {
        return Ok(Schema::default());
    }

    let raw: Option<Vec<RawEntry>> = serde_yaml::from_str(text).context(DocumentSnafu)?;
    let raw = raw.unwrap_or_default();

    let mut seen = HashSet::new();
    let mut entries = Vec::with_capacity(raw.len());

    for entry in raw {
        ensure!(!entry.name.trim().is_empty(), InvalidEntrySnafu { op: entry.name.clone(), reason: "empty operator name" });
        ensure!(
            entry.name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
                && !entry.name.starts_with(|c: char| c.is_ascii_digit()),
            InvalidEntrySnafu { op: entry.name.clone(), reason: "operator name must be an identifier" }
        );
        ensure!(
            seen.insert(entry.name.clone()),
            InvalidEntrySnafu { op: entry.name.clone(), reason: "operator is declared more than once" }
        );

        let texts = entry.signature.into_vec();
        ensure!(!texts.is_empty(), InvalidEntrySnafu { op: entry.name.clone(), reason: "no signatures declared" });

        let mut overloads = Vec::with_capacity(texts.len());
        for (index, text) in texts.into_iter().enumerate() {
            let parsed = parse_signature(&text).map_err(|e| Error::from_signature(&entry.name, index, &text, e))?;
            overloads.push(OverloadSignature {
                params: parsed.params,
                return_type: parsed.return_type,
                function: parsed.function.unwrap_or_else(|| pascal_case(&entry.name)),
                text,
                index,
            });
        }

        reject_duplicate_overloads(&entry.name, &overloads)?;
        tracing::trace!(op = %entry.name, overloads = overloads.len(), "parsed operator");
        entries.push(OperatorSchemaEntry { name: entry.name, bind_python: entry.bind_python, overloads });
    }

    Ok(Schema { entries })
}

/// Dispatch key of an overload: canonical type, keyword flag and required flag
/// per parameter.
pub(crate) fn dispatch_key(overload: &OverloadSignature) -> Vec<(TypeDescriptor, bool, bool)> {
    overload.params.iter().map(|p| (p.canonical_type(), p.keyword_only, p.is_required())).collect()
}

/// Reject overloads whose parameter lists are identical.
fn reject_duplicate_overloads(op: &str, overloads: &[OverloadSignature]) -> Result<()> {
    for (i, first) in overloads.iter().enumerate() {
        let key = dispatch_key(first);
        for second in &overloads[i + 1..] {
            ensure!(
                dispatch_key(second) != key,
                AmbiguousOverloadSnafu {
                    op,
                    first: first.index,
                    second: second.index,
                    first_signature: first.text.clone(),
                    second_signature: second.text.clone(),
                    arity: first.required_positional(),
                }
            );
        }
    }
    Ok(())
}
