//! Signature Resolver.
//!
//! Turns a parsed [`Schema`] into a [`ResolvedSchema`]:
//!
//! - every parameter gets its canonical type (`None` defaults become `Optional`),
//! - positional parameters with defaults may only be followed by other defaulted
//!   or keyword-only parameters,
//! - overloads of one operator get a dispatch precedence, and
//! - overloads that no call could tell apart are rejected.
//!
//! # Dispatch policy
//!
//! A call with `k` positional arguments can match every overload with
//! `required_positional <= k <= max_positional`. Among those the binding layer
//! prefers the overload whose required count is closest to `k`, then the one
//! declared first. Closeness `k - required` is smallest for the largest required
//! count at every arity, so one total order serves all arities: required
//! positional count descending, declaration index ascending.
//!
//! Two overloads are ambiguous when they have the same required positional
//! count, the same required keyword-only parameters (name and [`RuntimeClass`])
//! and the same class in each required positional slot. At arity `required` both accept the call,
//! closeness ties and the arguments cannot distinguish them.

use std::cmp::Reverse;
use std::collections::{BTreeSet, HashMap};

use snafu::ensure;

use crate::error::{AmbiguousOverloadSnafu, ConflictingFunctionSnafu, ParameterOrderSnafu, Result};
use crate::types::{OverloadSignature, Parameter, Schema, TypeDescriptor};

/// What the binding layer can observe about an argument at call time.
///
/// Integer widths, float widths and enum constraints are invisible to a dynamic
/// caller, so they collapse into one class each.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RuntimeClass {
    Tensor,
    TensorTuple,
    Scalar,
    Int,
    Float,
    Bool,
    String,
    DType,
    List(Box<RuntimeClass>),
    Optional(Box<RuntimeClass>),
    Void,
}

impl RuntimeClass {
    pub fn of(ty: &TypeDescriptor) -> Self {
        match ty {
            TypeDescriptor::Tensor => Self::Tensor,
            TypeDescriptor::TensorTuple => Self::TensorTuple,
            TypeDescriptor::Scalar => Self::Scalar,
            TypeDescriptor::Int(_) => Self::Int,
            TypeDescriptor::Float(_) => Self::Float,
            TypeDescriptor::Bool => Self::Bool,
            TypeDescriptor::String | TypeDescriptor::Enum(_) => Self::String,
            TypeDescriptor::DType => Self::DType,
            TypeDescriptor::List { element, .. } => Self::List(Box::new(Self::of(element))),
            TypeDescriptor::Optional(inner) => Self::Optional(Box::new(Self::of(inner))),
            TypeDescriptor::Void => Self::Void,
        }
    }
}

/// An overload with canonical parameter types and its dispatch precedence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOverload {
    /// Signature with every parameter type in canonical form.
    pub signature: OverloadSignature,
    /// Position in dispatch order, 0 is tried first.
    pub precedence: usize,
    pub required_positional: usize,
    pub max_positional: usize,
    /// Identifier of the generated binding schema, unique across the schema.
    pub schema_id: String,
    /// First overload in the schema to use this native function and parameter
    /// list. Later ones reuse its declaration and definition.
    pub declares_function: bool,
}

impl ResolvedOverload {
    pub fn params(&self) -> &[Parameter] {
        &self.signature.params
    }

    pub fn function(&self) -> &str {
        &self.signature.function
    }

    pub fn return_type(&self) -> &TypeDescriptor {
        &self.signature.return_type
    }

    pub fn index(&self) -> usize {
        self.signature.index
    }
}

/// An operator whose overloads passed resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOperator {
    pub name: String,
    pub bind_python: bool,
    /// Overloads in declaration order.
    pub overloads: Vec<ResolvedOverload>,
}

impl ResolvedOperator {
    /// Overloads in dispatch order.
    pub fn by_precedence(&self) -> Vec<&ResolvedOverload> {
        let mut ordered: Vec<_> = self.overloads.iter().collect();
        ordered.sort_by_key(|o| o.precedence);
        ordered
    }
}

/// Resolved schema, operators in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResolvedSchema {
    pub operators: Vec<ResolvedOperator>,
}

impl ResolvedSchema {
    pub fn get(&self, name: &str) -> Option<&ResolvedOperator> {
        self.operators.iter().find(|op| op.name == name)
    }

    /// All overloads, operator by operator in declaration order.
    pub fn overloads(&self) -> impl Iterator<Item = (&ResolvedOperator, &ResolvedOverload)> {
        self.operators.iter().flat_map(|op| op.overloads.iter().map(move |o| (op, o)))
    }
}

/// Resolve every operator of `schema`.
#[tracing::instrument(skip_all, fields(operators = schema.len()))]
pub fn resolve(schema: &Schema) -> Result<ResolvedSchema> {
    let mut operators = Vec::with_capacity(schema.len());
    let mut schema_ids: HashMap<String, usize> = HashMap::new();
    // (function, native parameter key) -> (operator, return type)
    let mut functions: HashMap<(String, Vec<TypeDescriptor>), (String, TypeDescriptor)> = HashMap::new();

    for entry in &schema.entries {
        let canonical: Vec<OverloadSignature> = entry.overloads.iter().map(canonicalize).collect();

        for overload in &canonical {
            check_parameter_order(&entry.name, overload)?;
        }

        for (i, first) in canonical.iter().enumerate() {
            for second in &canonical[i + 1..] {
                if let Some(arity) = conflict_arity(first, second) {
                    return AmbiguousOverloadSnafu {
                        op: entry.name.as_str(),
                        first: first.index,
                        second: second.index,
                        first_signature: first.text.as_str(),
                        second_signature: second.text.as_str(),
                        arity,
                    }
                    .fail();
                }
            }
        }

        let precedence = dispatch_order(&canonical);

        let mut overloads = Vec::with_capacity(canonical.len());
        for (signature, precedence) in canonical.into_iter().zip(precedence) {
            let key = (signature.function.clone(), native_key(&signature));
            let declares_function = match functions.get(&key) {
                Some((first_op, return_type)) => {
                    ensure!(
                        *return_type == signature.return_type,
                        ConflictingFunctionSnafu {
                            function: signature.function.as_str(),
                            first_op: first_op.as_str(),
                            second_op: entry.name.as_str(),
                        }
                    );
                    false
                }
                None => {
                    functions.insert(key, (entry.name.clone(), signature.return_type.clone()));
                    true
                }
            };

            let schema_id = unique_schema_id(&mut schema_ids, &signature);
            overloads.push(ResolvedOverload {
                required_positional: signature.required_positional(),
                max_positional: signature.max_positional(),
                signature,
                precedence,
                schema_id,
                declares_function,
            });
        }

        tracing::debug!(op = %entry.name, overloads = overloads.len(), "operator resolved");
        operators.push(ResolvedOperator { name: entry.name.clone(), bind_python: entry.bind_python, overloads });
    }

    Ok(ResolvedSchema { operators })
}

fn canonicalize(overload: &OverloadSignature) -> OverloadSignature {
    let mut canonical = overload.clone();
    for param in canonical.params.iter_mut() {
        param.ty = param.canonical_type();
    }
    canonical
}

fn check_parameter_order(op: &str, overload: &OverloadSignature) -> Result<()> {
    let mut seen_default = false;
    for param in overload.positional() {
        if param.is_required() {
            ensure!(
                !seen_default,
                ParameterOrderSnafu {
                    op,
                    index: overload.index,
                    signature: overload.text.as_str(),
                    param: param.name.as_str(),
                }
            );
        } else {
            seen_default = true;
        }
    }
    Ok(())
}

/// The positional arity at which `a` and `b` cannot be told apart, if any.
pub fn conflict_arity(a: &OverloadSignature, b: &OverloadSignature) -> Option<usize> {
    let required = a.required_positional();
    if required != b.required_positional() {
        return None;
    }

    let required_keywords = |o: &OverloadSignature| -> BTreeSet<(String, RuntimeClass)> {
        o.keyword_only()
            .filter(|p| p.is_required())
            .map(|p| (p.name.clone(), RuntimeClass::of(&p.canonical_type())))
            .collect()
    };
    if required_keywords(a) != required_keywords(b) {
        return None;
    }

    let same_prefix = a
        .positional()
        .zip(b.positional())
        .take(required)
        .all(|(pa, pb)| RuntimeClass::of(&pa.canonical_type()) == RuntimeClass::of(&pb.canonical_type()));

    same_prefix.then_some(required)
}

/// Precedence per overload, in declaration order.
pub fn dispatch_order(overloads: &[OverloadSignature]) -> Vec<usize> {
    let mut order: Vec<usize> = (0..overloads.len()).collect();
    order.sort_by_key(|&i| (Reverse(overloads[i].required_positional()), overloads[i].index));

    let mut precedence = vec![0; overloads.len()];
    for (rank, i) in order.into_iter().enumerate() {
        precedence[i] = rank;
    }
    precedence
}

/// Parameter types as the native signature sees them: enum constraints and list
/// lengths do not change the native type.
fn native_key(overload: &OverloadSignature) -> Vec<TypeDescriptor> {
    fn erase(ty: &TypeDescriptor) -> TypeDescriptor {
        match ty {
            TypeDescriptor::Enum(_) => TypeDescriptor::String,
            TypeDescriptor::List { element, .. } => TypeDescriptor::List { element: Box::new(erase(element)), size: None },
            TypeDescriptor::Optional(inner) => TypeDescriptor::Optional(Box::new(erase(inner))),
            other => other.clone(),
        }
    }
    overload.params.iter().map(|p| erase(&p.ty)).collect()
}

fn unique_schema_id(seen: &mut HashMap<String, usize>, overload: &OverloadSignature) -> String {
    let mut base = format!("{}Schema_{}", overload.function, overload.return_type.abbreviation());
    for param in &overload.params {
        base.push_str(&param.ty.abbreviation());
    }

    let count = seen.entry(base.clone()).or_insert(0);
    *count += 1;
    if *count == 1 { base } else { format!("{base}_{}", *count - 1) }
}
