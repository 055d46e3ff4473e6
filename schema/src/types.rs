//! Type definitions for operator schemas.
//!
//! This module contains the type model shared by the loader, the resolver and
//! every code generation backend: the [`TypeDescriptor`] tagged variant, default
//! value literals, parameters and overload signatures.

use std::fmt;

use smallvec::SmallVec;

/// Integer width of an `Int` schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum IntWidth {
    I32,
    I64,
}

/// Floating point width of a `Float` schema type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FloatWidth {
    F32,
    F64,
}

/// Type of a parameter or a return value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// A single tensor.
    Tensor,
    /// An ordered tuple of tensors.
    TensorTuple,
    /// A dynamically typed number (int, float or bool).
    Scalar,
    /// Integer.
    Int(IntWidth),
    /// Floating point number.
    Float(FloatWidth),
    Bool,
    String,
    /// Tensor element data type.
    DType,
    /// Homogeneous list, optionally with a fixed length.
    List { element: Box<TypeDescriptor>, size: Option<usize> },
    /// Value that may be `None`.
    Optional(Box<TypeDescriptor>),
    /// String constrained to a fixed set of values.
    Enum(SmallVec<[String; 4]>),
    /// No value. Only valid as a return type.
    Void,
}

impl TypeDescriptor {
    /// Look up a type token such as `Int64`, `FloatList` or `Tensor`.
    ///
    /// List tokens are an element token followed by `List`. The optional fixed
    /// size (`Int64List[2]`) is parsed separately and attached by the caller.
    /// Returns `None` for unknown tokens.
    pub fn from_token(token: &str) -> Option<Self> {
        if let Some(element) = token.strip_suffix("List") {
            let element = Self::scalar_token(element)?;
            if !element.is_list_element() {
                return None;
            }
            return Some(Self::List { element: Box::new(element), size: None });
        }
        Self::scalar_token(token)
    }

    /// Aliases fold onto one canonical variant (`Int` and `Int32`, `DataType` and `DType`).
    fn scalar_token(token: &str) -> Option<Self> {
        Some(match token {
            "Tensor" => Self::Tensor,
            "TensorTuple" => Self::TensorTuple,
            "Scalar" => Self::Scalar,
            "Int" | "Int32" => Self::Int(IntWidth::I32),
            "Int64" => Self::Int(IntWidth::I64),
            "Float" => Self::Float(FloatWidth::F32),
            "Double" => Self::Float(FloatWidth::F64),
            "Bool" => Self::Bool,
            "String" => Self::String,
            "DataType" | "DType" => Self::DType,
            "Void" => Self::Void,
            _ => return None,
        })
    }

    /// Whether this type can be the element of a `List`.
    pub fn is_list_element(&self) -> bool {
        matches!(self, Self::Scalar | Self::Int(_) | Self::Float(_) | Self::Bool | Self::String | Self::DType)
    }

    /// Wrap in `Optional`, leaving already-optional types untouched.
    pub fn optional(self) -> Self {
        match self {
            Self::Optional(_) => self,
            other => Self::Optional(Box::new(other)),
        }
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, Self::Optional(_))
    }

    /// The type with any `Optional` wrapper removed.
    pub fn strip_optional(&self) -> &Self {
        match self {
            Self::Optional(inner) => inner,
            other => other,
        }
    }

    pub fn is_void(&self) -> bool {
        matches!(self, Self::Void)
    }

    /// Fixed list length, `None` for unsized lists and non-list types.
    pub fn list_size(&self) -> Option<usize> {
        match self.strip_optional() {
            Self::List { size, .. } => *size,
            _ => None,
        }
    }

    /// Short mnemonic used to build unique binding identifiers.
    pub fn abbreviation(&self) -> String {
        match self {
            Self::Tensor => "T".into(),
            Self::TensorTuple => "Tt".into(),
            Self::Scalar => "Sc".into(),
            Self::Int(IntWidth::I32) => "I32".into(),
            Self::Int(IntWidth::I64) => "I64".into(),
            Self::Float(FloatWidth::F32) => "F".into(),
            Self::Float(FloatWidth::F64) => "D".into(),
            Self::Bool => "B".into(),
            Self::String => "S".into(),
            Self::DType => "Dt".into(),
            Self::List { element, .. } => format!("{}l", element.abbreviation()),
            Self::Optional(inner) => format!("O{}", inner.abbreviation()),
            Self::Enum(_) => "E".into(),
            Self::Void => "V".into(),
        }
    }
}

impl fmt::Display for TypeDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Tensor => f.write_str("Tensor"),
            Self::TensorTuple => f.write_str("TensorTuple"),
            Self::Scalar => f.write_str("Scalar"),
            Self::Int(IntWidth::I32) => f.write_str("Int32"),
            Self::Int(IntWidth::I64) => f.write_str("Int64"),
            Self::Float(FloatWidth::F32) => f.write_str("Float"),
            Self::Float(FloatWidth::F64) => f.write_str("Double"),
            Self::Bool => f.write_str("Bool"),
            Self::String => f.write_str("String"),
            Self::DType => f.write_str("DataType"),
            Self::List { element, size: None } => write!(f, "{element}List"),
            Self::List { element, size: Some(size) } => write!(f, "{element}List[{size}]"),
            Self::Optional(inner) => write!(f, "Optional[{inner}]"),
            Self::Enum(variants) => {
                f.write_str("Enum[")?;
                for (i, variant) in variants.iter().enumerate() {
                    if i > 0 {
                        f.write_str("|")?;
                    }
                    write!(f, "\"{}\"", escape_string(variant))?;
                }
                f.write_str("]")
            }
            Self::Void => f.write_str("Void"),
        }
    }
}

/// Default value literal attached to a parameter.
///
/// Float literals keep their source text so that generated code repeats the
/// value exactly as written in the schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DefaultValue {
    None,
    Bool(bool),
    Int(i64),
    Float(String),
    String(String),
    /// Data type identifier such as `kFloat`.
    DType(String),
    List(Vec<DefaultValue>),
}

impl DefaultValue {
    /// Check whether this literal is a valid value of `ty`, including the
    /// range of 32-bit integers and single-precision floats.
    pub fn fits(&self, ty: &TypeDescriptor) -> bool {
        use TypeDescriptor as T;

        match (self, ty) {
            (Self::None, _) => true,
            (value, T::Optional(inner)) => value.fits(inner),
            (Self::Bool(_), T::Bool | T::Scalar) => true,
            (Self::Int(i), T::Int(IntWidth::I32)) => i32::try_from(*i).is_ok(),
            (Self::Int(_), T::Int(IntWidth::I64) | T::Float(_) | T::Scalar) => true,
            (Self::Float(text), T::Float(FloatWidth::F32)) => text.parse::<f64>().is_ok_and(|v| (v as f32).is_finite()),
            (Self::Float(_), T::Float(FloatWidth::F64) | T::Scalar) => true,
            (Self::String(_), T::String) => true,
            (Self::String(s), T::Enum(variants)) => variants.iter().any(|v| v == s),
            (Self::DType(_), T::DType) => true,
            (Self::List(values), T::List { element, size }) => {
                size.is_none_or(|n| n == values.len()) && values.iter().all(|v| v.fits(element))
            }
            _ => false,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::None => f.write_str("None"),
            Self::Bool(true) => f.write_str("True"),
            Self::Bool(false) => f.write_str("False"),
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(text) => f.write_str(text),
            Self::String(s) => write!(f, "\"{}\"", escape_string(s)),
            Self::DType(name) => f.write_str(name),
            Self::List(values) => {
                f.write_str("[")?;
                for (i, value) in values.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{value}")?;
                }
                f.write_str("]")
            }
        }
    }
}

/// Escape a string for a double-quoted schema literal.
fn escape_string(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// A named, typed parameter of an overload.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Parameter {
    pub name: String,
    pub ty: TypeDescriptor,
    pub default: Option<DefaultValue>,
    /// Declared after the `*` marker.
    pub keyword_only: bool,
}

impl Parameter {
    /// A parameter is required when it has no default value.
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// The declared type with a `None` default folded into `Optional`.
    pub fn canonical_type(&self) -> TypeDescriptor {
        match &self.default {
            Some(DefaultValue::None) => self.ty.clone().optional(),
            _ => self.ty.clone(),
        }
    }
}

/// Prints the schema form: a `None` default already says the type is optional.
impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let ty = match self.default {
            Some(DefaultValue::None) => self.ty.strip_optional(),
            _ => &self.ty,
        };
        write!(f, "{ty} {}", self.name)?;
        if let Some(default) = &self.default {
            write!(f, "={default}")?;
        }
        Ok(())
    }
}

/// One parameter-signature variant of an operator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverloadSignature {
    pub params: SmallVec<[Parameter; 4]>,
    pub return_type: TypeDescriptor,
    /// Native function implementing this overload.
    pub function: String,
    /// Signature text as written in the schema.
    pub text: String,
    /// Zero-based declaration position within the operator.
    pub index: usize,
}

impl OverloadSignature {
    pub fn positional(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| !p.keyword_only)
    }

    pub fn keyword_only(&self) -> impl Iterator<Item = &Parameter> {
        self.params.iter().filter(|p| p.keyword_only)
    }

    /// Number of positional parameters without a default.
    pub fn required_positional(&self) -> usize {
        self.positional().filter(|p| p.is_required()).count()
    }

    pub fn max_positional(&self) -> usize {
        self.positional().count()
    }

    /// Signature text without the `=> Function` suffix.
    pub fn python_signature(&self) -> String {
        let mut out = format!("{} (", self.return_type);
        let mut star_written = false;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                out.push_str(", ");
            }
            if param.keyword_only && !star_written {
                out.push_str("*, ");
                star_written = true;
            }
            out.push_str(&param.to_string());
        }
        out.push(')');
        out
    }
}

/// A schema entry: one public operator name and its overloads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OperatorSchemaEntry {
    pub name: String,
    /// Whether the binding layer exposes this operator.
    pub bind_python: bool,
    pub overloads: Vec<OverloadSignature>,
}

/// Parsed schema, with entries in file order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Schema {
    pub entries: Vec<OperatorSchemaEntry>,
}

impl Schema {
    pub fn get(&self, name: &str) -> Option<&OperatorSchemaEntry> {
        self.entries.iter().find(|e| e.name == name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Convert an operator name such as `batch_norm` into `BatchNorm`.
pub fn pascal_case(name: &str) -> String {
    name.split('_')
        .filter(|part| !part.is_empty())
        .map(|part| {
            let mut chars = part.chars();
            match chars.next() {
                Some(first) => first.to_ascii_uppercase().to_string() + chars.as_str(),
                None => String::new(),
            }
        })
        .collect()
}
