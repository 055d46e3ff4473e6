//! C++ type mapping and default value rendering for the cpp backend.

use funcgen_schema::{DefaultValue, FloatWidth, IntWidth, Parameter, TypeDescriptor};

/// Decayed C++ type of a schema type, as stored in containers and `Optional`.
pub fn cpp_value_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Tensor => "std::shared_ptr<one::Tensor>".into(),
        TypeDescriptor::TensorTuple => "one::TensorTuple".into(),
        TypeDescriptor::Scalar => "Scalar".into(),
        TypeDescriptor::Int(IntWidth::I32) => "int32_t".into(),
        TypeDescriptor::Int(IntWidth::I64) => "int64_t".into(),
        TypeDescriptor::Float(FloatWidth::F32) => "float".into(),
        TypeDescriptor::Float(FloatWidth::F64) => "double".into(),
        TypeDescriptor::Bool => "bool".into(),
        TypeDescriptor::String | TypeDescriptor::Enum(_) => "std::string".into(),
        TypeDescriptor::DType => "Symbol<DType>".into(),
        TypeDescriptor::List { element, .. } => format!("std::vector<{}>", cpp_value_type(element)),
        TypeDescriptor::Optional(inner) => format!("Optional<{}>", optional_target(inner)),
        TypeDescriptor::Void => "void".into(),
    }
}

/// `Optional` holds tensors by object type, everything else by value type.
fn optional_target(inner: &TypeDescriptor) -> String {
    match inner {
        TypeDescriptor::Tensor => "one::Tensor".into(),
        other => cpp_value_type(other),
    }
}

/// C++ parameter type: trivially copyable values by value, the rest by const
/// reference.
pub fn cpp_param_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Int(_) | TypeDescriptor::Float(_) | TypeDescriptor::Bool => cpp_value_type(ty),
        other => format!("const {}&", cpp_value_type(other)),
    }
}

/// C++ return type. Every native function returns through `Maybe`.
pub fn cpp_return_type(ty: &TypeDescriptor) -> String {
    match ty {
        TypeDescriptor::Tensor => "Maybe<one::Tensor>".into(),
        TypeDescriptor::TensorTuple => "Maybe<one::TensorTuple>".into(),
        other => format!("Maybe<{}>", cpp_value_type(other)),
    }
}

/// C++ expression constructing `value` as a `ty`.
///
/// Numeric literals are spliced verbatim so the generated default matches the
/// schema text exactly.
pub fn cpp_default(value: &DefaultValue, ty: &TypeDescriptor) -> String {
    match (value, ty) {
        (DefaultValue::None, ty) => format!("{}()", cpp_value_type(&ty.clone().optional())),
        (value, TypeDescriptor::Optional(inner)) => {
            format!("{}({})", cpp_value_type(ty), cpp_default(value, inner))
        }
        (DefaultValue::Bool(b), TypeDescriptor::Scalar) => format!("Scalar({b})"),
        (DefaultValue::Bool(b), _) => b.to_string(),
        (DefaultValue::Int(i), TypeDescriptor::Scalar) => format!("Scalar({i})"),
        (DefaultValue::Int(i), ty) => format!("static_cast<{}>({i})", cpp_value_type(ty)),
        (DefaultValue::Float(text), TypeDescriptor::Scalar) => format!("Scalar({text})"),
        (DefaultValue::Float(text), ty) => format!("static_cast<{}>({text})", cpp_value_type(ty)),
        (DefaultValue::String(s), _) => format!("std::string({})", cpp_string_literal(s)),
        (DefaultValue::DType(name), _) => format!("CHECK_JUST(DType::Get(DataType::{name}))"),
        (DefaultValue::List(values), TypeDescriptor::List { element, .. }) => {
            let items: Vec<String> = values.iter().map(|v| cpp_default(v, element)).collect();
            format!("{}{{{}}}", cpp_value_type(ty), items.join(", "))
        }
        (DefaultValue::List(_), ty) => format!("{}()", cpp_value_type(ty)),
    }
}

/// Quote `s` as a C++ string literal.
pub fn cpp_string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            c if c.is_ascii_control() => out.push_str(&format!("\\x{:02x}\"\"", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

#[rustfmt::skip]
const CPP_KEYWORDS: &[&str] = &[
    "alignas", "alignof", "and", "asm", "auto", "bool", "break", "case", "catch", "char", "class",
    "const", "constexpr", "continue", "default", "delete", "do", "double", "else", "enum",
    "explicit", "export", "extern", "false", "float", "for", "friend", "goto", "if", "inline",
    "int", "long", "mutable", "namespace", "new", "not", "operator", "or", "private", "protected",
    "public", "register", "return", "short", "signed", "sizeof", "static", "struct", "switch",
    "template", "this", "throw", "true", "try", "typedef", "typename", "union", "unsigned",
    "using", "virtual", "void", "volatile", "while", "xor",
];

/// C++ identifiers for a parameter list.
///
/// Keywords get a trailing `_`, repeated until the result differs from every
/// other name in the list.
pub fn cpp_parameter_names(params: &[Parameter]) -> Vec<String> {
    let mut names: Vec<String> = Vec::with_capacity(params.len());
    for param in params {
        let mut name = param.name.clone();
        if CPP_KEYWORDS.contains(&name.as_str()) {
            name.push('_');
            while params.iter().any(|p| p.name == name) || names.contains(&name) {
                name.push('_');
            }
        }
        names.push(name);
    }
    names
}
