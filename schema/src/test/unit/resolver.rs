use test_case::test_case;

use crate::error::Error;
use crate::loader::parse_schema;
use crate::resolver::{ResolvedSchema, RuntimeClass, conflict_arity, dispatch_order, resolve};
use crate::types::{IntWidth, TypeDescriptor};

fn resolve_text(text: &str) -> crate::Result<ResolvedSchema> {
    resolve(&parse_schema(text)?)
}

fn single_op(signatures: &[&str]) -> String {
    let mut text = String::from("- name: op\n  signature:\n");
    for signature in signatures {
        text.push_str(&format!("    - '{signature}'\n"));
    }
    text
}

#[test]
fn test_add_overloads_ordered_by_required_count() {
    let resolved = resolve_text(
        r#"
- name: "add"
  signature:
    - "Tensor (Tensor x, Tensor y) => Add"
    - "Tensor (Tensor x, Scalar alpha=1) => ScalarAdd"
"#,
    )
    .unwrap();

    let add = resolved.get("add").unwrap();
    assert_eq!(add.overloads[0].function(), "Add");
    assert_eq!(add.overloads[0].precedence, 0);
    assert_eq!(add.overloads[1].function(), "ScalarAdd");
    assert_eq!(add.overloads[1].precedence, 1);

    let order: Vec<_> = add.by_precedence().iter().map(|o| o.function()).collect();
    assert_eq!(order, ["Add", "ScalarAdd"]);
}

#[test]
fn test_later_declaration_with_more_required_goes_first() {
    let resolved = resolve_text(&single_op(&[
        "Tensor (Tensor x, Int64 dim=0) => Sum",
        "Tensor (Tensor x, Int64List dims, Bool keepdim=False) => SumDims",
    ]))
    .unwrap();

    let op = resolved.get("op").unwrap();
    assert_eq!(op.overloads[0].precedence, 1);
    assert_eq!(op.overloads[1].precedence, 0);
}

#[test]
fn test_sub_with_identical_types_is_ambiguous() {
    // Different parameter names but identical types: the loader already
    // refuses these, the resolver would too.
    let result = resolve_text(&single_op(&["Tensor (Tensor x, Tensor y) => Sub", "Tensor (Tensor a, Tensor b) => Sub2"]));
    assert!(matches!(&result, Err(err) if err.is_ambiguous()), "{result:?}");
}

#[test]
fn test_int_widths_are_ambiguous() {
    let result = resolve_text(&single_op(&["Tensor (Tensor x, Int32 n) => A", "Tensor (Tensor x, Int64 n) => B"]));
    match result {
        Err(Error::AmbiguousOverload { op, first, second, arity, .. }) => {
            assert_eq!(op, "op");
            assert_eq!((first, second, arity), (0, 1, 2));
        }
        other => panic!("expected ambiguity, got {other:?}"),
    }
}

#[test]
fn test_optional_defaults_do_not_disambiguate() {
    // Both accept `op(x)` with equal closeness.
    let result = resolve_text(&single_op(&["Tensor (Tensor x, Int64 n=1) => A", "Tensor (Tensor x, Bool b=False) => B"]));
    assert!(matches!(result, Err(Error::AmbiguousOverload { arity: 1, .. })), "{result:?}");
}

#[test]
fn test_required_keyword_disambiguates() {
    let resolved = resolve_text(&single_op(&["Tensor (Tensor x) => A", "Tensor (Tensor x, *, Int64 dim) => B"])).unwrap();
    let op = resolved.get("op").unwrap();
    assert_eq!(op.overloads[0].precedence, 0);
    assert_eq!(op.overloads[1].precedence, 1);
}

#[test]
fn test_required_keyword_class_disambiguates() {
    let resolved =
        resolve_text(&single_op(&["Tensor (Tensor x, *, Int64 a) => A", "Tensor (Tensor x, *, Tensor a) => B"])).unwrap();
    let precedences: Vec<_> = resolved.get("op").unwrap().overloads.iter().map(|o| o.precedence).collect();
    assert_eq!(precedences, [0, 1]);
}

#[test]
fn test_required_keyword_same_class_is_ambiguous() {
    let result = resolve_text(&single_op(&["Tensor (Tensor x, *, Int64 a) => A", "Tensor (Tensor x, *, Int32 a) => B"]));
    assert!(matches!(result, Err(Error::AmbiguousOverload { arity: 1, .. })), "{result:?}");
}

#[test]
fn test_distinct_runtime_classes_resolve() {
    let resolved = resolve_text(&single_op(&[
        "Tensor (Tensor x, Tensor y) => Add",
        "Tensor (Tensor x, Scalar y) => ScalarAdd",
        "Tensor (Scalar x, Tensor y) => ScalarAdd2",
    ]))
    .unwrap();
    let precedences: Vec<_> = resolved.get("op").unwrap().overloads.iter().map(|o| o.precedence).collect();
    assert_eq!(precedences, [0, 1, 2]);
}

#[test]
fn test_parameter_order_violation() {
    let result = resolve_text(&single_op(&["Tensor (Tensor x, Int64 n=1, Tensor y) => A"]));
    match result {
        Err(Error::ParameterOrder { op, index, param, .. }) => {
            assert_eq!(op, "op");
            assert_eq!(index, 0);
            assert_eq!(param, "y");
        }
        other => panic!("expected parameter order error, got {other:?}"),
    }
}

#[test]
fn test_required_keyword_after_default_is_allowed() {
    let resolved = resolve_text(&single_op(&["Tensor (Tensor x, Int64 n=1, *, Tensor y) => A"]));
    assert!(resolved.is_ok(), "{resolved:?}");
}

#[test]
fn test_none_default_becomes_optional() {
    let resolved = resolve_text(&single_op(&["Tensor (Tensor x, Tensor weight=None, DataType dtype=None) => A"])).unwrap();
    let overload = &resolved.get("op").unwrap().overloads[0];

    assert_eq!(overload.params()[1].ty, TypeDescriptor::Tensor.optional());
    assert_eq!(overload.params()[2].ty, TypeDescriptor::DType.optional());
    assert_eq!(overload.schema_id, "ASchema_TTOTODt");
}

#[test]
fn test_shared_function_declared_once() {
    let resolved = resolve_text(
        r#"
- name: "add"
  signature: "Tensor (Tensor x, Tensor y) => Add"
- name: "add_"
  signature: "Tensor (Tensor x, Tensor y) => Add"
"#,
    )
    .unwrap();

    let flags: Vec<_> = resolved.overloads().map(|(_, o)| o.declares_function).collect();
    assert_eq!(flags, [true, false]);

    let ids: Vec<_> = resolved.overloads().map(|(_, o)| o.schema_id.as_str()).collect();
    assert_eq!(ids, ["AddSchema_TTT", "AddSchema_TTT_1"]);
}

#[test]
fn test_conflicting_return_types() {
    let result = resolve_text(
        r#"
- name: "add"
  signature: "Tensor (Tensor x, Tensor y) => Add"
- name: "add_inplace"
  signature: "Void (Tensor x, Tensor y) => Add"
"#,
    );
    match result {
        Err(Error::ConflictingFunction { function, first_op, second_op }) => {
            assert_eq!(function, "Add");
            assert_eq!(first_op, "add");
            assert_eq!(second_op, "add_inplace");
        }
        other => panic!("expected conflicting function, got {other:?}"),
    }
}

#[test]
fn test_enum_and_string_share_native_function() {
    let resolved = resolve_text(
        r#"
- name: "loss"
  signature: 'Tensor (Tensor x, Enum["sum"|"mean"] reduction="mean") => Loss'
- name: "loss_any"
  signature: 'Tensor (Tensor x, String reduction="mean") => Loss'
"#,
    )
    .unwrap();
    let flags: Vec<_> = resolved.overloads().map(|(_, o)| o.declares_function).collect();
    assert_eq!(flags, [true, false]);
}

#[test]
fn test_same_function_different_params_is_overloading() {
    let resolved = resolve_text(
        r#"
- name: "pow"
  signature:
    - "Tensor (Tensor x, Tensor y) => Pow"
    - "Tensor (Tensor x, Double y) => Pow"
"#,
    )
    .unwrap();
    assert!(resolved.overloads().all(|(_, o)| o.declares_function));
}

#[test_case(TypeDescriptor::Int(IntWidth::I32), RuntimeClass::Int; "int32")]
#[test_case(TypeDescriptor::Int(IntWidth::I64), RuntimeClass::Int; "int64")]
#[test_case(TypeDescriptor::Enum(["a".to_string()].into_iter().collect()), RuntimeClass::String; "enum")]
#[test_case(TypeDescriptor::Tensor.optional(), RuntimeClass::Optional(Box::new(RuntimeClass::Tensor)); "optional")]
fn test_runtime_class(ty: TypeDescriptor, expected: RuntimeClass) {
    assert_eq!(RuntimeClass::of(&ty), expected);
}

#[test]
fn test_conflict_arity_and_dispatch_order_directly() {
    let schema = parse_schema(&single_op(&[
        "Tensor (Tensor x) => A",
        "Tensor (Tensor x, Tensor y, Tensor z) => B",
        "Tensor (Tensor x, Scalar y) => C",
    ]))
    .unwrap();
    let overloads = &schema.entries[0].overloads;

    assert_eq!(conflict_arity(&overloads[0], &overloads[1]), None);
    assert_eq!(conflict_arity(&overloads[1], &overloads[2]), None);
    assert_eq!(conflict_arity(&overloads[0], &overloads[0]), Some(1));
    assert_eq!(dispatch_order(overloads), [2, 0, 1]);
}

#[test]
fn test_empty_schema_resolves() {
    assert!(resolve_text("").unwrap().operators.is_empty());
}
