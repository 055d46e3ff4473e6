use test_case::test_case;

use crate::template::{TemplateContext, escape_braces, render_template};
use crate::{Error, backend_by_name};

fn ctx() -> TemplateContext<'static> {
    TemplateContext {
        source: "schema.yaml",
        header: "schema.yaml.h",
        binding_header: "schema.yaml.pybind.h",
        guard: "SCHEMA_YAML_H_",
        body: "int f() { return 0; }",
        registrations: "  m.def(\"f\", &f);",
    }
}

#[test]
fn test_all_placeholders() {
    let rendered = render_template("{source} {header} {binding_header} {guard}\n{body}\n{registrations}", &ctx()).unwrap();
    assert_eq!(
        rendered,
        "schema.yaml schema.yaml.h schema.yaml.pybind.h SCHEMA_YAML_H_\nint f() { return 0; }\n  m.def(\"f\", &f);"
    );
}

#[test]
fn test_repeated_placeholder() {
    assert_eq!(render_template("{guard}/{guard}", &ctx()).unwrap(), "SCHEMA_YAML_H_/SCHEMA_YAML_H_");
}

#[test]
fn test_literal_braces() {
    assert_eq!(render_template("namespace a {{\n{body}\n}}", &ctx()).unwrap(), "namespace a {\nint f() { return 0; }\n}");
}

#[test_case("{bodyy}", 0; "unknown_placeholder")]
#[test_case("ab {}", 3; "empty_placeholder")]
#[test_case("x }", 2; "unmatched_close")]
#[test_case("{body} {guard", 7; "unterminated")]
fn test_template_errors(template: &str, expected_offset: usize) {
    match render_template(template, &ctx()) {
        Err(Error::Template { offset, .. }) => assert_eq!(offset, expected_offset),
        other => panic!("expected template error, got {other:?}"),
    }
}

#[test]
fn test_unknown_placeholder_lists_known_ones() {
    let err = render_template("{nope}", &ctx()).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("{nope}"), "{message}");
    assert!(message.contains("registrations"), "{message}");
}

#[test]
fn test_escape_braces() {
    assert_eq!(escape_braces("a{b}c"), "a{{b}}c");
    assert_eq!(escape_braces("plain"), "plain");
}

#[test]
fn test_backend_lookup() {
    assert_eq!(backend_by_name("cpp").unwrap().name(), "cpp");

    match backend_by_name("rust") {
        Err(Error::UnknownBackend { name, available }) => {
            assert_eq!(name, "rust");
            assert_eq!(available, "cpp");
        }
        Err(other) => panic!("expected unknown backend, got {other:?}"),
        Ok(_) => panic!("expected unknown backend"),
    }
}
