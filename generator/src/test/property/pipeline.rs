use std::fs;

use funcgen_codegen::ArtifactKind;
use funcgen_schema::test::property::generators::arb_valid_schema;
use proptest::prelude::*;

use crate::pipeline::{check, generate, render};
use crate::test::fixture::Project;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn second_generation_is_a_noop(schema in arb_valid_schema()) {
        let project = Project::new(&schema);

        let first = generate(&project.config).unwrap();
        prop_assert_eq!(first.written.len(), 4);
        let contents: Vec<String> = first.written.iter().map(|p| fs::read_to_string(p).unwrap()).collect();

        let second = generate(&project.config).unwrap();
        prop_assert!(second.is_noop());
        prop_assert!(check(&project.config).is_ok());

        let again: Vec<String> = first.written.iter().map(|p| fs::read_to_string(p).unwrap()).collect();
        prop_assert_eq!(contents, again);
    }

    #[test]
    fn every_bound_operator_is_registered_once(schema in arb_valid_schema()) {
        let project = Project::new(&schema);
        let artifacts = render(&project.config).unwrap();
        let operators = funcgen_schema::parse_schema(&schema).unwrap();

        let binding_source = &artifacts.iter().find(|a| a.kind == ArtifactKind::BindingSource).unwrap().contents;
        for name in operators.names() {
            let registration = format!("m.def(\"{name}\",");
            prop_assert_eq!(binding_source.matches(registration.as_str()).count(), 1);
        }
    }
}
