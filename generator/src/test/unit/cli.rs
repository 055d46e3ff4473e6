use std::path::PathBuf;

use clap::Parser;
use test_case::test_case;

use crate::cli::{Args, run};
use crate::test::fixture::{ADD_SCHEMA, Project};

#[test_case("--project-source-dir"; "kebab")]
#[test_case("--project_source_dir"; "snake_alias")]
fn test_project_source_dir_spellings(flag: &str) {
    let args = Args::try_parse_from(["funcgen", flag, "/src"]).unwrap();
    assert_eq!(args.project_source_dir, PathBuf::from("/src"));
    assert!(!args.check);
}

#[test]
fn test_project_source_dir_is_required() {
    assert!(Args::try_parse_from(["funcgen"]).is_err());
}

#[test]
fn test_flags_override_config() {
    let args = Args::try_parse_from([
        "funcgen",
        "--project-source-dir",
        "/src",
        "--schema",
        "ops.yaml",
        "--output-dir",
        "gen",
        "--backend",
        "cpp",
    ])
    .unwrap();
    let config = args.config();

    assert_eq!(config.schema, PathBuf::from("ops.yaml"));
    assert_eq!(config.output_dir, PathBuf::from("gen"));
    assert_eq!(config.backend, "cpp");
}

#[test]
fn test_run_then_check() {
    let project = Project::new(ADD_SCHEMA);
    let dir = project.dir.path().to_str().unwrap();
    let output = project.output_dir();
    let output = output.to_str().unwrap();

    let args = Args::try_parse_from(["funcgen", "--project-source-dir", dir, "--output-dir", output]).unwrap();
    assert_eq!(run(&args).unwrap(), "4 file(s) written, 0 unchanged");
    assert_eq!(run(&args).unwrap(), "0 file(s) written, 4 unchanged");

    let args = Args::try_parse_from(["funcgen", "--project-source-dir", dir, "--output-dir", output, "--check"]).unwrap();
    assert_eq!(run(&args).unwrap(), "generated files are up to date");
}
