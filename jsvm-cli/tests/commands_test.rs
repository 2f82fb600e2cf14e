//! Integration tests for the CLI command handlers.
//!
//! These tests run real scripts from temporary files through the same
//! handlers `main` dispatches to.

use jsvm_cli::cli::{CheckArgs, RunArgs};
use jsvm_cli::commands;
use jsvm_cli::config::Config;
use jsvm_runtime::RuntimeError;
use serde_json::json;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn write_script(dir: &Path, source: &str) -> PathBuf {
    let path = dir.join("script.js");
    std::fs::write(&path, source).unwrap();
    path
}

fn run_args(script: PathBuf, function: Option<&str>, args: &[&str]) -> RunArgs {
    RunArgs {
        script,
        function: function.map(str::to_string),
        args: args.iter().map(|s| s.to_string()).collect(),
        pretty: false,
    }
}

#[test]
fn test_run_default_entry_point() {
    let temp_dir = TempDir::new().unwrap();
    let script = write_script(temp_dir.path(), "function main(a, b) { return a + b; }");

    let result = commands::run(&Config::default(), &run_args(script, None, &["3", "4"])).unwrap();
    assert_eq!(result, json!(7));
}

#[test]
fn test_run_named_function_with_string_arg() {
    let temp_dir = TempDir::new().unwrap();
    let script = write_script(
        temp_dir.path(),
        "function shout(s) { return s.toUpperCase(); }",
    );

    let result = commands::run(
        &Config::default(),
        &run_args(script, Some("shout"), &["quiet"]),
    )
    .unwrap();
    assert_eq!(result, json!("QUIET"));
}

#[test]
fn test_run_uses_configured_entry_point() {
    let temp_dir = TempDir::new().unwrap();
    let script = write_script(temp_dir.path(), "function start() { return 'started'; }");

    let mut config = Config::default();
    config.runtime.entry_point = "start".to_string();

    let result = commands::run(&config, &run_args(script, None, &[])).unwrap();
    assert_eq!(result, json!("started"));
}

#[test]
fn test_run_reports_script_fault() {
    let temp_dir = TempDir::new().unwrap();
    let script = write_script(temp_dir.path(), "function main() { throw new Error('bad input'); }");

    let err = commands::run(&Config::default(), &run_args(script, None, &[])).unwrap_err();
    match err.downcast_ref::<RuntimeError>() {
        Some(RuntimeError::FunctionRuntime { name, message }) => {
            assert_eq!(name, "main");
            assert!(message.contains("bad input"));
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[test]
fn test_check_rejects_directory() {
    let temp_dir = TempDir::new().unwrap();

    let err = commands::check(
        &Config::default(),
        &CheckArgs {
            script: temp_dir.path().to_path_buf(),
        },
    )
    .unwrap_err();

    assert!(format!("{:#}", err).contains("Failed to load script"));
    assert!(matches!(
        err.downcast_ref::<RuntimeError>(),
        Some(RuntimeError::NotRegularFile { .. })
    ));
}

#[test]
fn test_check_valid_script() {
    let temp_dir = TempDir::new().unwrap();
    let script = write_script(temp_dir.path(), "console.log('loading'); function main() {}");

    assert!(commands::check(&Config::default(), &CheckArgs { script }).is_ok());
}
