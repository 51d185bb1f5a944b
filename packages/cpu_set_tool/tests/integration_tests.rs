//! Integration tests for the cpuset binary.

#![cfg(not(miri))]

use std::process::{Command, Output};

use cpu_set_tool::{OutputFormat, RunError, RunInput, run};

/// Helper to run the cpuset binary with given arguments.
fn run_tool(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_cpuset"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .expect("failed to start the cpuset binary")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

#[test]
fn merges_lists_in_order() {
    let output = run_tool(&["0,2", "4-6"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "0 2 4 5 6");
}

#[test]
fn empty_list_clears() {
    let output = run_tool(&["3 7", "", "1-2"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "1 2");
}

#[test]
fn no_lists_prints_empty_line() {
    let output = run_tool(&[]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "");
}

#[test]
fn ranges_switch_collapses_runs() {
    let output = run_tool(&["--ranges", "0-3 8 10,11"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "0-3 8 10-11");
}

#[test]
fn ranges_switch_applies_to_merged_result() {
    let output = run_tool(&["--ranges", "0-3", "", "4-5", "7,6"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "4-7");
}

#[test]
fn format_option_is_not_accepted() {
    let output = run_tool(&["--format", "ranges", "0-3"]);

    assert!(!output.status.success());
    assert_eq!(stdout(&output), "");
}

#[test]
fn inverted_range_warns_but_succeeds() {
    let output = run_tool(&["1", "5-3"]);

    assert!(output.status.success());
    assert_eq!(stdout(&output), "1");
    assert!(stderr(&output).contains("range '5-3' is invalid, 5 > 3, ignoring"));
}

#[test]
fn malformed_list_fails() {
    let output = run_tool(&["1", "two"]);

    assert!(!output.status.success());
    let stderr = stderr(&output);
    assert!(stderr.contains("Error: invalid CPU list 'two'"));
    assert!(stderr.contains("Caused by: invalid CPU list syntax"));
}

#[test]
fn out_of_range_fails() {
    let output = run_tool(&["8192"]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("CPU 8192 is out of range"));
}

#[test]
fn run_reports_list_errors() {
    let input = RunInput {
        current: false,
        format: OutputFormat::Ids,
        lists: vec!["'1".to_string()],
    };

    let error = run(&input).unwrap_err();

    assert!(matches!(error, RunError::InvalidList { ref list, .. } if list == "'1"));
}

#[cfg(target_os = "linux")]
#[test]
fn current_affinity_is_extended() {
    let input = RunInput {
        current: true,
        format: OutputFormat::Ids,
        lists: vec!["8191".to_string()],
    };

    let output = run(&input).unwrap();

    assert!(output.ends_with("8191"));
}
