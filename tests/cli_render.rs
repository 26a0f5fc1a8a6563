//! Integration tests for the `tugdecomp` binary.
//!
//! Runs the built CLI against tree files in a temp directory and checks
//! stdout, JSON envelopes, and exit codes.

use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use serde_json::Value;
use tempfile::TempDir;

const PLAIN_CALL: &str = r#"{"kind": "call", "children": [
    {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "f"}]},
    {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "a"}]},
    {"kind": "CALL_FUNCTION_1", "attr": {"int": 1}}
]}"#;

const SHORT_CALL: &str = r#"{"revision": "3.5", "tree": {"kind": "call", "children": [
    {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "f", "line": 7}]},
    {"kind": "expr", "children": [{"kind": "LOAD_NAME", "pattr": "a"}]},
    {"kind": "CALL_FUNCTION_VAR_KW_3", "attr": {"int": 3}}
]}}"#;

fn tugdecomp() -> Command {
    Command::new(env!("CARGO_BIN_EXE_tugdecomp"))
}

fn write_tree(dir: &TempDir, name: &str, contents: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, contents).unwrap();
    path
}

fn render(path: &Path, extra: &[&str]) -> Output {
    tugdecomp()
        .arg("render")
        .arg(path)
        .args(extra)
        .output()
        .unwrap()
}

fn stdout_json(output: &Output) -> Value {
    serde_json::from_slice(&output.stdout).unwrap_or_else(|e| {
        panic!(
            "stdout is not JSON ({e}): {}",
            String::from_utf8_lossy(&output.stdout)
        )
    })
}

#[test]
fn render_text_output() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "call.json", PLAIN_CALL);
    let output = render(&path, &["--revision", "3.6"]);
    assert!(output.status.success(), "{output:?}");
    assert_eq!(String::from_utf8_lossy(&output.stdout), "f(a)");
}

#[test]
fn render_json_output() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "call.json", PLAIN_CALL);
    let output = render(&path, &["--revision", "3.4", "--format", "json"]);
    assert!(output.status.success(), "{output:?}");
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    assert_eq!(json["revision"], "3.4");
    assert_eq!(json["source"], "f(a)");
}

#[test]
fn render_reads_stdin() {
    use std::io::Write;
    use std::process::Stdio;

    let mut child = tugdecomp()
        .args(["render", "-", "--revision", "3.7"])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .spawn()
        .unwrap();
    child
        .stdin
        .take()
        .unwrap()
        .write_all(PLAIN_CALL.as_bytes())
        .unwrap();
    let output = child.wait_with_output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout), "f(a)");
}

#[test]
fn missing_file_is_input_error() {
    let dir = TempDir::new().unwrap();
    let output = render(&dir.path().join("absent.json"), &["--revision", "3.6"]);
    assert_eq!(output.status.code(), Some(3));
    let json = stdout_json(&output);
    assert_eq!(json["status"], "error");
    assert_eq!(json["error"]["code"], 3);
}

#[test]
fn malformed_tree_is_input_error() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "bad.json", "{\"kind\": 3}");
    let output = render(&path, &["--revision", "3.6"]);
    assert_eq!(output.status.code(), Some(3));
}

#[test]
fn missing_revision_is_invalid_arguments() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "call.json", PLAIN_CALL);
    let output = render(&path, &[]);
    assert_eq!(output.status.code(), Some(2));
    assert_eq!(stdout_json(&output)["error"]["code"], 2);
}

#[test]
fn argument_count_mismatch_reports_location() {
    let dir = TempDir::new().unwrap();
    let path = write_tree(&dir, "short.json", SHORT_CALL);
    let output = render(&path, &[]);
    assert_eq!(output.status.code(), Some(4));
    let json = stdout_json(&output);
    assert_eq!(json["error"]["code"], 4);
    assert_eq!(json["error"]["location"]["kind"], "call");
}

#[test]
fn rules_lists_active_tables() {
    let output = tugdecomp()
        .args(["rules", "--revision", "3.6"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    assert_eq!(json["status"], "ok");
    let rules = json["rules"].as_array().unwrap();
    assert!(rules
        .iter()
        .any(|r| r["tag"] == "fstring_multi" && r["rule"] == "handler"));
    let precedence = json["precedence"].as_array().unwrap();
    assert!(precedence
        .iter()
        .any(|p| p["tag"] == "call_ex_kw" && p["value"] == 100));
}

#[test]
fn rules_below_three_have_no_overlay() {
    let output = tugdecomp()
        .args(["rules", "--revision", "2.7"])
        .output()
        .unwrap();
    assert!(output.status.success());
    let json = stdout_json(&output);
    let rules = json["rules"].as_array().unwrap();
    assert!(!rules.iter().any(|r| r["tag"] == "call_ex_kw"));
}
