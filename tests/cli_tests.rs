//! CLI integration tests
//!
//! These tests verify the CLI commands work correctly by running the binary.

#![cfg(feature = "cli")]

use std::io::Write;
use std::path::PathBuf;
use std::process::{Command, Output, Stdio};

const RICHTEXT_ROOT: &str = r#"<div xmlns="http://www.coremedia.com/2003/richtext-1.0" xmlns:xlink="http://www.w3.org/1999/xlink">"#;

fn richtext_bin() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_richtext"))
}

fn fixture(name: &str) -> String {
    let mut path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    path.push("tests");
    path.push("fixtures");
    path.push(name);
    path.to_string_lossy().into_owned()
}

fn run(args: &[&str]) -> Output {
    Command::new(richtext_bin())
        .args(args)
        .output()
        .expect("Failed to execute command")
}

fn run_with_stdin(args: &[&str], input: &str) -> Output {
    let mut child = Command::new(richtext_bin())
        .args(args)
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("Failed to spawn command");
    child
        .stdin
        .take()
        .expect("stdin is piped")
        .write_all(input.as_bytes())
        .expect("Failed to write stdin");
    child.wait_with_output().expect("Failed to wait for command")
}

fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).trim_end().to_string()
}

fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

// ============================================================================
// Sanitize Command Tests
// ============================================================================

#[test]
fn test_cli_sanitize_valid_document() {
    let output = run(&["sanitize", &fixture("valid.xml")]);

    assert!(output.status.success(), "sanitize should succeed");
    assert_eq!(
        stdout(&output),
        format!(
            r#"{}<p>Lorem <strong>ipsum</strong> <a xlink:href="content:42">dolor</a></p></div>"#,
            RICHTEXT_ROOT
        )
    );
}

#[test]
fn test_cli_sanitize_repairs_document() {
    let output = run(&["sanitize", &fixture("messy.xml")]);

    assert!(output.status.success(), "sanitize should succeed");
    assert_eq!(stdout(&output), format!("{}<p>Lorem ipsum</p></div>", RICHTEXT_ROOT));
    let report = stderr(&output);
    assert!(report.contains("removed <blink>"), "should report the unknown element");
    assert!(report.contains("removed <ul>"), "should report the empty list");
    assert!(report.contains("lang"), "should report the invalid attribute");
}

#[test]
fn test_cli_sanitize_with_strictness() {
    let output = run(&["--strictness", "legacy", "sanitize", &fixture("messy.xml")]);

    assert!(output.status.success());
    assert_eq!(
        stdout(&output),
        format!(r#"{}<p lang="in valid">Lorem ipsum</p></div>"#, RICHTEXT_ROOT)
    );
}

#[test]
fn test_cli_sanitize_with_config() {
    let output = run(&["--config", &fixture("legacy.json"), "sanitize", &fixture("messy.xml")]);

    assert!(output.status.success());
    assert!(stdout(&output).contains(r#"lang="in valid""#));
}

#[test]
fn test_cli_sanitize_to_output_file() {
    let dir = tempfile::tempdir().unwrap();
    let target = dir.path().join("out.xml");
    let output = run(&[
        "sanitize",
        &fixture("messy.xml"),
        "--output",
        target.to_str().unwrap(),
    ]);

    assert!(output.status.success());
    assert!(stdout(&output).is_empty(), "nothing should go to stdout");
    let written = std::fs::read_to_string(&target).unwrap();
    assert_eq!(written, format!("{}<p>Lorem ipsum</p></div>", RICHTEXT_ROOT));
}

#[test]
fn test_cli_sanitize_wrong_root_fails() {
    let output = run(&["sanitize", &fixture("wrong_root.xml")]);

    assert!(!output.status.success(), "a wrong document element is fatal");
    assert!(stdout(&output).is_empty());
    assert!(stderr(&output).contains("Error"));
}

#[test]
fn test_cli_invalid_strictness() {
    let output = run(&["--strictness", "sloppy", "sanitize", &fixture("valid.xml")]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("sloppy"));
}

#[test]
fn test_cli_missing_config() {
    let output = run(&["--config", &fixture("missing.json"), "sanitize", &fixture("valid.xml")]);

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error"));
}

// ============================================================================
// Conversion Command Tests
// ============================================================================

#[test]
fn test_cli_to_data() {
    let output = run(&["to-data", &fixture("view.html")]);

    assert!(output.status.success(), "to-data should succeed");
    assert_eq!(
        stdout(&output),
        format!(
            concat!(
                "{}",
                r#"<p class="p--heading-1">Title</p>"#,
                r#"<p><strong>Lorem</strong> <a xlink:href="https://example.org" xlink:show="new">ipsum</a></p>"#,
                "</div>"
            ),
            RICHTEXT_ROOT
        )
    );
}

#[test]
fn test_cli_to_view_from_stdin() {
    let data = format!(
        r#"{}<p class="p--heading-3">T</p><p><a xlink:href="u" xlink:show="replace">l</a></p></div>"#,
        RICHTEXT_ROOT
    );
    let output = run_with_stdin(&["to-view"], &data);

    assert!(output.status.success(), "to-view should succeed");
    assert_eq!(
        stdout(&output),
        r#"<h3>T</h3><p><a href="u" target="_self">l</a></p>"#
    );
}

#[test]
fn test_cli_to_view_rejects_markup() {
    let output = run_with_stdin(&["to-view"], "<p>not stored data</p>");

    assert!(!output.status.success());
    assert!(stderr(&output).contains("Error"));
}

// ============================================================================
// Check Command Tests
// ============================================================================

#[test]
fn test_cli_check_valid() {
    let output = run(&["check", &fixture("valid.xml")]);

    assert!(output.status.success(), "check should succeed");
    assert!(stdout(&output).contains("✓ Document is valid"));
}

#[test]
fn test_cli_check_invalid() {
    let output = run(&["check", &fixture("messy.xml")]);

    assert!(!output.status.success(), "severe repairs fail the check");
    let report = stdout(&output);
    assert!(report.contains("✗ Document is invalid"));
    assert!(report.contains("removed <blink> (invalid)"));
}

#[test]
fn test_cli_check_minor_repairs_pass() {
    let output = run_with_stdin(
        &["check"],
        &format!("{}<p>a</p><ol/></div>", RICHTEXT_ROOT),
    );

    assert!(output.status.success(), "empty elements are not severe");
    let report = stdout(&output);
    assert!(report.contains("✓ Document is valid"));
    assert!(report.contains("1 minor repair(s)"));
}

#[test]
fn test_cli_check_wrong_root() {
    let output = run(&["check", &fixture("wrong_root.xml")]);

    assert!(!output.status.success());
    assert!(stdout(&output).contains("fatal:"));
}

#[test]
fn test_cli_help() {
    let output = run(&["--help"]);

    assert!(output.status.success());
    let help = stdout(&output);
    for command in ["sanitize", "to-data", "to-view", "check"] {
        assert!(help.contains(command), "help should list {}", command);
    }
}
