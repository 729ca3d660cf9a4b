use assert_cmd::Command;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

const SIGNUP: &str = include_str!("../../wizard-spec/tests/fixtures/signup.json");

fn write_file(dir: &Path, name: &str, contents: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, contents).expect("write fixture");
    path
}

fn cli() -> Command {
    Command::cargo_bin("form-wizard").expect("binary")
}

#[test]
fn validate_accepts_complete_values() {
    let temp = TempDir::new().expect("temp dir");
    let spec = write_file(temp.path(), "signup.json", SIGNUP);
    let values = write_file(
        temp.path(),
        "values.json",
        r#"{"name": "Al", "email": "a@b.com", "age": 20}"#,
    );
    let output = cli()
        .args(["validate", "--spec"])
        .arg(&spec)
        .arg("--values")
        .arg(&values)
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Validation result: valid"));
}

#[test]
fn validate_reports_errors_from_every_step() {
    let temp = TempDir::new().expect("temp dir");
    let spec = write_file(temp.path(), "signup.json", SIGNUP);
    let values = write_file(
        temp.path(),
        "values.json",
        r#"{"name": "A", "email": "a@b.com", "age": 15, "phone": "1"}"#,
    );
    let output = cli()
        .args(["validate", "--spec"])
        .arg(&spec)
        .arg("--values")
        .arg(&values)
        .output()
        .expect("run");
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name - Name too short"));
    assert!(stdout.contains("age - Must be at least 18"));
    assert!(stdout.contains("Unknown fields: phone"));
}

#[test]
fn schema_prints_document_schema() {
    let output = cli().arg("schema").output().expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("\"steps\""));
}

#[test]
fn run_walks_through_every_step() {
    let temp = TempDir::new().expect("temp dir");
    let spec = write_file(temp.path(), "signup.json", SIGNUP);
    let output = cli()
        .args(["run", "--values-json", "--spec"])
        .arg(&spec)
        .write_stdin("\nnext\nAl\nnext\na@b.com\nnext\n15\nsubmit\n20\nsubmit\n")
        .output()
        .expect("run");
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("name - Name too short"));
    assert!(stdout.contains("age - Must be at least 18"));
    assert!(stdout.contains("Step 3/3: Age"));
    assert!(stdout.contains("Done ✅"));
    assert!(stdout.contains("\"email\": \"a@b.com\""));
}

#[test]
fn run_back_keeps_entered_values() {
    let temp = TempDir::new().expect("temp dir");
    let spec = write_file(temp.path(), "signup.json", SIGNUP);
    let output = cli()
        .args(["run", "--spec"])
        .arg(&spec)
        .write_stdin("Al\nnext\nbad\nback\n\nnext\n")
        .output()
        .expect("run");
    // Input runs out on the contact step, which aborts the run.
    assert!(!output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Full name [Al]"));
    assert!(stdout.contains("Email address [bad]"));
}

#[test]
fn run_rejects_invalid_spec() {
    let temp = TempDir::new().expect("temp dir");
    let spec = write_file(
        temp.path(),
        "broken.json",
        include_str!("../../wizard-spec/tests/fixtures/invalid_overlap.json"),
    );
    let output = cli().args(["run", "--spec"]).arg(&spec).output().expect("run");
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("FieldInMultipleSteps"));
}
