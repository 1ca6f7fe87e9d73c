//! The `sift` binary: JSON on stdout, non-zero exit on errors.

use std::process::Command;

use serde_json::Value;

use crate::helpers::temp_fixture;

fn sift() -> Command {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_sift"));
    cmd.env("RUST_LOG", "off");
    cmd
}

#[test]
fn prints_response_json() {
    let (_dir, config_path) = temp_fixture();
    let output = sift()
        .arg("--config")
        .arg(&config_path)
        .args(["caat", "--page-size", "5"])
        .output()
        .expect("run sift");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(json["results"]["article"][0]["id"], "a1");
    assert_eq!(json["pageInfo"]["article"]["pageSize"], 5);
    assert_eq!(json["pageInfo"]["article"]["total"], 1);
}

#[test]
fn fields_flag_restricts_attributes() {
    let (_dir, config_path) = temp_fixture();
    let output = sift()
        .arg("--config")
        .arg(&config_path)
        .args(["cat", "--fields", "title", "--populate", "", "--pretty"])
        .output()
        .expect("run sift");

    assert!(output.status.success());
    let json: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    let attributes = json["results"]["article"][0]["attributes"]
        .as_object()
        .expect("attributes object");
    assert_eq!(attributes.keys().collect::<Vec<_>>(), vec!["title"]);
}

#[test]
fn empty_query_exits_non_zero() {
    let (_dir, config_path) = temp_fixture();
    let output = sift()
        .arg("--config")
        .arg(&config_path)
        .arg("")
        .output()
        .expect("run sift");

    assert!(!output.status.success());
    assert!(output.stdout.is_empty());
    assert!(String::from_utf8_lossy(&output.stderr).contains("invalid query"));
}

#[test]
fn missing_config_exits_non_zero() {
    let output = sift()
        .args(["--config", "/nonexistent/sift.toml", "cat"])
        .output()
        .expect("run sift");

    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("loading config"));
}
