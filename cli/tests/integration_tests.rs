use std::fs;
use std::path::PathBuf;
use std::process::{Command, Output};

use tempfile::TempDir;

const MANIFEST: &str = r#"version: "1.0"
name: deploy
flags:
  - name: region
    kind: string
    env_vars: [ENVFLAG_TEST_REGION, ENVFLAG_TEST_REGION_FALLBACK]
    default: us-east-1
    usage: Target region
  - name: replicas
    kind: int
    aliases: [r]
    env_vars: [ENVFLAG_TEST_REPLICAS]
    default: 3
  - name: dry-run
    kind: bool
"#;

fn write_manifest(dir: &TempDir, yaml: &str) -> PathBuf {
    let path = dir.path().join("flags.yaml");
    fs::write(&path, yaml).expect("failed to write manifest");
    path
}

/// Runs the binary with a clean set of test variables.
fn envflag(args: &[&str], envs: &[(&str, &str)]) -> Output {
    let mut cmd = Command::new(env!("CARGO_BIN_EXE_envflag"));
    cmd.args(args)
        .env_remove("ENVFLAG_TEST_REGION")
        .env_remove("ENVFLAG_TEST_REGION_FALLBACK")
        .env_remove("ENVFLAG_TEST_REPLICAS");
    for (key, value) in envs {
        cmd.env(key, value);
    }
    cmd.output().expect("failed to run envflag")
}

fn stdout_json(output: &Output) -> serde_json::Value {
    assert!(
        output.status.success(),
        "stderr: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

#[test]
fn validate_accepts_good_manifest() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(&["validate", "--manifest", manifest.to_str().unwrap()], &[]);
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(
        stdout.contains("Validated manifest 'deploy' with 3 flag(s)."),
        "stdout: {stdout}"
    );
}

#[test]
fn validate_rejects_bad_default() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(
        &dir,
        "version: \"1.0\"\nflags:\n  - name: port\n    kind: uint\n    default: \"-1\"\n",
    );

    let out = envflag(&["validate", "--manifest", manifest.to_str().unwrap()], &[]);
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains(r#"invalid default "-1" for flag -port: must be 32-bit unsigned integer"#),
        "stderr: {stderr}"
    );
}

#[test]
fn validate_reports_missing_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("missing.yaml");

    let out = envflag(&["validate", "--manifest", missing.to_str().unwrap()], &[]);
    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("Failed to load"));
}

#[test]
fn describe_ignores_environment() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &["describe", "--manifest", manifest.to_str().unwrap()],
        &[("ENVFLAG_TEST_REGION", "eu-west-1")],
    );
    let json = stdout_json(&out);

    assert_eq!(json[0]["name"], "region");
    assert_eq!(json[0]["value"], "us-east-1");
    assert_eq!(json[0]["is_set"], false);
    assert_eq!(json[1]["aliases"], serde_json::json!(["r"]));
    assert_eq!(json[2]["is_bool_flag"], true);
    assert_eq!(json[2]["takes_value"], false);
}

#[test]
fn resolve_applies_precedence() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &[
            "resolve",
            "--manifest",
            manifest.to_str().unwrap(),
            "--",
            "-r",
            "5",
            "--dry-run",
            "extra",
        ],
        &[
            ("ENVFLAG_TEST_REGION_FALLBACK", "ap-south-1"),
            ("ENVFLAG_TEST_REPLICAS", "9"),
        ],
    );
    let json = stdout_json(&out);

    let region = &json["flags"][0];
    assert_eq!(region["value"], "ap-south-1");
    assert_eq!(region["default_text"], "us-east-1");
    assert_eq!(region["source"], "env_var");

    let replicas = &json["flags"][1];
    assert_eq!(replicas["value"], "5");
    assert_eq!(replicas["source"], "argument");

    assert_eq!(json["flags"][2]["value"], "true");
    assert_eq!(json["args"], serde_json::json!(["extra"]));
}

#[test]
fn resolve_reports_invalid_env_value() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &["resolve", "--manifest", manifest.to_str().unwrap()],
        &[("ENVFLAG_TEST_REPLICAS", "monkey")],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains(
            r#"invalid value "monkey" for env var ENVFLAG_TEST_REPLICAS: must be 32-bit integer"#
        ),
        "stderr: {stderr}"
    );
}

#[test]
fn resolve_rejects_repeated_flag() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &[
            "resolve",
            "--manifest",
            manifest.to_str().unwrap(),
            "--",
            "--replicas",
            "1",
            "-r",
            "2",
        ],
        &[],
    );
    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains(r#"invalid value "2" for flag -r: setting the flag multiple times"#),
        "stderr: {stderr}"
    );
}

#[test]
fn resolve_outputs_yaml() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &[
            "resolve",
            "--manifest",
            manifest.to_str().unwrap(),
            "--format",
            "yaml",
        ],
        &[],
    );
    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("name: region"), "stdout: {stdout}");
    assert!(stdout.contains("args: []"), "stdout: {stdout}");
}

#[test]
fn verbose_logs_resolution_to_stderr() {
    let dir = TempDir::new().unwrap();
    let manifest = write_manifest(&dir, MANIFEST);

    let out = envflag(
        &["--verbose", "resolve", "--manifest", manifest.to_str().unwrap()],
        &[("ENVFLAG_TEST_REGION", "eu-west-1")],
    );
    assert!(out.status.success());
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(
        stderr.contains("Resolved flag from environment"),
        "stderr: {stderr}"
    );
}
