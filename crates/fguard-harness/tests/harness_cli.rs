#![forbid(unsafe_code)]

//! End-to-end runs of the harness commands against temp files.

use std::io::Write;
use std::path::Path;

use fguard_harness::cli::Opts;
use fguard_harness::{EXIT_INVALID, HarnessError, run};
use serde_json::Value;
use tempfile::{NamedTempFile, TempDir};

// ============================================================================
// Helpers
// ============================================================================

fn opts(args: &[&str]) -> Opts {
    Opts::parse(args.iter().map(|s| s.to_string()), |_| None).unwrap()
}

fn run_json(args: &[&str]) -> (i32, Value) {
    let mut out = Vec::new();
    let status = run(&opts(args), &mut out).unwrap();
    let json = serde_json::from_slice(&out).unwrap();
    (status, json)
}

fn write_file(dir: &Path, name: &str, contents: &str) -> String {
    let path = dir.join(name);
    std::fs::write(&path, contents).unwrap();
    path.to_string_lossy().into_owned()
}

const ADULT_SCRIPT: &str = r#"
# adult applicant, every field filled in tab order
{"type":"input","field":"firstName","value":"priya"}
{"type":"blur","field":"firstName"}
{"type":"input","field":"lastName","value":"sharma"}
{"type":"input","field":"username","value":"priya_s88"}
{"type":"input","field":"email","value":"priya.sharma@example.org"}
{"type":"input","field":"mobile","value":"98450 12376"}
{"type":"input","field":"dob","value":"1995-06-15"}
{"type":"input","field":"postalCode","value":"411001"}
{"type":"input","field":"country","value":"India"}
{"type":"input","field":"state","value":"Maharashtra"}
{"type":"input","field":"city","value":"Pune"}
{"type":"input","field":"education","value":"Bachelors"}
{"type":"input","field":"password","value":"Blue!Ocean42"}
{"type":"input","field":"confirmPassword","value":"Blue!Ocean42"}
{"type":"input","field":"address","value":"221B Baker Street, Pune"}
{"type":"input","field":"securityQuestion","value":"First pet"}
{"type":"input","field":"securityAnswer","value":"Bruno"}
{"type":"gender","value":"female"}
{"type":"terms","accepted":true}
{"type":"photo","data":"data:image/png;base64,iVBORw0KGgo"}
{"type":"wait","ms":50}
{"type":"submit"}
"#;

// ============================================================================
// check / dob
// ============================================================================

#[test]
fn check_prints_filtered_value() {
    let (status, json) = run_json(&["check", "name", "priya"]);
    assert_eq!(status, 0);
    assert_eq!(json["kind"], "name");
    assert_eq!(json["value"], "Priya");
    assert_eq!(json["valid"], true);
    assert!(json.get("code").is_none());
}

#[test]
fn invalid_value_exits_with_invalid_status() {
    let (status, json) = run_json(&["check", "postal", "4110"]);
    assert_eq!(status, EXIT_INVALID);
    assert_eq!(json["valid"], false);
    assert_eq!(json["code"], "format");
    assert_eq!(json["message"], "Must be exactly 6 digits");
}

#[test]
fn dob_uses_today_flag() {
    let (status, json) = run_json(&["--today=2026-10-18", "dob", "2013-10-18"]);
    assert_eq!(status, 0);
    assert_eq!(json["status"], "minor");
    assert_eq!(json["age"], 13);
    assert_eq!(json["is_minor"], true);

    let (status, json) = run_json(&["--today=2026-10-18", "dob", "2013-10-19"]);
    assert_eq!(status, EXIT_INVALID);
    assert_eq!(json["message"], "Must be 13+ years old");
}

#[test]
fn config_file_changes_age_bounds() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, r#"{{"age": {{"min_age": 16}}}}"#).unwrap();
    let path = config.path().to_string_lossy().into_owned();

    let (status, json) = run_json(&[
        "--config",
        &path,
        "--today=2026-10-18",
        "dob",
        "2011-06-15",
    ]);
    assert_eq!(status, EXIT_INVALID);
    assert_eq!(json["status"], "too_young");
    assert_eq!(json["message"], "Must be 16+ years old");
}

#[test]
fn config_blacklist_extras_apply() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, r#"{{"blacklist": {{"usernames": ["priya_s88"]}}}}"#).unwrap();
    let path = config.path().to_string_lossy().into_owned();

    let (status, json) = run_json(&["--config", &path, "check", "username", "priya_s88"]);
    assert_eq!(status, EXIT_INVALID);
    assert_eq!(json["code"], "blacklisted");
}

#[test]
fn broken_config_is_a_config_error() {
    let mut config = NamedTempFile::new().unwrap();
    write!(config, "{{ not json").unwrap();
    let path = config.path().to_string_lossy().into_owned();

    let err = run(
        &opts(&["--config", &path, "check", "city", "Pune"]),
        &mut Vec::new(),
    )
    .unwrap_err();
    assert!(matches!(err, HarnessError::Config(_)), "{err}");
}

// ============================================================================
// replay
// ============================================================================

#[test]
fn adult_script_submits() {
    let dir = TempDir::new().unwrap();
    let script = write_file(dir.path(), "adult.jsonl", ADULT_SCRIPT);

    let (status, json) = run_json(&["--today=2026-10-18", "replay", &script]);
    assert_eq!(status, 0);
    assert_eq!(json["steps"], 22);
    assert_eq!(json["submissions"], 1);
    assert_eq!(json["submission"]["phase"], "succeeded");
    assert_eq!(json["is_minor"], false);
    assert_eq!(json["age"], 31);
    assert_eq!(json["blockers"], Value::Array(Vec::new()));
    assert_eq!(json["focus"]["state"], "unblocked");
}

#[test]
fn blocked_field_holds_focus_in_replay() {
    let dir = TempDir::new().unwrap();
    let script = write_file(
        dir.path(),
        "blocked.jsonl",
        r#"{"type":"input","field":"postalCode","value":"41"}
{"type":"blur","field":"postalCode"}
{"type":"focus","target":{"field":"city"}}
"#,
    );

    let (_, json) = run_json(&["--today=2026-10-18", "replay", &script]);
    assert_eq!(json["focus"]["state"], "blocked");
    assert_eq!(json["focus"]["field"], "postalCode");
    assert_eq!(json["focused"]["field"], "postalCode");
    assert_eq!(json["submit_enabled"], false);
}

#[test]
fn enter_and_blur_elsewhere_keep_the_block_in_replay() {
    let dir = TempDir::new().unwrap();
    let script = write_file(
        dir.path(),
        "elsewhere.jsonl",
        r#"{"type":"input","field":"postalCode","value":"41"}
{"type":"blur","field":"postalCode"}
{"type":"enter","field":"city"}
{"type":"blur","field":"email"}
{"type":"enter","field":"mobile"}
"#,
    );

    let (_, json) = run_json(&["--today=2026-10-18", "replay", &script]);
    assert_eq!(json["steps"], 5);
    assert_eq!(json["focus"]["state"], "blocked");
    assert_eq!(json["focus"]["field"], "postalCode");
    assert_eq!(json["focused"]["field"], "postalCode");
}

#[test]
fn malformed_script_names_the_line() {
    let dir = TempDir::new().unwrap();
    let script = write_file(
        dir.path(),
        "bad.jsonl",
        "{\"type\":\"terms\",\"accepted\":true}\n\n{\"type\":\"terms\"}\n",
    );
    let err = run(&opts(&["replay", &script]), &mut Vec::new()).unwrap_err();
    match err {
        HarnessError::Script { line, .. } => assert_eq!(line, 3),
        other => panic!("expected script error, got {other}"),
    }
}

#[test]
fn missing_script_reports_path() {
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("nope.jsonl");
    let missing = missing.to_string_lossy().into_owned();
    let err = run(&opts(&["replay", &missing]), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, HarnessError::Io { path: Some(_), .. }));
    assert!(err.to_string().contains("nope.jsonl"));
}

#[test]
fn help_and_version_need_no_config() {
    let mut out = Vec::new();
    assert_eq!(run(&opts(&["--help"]), &mut out).unwrap(), 0);
    assert!(String::from_utf8(out).unwrap().contains("USAGE:"));

    let mut out = Vec::new();
    assert_eq!(run(&opts(&["-V"]), &mut out).unwrap(), 0);
    assert!(String::from_utf8(out).unwrap().starts_with("fguard-harness "));
}
