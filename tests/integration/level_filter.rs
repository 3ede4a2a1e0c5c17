//! `--level` threshold.

use crate::lograft;

#[test]
fn level_threshold_filters_records() {
    let input = std::fs::read_to_string("tests/fixtures/filebeat.jsonl").unwrap();
    let output = lograft()
        .args(["--color=never", "--level=warn"])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(!stdout.contains("Refreshing"), "INFO record should be filtered");
    assert!(stdout.contains("stock low"));
    assert!(stdout.contains("payment gateway timeout"));
    assert_eq!(stdout.lines().count(), 2);
}

#[test]
fn unrecognized_level_always_passes() {
    let input = r#"{"message":"[main] 2018-07-07 10:31:12,138 NOTICE [a.B.c(1)] hi"}
{"message":"unstructured line"}"#;
    let output = lograft()
        .args(["--color=never", "--level=fatal"])
        .write_stdin(input)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    // NOTICE maps to INFO and is filtered; the unmatched line has no level.
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.starts_with("     :"));
}

#[test]
fn invalid_level_is_usage_error() {
    lograft().arg("--level=loud").write_stdin("").assert().failure();
}
