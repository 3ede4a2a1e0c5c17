//! Malformed envelopes, non-matching lines and strict mode.

use predicates::prelude::*;

use crate::lograft;

const GOOD: &str =
    r#"{"message":"[main] 2018-07-07 10:31:12,138 INFO [a.B.c(1)] still running","beat":{"hostname":"H1"}}"#;

#[test]
fn malformed_envelopes_are_dropped() {
    let input = format!("not json\n{{\"beat\":{{\"hostname\":\"H1\"}}}}\n{GOOD}\n");
    lograft()
        .args(["--color=never", "--log-filter=warn"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains("still running"))
        .stdout(predicate::str::contains("not json").not())
        .stderr(predicate::str::contains("malformed envelope"));
}

#[test]
fn blank_lines_are_ignored() {
    let input = format!("\n   \n{GOOD}\n\n");
    let output = lograft().arg("--color=never").write_stdin(input).output().unwrap();
    assert!(output.status.success());
    assert_eq!(String::from_utf8_lossy(&output.stdout).lines().count(), 1);
    assert!(output.stderr.is_empty());
}

#[test]
fn no_match_degraded_by_default() {
    let input = r#"{"message":"Exception in thread main","beat":{"hostname":"H1"}}"#;
    lograft()
        .arg("--format=json")
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""message":"""#))
        .stdout(predicate::str::contains(r#""host":"H1""#));
}

#[test]
fn no_match_skip() {
    let input = format!("{}\n{GOOD}\n", r#"{"message":"Exception in thread main"}"#);
    let output = lograft()
        .args(["--color=never", "--on-no-match=skip"])
        .write_stdin(input)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 1);
    assert!(stdout.contains("still running"));
}

#[test]
fn strict_mode_drops_partial_records() {
    let input = format!("{}\n{GOOD}\n", r#"{"message":"INFO: no location here"}"#);
    let output = lograft()
        .args([
            "--color=never",
            "--strict",
            "--log-filter=warn",
            "--pattern",
            r"%{LOGLEVEL:level}: (?:\[%{NOTSPACE:location}\] )?%{GREEDYDATA:message}",
        ])
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("required capture `timestamp` is missing"));
}

#[test]
fn invalid_pattern_exits_one() {
    lograft()
        .args(["--pattern", "%{NOPE:x}"])
        .write_stdin(GOOD)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("unknown definition %{NOPE}"));
}

#[test]
fn json_diagnostics() {
    let output = lograft()
        .args(["--color=never", "--log-filter=warn", "--log-format=json"])
        .write_stdin("not json\n")
        .output()
        .unwrap();
    let stderr = String::from_utf8_lossy(&output.stderr);
    let event: serde_json::Value = serde_json::from_str(stderr.lines().next().unwrap()).unwrap();
    assert_eq!(event["level"], "WARN");
    assert_eq!(event["fields"]["message"], "dropping message");
}
