//! Envelopes in, records out.

use predicates::prelude::*;

use crate::lograft;

const E2E: &str = r#"{"message":"[main] 2018-07-07 10:31:12,138 INFO  [pkg.Cls.method(503)] Refreshing ctx", "fields": null, "beat":{"hostname":"H1"}}"#;

#[test]
fn empty_stdin_exits_zero() {
    lograft().write_stdin("").assert().success().stdout("");
}

#[test]
fn single_envelope_text_output() {
    lograft()
        .arg("--color=never")
        .write_stdin(E2E)
        .assert()
        .success()
        .stdout(
            "2018-07-07 10:31:12,138   INFO: [H1/NOT_PROVIDED] pkg.Cls.method(503) Refreshing ctx\n",
        );
}

#[test]
fn single_envelope_json_output() {
    let output = lograft()
        .arg("--format=json")
        .write_stdin(E2E)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let record: serde_json::Value = serde_json::from_str(stdout.trim_end()).unwrap();
    assert_eq!(record["level"], "INFO");
    assert_eq!(record["location"], "pkg.Cls.method(503)");
    assert_eq!(record["message"], "Refreshing ctx");
    assert_eq!(record["timestamp"], "2018-07-07 10:31:12,138");
    assert_eq!(record["host"], "H1");
    assert_eq!(record["app_id"], "NOT_PROVIDED");
    assert_eq!(record["thread"], "main");
}

#[test]
fn filebeat_fixture() {
    let input = std::fs::read_to_string("tests/fixtures/filebeat.jsonl").unwrap();
    let output = lograft()
        .arg("--format=json")
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());

    let stdout = String::from_utf8_lossy(&output.stdout);
    let records: Vec<serde_json::Value> = stdout
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 3);

    // No `fields`: shipper hostname and the sentinel app id.
    assert_eq!(records[0]["host"], "01AD58697812703");
    assert_eq!(records[0]["app_id"], "NOT_PROVIDED");
    assert_eq!(
        records[0]["location"],
        "org.springframework.context.support.ClassPathXmlApplicationContext.prepareRefresh(503)"
    );

    // `fields` present: metadata wins over the shipper hostname.
    assert_eq!(records[1]["host"], "10.0.0.1");
    assert_eq!(records[1]["app_id"], "order-service");
    assert_eq!(records[1]["thread"], "pool-2-thread-1");
    assert_eq!(records[2]["level"], "ERROR");
    assert_eq!(
        records[2]["message"],
        "payment gateway timeout after 3000ms"
    );
}

#[test]
fn records_keep_input_order() {
    let input = (1..=5)
        .map(|i| {
            format!(
                r#"{{"message":"[main] 2018-07-07 10:31:1{i},000 INFO [a.B.c(1)] n={i}"}}"#
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let output = lograft()
        .arg("--color=never")
        .write_stdin(input)
        .output()
        .unwrap();
    let stdout = String::from_utf8_lossy(&output.stdout);
    let order: Vec<_> = stdout
        .lines()
        .map(|l| l.rsplit(' ').next().unwrap().to_string())
        .collect();
    assert_eq!(order, ["n=1", "n=2", "n=3", "n=4", "n=5"]);
}

#[test]
fn buffered_output_is_complete_at_eof() {
    let input = (0..2000)
        .map(|i| format!(r#"{{"message":"[main] 2018-07-07 10:31:12,138 INFO [a.B.c(1)] n={i}"}}"#))
        .collect::<Vec<_>>()
        .join("\n");
    let output = lograft()
        .arg("--format=json")
        .write_stdin(input)
        .output()
        .unwrap();
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert_eq!(stdout.lines().count(), 2000);
    let last: serde_json::Value = serde_json::from_str(stdout.lines().last().unwrap()).unwrap();
    assert_eq!(last["message"], "n=1999");
}

#[test]
fn labels_from_cli() {
    lograft()
        .args(["--format=json", "-L", "env=prod", "--label", "team=core"])
        .write_stdin(E2E)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""labels":{"env":"prod","team":"core"}"#));
}

#[test]
fn colorized_output_when_forced() {
    lograft()
        .arg("--color=always")
        .write_stdin(E2E)
        .assert()
        .success()
        .stdout(predicate::str::contains("\x1b["))
        .stdout(predicate::str::contains("Refreshing ctx"));
}

#[test]
fn custom_pattern_from_cli() {
    let input = r#"{"message":"WARN: queue depth 900","beat":{"hostname":"H2"}}"#;
    lograft()
        .args(["--format=json", "--pattern", "^%{LOGLEVEL:level}: %{GREEDYDATA:message}$"])
        .write_stdin(input)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""level":"WARN""#))
        .stdout(predicate::str::contains(r#""message":"queue depth 900""#))
        .stdout(predicate::str::contains(r#""location":"""#));
}
