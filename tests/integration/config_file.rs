//! Config file loading and precedence.

use std::io::Write;

use predicates::prelude::*;

use crate::lograft;

const INPUT: &str = r#"{"message":"[main] 2018-07-07 10:31:12,138 INFO [a.B.c(1)] hello","fields":{"addr":"10.9.9.9","service":"billing","ip":"10.0.0.1"}}"#;

fn write_config(content: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file
}

#[test]
fn config_file_sets_format_and_metadata_keys() {
    let config = write_config(
        r#"
format = "json"

[metadata]
host_key = "addr"
app_id_key = "service"

[labels]
env = "prod"
"#,
    );
    lograft()
        .arg("--config")
        .arg(config.path())
        .write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""host":"10.9.9.9""#))
        .stdout(predicate::str::contains(r#""app_id":"billing""#))
        .stdout(predicate::str::contains(r#""env":"prod""#));
}

#[test]
fn cli_flag_overrides_config_file() {
    let config = write_config("format = \"json\"\n");
    lograft()
        .arg("--config")
        .arg(config.path())
        .args(["--format=text", "--color=never"])
        .write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("2018-07-07 10:31:12,138"));
}

#[test]
fn config_file_pattern_definitions() {
    let config = write_config(
        r#"
format = "json"

[pattern]
expression = '^%{LEVEL:level} %{GREEDYDATA:message}$'

[pattern.definitions]
LEVEL = "(?:LOUD|QUIET)"
"#,
    );
    lograft()
        .arg("--config")
        .arg(config.path())
        .write_stdin(r#"{"message":"LOUD disk almost full"}"#)
        .assert()
        .success()
        .stdout(predicate::str::contains(r#""level":"LOUD""#))
        .stdout(predicate::str::contains(r#""message":"disk almost full""#));
}

#[test]
fn xdg_config_home_is_used() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir_all(dir.path().join("lograft")).unwrap();
    std::fs::write(dir.path().join("lograft/config.toml"), "format = \"json\"\n").unwrap();

    lograft()
        .env("XDG_CONFIG_HOME", dir.path())
        .write_stdin(INPUT)
        .assert()
        .success()
        .stdout(predicate::str::starts_with("{"));
}

#[test]
fn invalid_config_file_exits_one() {
    let config = write_config("on_no_match = \"retry\"\n");
    lograft()
        .arg("--config")
        .arg(config.path())
        .write_stdin(INPUT)
        .assert()
        .code(1)
        .stderr(predicate::str::contains("config file error"));
}

#[test]
fn missing_config_file_exits_one() {
    lograft()
        .args(["--config", "/nonexistent/lograft.toml"])
        .write_stdin(INPUT)
        .assert()
        .code(1);
}
