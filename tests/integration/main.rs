//! CLI integration tests for the `lograft` binary.

mod basic_pipe;
mod config_file;
mod error_handling;
mod level_filter;

use assert_cmd::Command;

#[allow(deprecated)]
pub fn lograft() -> Command {
    let mut cmd = Command::cargo_bin("lograft").unwrap();
    cmd.env("XDG_CONFIG_HOME", "/tmp/lograft-test-no-config");
    cmd.env_remove("RUST_LOG");
    cmd
}
