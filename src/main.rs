use std::io::{self, BufRead, BufWriter, IsTerminal};
use std::process::ExitCode;

use clap::Parser;

use lograft::LograftError;
use lograft::cli::{Cli, ColorMode};
use lograft::config::Config;
use lograft::logging::init_tracing;
use lograft::pipeline::Outcome;

fn main() -> ExitCode {
    // Reset SIGPIPE to default behavior so upstream writers get a clean
    // SIGPIPE signal instead of a BrokenPipeError when lograft exits early.
    reset_sigpipe();

    let cli = Cli::parse();

    let config = match Config::from_cli(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("lograft: {e}");
            return ExitCode::from(1);
        }
    };

    if let Err(e) = init_tracing(&config.log_filter, config.log_format) {
        eprintln!("lograft: {e}");
        return ExitCode::from(1);
    }

    let use_color = resolve_color_mode(config.color_mode);

    let pipeline = match config.pipeline(BufWriter::new(io::stdout()), use_color) {
        Ok(pipeline) => pipeline,
        Err(e) => {
            eprintln!("lograft: {e}");
            return ExitCode::from(1);
        }
    };
    tracing::debug!(chain = ?pipeline.chain(), "pipeline ready");

    let mut stats = Stats::default();
    let stdin = io::stdin();
    for (index, line_result) in stdin.lock().lines().enumerate() {
        let line = match line_result {
            Ok(l) => l,
            Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                tracing::warn!(line = index + 1, "skipping line that is not valid UTF-8");
                stats.dropped += 1;
                continue;
            }
            Err(e) => {
                eprintln!("lograft: {}", LograftError::from(e));
                return ExitCode::from(2);
            }
        };

        if line.trim().is_empty() {
            continue;
        }

        match pipeline.process(line.as_bytes()) {
            Ok(Outcome::Dispatched(_)) => stats.dispatched += 1,
            Ok(Outcome::Skipped) => stats.skipped += 1,
            Err(e) if is_broken_pipe(&e) => return ExitCode::SUCCESS,
            Err(e @ LograftError::Handler { .. }) => {
                tracing::error!(line = index + 1, error = %e, "handler chain failed");
                stats.failed += 1;
            }
            Err(e) if e.is_per_message() => {
                tracing::warn!(line = index + 1, error = %e, "dropping message");
                stats.dropped += 1;
            }
            Err(e) => {
                eprintln!("lograft: {e}");
                return ExitCode::from(2);
            }
        }
    }

    if let Err(e) = pipeline.flush() {
        if is_broken_pipe(&e) {
            return ExitCode::SUCCESS;
        }
        eprintln!("lograft: flush error: {e}");
        return ExitCode::from(2);
    }

    tracing::info!(
        dispatched = stats.dispatched,
        skipped = stats.skipped,
        dropped = stats.dropped,
        failed = stats.failed,
        "input exhausted"
    );

    ExitCode::SUCCESS
}

#[derive(Debug, Default)]
struct Stats {
    dispatched: u64,
    skipped: u64,
    dropped: u64,
    failed: u64,
}

/// Whether a handler write or flush failed because stdout was closed.
fn is_broken_pipe(err: &LograftError) -> bool {
    match err {
        LograftError::Handler { source, .. } => source
            .downcast_ref::<io::Error>()
            .is_some_and(|e| e.kind() == io::ErrorKind::BrokenPipe),
        _ => false,
    }
}

fn resolve_color_mode(mode: ColorMode) -> bool {
    match mode {
        ColorMode::Always => true,
        ColorMode::Never => false,
        ColorMode::Auto => {
            let stdout = io::stdout();
            if !stdout.is_terminal() {
                return false;
            }
            if std::env::var_os("NO_COLOR").is_some_and(|v| !v.is_empty()) {
                return false;
            }
            if std::env::var("TERM").is_ok_and(|v| v == "dumb") {
                return false;
            }
            true
        }
    }
}

/// Reset SIGPIPE to the default (terminate) behavior.
///
/// By default, Rust ignores SIGPIPE to surface `BrokenPipe` I/O errors.
/// For a filter like `lograft`, restoring `SIG_DFL` lets the OS handle the
/// signal normally when the downstream reader exits.
#[cfg(unix)]
fn reset_sigpipe() {
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }
}

#[cfg(not(unix))]
fn reset_sigpipe() {}
