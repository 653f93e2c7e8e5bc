//! CLI command execution.

use std::path::Path;

use anyhow::{Context, Result};
use tokio::fs::File;
use tracing::{info, warn};

use teetime::{Buffered, Buffering, ProcessOptions, Sinks, StreamKind, WriterSink};

use super::args::Cli;

/// Run the command described by `cli` and return the exit code to use.
pub async fn execute(cli: Cli) -> Result<i32> {
    let options = process_options(&cli)?;
    let sinks = build_sinks(&cli).await?;

    info!(program = %options.program, "running");
    let report = teetime::run(options, sinks)
        .await
        .with_context(|| format!("Failed to run {}", cli.command.join(" ")))?;

    for error in &report.sink_errors {
        warn!(%error, "output was not fully delivered");
    }

    info!(code = report.exit_code(), "finished");
    Ok(report.exit_code())
}

fn process_options(cli: &Cli) -> Result<ProcessOptions> {
    let mut options = ProcessOptions::from_command(cli.command.iter().cloned())
        .context("No command given")?
        .envs(cli.env.iter().cloned());

    if let Some(ref dir) = cli.dir {
        options = options.working_dir(dir);
    }

    if cli.env_clear {
        options = options.env_clear();
    }

    Ok(options)
}

/// Open every file sink and wire the terminal echo.
///
/// The terminal is only added to a stream that already has file sinks: a
/// stream with nothing to copy into is left to pass through.
async fn build_sinks(cli: &Cli) -> Result<Sinks> {
    let mode = Buffering::from(cli.buffering);
    let echo = !cli.quiet;
    let mut sinks = Sinks::new();

    if echo && !(cli.stdout.is_empty() && cli.both.is_empty()) {
        sinks = sinks.stdout(Buffered::new(WriterSink::stdout(), Buffering::Unbuffered));
    }
    if echo && !(cli.stderr.is_empty() && cli.both.is_empty()) {
        sinks = sinks.stderr(Buffered::new(WriterSink::stderr(), Buffering::Unbuffered));
    }

    for path in &cli.stdout {
        let file = open_file(path, cli.append).await?;
        sinks = sinks.with(StreamKind::Stdout, Buffered::new(file, mode));
    }
    for path in &cli.stderr {
        let file = open_file(path, cli.append).await?;
        sinks = sinks.with(StreamKind::Stderr, Buffered::new(file, mode));
    }
    for path in &cli.both {
        let file = open_file(path, cli.append).await?;
        sinks = sinks.both_with(file, mode);
    }

    Ok(sinks)
}

async fn open_file(path: &Path, append: bool) -> Result<WriterSink<File>> {
    let sink = if append {
        WriterSink::append(path).await
    } else {
        WriterSink::create(path).await
    };
    sink.with_context(|| format!("Failed to open {}", path.display()))
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("teetime").chain(args.iter().copied())).unwrap()
    }

    #[tokio::test]
    async fn test_execute_writes_files_and_returns_code() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.log");
        let err = dir.path().join("err.log");
        let both = dir.path().join("both.log");

        let cli = parse(&[
            "-q",
            "-o",
            out.to_str().unwrap(),
            "-e",
            err.to_str().unwrap(),
            "-b",
            both.to_str().unwrap(),
            "sh",
            "-c",
            "printf 'out\\n'; printf 'err\\n' >&2; exit 4",
        ]);

        let code = execute(cli).await.unwrap();
        assert_eq!(code, 4);
        assert_eq!(std::fs::read(&out).unwrap(), b"out\n");
        assert_eq!(std::fs::read(&err).unwrap(), b"err\n");
        let combined = std::fs::read_to_string(&both).unwrap();
        assert_eq!(combined.len(), 8);
        assert!(combined.contains("out\n"));
        assert!(combined.contains("err\n"));
    }

    #[tokio::test]
    async fn test_both_file_keeps_lines_whole() {
        let dir = tempfile::tempdir().unwrap();
        let both = dir.path().join("both.log");

        let cli = parse(&[
            "-q",
            "--buffering",
            "line",
            "-b",
            both.to_str().unwrap(),
            "sh",
            "-c",
            "printf par; sleep 0.3; printf 'warn\\n' >&2; sleep 0.3; printf 'tial\\n'",
        ]);

        assert_eq!(execute(cli).await.unwrap(), 0);
        let text = std::fs::read_to_string(&both).unwrap();
        assert!(text == "warn\npartial\n" || text == "partial\nwarn\n", "{text:?}");
    }

    #[tokio::test]
    async fn test_append_keeps_existing_contents() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out.log");
        std::fs::write(&out, "before\n").unwrap();

        let cli = parse(&[
            "-q",
            "-a",
            "--buffering",
            "line",
            "-o",
            out.to_str().unwrap(),
            "printf",
            "after\\n",
        ]);

        assert_eq!(execute(cli).await.unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "before\nafter\n");
    }

    #[tokio::test]
    async fn test_env_and_dir_are_forwarded() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("env.log");

        let cli = parse(&[
            "-q",
            "-C",
            dir.path().to_str().unwrap(),
            "--env",
            "GREETING=hi",
            "-o",
            out.to_str().unwrap(),
            "sh",
            "-c",
            "printf \"$GREETING\"",
        ]);

        assert_eq!(execute(cli).await.unwrap(), 0);
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "hi");
    }

    #[tokio::test]
    async fn test_missing_program_is_an_error() {
        let cli = parse(&["nonexistent_command_12345"]);
        assert!(execute(cli).await.is_err());
    }

    #[tokio::test]
    async fn test_unopenable_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("missing").join("out.log");
        let cli = parse(&["-o", bad.to_str().unwrap(), "true"]);
        assert!(execute(cli).await.is_err());
    }
}
