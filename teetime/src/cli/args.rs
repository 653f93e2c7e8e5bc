//! CLI argument definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, ValueEnum};
use teetime::{Buffering, DEFAULT_BLOCK_SIZE};

/// Teetime - run a command and tee its stdout/stderr to files
#[derive(Parser, Debug)]
#[command(name = "teetime")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    // === Sinks ===
    /// Copy the command's stdout to FILE (repeatable)
    #[arg(short = 'o', long = "stdout", value_name = "FILE")]
    pub stdout: Vec<PathBuf>,

    /// Copy the command's stderr to FILE (repeatable)
    #[arg(short = 'e', long = "stderr", value_name = "FILE")]
    pub stderr: Vec<PathBuf>,

    /// Copy both streams into one FILE (repeatable)
    #[arg(short = 'b', long = "both", value_name = "FILE")]
    pub both: Vec<PathBuf>,

    /// Append to files instead of truncating them
    #[arg(short, long)]
    pub append: bool,

    /// Do not echo teed streams to the terminal
    #[arg(short, long)]
    pub quiet: bool,

    /// Buffering applied to file sinks
    #[arg(long, value_enum, default_value = "block")]
    pub buffering: BufferingArg,

    // === Process Options ===
    /// Working directory for the command
    #[arg(short = 'C', long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// Set an environment variable for the command (repeatable)
    #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_env)]
    pub env: Vec<(String, String)>,

    /// Start the command with an empty environment
    #[arg(long)]
    pub env_clear: bool,

    /// Raise log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,

    /// Command to run, followed by its arguments
    #[arg(trailing_var_arg = true, required = true, num_args = 1.., value_name = "COMMAND")]
    pub command: Vec<String>,
}

impl Cli {
    /// Default tracing filter when `RUST_LOG` is unset.
    pub const fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

/// Buffering modes selectable on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BufferingArg {
    /// Flush after every chunk
    None,
    /// Write whole lines only
    Line,
    /// Write in blocks
    Block,
}

impl From<BufferingArg> for Buffering {
    fn from(arg: BufferingArg) -> Self {
        match arg {
            BufferingArg::None => Self::Unbuffered,
            BufferingArg::Line => Self::Line,
            BufferingArg::Block => Self::Block(DEFAULT_BLOCK_SIZE),
        }
    }
}

/// Parse a `KEY=VALUE` pair.
fn parse_env(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got `{s}`"))?;
    if key.is_empty() {
        return Err(format!("empty variable name in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_command_keeps_its_flags() {
        let cli = Cli::try_parse_from([
            "teetime", "-o", "out.log", "-b", "all.log", "cargo", "test", "-q", "--nocapture",
        ])
        .unwrap();

        assert_eq!(cli.stdout, vec![PathBuf::from("out.log")]);
        assert_eq!(cli.both, vec![PathBuf::from("all.log")]);
        assert!(!cli.quiet);
        assert_eq!(cli.command, vec!["cargo", "test", "-q", "--nocapture"]);
    }

    #[test]
    fn test_command_required() {
        assert!(Cli::try_parse_from(["teetime", "-o", "out.log"]).is_err());
    }

    #[test]
    fn test_env_pairs() {
        let cli = Cli::try_parse_from(["teetime", "--env", "A=1", "--env", "B=x=y", "true"]).unwrap();
        assert_eq!(
            cli.env,
            vec![
                ("A".to_string(), "1".to_string()),
                ("B".to_string(), "x=y".to_string())
            ]
        );
    }

    #[test]
    fn test_parse_env_rejects_malformed() {
        assert!(parse_env("NOEQUALS").is_err());
        assert!(parse_env("=value").is_err());
        assert_eq!(parse_env("K=").unwrap(), ("K".to_string(), String::new()));
    }

    #[test]
    fn test_verbosity_and_buffering() {
        let cli = Cli::try_parse_from(["teetime", "-vv", "--buffering", "line", "true"]).unwrap();
        assert_eq!(cli.log_level(), "debug");
        assert_eq!(Buffering::from(cli.buffering), Buffering::Line);
    }
}
