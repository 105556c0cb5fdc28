//! CLI module for camux-provision
//!
//! Argument parsing and subcommand dispatch.

pub mod commands;
pub mod output;

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use camux_provision::telemetry::LogFormat;

/// camux-provision - bootstrap the Google Cloud project for the camux camera viewer
///
/// Creates a project with billing attached, enables the Smart Device
/// Management and IAM APIs, and creates a service account and key.
#[derive(Parser, Debug, Clone)]
#[command(name = "camux-provision")]
#[command(author = "Camux Contributors")]
#[command(version)]
#[command(about = "Provision the Google Cloud resources for camux", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the stack file holding configuration
    #[arg(short = 's', long, global = true, env = "CAMUX_STACK_FILE")]
    pub stack_file: Option<PathBuf>,

    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short = 'v', long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Output format
    #[arg(long, global = true, default_value = "human")]
    pub output: OutputFormat,

    /// Log line format (logs go to stderr)
    #[arg(long, global = true, default_value = "compact")]
    pub log_format: LogFormatArg,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,
}

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum OutputFormat {
    /// Human-readable output with colors
    #[default]
    Human,
    /// JSON output for scripting
    Json,
    /// YAML output
    Yaml,
}

/// Log format selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Default)]
pub enum LogFormatArg {
    #[default]
    Compact,
    Pretty,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

/// Available subcommands
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Create the project, APIs, service account and key
    Up(commands::up::UpArgs),

    /// Show what `up` would create without calling the cloud APIs
    Preview(commands::preview::PreviewArgs),

    /// Read or edit stack configuration
    Config(commands::config::ConfigArgs),
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }

    /// Get the effective verbosity level (0-3)
    pub fn verbosity(&self) -> u8 {
        self.verbose.min(3)
    }

    /// Whether colors should be used
    pub fn use_color(&self) -> bool {
        !self.no_color && std::env::var("NO_COLOR").is_err()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_up_with_globals() {
        let cli = Cli::try_parse_from([
            "camux-provision",
            "up",
            "--show-secrets",
            "-vv",
            "--output",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.verbosity(), 2);
        assert_eq!(cli.output, OutputFormat::Json);
        assert!(matches!(cli.command, Commands::Up(ref args) if args.show_secrets));
    }

    #[test]
    fn test_parse_config_set() {
        let cli = Cli::try_parse_from([
            "camux-provision",
            "config",
            "set",
            "billingAccount",
            "ACME-123",
        ])
        .unwrap();
        assert!(matches!(cli.command, Commands::Config(_)));
    }

    #[test]
    fn test_verbosity_is_capped() {
        let cli = Cli::try_parse_from(["camux-provision", "preview", "-vvvvv"]).unwrap();
        assert_eq!(cli.verbosity(), 3);
    }
}
