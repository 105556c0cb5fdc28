//! Subcommands module for camux-provision CLI

pub mod config;
pub mod preview;
pub mod up;

use std::path::PathBuf;

use anyhow::Result;
use camux_provision::config::{resolve_stack_file, Settings};

use crate::cli::output::OutputFormatter;

/// Common context shared between commands
pub struct CommandContext {
    /// Output formatter
    pub output: OutputFormatter,
    /// Stack file in effect
    pub stack_file: PathBuf,
}

impl CommandContext {
    /// Create a new command context from CLI arguments
    pub fn new(cli: &crate::cli::Cli) -> Self {
        let output = OutputFormatter::new(cli.use_color(), cli.output, cli.verbosity());

        Self {
            output,
            stack_file: resolve_stack_file(cli.stack_file.as_deref()),
        }
    }

    /// Load settings from the stack file and environment
    pub fn load_settings(&self) -> Result<Settings> {
        let settings = Settings::load(Some(&self.stack_file))?;
        if !self.stack_file.exists() {
            self.output.info(&format!(
                "Stack file {} not found, using environment only",
                self.stack_file.display()
            ));
        }
        Ok(settings)
    }
}
