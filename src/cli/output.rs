//! Output formatting module for camux-provision
//!
//! Human output is colored text on stdout. In JSON and YAML modes stdout
//! carries exactly one document (the outputs or the plan) and messages go
//! to stderr.

use colored::Colorize;
use std::io::{self, Write};

use camux_provision::outputs::StackOutputs;

use super::OutputFormat;

/// Status of a completed step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepStatus {
    /// Resource was created or enabled
    Created,
    /// Resource would be created (preview)
    Planned,
}

impl StepStatus {
    /// Get the plain string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            StepStatus::Created => "created",
            StepStatus::Planned => "+ create",
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Notice {
    Error,
    Warning,
    Hint,
}

impl Notice {
    fn tag(self) -> &'static str {
        match self {
            Notice::Error => "error",
            Notice::Warning => "warning",
            Notice::Hint => "hint",
        }
    }
}

/// Output formatter for different output modes
#[derive(Debug, Clone)]
pub struct OutputFormatter {
    use_color: bool,
    format: OutputFormat,
    verbosity: u8,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(use_color: bool, format: OutputFormat, verbosity: u8) -> Self {
        Self {
            use_color,
            format,
            verbosity,
        }
    }

    /// Selected output format
    pub fn format(&self) -> OutputFormat {
        self.format
    }

    fn is_human(&self) -> bool {
        self.format == OutputFormat::Human
    }

    /// Title line printed once at the start of a command
    pub fn banner(&self, title: &str) {
        if !self.is_human() {
            return;
        }
        let title = format!("camux :: {}", title.to_lowercase());
        if self.use_color {
            println!("{}\n", title.bright_blue().bold());
        } else {
            println!("{}\n", title);
        }
    }

    /// Heading for a block of lines
    pub fn section(&self, title: &str) {
        if !self.is_human() {
            return;
        }
        let heading = format!("\n[{}]", title.to_lowercase());
        if self.use_color {
            println!("{}", heading.cyan());
        } else {
            println!("{}", heading);
        }
    }

    /// One progress line, e.g. `  created  api iam.googleapis.com`
    pub fn step(&self, status: StepStatus, message: &str) {
        if !self.is_human() {
            return;
        }
        let width = StepStatus::Planned.as_str().len();
        let label = format!("{:>width$}", status.as_str(), width = width);
        if self.use_color {
            let label = match status {
                StepStatus::Created => label.green(),
                StepStatus::Planned => label.yellow(),
            };
            println!("  {}  {}", label, message);
        } else {
            println!("  {}  {}", label, message);
        }
    }

    /// Failure that ends the command; a JSON object on stderr in json mode
    pub fn error(&self, message: &str) {
        if self.format == OutputFormat::Json {
            eprintln!("{}", serde_json::json!({ "type": "error", "message": message }));
        } else {
            self.notice(Notice::Error, message);
        }
    }

    pub fn warning(&self, message: &str) {
        self.notice(Notice::Warning, message);
    }

    /// Suggested fix; suppressed in json mode
    pub fn hint(&self, message: &str) {
        if self.format != OutputFormat::Json {
            self.notice(Notice::Hint, message);
        }
    }

    /// Only shown with `-v` in human mode
    pub fn info(&self, message: &str) {
        if self.verbosity >= 1 && self.is_human() {
            println!("{}", message.dimmed());
        }
    }

    fn notice(&self, kind: Notice, message: &str) {
        let tag = kind.tag();
        if !self.use_color {
            eprintln!("{}: {}", tag, message);
            return;
        }
        let tag = match kind {
            Notice::Error => tag.red().bold(),
            Notice::Warning => tag.yellow().bold(),
            Notice::Hint => tag.cyan(),
        };
        eprintln!("{}: {}", tag, message);
    }

    /// Print a machine-readable document (JSON/YAML) or a plain line.
    pub fn document(&self, content: &str) {
        print!("{}", content);
        if !content.ends_with('\n') {
            println!();
        }
    }

    /// Render the stack outputs in the selected format
    pub fn outputs(&self, outputs: &StackOutputs, show_secrets: bool) -> anyhow::Result<()> {
        match self.format {
            OutputFormat::Json => self.document(&outputs.to_json(show_secrets)?),
            OutputFormat::Yaml => self.document(&outputs.to_yaml(show_secrets)?),
            OutputFormat::Human => {
                self.section("Outputs");
                let rows: Vec<_> = outputs
                    .entries(show_secrets)
                    .into_iter()
                    .filter(|(name, _)| *name != "nextSteps")
                    .collect();
                let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
                for (name, value) in rows {
                    let name = format!("{:<width$}", name, width = width);
                    if self.use_color {
                        println!("  {} = {}", name.bold(), value);
                    } else {
                        println!("  {} = {}", name, value);
                    }
                }
                println!("{}", outputs.next_steps);
            }
        }
        Ok(())
    }

    /// Flush stdout
    pub fn flush(&self) {
        let _ = io::stdout().flush();
    }
}
