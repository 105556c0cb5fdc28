//! Config command - read and edit stack configuration

use anyhow::Result;
use clap::{Parser, Subcommand};

use camux_provision::config::{self as stack, KNOWN_KEYS};

use super::CommandContext;
use crate::cli::OutputFormat;

/// Arguments for the config command
#[derive(Parser, Debug, Clone)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub action: ConfigAction,
}

/// Config operations
#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Set a configuration value in the stack file
    Set {
        /// Configuration key (projectName, billingAccount, organizationId)
        key: String,
        /// Value to store
        value: String,
    },

    /// Print the effective value of a key
    Get {
        /// Configuration key
        key: String,
    },

    /// Remove a key from the stack file
    Rm {
        /// Configuration key
        key: String,
    },

    /// List effective configuration values
    List,
}

impl ConfigArgs {
    /// Execute the config command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        match &self.action {
            ConfigAction::Set { key, value } => {
                stack::set_stack_value(&ctx.stack_file, key, value)?;
                ctx.output.info(&format!(
                    "Set {} in {}",
                    key,
                    ctx.stack_file.display()
                ));
                Ok(0)
            }
            ConfigAction::Get { key } => {
                let settings = ctx.load_settings()?;
                match settings.config.get(key) {
                    Some(value) => {
                        warn_if_overridden(ctx, key);
                        ctx.output.document(value);
                        Ok(0)
                    }
                    None => {
                        ctx.output.error(&format!(
                            "configuration key '{}' is not set in {}",
                            key,
                            ctx.stack_file.display()
                        ));
                        Ok(1)
                    }
                }
            }
            ConfigAction::Rm { key } => {
                if stack::unset_stack_value(&ctx.stack_file, key)? {
                    ctx.output.info(&format!("Removed {}", key));
                } else {
                    ctx.output.info(&format!("{} was not set", key));
                }
                Ok(0)
            }
            ConfigAction::List => {
                let settings = ctx.load_settings()?;
                match ctx.output.format() {
                    OutputFormat::Json => ctx
                        .output
                        .document(&serde_json::to_string_pretty(&settings.config)?),
                    OutputFormat::Yaml => ctx
                        .output
                        .document(&serde_yaml::to_string(&settings.config)?),
                    OutputFormat::Human => {
                        ctx.output.section("Configuration");
                        for (key, value) in settings.config.iter() {
                            println!("  {:<16} {}", key, value);
                        }
                    }
                }
                Ok(0)
            }
        }
    }
}

fn warn_if_overridden(ctx: &CommandContext, key: &str) {
    if let Some((_, var)) = KNOWN_KEYS.iter().find(|(k, _)| *k == key) {
        if std::env::var(var).is_ok() {
            ctx.output.warning(&format!(
                "{} is overridden by the {} environment variable",
                key, var
            ));
        }
    }
}
