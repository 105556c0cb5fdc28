//! Up command - provision the stack

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use camux_provision::cloud::gcp::GcpResourceManager;
use camux_provision::workflow::{Provisioner, Step};

use super::CommandContext;
use crate::cli::output::{OutputFormatter, StepStatus};

/// Arguments for the up command
#[derive(Parser, Debug, Clone)]
pub struct UpArgs {
    /// Print secret outputs (the service account key) in clear text
    #[arg(long)]
    pub show_secrets: bool,

    /// Also write all outputs, unmasked, as JSON to this file
    #[arg(long)]
    pub outputs_file: Option<PathBuf>,
}

impl UpArgs {
    /// Execute the up command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = ctx.load_settings()?;

        ctx.output.banner("CAMUX PROVISION");

        let manager = GcpResourceManager::new(&settings.gcp)?;
        let output = ctx.output.clone();
        let provisioner = Provisioner::new(manager).on_step(move |step| report(&output, step));

        let outputs = provisioner.run(&settings.config).await?;

        // The key exists only in this process; if it cannot be saved it is
        // printed instead.
        let mut show_secrets = self.show_secrets;
        if let Some(path) = &self.outputs_file {
            match outputs.write_json_file(path) {
                Ok(()) => ctx
                    .output
                    .info(&format!("Wrote outputs to {}", path.display())),
                Err(e) => {
                    ctx.output.warning(&format!(
                        "Could not write outputs to {}: {}; printing the service account key instead",
                        path.display(),
                        e
                    ));
                    show_secrets = true;
                }
            }
        }

        ctx.output.outputs(&outputs, show_secrets)?;
        ctx.output.flush();
        Ok(0)
    }
}

fn report(output: &OutputFormatter, step: Step<'_>) {
    match step {
        Step::ProjectCreated(project) => output.step(
            StepStatus::Created,
            &format!("project {} (number {})", project.project_id, project.number),
        ),
        Step::ServiceEnabled(api) => output.step(StepStatus::Created, &format!("api {}", api)),
        Step::ServiceAccountCreated(account) => output.step(
            StepStatus::Created,
            &format!("service account {}", account.email),
        ),
        Step::KeyCreated => output.step(StepStatus::Created, "service account key"),
    }
}
