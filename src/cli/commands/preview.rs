//! Preview command - show the operations `up` would issue

use anyhow::Result;
use clap::Parser;
use serde::Serialize;

use camux_provision::cloud::preview::{PlannedOperation, PreviewResourceManager};
use camux_provision::workflow::Provisioner;

use super::CommandContext;
use crate::cli::output::StepStatus;
use crate::cli::OutputFormat;

/// Arguments for the preview command
#[derive(Parser, Debug, Clone, Default)]
pub struct PreviewArgs {}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct PreviewDocument<'a> {
    project_id: &'a str,
    operations: &'a [PlannedOperation],
}

impl PreviewArgs {
    /// Execute the preview command
    pub async fn execute(&self, ctx: &mut CommandContext) -> Result<i32> {
        let settings = ctx.load_settings()?;

        ctx.output.banner("CAMUX PREVIEW");

        let provisioner = Provisioner::new(PreviewResourceManager::new());
        let outputs = provisioner.run(&settings.config).await?;
        let plan = provisioner.manager().plan();

        let document = PreviewDocument {
            project_id: &outputs.project_id,
            operations: &plan,
        };

        match ctx.output.format() {
            OutputFormat::Json => ctx
                .output
                .document(&serde_json::to_string_pretty(&document)?),
            OutputFormat::Yaml => ctx.output.document(&serde_yaml::to_string(&document)?),
            OutputFormat::Human => {
                for op in &plan {
                    ctx.output.step(StepStatus::Planned, &op.describe());
                }
                ctx.output.section("Summary");
                println!("  {} operation(s) planned, nothing created", plan.len());
            }
        }

        ctx.output.flush();
        Ok(0)
    }
}
