//! The provisioning workflow.
//!
//! One linear pass per run:
//!
//! 1. read and validate configuration
//! 2. derive the project id `"{projectName}-{unixSeconds}"`
//! 3. create the project
//! 4. enable each of [`REQUIRED_APIS`] on it
//! 5. create the `camera-viewer-sa` service account
//! 6. create a key for that account
//! 7. return the [`StackOutputs`]
//!
//! The first failure ends the run and is returned unchanged. Nothing already
//! created is rolled back; re-running starts over with a fresh project id.

use tracing::{info, info_span, Instrument};

use crate::cloud::{
    CreateProjectRequest, CreateServiceAccountKeyRequest, CreateServiceAccountRequest,
    EnableServiceRequest, Project, ResourceManager, ServiceAccount,
};
use crate::config::{ConfigValues, ProvisionConfig};
use crate::error::{Error, Result};
use crate::outputs::{StackOutputs, NEXT_STEPS};

/// APIs enabled on the new project, in issue order.
pub const REQUIRED_APIS: &[&str] = &[
    "smartdevicemanagement.googleapis.com",
    "cloudresourcemanager.googleapis.com",
    "iam.googleapis.com",
    "iap.googleapis.com",
    "iamcredentials.googleapis.com",
];

pub const SERVICE_ACCOUNT_ID: &str = "camera-viewer-sa";
pub const SERVICE_ACCOUNT_DISPLAY_NAME: &str = "Camera Viewer Service Account";

/// Source of the run's timestamp.
pub trait Clock: Send + Sync {
    /// Seconds since the Unix epoch.
    fn unix_timestamp(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn unix_timestamp(&self) -> i64 {
        chrono::Utc::now().timestamp()
    }
}

/// A clock pinned to one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn unix_timestamp(&self) -> i64 {
        self.0
    }
}

/// `"{project_name}-{timestamp}"`
pub fn project_id(project_name: &str, timestamp: i64) -> String {
    format!("{}-{}", project_name, timestamp)
}

/// Name under which an API enablement is tracked.
pub fn service_resource_name(api: &str) -> String {
    format!("{}-api", api)
}

/// Progress notifications emitted after each completed step.
#[derive(Debug, Clone, Copy)]
pub enum Step<'a> {
    ProjectCreated(&'a Project),
    ServiceEnabled(&'a str),
    ServiceAccountCreated(&'a ServiceAccount),
    KeyCreated,
}

type StepHook = Box<dyn Fn(Step<'_>) + Send + Sync>;

/// Runs the provisioning sequence against a [`ResourceManager`].
pub struct Provisioner<R> {
    manager: R,
    clock: Box<dyn Clock>,
    on_step: Option<StepHook>,
}

impl<R: ResourceManager> Provisioner<R> {
    pub fn new(manager: R) -> Self {
        Self {
            manager,
            clock: Box::new(SystemClock),
            on_step: None,
        }
    }

    /// Replace the clock used for the project id suffix.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    /// Register a callback invoked after each completed step.
    pub fn on_step(mut self, hook: impl Fn(Step<'_>) + Send + Sync + 'static) -> Self {
        self.on_step = Some(Box::new(hook));
        self
    }

    pub fn manager(&self) -> &R {
        &self.manager
    }

    fn notify(&self, step: Step<'_>) {
        if let Some(hook) = &self.on_step {
            hook(step);
        }
    }

    /// Execute the full sequence.
    pub async fn run(&self, values: &ConfigValues) -> Result<StackOutputs> {
        let config = ProvisionConfig::from_values(values)?;
        let new_project_id = project_id(&config.project_name, self.clock.unix_timestamp());

        async {
            let project = self.create_project(&config, &new_project_id).await?;
            self.enable_services(&project).await?;
            let account = self.create_service_account(&project).await?;
            let key = self
                .manager
                .create_service_account_key(&CreateServiceAccountKeyRequest {
                    service_account_name: account.name.clone(),
                })
                .await?;
            info!("Created key for {}", account.email);
            self.notify(Step::KeyCreated);

            Ok::<_, Error>(StackOutputs {
                project_id: project.project_id,
                project_number: project.number,
                service_account_email: account.email,
                service_account_key: key.private_key,
                next_steps: NEXT_STEPS.to_string(),
            })
        }
        .instrument(info_span!("provision", project_id = %new_project_id))
        .await
    }

    async fn create_project(&self, config: &ProvisionConfig, project_id: &str) -> Result<Project> {
        let request = CreateProjectRequest {
            name: config.project_name.clone(),
            project_id: project_id.to_string(),
            billing_account: config.billing_account.clone(),
            org_id: config.organization_id.clone(),
        };

        info!("Creating project {}", project_id);
        let project = self.manager.create_project(&request).await?;
        info!("Created project {} (number {})", project.project_id, project.number);
        self.notify(Step::ProjectCreated(&project));
        Ok(project)
    }

    async fn enable_services(&self, project: &Project) -> Result<()> {
        for &api in REQUIRED_APIS {
            let request = EnableServiceRequest {
                resource_name: service_resource_name(api),
                project_id: project.project_id.clone(),
                service: api.to_string(),
            };
            self.manager.enable_service(&request).await?;
            info!("Enabled {}", api);
            self.notify(Step::ServiceEnabled(api));
        }
        Ok(())
    }

    async fn create_service_account(&self, project: &Project) -> Result<ServiceAccount> {
        let request = CreateServiceAccountRequest {
            project_id: project.project_id.clone(),
            account_id: SERVICE_ACCOUNT_ID.to_string(),
            display_name: SERVICE_ACCOUNT_DISPLAY_NAME.to_string(),
        };

        let account = self.manager.create_service_account(&request).await?;
        info!("Created service account {}", account.email);
        self.notify(Step::ServiceAccountCreated(&account));
        Ok(account)
    }
}
