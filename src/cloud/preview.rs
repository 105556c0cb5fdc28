//! Preview (check mode) resource manager.
//!
//! Records every operation the workflow would issue and answers with
//! placeholder values, so a full run can be shown without touching the
//! remote service.

use async_trait::async_trait;
use parking_lot::Mutex;
use serde::Serialize;
use tracing::info;

use super::{
    CloudResult, CreateProjectRequest, CreateServiceAccountKeyRequest,
    CreateServiceAccountRequest, EnableServiceRequest, Project, ResourceManager, ServiceAccount,
    ServiceAccountKey,
};

/// Placeholder for values the service assigns at creation time.
pub const KNOWN_AFTER_UP: &str = "(known after up)";

/// A single planned operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "operation", rename_all = "snake_case")]
pub enum PlannedOperation {
    CreateProject(CreateProjectRequest),
    EnableService(EnableServiceRequest),
    CreateServiceAccount(CreateServiceAccountRequest),
    CreateServiceAccountKey(CreateServiceAccountKeyRequest),
}

impl PlannedOperation {
    /// One-line description for human output.
    pub fn describe(&self) -> String {
        match self {
            PlannedOperation::CreateProject(req) => match &req.org_id {
                Some(org) => format!(
                    "create project '{}' (billing {}, organization {})",
                    req.project_id, req.billing_account, org
                ),
                None => format!(
                    "create project '{}' (billing {})",
                    req.project_id, req.billing_account
                ),
            },
            PlannedOperation::EnableService(req) => {
                format!("enable {} on '{}'", req.service, req.project_id)
            }
            PlannedOperation::CreateServiceAccount(req) => format!(
                "create service account '{}' in '{}'",
                req.account_id, req.project_id
            ),
            PlannedOperation::CreateServiceAccountKey(req) => {
                format!("create key for '{}'", req.service_account_name)
            }
        }
    }
}

/// Resource manager that plans instead of creating.
#[derive(Debug, Default)]
pub struct PreviewResourceManager {
    plan: Mutex<Vec<PlannedOperation>>,
}

impl PreviewResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Operations recorded so far, in issue order.
    pub fn plan(&self) -> Vec<PlannedOperation> {
        self.plan.lock().clone()
    }

    fn record(&self, op: PlannedOperation) {
        info!("Would {}", op.describe());
        self.plan.lock().push(op);
    }
}

#[async_trait]
impl ResourceManager for PreviewResourceManager {
    async fn create_project(&self, request: &CreateProjectRequest) -> CloudResult<Project> {
        self.record(PlannedOperation::CreateProject(request.clone()));
        Ok(Project {
            project_id: request.project_id.clone(),
            number: KNOWN_AFTER_UP.to_string(),
        })
    }

    async fn enable_service(&self, request: &EnableServiceRequest) -> CloudResult<()> {
        self.record(PlannedOperation::EnableService(request.clone()));
        Ok(())
    }

    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> CloudResult<ServiceAccount> {
        self.record(PlannedOperation::CreateServiceAccount(request.clone()));
        let email = format!(
            "{}@{}.iam.gserviceaccount.com",
            request.account_id, request.project_id
        );
        Ok(ServiceAccount {
            name: format!("projects/{}/serviceAccounts/{}", request.project_id, email),
            email,
        })
    }

    async fn create_service_account_key(
        &self,
        request: &CreateServiceAccountKeyRequest,
    ) -> CloudResult<ServiceAccountKey> {
        self.record(PlannedOperation::CreateServiceAccountKey(request.clone()));
        Ok(ServiceAccountKey {
            private_key: KNOWN_AFTER_UP.to_string(),
        })
    }
}
