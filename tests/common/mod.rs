//! Shared test utilities for the camux-provision test suite.
//!
//! Provides a recording [`ResourceManager`] double that logs every call in
//! order and can be told to fail at a chosen step.
//!
//! # Usage
//!
//! ```rust,ignore
//! mod common;
//! use common::*;
//! ```

#![allow(dead_code)]

use async_trait::async_trait;
use parking_lot::Mutex;

use camux_provision::cloud::{
    CloudError, CloudResult, CreateProjectRequest, CreateServiceAccountKeyRequest,
    CreateServiceAccountRequest, EnableServiceRequest, Project, ResourceManager, ServiceAccount,
    ServiceAccountKey,
};
use camux_provision::config::ConfigValues;

pub const TEST_PROJECT_NUMBER: &str = "415104041262";
pub const TEST_PRIVATE_KEY: &str = "eyJ0eXBlIjoic2VydmljZV9hY2NvdW50In0=";

// ============================================================================
// Recorded Calls
// ============================================================================

/// One call received by the double, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    CreateProject(CreateProjectRequest),
    EnableService(EnableServiceRequest),
    CreateServiceAccount(CreateServiceAccountRequest),
    CreateServiceAccountKey(CreateServiceAccountKeyRequest),
}

impl Call {
    pub fn kind(&self) -> &'static str {
        match self {
            Call::CreateProject(_) => "create_project",
            Call::EnableService(_) => "enable_service",
            Call::CreateServiceAccount(_) => "create_service_account",
            Call::CreateServiceAccountKey(_) => "create_service_account_key",
        }
    }
}

/// Where to inject a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailAt {
    CreateProject,
    /// Enabling the given API
    EnableService(String),
    CreateServiceAccount,
    CreateServiceAccountKey,
}

// ============================================================================
// Recording Resource Manager
// ============================================================================

/// Test double for the remote service.
#[derive(Debug, Default)]
pub struct RecordingResourceManager {
    calls: Mutex<Vec<Call>>,
    fail_at: Option<FailAt>,
}

impl RecordingResourceManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail with [`injected_error_message`] at the given step.
    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            fail_at: Some(fail_at),
        }
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    pub fn call_kinds(&self) -> Vec<&'static str> {
        self.calls.lock().iter().map(Call::kind).collect()
    }

    pub fn enable_requests(&self) -> Vec<EnableServiceRequest> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                Call::EnableService(req) => Some(req.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }

    fn should_fail(&self, step: &FailAt) -> bool {
        self.fail_at.as_ref() == Some(step)
    }
}

/// Message carried by injected failures.
pub fn injected_error_message(step: &FailAt) -> String {
    format!("injected failure at {:?}", step)
}

fn injected(step: FailAt) -> CloudError {
    CloudError::Other(injected_error_message(&step))
}

#[async_trait]
impl ResourceManager for RecordingResourceManager {
    async fn create_project(&self, request: &CreateProjectRequest) -> CloudResult<Project> {
        self.record(Call::CreateProject(request.clone()));
        if self.should_fail(&FailAt::CreateProject) {
            return Err(injected(FailAt::CreateProject));
        }
        Ok(Project {
            project_id: request.project_id.clone(),
            number: TEST_PROJECT_NUMBER.to_string(),
        })
    }

    async fn enable_service(&self, request: &EnableServiceRequest) -> CloudResult<()> {
        self.record(Call::EnableService(request.clone()));
        let step = FailAt::EnableService(request.service.clone());
        if self.should_fail(&step) {
            return Err(injected(step));
        }
        Ok(())
    }

    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> CloudResult<ServiceAccount> {
        self.record(Call::CreateServiceAccount(request.clone()));
        if self.should_fail(&FailAt::CreateServiceAccount) {
            return Err(injected(FailAt::CreateServiceAccount));
        }
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
        self.record(Call::CreateServiceAccountKey(request.clone()));
        if self.should_fail(&FailAt::CreateServiceAccountKey) {
            return Err(injected(FailAt::CreateServiceAccountKey));
        }
        Ok(ServiceAccountKey {
            private_key: TEST_PRIVATE_KEY.to_string(),
        })
    }
}

// ============================================================================
// Fixtures
// ============================================================================

/// `projectName=camux`, `billingAccount=ACME-123`, `organizationId=""`
pub fn default_values() -> ConfigValues {
    ConfigValues::new()
        .with("projectName", "camux")
        .with("billingAccount", "ACME-123")
        .with("organizationId", "")
}
