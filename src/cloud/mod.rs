//! Remote resource-management seam.
//!
//! The provisioning workflow talks to the cloud exclusively through the
//! [`ResourceManager`] trait. Two implementations ship with the crate:
//!
//! - [`GcpResourceManager`](gcp::GcpResourceManager): REST calls against the
//!   Google Cloud APIs
//! - [`PreviewResourceManager`](preview::PreviewResourceManager): records the
//!   planned operations without contacting any service
//!
//! Every operation is awaited to completion by the caller before the next
//! dependent operation is issued.

pub mod error;
pub mod gcp;
pub mod preview;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

pub use error::{CloudError, CloudResult};

/// Request to create a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProjectRequest {
    /// Human-readable display name
    pub name: String,
    /// Globally unique project identifier
    pub project_id: String,
    /// Billing account to attach
    pub billing_account: String,
    /// Parent organization; absent means no organization attachment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub org_id: Option<String>,
}

/// A project as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub project_id: String,
    /// Server-assigned project number
    pub number: String,
}

/// Request to enable one API on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EnableServiceRequest {
    /// Unique name under which this enablement is tracked, e.g. `iam.googleapis.com-api`
    pub resource_name: String,
    pub project_id: String,
    pub service: String,
}

/// Request to create a service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccountRequest {
    pub project_id: String,
    pub account_id: String,
    pub display_name: String,
}

/// A service account as reported by the service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccount {
    /// Full resource name, `projects/{project}/serviceAccounts/{email}`
    pub name: String,
    pub email: String,
}

/// Request to create a key for a service account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateServiceAccountKeyRequest {
    /// Full resource name of the owning service account
    pub service_account_name: String,
}

/// A server-generated service account key.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceAccountKey {
    /// Private key material exactly as returned by the service
    pub private_key: String,
}

impl std::fmt::Debug for ServiceAccountKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ServiceAccountKey")
            .field("private_key", &"[secret]")
            .finish()
    }
}

/// Create/enable operations against a remote resource-management service.
#[async_trait]
pub trait ResourceManager: Send + Sync {
    /// Create a project and attach billing (and the organization, when given).
    async fn create_project(&self, request: &CreateProjectRequest) -> CloudResult<Project>;

    /// Enable an API on a project.
    async fn enable_service(&self, request: &EnableServiceRequest) -> CloudResult<()>;

    /// Create a service account inside a project.
    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> CloudResult<ServiceAccount>;

    /// Create a key for a service account.
    async fn create_service_account_key(
        &self,
        request: &CreateServiceAccountKeyRequest,
    ) -> CloudResult<ServiceAccountKey>;
}

#[async_trait]
impl<T: ResourceManager + ?Sized> ResourceManager for Box<T> {
    async fn create_project(&self, request: &CreateProjectRequest) -> CloudResult<Project> {
        (**self).create_project(request).await
    }

    async fn enable_service(&self, request: &EnableServiceRequest) -> CloudResult<()> {
        (**self).enable_service(request).await
    }

    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> CloudResult<ServiceAccount> {
        (**self).create_service_account(request).await
    }

    async fn create_service_account_key(
        &self,
        request: &CreateServiceAccountKeyRequest,
    ) -> CloudResult<ServiceAccountKey> {
        (**self).create_service_account_key(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_project_request_omits_absent_org() {
        let request = CreateProjectRequest {
            name: "camux".to_string(),
            project_id: "camux-1700000000".to_string(),
            billing_account: "ACME-123".to_string(),
            org_id: None,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("orgId").is_none());
        assert_eq!(json["projectId"], "camux-1700000000");
    }

    #[test]
    fn test_create_project_request_includes_org() {
        let request = CreateProjectRequest {
            name: "camux".to_string(),
            project_id: "camux-1700000000".to_string(),
            billing_account: "ACME-123".to_string(),
            org_id: Some("1234567890".to_string()),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["orgId"], "1234567890");
    }

    #[test]
    fn test_key_debug_is_masked() {
        let key = ServiceAccountKey {
            private_key: "c2VjcmV0".to_string(),
        };
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("c2VjcmV0"));
        assert!(rendered.contains("[secret]"));
    }
}
