//! Google Cloud REST client implementing [`ResourceManager`].
//!
//! Calls made per operation:
//!
//! | Operation | API call |
//! |-----------|----------|
//! | create project | `POST {resource_manager}/v3/projects`, poll the operation, `PUT {billing}/v1/projects/{id}/billingInfo` |
//! | enable service | `POST {service_usage}/v1/projects/{id}/services/{api}:enable`, poll the operation |
//! | create service account | `POST {iam}/v1/projects/{id}/serviceAccounts` |
//! | create key | `POST {iam}/v1/{service_account}/keys` |
//!
//! Failed calls are turned into [`CloudError`] and returned as-is. Nothing is
//! retried; polling a long-running operation is the only repeated request.

use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::auth::TokenSource;
use super::operation::{error_message, project_number, Operation};
use crate::cloud::{
    CloudError, CloudResult, CreateProjectRequest, CreateServiceAccountKeyRequest,
    CreateServiceAccountRequest, EnableServiceRequest, Project, ResourceManager, ServiceAccount,
    ServiceAccountKey,
};
use crate::config::GcpSettings;

/// Configuration for the GCP client
#[derive(Debug, Clone)]
pub struct GcpClientConfig {
    pub resource_manager_endpoint: String,
    pub billing_endpoint: String,
    pub service_usage_endpoint: String,
    pub iam_endpoint: String,
    /// Per-request timeout
    pub timeout: Duration,
    /// Delay between operation polls
    pub poll_interval: Duration,
    /// Maximum time to wait for one operation
    pub operation_timeout: Duration,
    pub token: TokenSource,
    pub user_agent: String,
}

impl Default for GcpClientConfig {
    fn default() -> Self {
        Self::from(&GcpSettings::default())
    }
}

impl From<&GcpSettings> for GcpClientConfig {
    fn from(settings: &GcpSettings) -> Self {
        Self {
            resource_manager_endpoint: trim_endpoint(&settings.resource_manager_endpoint),
            billing_endpoint: trim_endpoint(&settings.billing_endpoint),
            service_usage_endpoint: trim_endpoint(&settings.service_usage_endpoint),
            iam_endpoint: trim_endpoint(&settings.iam_endpoint),
            timeout: Duration::from_secs(settings.request_timeout_secs),
            poll_interval: Duration::from_millis(settings.operation_poll_interval_ms),
            operation_timeout: Duration::from_secs(settings.operation_timeout_secs),
            token: TokenSource::discover(settings.access_token.as_deref()),
            user_agent: format!("camux-provision/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// Builder for creating a GcpResourceManager
pub struct GcpResourceManagerBuilder {
    config: GcpClientConfig,
}

impl GcpResourceManagerBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self {
            config: GcpClientConfig::default(),
        }
    }

    /// Point every API at one base URL (used against local emulators and mocks)
    pub fn endpoint(mut self, url: impl Into<String>) -> Self {
        let url = trim_endpoint(&url.into());
        self.config.resource_manager_endpoint = url.clone();
        self.config.billing_endpoint = url.clone();
        self.config.service_usage_endpoint = url.clone();
        self.config.iam_endpoint = url;
        self
    }

    /// Use a fixed access token
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.config.token = TokenSource::Static(token.into());
        self
    }

    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the operation poll interval
    pub fn poll_interval(mut self, interval: Duration) -> Self {
        self.config.poll_interval = interval;
        self
    }

    /// Set the operation timeout
    pub fn operation_timeout(mut self, timeout: Duration) -> Self {
        self.config.operation_timeout = timeout;
        self
    }

    /// Build the GcpResourceManager
    pub fn build(self) -> CloudResult<GcpResourceManager> {
        GcpResourceManager::from_config(self.config)
    }
}

impl Default for GcpResourceManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// REST backend for the Google Cloud APIs
pub struct GcpResourceManager {
    client: Client,
    config: GcpClientConfig,
    token: OnceCell<String>,
}

impl GcpResourceManager {
    /// Create a client from the stack file's `gcp:` section
    pub fn new(settings: &GcpSettings) -> CloudResult<Self> {
        Self::from_config(GcpClientConfig::from(settings))
    }

    fn from_config(config: GcpClientConfig) -> CloudResult<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(&config.user_agent)
            .build()
            .map_err(|e| CloudError::Http {
                message: "Failed to create HTTP client".to_string(),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            config,
            token: OnceCell::new(),
        })
    }

    /// Create a new builder
    pub fn builder() -> GcpResourceManagerBuilder {
        GcpResourceManagerBuilder::new()
    }

    async fn bearer_token(&self) -> CloudResult<&str> {
        self.token
            .get_or_try_init(|| self.config.token.token())
            .await
            .map(String::as_str)
    }

    /// Send a request and decode the JSON response.
    async fn call<T: DeserializeOwned>(
        &self,
        operation: &str,
        request: RequestBuilder,
    ) -> CloudResult<T> {
        let token = self.bearer_token().await?;
        let response = request.bearer_auth(token).send().await?;

        let status = response.status();
        let body = response.text().await?;
        debug!("{} -> {}", operation, status);

        if status == StatusCode::UNAUTHORIZED {
            return Err(CloudError::AuthenticationFailed {
                message: error_message(&body),
            });
        }
        if !status.is_success() {
            return Err(CloudError::api(
                operation,
                status.as_u16(),
                error_message(&body),
            ));
        }

        let body = if body.trim().is_empty() { "null" } else { &body };
        serde_json::from_str(body)
            .map_err(|e| CloudError::invalid_response(operation, e.to_string()))
    }

    /// Poll a long-running operation until it finishes.
    ///
    /// Returns the operation's `response` payload, if it carried one.
    async fn wait_for_operation(
        &self,
        operation: &str,
        api_base: &str,
        started: Operation,
    ) -> CloudResult<Option<serde_json::Value>> {
        let start = Instant::now();
        let mut current = started;

        loop {
            if let Some(outcome) = current.outcome() {
                return outcome.map(|response| response.cloned());
            }

            if start.elapsed() >= self.config.operation_timeout {
                return Err(CloudError::OperationTimeout {
                    name: current.name,
                    timeout_secs: self.config.operation_timeout.as_secs(),
                });
            }

            debug!(
                "Waiting for operation {} ({:?} elapsed)",
                current.name,
                start.elapsed()
            );
            tokio::time::sleep(self.config.poll_interval).await;

            let url = format!("{}/{}", api_base, current.name);
            current = self.call(operation, self.client.get(&url)).await?;
        }
    }

    async fn fetch_project_number(&self, project_id: &str) -> CloudResult<String> {
        let url = format!(
            "{}/v3/projects/{}",
            self.config.resource_manager_endpoint, project_id
        );
        let resource: ResourceName = self.call("get project", self.client.get(&url)).await?;
        project_number(&resource.name)
            .map(str::to_string)
            .ok_or_else(|| {
                CloudError::invalid_response(
                    "get project",
                    format!("unexpected project name '{}'", resource.name),
                )
            })
    }

    async fn link_billing(&self, project_id: &str, billing_account: &str) -> CloudResult<()> {
        let url = format!(
            "{}/v1/projects/{}/billingInfo",
            self.config.billing_endpoint, project_id
        );
        let body = json!({
            "billingAccountName": qualify("billingAccounts/", billing_account),
        });

        info!("Linking billing account {} to {}", billing_account, project_id);
        let _: serde_json::Value = self
            .call("link billing account", self.client.put(&url).json(&body))
            .await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceManager for GcpResourceManager {
    async fn create_project(&self, request: &CreateProjectRequest) -> CloudResult<Project> {
        let api_base = format!("{}/v3", self.config.resource_manager_endpoint);
        let mut body = json!({
            "projectId": request.project_id,
            "displayName": request.name,
        });
        if let Some(org) = &request.org_id {
            body["parent"] = json!(qualify("organizations/", org));
        }

        let started: Operation = self
            .call(
                "create project",
                self.client.post(format!("{}/projects", api_base)).json(&body),
            )
            .await?;
        let response = self
            .wait_for_operation("create project", &api_base, started)
            .await?;

        let number = match response
            .as_ref()
            .and_then(|r| r.get("name"))
            .and_then(|n| n.as_str())
            .and_then(project_number)
        {
            Some(number) => number.to_string(),
            None => self.fetch_project_number(&request.project_id).await?,
        };

        self.link_billing(&request.project_id, &request.billing_account)
            .await?;

        Ok(Project {
            project_id: request.project_id.clone(),
            number,
        })
    }

    async fn enable_service(&self, request: &EnableServiceRequest) -> CloudResult<()> {
        let api_base = format!("{}/v1", self.config.service_usage_endpoint);
        let url = format!(
            "{}/projects/{}/services/{}:enable",
            api_base, request.project_id, request.service
        );

        let started: Operation = self
            .call("enable service", self.client.post(&url).json(&json!({})))
            .await?;
        self.wait_for_operation("enable service", &api_base, started)
            .await?;
        Ok(())
    }

    async fn create_service_account(
        &self,
        request: &CreateServiceAccountRequest,
    ) -> CloudResult<ServiceAccount> {
        let url = format!(
            "{}/v1/projects/{}/serviceAccounts",
            self.config.iam_endpoint, request.project_id
        );
        let body = json!({
            "accountId": request.account_id,
            "serviceAccount": { "displayName": request.display_name },
        });

        let created: ServiceAccountResource = self
            .call("create service account", self.client.post(&url).json(&body))
            .await?;
        Ok(ServiceAccount {
            name: created.name,
            email: created.email,
        })
    }

    async fn create_service_account_key(
        &self,
        request: &CreateServiceAccountKeyRequest,
    ) -> CloudResult<ServiceAccountKey> {
        let url = format!(
            "{}/v1/{}/keys",
            self.config.iam_endpoint, request.service_account_name
        );

        let created: KeyResource = self
            .call(
                "create service account key",
                self.client.post(&url).json(&json!({})),
            )
            .await?;
        Ok(ServiceAccountKey {
            private_key: created.private_key_data,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ResourceName {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ServiceAccountResource {
    name: String,
    email: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct KeyResource {
    private_key_data: String,
}

fn trim_endpoint(url: &str) -> String {
    url.trim_end_matches('/').to_string()
}

/// Prefix `value` unless it already carries the prefix.
fn qualify(prefix: &str, value: &str) -> String {
    if value.starts_with(prefix) {
        value.to_string()
    } else {
        format!("{}{}", prefix, value)
    }
}
