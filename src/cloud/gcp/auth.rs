//! Access token discovery for the Google Cloud REST APIs.

use tokio::process::Command;
use tracing::debug;

use crate::cloud::{CloudError, CloudResult};

/// Environment variable holding a ready-to-use OAuth2 access token.
pub const ACCESS_TOKEN_ENV: &str = "GOOGLE_OAUTH_ACCESS_TOKEN";

/// Where the bearer token comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenSource {
    /// A fixed token (stack file or environment).
    Static(String),
    /// Ask the gcloud CLI for the active account's token.
    Gcloud,
}

impl TokenSource {
    /// Pick a source: explicit token first, then the environment, then gcloud.
    pub fn discover(explicit: Option<&str>) -> Self {
        if let Some(token) = explicit.filter(|t| !t.is_empty()) {
            return TokenSource::Static(token.to_string());
        }
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.is_empty() => TokenSource::Static(token),
            _ => TokenSource::Gcloud,
        }
    }

    /// Resolve the source into a bearer token.
    pub async fn token(&self) -> CloudResult<String> {
        match self {
            TokenSource::Static(token) => Ok(token.clone()),
            TokenSource::Gcloud => gcloud_access_token().await,
        }
    }
}

async fn gcloud_access_token() -> CloudResult<String> {
    debug!("Requesting access token from gcloud");

    let output = Command::new("gcloud")
        .args(["auth", "print-access-token"])
        .output()
        .await
        .map_err(|e| CloudError::AuthenticationFailed {
            message: format!(
                "no access token configured and gcloud could not be run: {}",
                e
            ),
        })?;

    if !output.status.success() {
        return Err(CloudError::AuthenticationFailed {
            message: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    let token = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if token.is_empty() {
        return Err(CloudError::AuthenticationFailed {
            message: "gcloud returned an empty access token".to_string(),
        });
    }
    Ok(token)
}
