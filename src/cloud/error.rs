//! Error types for remote resource operations.
//!
//! Every failure of a create or enable call against the cloud APIs is
//! represented here. The provisioning workflow never inspects or rewraps
//! these; they reach the operator exactly as the backend produced them.

use thiserror::Error;

/// Result type alias for resource operations.
pub type CloudResult<T> = Result<T, CloudError>;

/// Error type for remote resource operations.
#[derive(Error, Debug)]
pub enum CloudError {
    // ========================================================================
    // Transport Errors
    // ========================================================================
    /// HTTP request failed before a response was received.
    #[error("HTTP request failed: {message}")]
    Http {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Request timed out.
    #[error("Request to '{url}' timed out")]
    Timeout { url: String },

    // ========================================================================
    // API Errors
    // ========================================================================
    /// The API answered with a non-success status.
    #[error("{operation} failed ({status}): {message}")]
    Api {
        operation: String,
        status: u16,
        message: String,
    },

    /// No usable credentials were found, or the server rejected them.
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    /// The response body did not have the expected shape.
    #[error("Invalid response from {operation}: {message}")]
    InvalidResponse { operation: String, message: String },

    // ========================================================================
    // Long-running Operations
    // ========================================================================
    /// A long-running operation completed with an error.
    #[error("Operation '{name}' failed: {message}")]
    Operation { name: String, message: String },

    /// A long-running operation did not complete in time.
    #[error("Operation '{name}' did not complete within {timeout_secs} seconds")]
    OperationTimeout { name: String, timeout_secs: u64 },

    // ========================================================================
    // Injected / Generic
    // ========================================================================
    /// Any other failure reported by a resource manager implementation.
    #[error("{0}")]
    Other(String),
}

impl CloudError {
    /// Create an API error.
    pub fn api(operation: impl Into<String>, status: u16, message: impl Into<String>) -> Self {
        CloudError::Api {
            operation: operation.into(),
            status,
            message: message.into(),
        }
    }

    /// Create an invalid response error.
    pub fn invalid_response(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CloudError::InvalidResponse {
            operation: operation.into(),
            message: message.into(),
        }
    }

    /// Get a hint for resolving the error.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CloudError::AuthenticationFailed { .. } => Some(
                "Run 'gcloud auth login' or set GOOGLE_OAUTH_ACCESS_TOKEN to a valid access token.",
            ),
            CloudError::Api { status: 403, .. } => Some(
                "Check that the authenticated principal may create projects and is a billing account user.",
            ),
            CloudError::Api { status: 409, .. } => {
                Some("A resource with this identifier already exists. Re-run to generate a new project id.")
            }
            CloudError::Api { status: 429, .. } => {
                Some("Quota exceeded. Wait before re-running or request a quota increase.")
            }
            _ => None,
        }
    }
}

impl From<reqwest::Error> for CloudError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            CloudError::Timeout {
                url: err.url().map(|u| u.to_string()).unwrap_or_default(),
            }
        } else {
            CloudError::Http {
                message: err.to_string(),
                source: Some(Box::new(err)),
            }
        }
    }
}
