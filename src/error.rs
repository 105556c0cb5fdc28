//! Error types for camux-provision.
//!
//! Two kinds of failure end a provisioning run: a required configuration
//! value is missing, or a remote resource operation failed. The remaining
//! variants cover reading and writing the stack file.

use std::path::PathBuf;
use thiserror::Error;

use crate::cloud::CloudError;

/// Result type alias for provisioning operations.
pub type Result<T> = std::result::Result<T, Error>;

/// The main error type for camux-provision.
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // Workflow Errors
    // ========================================================================
    /// A required configuration value is missing or empty.
    #[error("{0}")]
    Configuration(String),

    /// A remote create or enable call failed. Displayed exactly as the
    /// backend reported it.
    #[error(transparent)]
    ResourceOperation(#[from] CloudError),

    // ========================================================================
    // Stack File Errors
    // ========================================================================
    /// The stack file exists but could not be read or parsed.
    #[error("Failed to load stack file '{path}': {message}")]
    ConfigLoad {
        /// Path to the stack file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// The stack file could not be written.
    #[error("Failed to write stack file '{path}': {message}")]
    ConfigWrite {
        /// Path to the stack file
        path: PathBuf,
        /// Error message
        message: String,
    },

    /// Unknown configuration key.
    #[error("Unknown configuration key '{key}'. Valid keys: {valid}")]
    UnknownConfigKey {
        /// Offending key
        key: String,
        /// Comma-separated list of accepted keys
        valid: String,
    },

    // ========================================================================
    // Generic Errors
    // ========================================================================
    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl Error {
    /// Error for a required key that is absent or empty, naming the
    /// command that fixes it.
    pub fn missing_required(key: &str) -> Self {
        Error::Configuration(format!(
            "{} is required - set with: camux-provision config set {} <{}>",
            key,
            key,
            placeholder(key)
        ))
    }

    /// Whether this error came from the remote service.
    pub fn is_resource_operation(&self) -> bool {
        matches!(self, Error::ResourceOperation(_))
    }

    /// Get a hint for resolving the error, if there is one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            Error::ResourceOperation(err) => err.hint(),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(err: serde_yaml::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

/// `billingAccount` -> `YOUR_BILLING_ACCOUNT_ID`, `projectName` -> `YOUR_PROJECT_NAME`
fn placeholder(key: &str) -> String {
    let mut snake = String::with_capacity(key.len() + 8);
    for (i, c) in key.chars().enumerate() {
        if c.is_ascii_uppercase() && i > 0 {
            snake.push('_');
        }
        snake.push(c.to_ascii_uppercase());
    }
    // account references are entered as ids
    if key.ends_with("Account") {
        snake.push_str("_ID");
    }
    format!("YOUR_{}", snake)
}
