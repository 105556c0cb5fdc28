//! Long-running operation and error envelopes shared by the Google APIs.

use serde::Deserialize;

use crate::cloud::{CloudError, CloudResult};

/// `google.longrunning.Operation` as returned by Resource Manager and
/// Service Usage.
#[derive(Debug, Clone, Deserialize)]
pub struct Operation {
    pub name: String,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<Status>,
    #[serde(default)]
    pub response: Option<serde_json::Value>,
}

impl Operation {
    /// The operation's outcome, or `None` while it is still running.
    pub fn outcome(&self) -> Option<CloudResult<Option<&serde_json::Value>>> {
        if !self.done {
            return None;
        }
        Some(match &self.error {
            Some(status) => Err(CloudError::Operation {
                name: self.name.clone(),
                message: status.message.clone(),
            }),
            None => Ok(self.response.as_ref()),
        })
    }
}

/// `google.rpc.Status`
#[derive(Debug, Clone, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub message: String,
}

/// Error body of a failed REST call: `{"error": {...}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: String,
}

/// Pull the server's message out of an error response body, falling back
/// to the raw body.
pub fn error_message(body: &str) -> String {
    match serde_json::from_str::<ErrorEnvelope>(body) {
        Ok(envelope) if !envelope.error.message.is_empty() => envelope.error.message,
        _ => body.trim().to_string(),
    }
}

/// Project number from a resource name of the form `projects/{number}`.
pub fn project_number(resource_name: &str) -> Option<&str> {
    resource_name
        .strip_prefix("projects/")
        .filter(|n| !n.is_empty() && n.chars().all(|c| c.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_running_operation_has_no_outcome() {
        let op: Operation =
            serde_json::from_str(r#"{"name": "operations/cp.123", "done": false}"#).unwrap();
        assert!(op.outcome().is_none());

        let op: Operation = serde_json::from_str(r#"{"name": "operations/cp.123"}"#).unwrap();
        assert!(op.outcome().is_none());
    }

    #[test]
    fn test_failed_operation() {
        let op: Operation = serde_json::from_str(
            r#"{"name": "operations/cp.9", "done": true, "error": {"code": 6, "message": "project id already in use"}}"#,
        )
        .unwrap();
        let err = op.outcome().unwrap().unwrap_err();
        assert_eq!(
            err.to_string(),
            "Operation 'operations/cp.9' failed: project id already in use"
        );
    }

    #[test]
    fn test_error_message_extraction() {
        let body = r#"{"error": {"code": 403, "message": "The caller does not have permission", "status": "PERMISSION_DENIED"}}"#;
        assert_eq!(error_message(body), "The caller does not have permission");
        assert_eq!(error_message("upstream connect error\n"), "upstream connect error");
    }

    #[test]
    fn test_project_number() {
        assert_eq!(project_number("projects/415104041262"), Some("415104041262"));
        assert_eq!(project_number("projects/camux-1700000000"), None);
        assert_eq!(project_number("folders/1"), None);
    }
}
