//! Values exported at the end of a successful run.

use std::io::Write;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shown in place of secret values unless secrets are requested.
pub const SECRET_PLACEHOLDER: &str = "[secret]";

/// Manual follow-up the operator performs after provisioning.
pub const NEXT_STEPS: &str = r#"
Manual steps required:

1. Configure OAuth consent screen:
   - Go to https://console.cloud.google.com/apis/credentials/consent
   - Select your project
   - Configure consent screen (external or internal based on your needs)
   - Add scopes: https://www.googleapis.com/auth/sdm.service

2. Create OAuth2 credentials:
   - Go to https://console.cloud.google.com/apis/credentials
   - Click "Create Credentials" > "OAuth client ID"
   - Application type: Web application
   - Add authorized redirect URI: http://localhost:5000/api/auth/callback
   - Save the Client ID and Client Secret

3. Create Device Access Project:
   - Go to https://console.nest.google.com/device-access
   - Create a new project ($5 one-time fee)
   - Link it to your Google Cloud project
   - Note the Project ID

4. Update your .env file with the credentials
"#;

/// The five exported values.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StackOutputs {
    pub project_id: String,
    pub project_number: String,
    pub service_account_email: String,
    /// Private key material; sensitive
    pub service_account_key: String,
    pub next_steps: String,
}

impl std::fmt::Debug for StackOutputs {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StackOutputs")
            .field("project_id", &self.project_id)
            .field("project_number", &self.project_number)
            .field("service_account_email", &self.service_account_email)
            .field("service_account_key", &SECRET_PLACEHOLDER)
            .finish()
    }
}

impl StackOutputs {
    /// Output names in export order.
    pub const NAMES: [&'static str; 5] = [
        "projectId",
        "projectNumber",
        "serviceAccountEmail",
        "serviceAccountKey",
        "nextSteps",
    ];

    /// Whether an output holds secret material.
    pub fn is_secret(name: &str) -> bool {
        name == "serviceAccountKey"
    }

    /// `(name, value)` pairs in export order, secrets masked unless `show_secrets`.
    pub fn entries(&self, show_secrets: bool) -> Vec<(&'static str, &str)> {
        let values = [
            self.project_id.as_str(),
            self.project_number.as_str(),
            self.service_account_email.as_str(),
            self.service_account_key.as_str(),
            self.next_steps.as_str(),
        ];
        Self::NAMES
            .into_iter()
            .zip(values)
            .map(|(name, value)| {
                if Self::is_secret(name) && !show_secrets {
                    (name, SECRET_PLACEHOLDER)
                } else {
                    (name, value)
                }
            })
            .collect()
    }

    /// Copy with secrets replaced by the placeholder.
    pub fn masked(&self) -> Self {
        Self {
            service_account_key: SECRET_PLACEHOLDER.to_string(),
            ..self.clone()
        }
    }

    fn view(&self, show_secrets: bool) -> Self {
        if show_secrets {
            self.clone()
        } else {
            self.masked()
        }
    }

    pub fn to_json(&self, show_secrets: bool) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.view(show_secrets))?)
    }

    pub fn to_yaml(&self, show_secrets: bool) -> Result<String> {
        Ok(serde_yaml::to_string(&self.view(show_secrets))?)
    }

    /// Write unmasked outputs as JSON for downstream tooling.
    ///
    /// The file holds the private key, so it is created owner-only (0600 on
    /// unix) and moved into place atomically.
    pub fn write_json_file(&self, path: &Path) -> Result<()> {
        let content = self.to_json(true)?;
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };

        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(content.as_bytes())?;
        tmp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }
}
