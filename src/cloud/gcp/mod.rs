//! Google Cloud Platform backend.
//!
//! Implements [`ResourceManager`](crate::cloud::ResourceManager) on top of
//! the public REST APIs:
//!
//! - Cloud Resource Manager v3 (projects)
//! - Cloud Billing v1 (billing account linkage)
//! - Service Usage v1 (API enablement)
//! - IAM v1 (service accounts and keys)
//!
//! ## Authentication
//!
//! A bearer token is resolved once per run, from the first of:
//!
//! 1. `gcp.access_token` in the stack file
//! 2. The `GOOGLE_OAUTH_ACCESS_TOKEN` environment variable
//! 3. `gcloud auth print-access-token`
//!
//! The principal needs permission to create projects (under the organization
//! when one is configured) and the Billing Account User role on the billing
//! account.

pub mod auth;
pub mod client;
pub mod operation;

pub use auth::TokenSource;
pub use client::{GcpClientConfig, GcpResourceManager, GcpResourceManagerBuilder};
