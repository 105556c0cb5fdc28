//! # camux-provision
//!
//! Provisions the Google Cloud resources the camux camera viewer needs before
//! it can talk to the Smart Device Management API: a project with billing
//! attached, five enabled APIs, a service account and a key for it.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                      CLI Interface                        │
//! │          (up / preview / config, clap-based)              │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                  Provisioning Workflow                    │
//! │   config -> project -> APIs -> service account -> key    │
//! └──────────────────────────────────────────────────────────┘
//!                             │
//!                             ▼
//! ┌──────────────────────────────────────────────────────────┐
//! │                 ResourceManager (trait)                   │
//! └──────────────────────────────────────────────────────────┘
//!              │                               │
//!              ▼                               ▼
//! ┌────────────────────────┐     ┌────────────────────────────┐
//! │   GcpResourceManager   │     │   PreviewResourceManager   │
//! │   (REST via reqwest)   │     │   (records the plan)       │
//! └────────────────────────┘     └────────────────────────────┘
//! ```
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use camux_provision::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load(None)?;
//!     let manager = GcpResourceManager::new(&settings.gcp)?;
//!
//!     let outputs = Provisioner::new(manager).run(&settings.config).await?;
//!     println!("{}", outputs.to_json(false)?);
//!     Ok(())
//! }
//! ```

pub mod cloud;
pub mod config;
pub mod error;
pub mod outputs;
pub mod telemetry;
pub mod workflow;

pub mod prelude {
    //! Convenient re-exports of commonly used types and traits.

    pub use crate::cloud::gcp::GcpResourceManager;
    pub use crate::cloud::preview::PreviewResourceManager;
    pub use crate::cloud::{CloudError, ResourceManager};
    pub use crate::config::{ConfigValues, ProvisionConfig, Settings};
    pub use crate::error::{Error, Result};
    pub use crate::outputs::StackOutputs;
    pub use crate::workflow::{Clock, FixedClock, Provisioner, SystemClock, REQUIRED_APIS};
}

/// Version of the crate.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
