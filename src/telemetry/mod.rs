//! Observability for camux-provision.
//!
//! Every step of a run is logged through `tracing`; the `provision` span
//! carries the generated project id. The subscriber is installed once by
//! the binary via [`LoggingBuilder`].

pub mod logging;

pub use logging::{LogFormat, LogLevel, LoggingBuilder};
