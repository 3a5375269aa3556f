//! Caseplay Telemetry - Logging for the caseplay replay engine.
//!
//! This crate provides configurable logging setup with multiple formats on
//! top of the tracing ecosystem.
//!
//! # Example
//!
//! ```rust,no_run
//! use caseplay_telemetry::{LogConfig, LogFormat, setup_logging};
//!
//! # fn main() -> Result<(), caseplay_telemetry::TelemetryError> {
//! let config = LogConfig::new("info")
//!     .with_format(LogFormat::Compact)
//!     .with_directive("caseplay_engine=debug");
//!
//! setup_logging(&config)?;
//! tracing::info!("logging ready");
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod error;
mod logging;

pub use error::{TelemetryError, TelemetryResult};
pub use logging::{LogConfig, LogFormat, LogTarget, setup_default_logging, setup_logging};
