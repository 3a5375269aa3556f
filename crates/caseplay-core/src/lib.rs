//! Caseplay Core - Foundation types for the caseplay replay engine.
//!
//! This crate provides:
//! - Subject and zone reference data, with TOML loading and validation
//! - Run tokens used to detect superseded runs
//! - The event, step and run-state types a run produces
//! - A simulated clock that stamps events independently of wall-clock time
//! - The shared error type
//!
//! # Example
//!
//! ```rust
//! use caseplay_core::{ReferenceData, SubjectId, ZoneStatus};
//!
//! let data = ReferenceData::builtin().unwrap();
//! let subject = data.subject(&SubjectId::new("+447700900123")).unwrap();
//! let zone = data.zone(&subject.zone).unwrap();
//! assert_eq!(zone.status, ZoneStatus::Active);
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

pub mod clock;
pub mod error;
pub mod event;
pub mod reference;
pub mod types;

pub use clock::{ClockMode, SimulatedClock};
pub use error::{ReplayError, ReplayResult};
pub use event::{CaseEvent, EventCategory, RunState, RunStatus, StepRecord};
pub use reference::ReferenceData;
pub use types::{RunToken, Subject, SubjectId, Zone, ZoneId, ZoneStatus};
