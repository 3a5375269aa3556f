//! Prelude module - commonly used types for convenient import.
//!
//! Use `use caseplay_core::prelude::*;` to import all essential types.

// Errors
pub use crate::{ReplayError, ReplayResult};

// Reference data
pub use crate::{ReferenceData, Subject, SubjectId, Zone, ZoneId, ZoneStatus};

// Run output
pub use crate::{CaseEvent, EventCategory, RunState, RunStatus, RunToken, StepRecord};

// Clock
pub use crate::{ClockMode, SimulatedClock};
