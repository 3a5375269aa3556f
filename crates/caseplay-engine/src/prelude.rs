//! Prelude module - commonly used types for convenient import.
//!
//! Use `use caseplay_engine::prelude::*;` to import all essential types.

// Engine
pub use crate::{Engine, RunRequest};

// Configuration
pub use crate::{AutoplayConfig, EngineConfig, SequencerConfig};

// Runs
pub use crate::{RunOutcome, Sequencer, Session, SessionSnapshot};

// Autoplay
pub use crate::AutoplayScheduler;
