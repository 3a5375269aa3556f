//! Caseplay Engine - Plays the scripted investigation.
//!
//! This crate provides:
//! - [`Session`], the shared state a run writes into, guarded by run tokens
//! - [`Sequencer`], which plays the investigation script as a Tokio task
//! - [`AutoplayScheduler`], a repeating timer that cycles subjects
//! - [`Engine`], the single task that serializes every run request
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use caseplay_core::ReferenceData;
//! use caseplay_engine::{Engine, EngineConfig};
//!
//! # async fn example() -> Result<(), caseplay_core::ReplayError> {
//! let reference = Arc::new(ReferenceData::builtin()?);
//! let engine = Engine::start(EngineConfig::default().with_autoplay(false), reference)?;
//!
//! let token = engine.request_run_once().await?;
//! if let Some(snapshot) = engine.wait_for_completion(token).await? {
//!     for event in &snapshot.events {
//!         println!("{event}");
//!     }
//! }
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

mod autoplay;
mod config;
mod engine;
mod sequencer;
mod session;

pub use autoplay::AutoplayScheduler;
pub use config::{
    AutoplayConfig, DEFAULT_AUTOPLAY_PERIOD, DEFAULT_FINAL_DELAY, DEFAULT_REQUEST_CAPACITY,
    DEFAULT_STEP_DELAY, EngineConfig, SequencerConfig,
};
pub use engine::{Engine, RunRequest};
pub use sequencer::{RunOutcome, Sequencer};
pub use session::{Session, SessionSnapshot};
