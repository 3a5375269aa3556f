//! Caseplay Events - Event bus for the caseplay replay engine.
//!
//! This crate provides:
//! - [`ReplayEvent`], the notifications a run publishes as it progresses
//! - A broadcast-based [`EventBus`] for async subscribers
//!
//! Presentation layers subscribe to the bus to stream the investigation log
//! as it is produced. Only the latest run publishes; a superseded run stops
//! before its next side effect, so it never publishes again.
//!
//! # Example
//!
//! ```rust
//! use caseplay_core::{RunToken, SubjectId};
//! use caseplay_events::{EventBus, EventMetadata, ReplayEvent};
//!
//! # async fn example() {
//! let bus = EventBus::new();
//! let mut receiver = bus.subscribe();
//!
//! bus.publish(ReplayEvent::RunStarted {
//!     metadata: EventMetadata::new("sequencer"),
//!     token: RunToken(1),
//!     subject: SubjectId::new("+447700900123"),
//! });
//!
//! let event = receiver.recv().await.unwrap();
//! assert_eq!(event.event_type(), "run_started");
//! # }
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod prelude;

mod bus;
mod event;

pub use bus::{DEFAULT_CHANNEL_CAPACITY, EventBus, EventReceiver};
pub use event::{EventMetadata, ReplayEvent};
