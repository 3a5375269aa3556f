//! Event types for the caseplay event bus.

use caseplay_core::{CaseEvent, RunToken, StepRecord, SubjectId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Metadata attached to every event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventMetadata {
    /// Wall-clock time the notification was created.
    pub timestamp: DateTime<Utc>,
    /// Source component that generated the event.
    pub source: String,
}

impl EventMetadata {
    /// Create new event metadata.
    #[must_use]
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            source: source.into(),
        }
    }
}

impl Default for EventMetadata {
    fn default() -> Self {
        Self::new("unknown")
    }
}

/// Notifications published while the engine runs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ReplayEvent {
    /// A run reset the session and started its script.
    RunStarted {
        /// Event metadata.
        metadata: EventMetadata,
        /// Token of the run.
        token: RunToken,
        /// Subject under investigation.
        subject: SubjectId,
    },

    /// A case event was appended to the log.
    EventEmitted {
        /// Event metadata.
        metadata: EventMetadata,
        /// Token of the run.
        token: RunToken,
        /// The appended event.
        event: CaseEvent,
    },

    /// An investigation step was completed.
    StepCompleted {
        /// Event metadata.
        metadata: EventMetadata,
        /// Token of the run.
        token: RunToken,
        /// The completed step.
        step: StepRecord,
    },

    /// Run progress changed.
    ProgressChanged {
        /// Event metadata.
        metadata: EventMetadata,
        /// Token of the run.
        token: RunToken,
        /// New progress fraction.
        progress: f64,
    },

    /// A run finished its script.
    RunCompleted {
        /// Event metadata.
        metadata: EventMetadata,
        /// Token of the run.
        token: RunToken,
        /// Subject that was investigated.
        subject: SubjectId,
    },

    /// Autoplay was switched on or off.
    AutoplayToggled {
        /// Event metadata.
        metadata: EventMetadata,
        /// Whether autoplay is now enabled.
        enabled: bool,
    },
}

impl ReplayEvent {
    /// Get the event type as a string.
    #[must_use]
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::RunStarted { .. } => "run_started",
            Self::EventEmitted { .. } => "event_emitted",
            Self::StepCompleted { .. } => "step_completed",
            Self::ProgressChanged { .. } => "progress_changed",
            Self::RunCompleted { .. } => "run_completed",
            Self::AutoplayToggled { .. } => "autoplay_toggled",
        }
    }

    /// Get the event metadata.
    #[must_use]
    pub fn metadata(&self) -> &EventMetadata {
        match self {
            Self::RunStarted { metadata, .. }
            | Self::EventEmitted { metadata, .. }
            | Self::StepCompleted { metadata, .. }
            | Self::ProgressChanged { metadata, .. }
            | Self::RunCompleted { metadata, .. }
            | Self::AutoplayToggled { metadata, .. } => metadata,
        }
    }

    /// Token of the run that published this event, if it belongs to one.
    #[must_use]
    pub fn token(&self) -> Option<RunToken> {
        match self {
            Self::RunStarted { token, .. }
            | Self::EventEmitted { token, .. }
            | Self::StepCompleted { token, .. }
            | Self::ProgressChanged { token, .. }
            | Self::RunCompleted { token, .. } => Some(*token),
            Self::AutoplayToggled { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_type_and_token() {
        let event = ReplayEvent::ProgressChanged {
            metadata: EventMetadata::new("test"),
            token: RunToken(4),
            progress: 0.25,
        };
        assert_eq!(event.event_type(), "progress_changed");
        assert_eq!(event.token(), Some(RunToken(4)));
        assert_eq!(event.metadata().source, "test");

        let toggle = ReplayEvent::AutoplayToggled {
            metadata: EventMetadata::default(),
            enabled: true,
        };
        assert_eq!(toggle.token(), None);
    }

    #[test]
    fn test_serialization_is_tagged() {
        let event = ReplayEvent::RunCompleted {
            metadata: EventMetadata::new("sequencer"),
            token: RunToken(2),
            subject: SubjectId::new("+447700900456"),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "run_completed");
        assert_eq!(json["token"], 2);
        assert_eq!(json["subject"], "+447700900456");
    }
}
