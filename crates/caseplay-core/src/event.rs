//! Output of a run: the event log, completed steps and run state.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category tag carried by every [`CaseEvent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventCategory {
    /// The investigation request itself.
    Request,
    /// A query against a backing system.
    System,
    /// An entitlement or account check.
    Validation,
    /// The outcome of the investigation.
    Result,
    /// Case lifecycle status.
    Status,
}

impl EventCategory {
    /// Upper-case label used in the rendered log.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Request => "REQUEST",
            Self::System => "SYSTEM",
            Self::Validation => "VALIDATION",
            Self::Result => "RESULT",
            Self::Status => "STATUS",
        }
    }
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One entry of the investigation log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaseEvent {
    /// Simulated time the event was stamped with.
    pub time: NaiveDateTime,
    /// Event category.
    pub category: EventCategory,
    /// Human-readable message.
    pub message: String,
}

impl CaseEvent {
    /// Create a new event.
    #[must_use]
    pub fn new(time: NaiveDateTime, category: EventCategory, message: impl Into<String>) -> Self {
        Self {
            time,
            category,
            message: message.into(),
        }
    }

    /// Simulated time rendered as `HH:MM:SS`.
    #[must_use]
    pub fn clock_label(&self) -> String {
        self.time.format("%H:%M:%S").to_string()
    }
}

impl fmt::Display for CaseEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} — {} — {}",
            self.clock_label(),
            self.category,
            self.message
        )
    }
}

/// Label of a completed investigation step.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StepRecord(pub String);

impl StepRecord {
    /// Create a step record.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    /// The step label.
    #[must_use]
    pub fn label(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StepRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle status of the session's run.
///
/// `Idle` only before the first run; afterwards the status alternates
/// between `Running` and `Completed`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunStatus {
    /// No run has started yet.
    #[default]
    Idle,
    /// A run is in progress.
    Running,
    /// The latest run finished its script.
    Completed,
}

impl fmt::Display for RunStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Idle => f.write_str("IDLE"),
            Self::Running => f.write_str("RUNNING"),
            Self::Completed => f.write_str("COMPLETED"),
        }
    }
}

/// Progress and status of the current run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RunState {
    /// Fraction of the script completed, in `[0, 1]`.
    pub progress: f64,
    /// Lifecycle status.
    pub status: RunStatus,
}

impl RunState {
    /// State at the start of a run.
    #[must_use]
    pub fn running() -> Self {
        Self {
            progress: 0.0,
            status: RunStatus::Running,
        }
    }

    /// Progress as a whole percentage.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn percent(&self) -> u8 {
        (self.progress.clamp(0.0, 1.0) * 100.0).round() as u8
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(h: u32, m: u32, s: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 11, 18)
            .unwrap()
            .and_hms_opt(h, m, s)
            .unwrap()
    }

    #[test]
    fn test_case_event_display() {
        let event = CaseEvent::new(at(19, 16, 10), EventCategory::Request, "Request received");
        assert_eq!(event.to_string(), "19:16:10 — REQUEST — Request received");
    }

    #[test]
    fn test_category_serde() {
        let json = serde_json::to_string(&EventCategory::Validation).unwrap();
        assert_eq!(json, "\"VALIDATION\"");
    }

    #[test]
    fn test_run_state_default_is_idle() {
        let state = RunState::default();
        assert_eq!(state.status, RunStatus::Idle);
        assert_eq!(state.percent(), 0);
    }

    #[test]
    fn test_run_state_percent() {
        let state = RunState {
            progress: 0.45,
            status: RunStatus::Running,
        };
        assert_eq!(state.percent(), 45);
    }
}
