//! Engine configuration.

use std::time::Duration;

use caseplay_core::{ClockMode, SimulatedClock, SubjectId};
use chrono::NaiveDateTime;

/// Default pause between script steps.
pub const DEFAULT_STEP_DELAY: Duration = Duration::from_millis(700);

/// Default pause before the final status step.
pub const DEFAULT_FINAL_DELAY: Duration = Duration::from_millis(500);

/// Default autoplay period.
pub const DEFAULT_AUTOPLAY_PERIOD: Duration = Duration::from_secs(16);

/// Default capacity of the run-request channel.
pub const DEFAULT_REQUEST_CAPACITY: usize = 32;

/// Pacing and clock settings for a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencerConfig {
    /// Real-time pause between script steps.
    pub step_delay: Duration,
    /// Real-time pause before the final status step.
    pub final_delay: Duration,
    /// Instant the simulated clock starts from on every run.
    pub clock_seed: NaiveDateTime,
    /// Seconds the simulated clock advances by.
    pub clock_step_secs: u32,
    /// When the simulated clock advances.
    pub clock_mode: ClockMode,
}

impl SequencerConfig {
    /// A fresh clock for one run.
    #[must_use]
    pub fn clock(&self) -> SimulatedClock {
        SimulatedClock::new(self.clock_seed, self.clock_step_secs, self.clock_mode)
    }

    /// Set both pacing delays.
    #[must_use]
    pub fn with_delays(mut self, step_delay: Duration, final_delay: Duration) -> Self {
        self.step_delay = step_delay;
        self.final_delay = final_delay;
        self
    }

    /// Set the clock mode.
    #[must_use]
    pub fn with_clock_mode(mut self, mode: ClockMode) -> Self {
        self.clock_mode = mode;
        self
    }
}

impl Default for SequencerConfig {
    fn default() -> Self {
        Self {
            step_delay: DEFAULT_STEP_DELAY,
            final_delay: DEFAULT_FINAL_DELAY,
            clock_seed: SimulatedClock::default().now(),
            clock_step_secs: 1,
            clock_mode: ClockMode::default(),
        }
    }
}

/// Autoplay settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoplayConfig {
    /// Whether autoplay starts enabled.
    pub enabled: bool,
    /// Time between autoplay ticks.
    pub period: Duration,
}

impl Default for AutoplayConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            period: DEFAULT_AUTOPLAY_PERIOD,
        }
    }
}

/// Full engine configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Run pacing and clock.
    pub sequencer: SequencerConfig,
    /// Autoplay scheduler.
    pub autoplay: AutoplayConfig,
    /// Subject selected at startup; the first subject when `None`.
    pub initial_subject: Option<SubjectId>,
    /// Capacity of the run-request channel.
    pub request_capacity: usize,
}

impl EngineConfig {
    /// Set whether autoplay starts enabled.
    #[must_use]
    pub fn with_autoplay(mut self, enabled: bool) -> Self {
        self.autoplay.enabled = enabled;
        self
    }

    /// Set the autoplay period.
    #[must_use]
    pub fn with_autoplay_period(mut self, period: Duration) -> Self {
        self.autoplay.period = period;
        self
    }

    /// Set the startup subject.
    #[must_use]
    pub fn with_initial_subject(mut self, subject: impl Into<SubjectId>) -> Self {
        self.initial_subject = Some(subject.into());
        self
    }

    /// Replace the sequencer settings.
    #[must_use]
    pub fn with_sequencer(mut self, sequencer: SequencerConfig) -> Self {
        self.sequencer = sequencer;
        self
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            sequencer: SequencerConfig::default(),
            autoplay: AutoplayConfig::default(),
            initial_subject: None,
            request_capacity: DEFAULT_REQUEST_CAPACITY,
        }
    }
}
