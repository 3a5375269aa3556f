//! Simulated clock used to stamp case events.
//!
//! The clock is seeded to a fixed instant at the start of every run and
//! advanced by a fixed increment, so event timestamps are reproducible and
//! independent of how long the real-time pacing delays take.

use chrono::{NaiveDate, NaiveDateTime, TimeDelta};
use serde::{Deserialize, Serialize};

/// Instant every run starts from unless configured otherwise.
pub const DEFAULT_SEED: &str = "2025-11-18T19:16:10";

/// Format accepted for clock seeds.
pub const SEED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// How often the clock advances during a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ClockMode {
    /// Advance once, right after the first emission, then hold.
    #[default]
    Single,
    /// Advance after every emission.
    PerStep,
}

/// Parse a clock seed in [`SEED_FORMAT`].
#[must_use]
pub fn parse_seed(seed: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(seed, SEED_FORMAT).ok()
}

fn default_seed() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2025, 11, 18)
        .and_then(|d| d.and_hms_opt(19, 16, 10))
        .unwrap_or_default()
}

/// Logical timestamp for one run.
#[derive(Debug, Clone)]
pub struct SimulatedClock {
    now: NaiveDateTime,
    step: TimeDelta,
    mode: ClockMode,
    advances: u32,
}

impl SimulatedClock {
    /// Create a clock seeded at `seed`, advancing by `step_secs`.
    #[must_use]
    pub fn new(seed: NaiveDateTime, step_secs: u32, mode: ClockMode) -> Self {
        Self {
            now: seed,
            step: TimeDelta::seconds(i64::from(step_secs)),
            mode,
            advances: 0,
        }
    }

    /// Current simulated time.
    #[must_use]
    pub fn now(&self) -> NaiveDateTime {
        self.now
    }

    /// Clock mode.
    #[must_use]
    pub fn mode(&self) -> ClockMode {
        self.mode
    }

    /// Number of times the clock has advanced.
    #[must_use]
    pub fn advances(&self) -> u32 {
        self.advances
    }

    /// Notify the clock that an event was emitted.
    ///
    /// In [`ClockMode::Single`] only the first call moves the clock.
    pub fn after_emit(&mut self) {
        if self.mode == ClockMode::Single && self.advances > 0 {
            return;
        }
        self.now = self.now.checked_add_signed(self.step).unwrap_or(self.now);
        self.advances = self.advances.saturating_add(1);
    }
}

impl Default for SimulatedClock {
    fn default() -> Self {
        Self::new(default_seed(), 1, ClockMode::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(clock: &SimulatedClock) -> String {
        clock.now().format("%H:%M:%S").to_string()
    }

    #[test]
    fn test_default_seed_matches_constant() {
        assert_eq!(parse_seed(DEFAULT_SEED).unwrap(), default_seed());
        assert_eq!(label(&SimulatedClock::default()), "19:16:10");
    }

    #[test]
    fn test_single_mode_advances_once() {
        let mut clock = SimulatedClock::default();
        clock.after_emit();
        assert_eq!(label(&clock), "19:16:11");
        clock.after_emit();
        clock.after_emit();
        assert_eq!(label(&clock), "19:16:11");
        assert_eq!(clock.advances(), 1);
    }

    #[test]
    fn test_per_step_mode_advances_every_emit() {
        let mut clock = SimulatedClock::new(default_seed(), 2, ClockMode::PerStep);
        clock.after_emit();
        clock.after_emit();
        clock.after_emit();
        assert_eq!(label(&clock), "19:16:16");
        assert_eq!(clock.advances(), 3);
    }

    #[test]
    fn test_parse_seed_rejects_garbage() {
        assert!(parse_seed("yesterday").is_none());
        assert!(parse_seed("2025-11-18 19:16:10").is_none());
    }
}
