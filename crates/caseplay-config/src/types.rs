//! Configuration types for caseplay.
//!
//! Every struct implements [`Default`] with the same values as the embedded
//! `defaults.toml`, so a bare `[section]` header in TOML produces a working
//! configuration.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Root configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Pacing and clock settings for the sequencer.
    pub sequencer: SequencerSection,
    /// Autoplay scheduler settings.
    pub autoplay: AutoplaySection,
    /// Reference data source.
    pub data: DataSection,
    /// Logging level, format, and per-crate directives.
    pub logging: LoggingSection,
}

// ---------------------------------------------------------------------------
// SequencerSection
// ---------------------------------------------------------------------------

/// Real-time pacing and simulated clock behaviour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequencerSection {
    /// Delay between regular steps, in milliseconds.
    pub step_delay_ms: u64,
    /// Delay before the final step, in milliseconds.
    pub final_delay_ms: u64,
    /// Simulated instant every run starts from (`YYYY-MM-DDTHH:MM:SS`).
    pub clock_seed: String,
    /// Simulated seconds added per clock advance.
    pub clock_step_secs: u32,
    /// `"single"` advances the clock once after the first event;
    /// `"per_step"` advances it after every event.
    pub clock_mode: String,
}

impl Default for SequencerSection {
    fn default() -> Self {
        Self {
            step_delay_ms: 700,
            final_delay_ms: 500,
            clock_seed: "2025-11-18T19:16:10".to_owned(),
            clock_step_secs: 1,
            clock_mode: "single".to_owned(),
        }
    }
}

// ---------------------------------------------------------------------------
// AutoplaySection
// ---------------------------------------------------------------------------

/// Autoplay scheduler settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutoplaySection {
    /// Whether autoplay starts enabled.
    pub enabled: bool,
    /// Seconds between autoplay subject switches.
    pub period_secs: u64,
    /// Subject investigated first. Defaults to the first subject.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub initial_subject: Option<String>,
}

impl Default for AutoplaySection {
    fn default() -> Self {
        Self {
            enabled: true,
            period_secs: 16,
            initial_subject: None,
        }
    }
}

// ---------------------------------------------------------------------------
// DataSection
// ---------------------------------------------------------------------------

/// Where subject and zone tables come from.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataSection {
    /// Reference data TOML file. The built-in tables are used when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference_file: Option<PathBuf>,
}

// ---------------------------------------------------------------------------
// LoggingSection
// ---------------------------------------------------------------------------

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSection {
    /// Log level filter (e.g. `"info"`, `"debug"`).
    pub level: String,
    /// Output format: `"pretty"`, `"compact"`, `"json"` or `"full"`.
    pub format: String,
    /// Per-crate directive overrides (e.g. `caseplay_engine=debug`).
    pub directives: Vec<String>,
}

impl Default for LoggingSection {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            format: "pretty".to_owned(),
            directives: Vec::new(),
        }
    }
}
