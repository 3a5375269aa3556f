//! Post-merge configuration validation.
//!
//! Validates that deserialized [`Config`](crate::Config) values are within
//! acceptable ranges.

use chrono::NaiveDateTime;

use crate::error::{ConfigError, ConfigResult};
use crate::types::Config;

/// Maximum pacing delay for a single step (one minute).
const MAX_DELAY_MS: u64 = 60_000;

/// Maximum autoplay period (one hour).
const MAX_PERIOD_SECS: u64 = 3_600;

/// Format of `sequencer.clock_seed`.
const CLOCK_SEED_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Accepted `sequencer.clock_mode` values.
const CLOCK_MODES: &[&str] = &["single", "per_step"];

/// Accepted `logging.format` values.
const LOG_FORMATS: &[&str] = &["pretty", "compact", "json", "full"];

/// Validate a fully-merged and deserialized configuration.
///
/// # Errors
///
/// Returns the first validation error found.
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_sequencer(config)?;
    validate_autoplay(config)?;
    validate_logging(config)?;
    Ok(())
}

fn invalid(field: &str, message: impl Into<String>) -> ConfigError {
    ConfigError::ValidationError {
        field: field.to_owned(),
        message: message.into(),
    }
}

fn validate_sequencer(config: &Config) -> ConfigResult<()> {
    let s = &config.sequencer;

    if s.step_delay_ms > MAX_DELAY_MS {
        return Err(invalid(
            "sequencer.step_delay_ms",
            format!("must not exceed {MAX_DELAY_MS}"),
        ));
    }

    if s.final_delay_ms > MAX_DELAY_MS {
        return Err(invalid(
            "sequencer.final_delay_ms",
            format!("must not exceed {MAX_DELAY_MS}"),
        ));
    }

    if let Err(e) = NaiveDateTime::parse_from_str(&s.clock_seed, CLOCK_SEED_FORMAT) {
        return Err(invalid(
            "sequencer.clock_seed",
            format!(
                "'{}' is not a valid YYYY-MM-DDTHH:MM:SS timestamp: {e}",
                s.clock_seed
            ),
        ));
    }

    if !CLOCK_MODES.contains(&s.clock_mode.as_str()) {
        return Err(invalid(
            "sequencer.clock_mode",
            format!(
                "unsupported mode '{}'; expected one of: {}",
                s.clock_mode,
                CLOCK_MODES.join(", ")
            ),
        ));
    }

    Ok(())
}

fn validate_autoplay(config: &Config) -> ConfigResult<()> {
    let a = &config.autoplay;

    if a.period_secs == 0 || a.period_secs > MAX_PERIOD_SECS {
        return Err(invalid(
            "autoplay.period_secs",
            format!("must be between 1 and {MAX_PERIOD_SECS}"),
        ));
    }

    if a.initial_subject.as_deref().is_some_and(str::is_empty) {
        return Err(invalid(
            "autoplay.initial_subject",
            "must not be empty when set",
        ));
    }

    Ok(())
}

fn validate_logging(config: &Config) -> ConfigResult<()> {
    let l = &config.logging;

    if l.level.trim().is_empty() {
        return Err(invalid("logging.level", "must not be empty"));
    }

    if !LOG_FORMATS.contains(&l.format.as_str()) {
        return Err(invalid(
            "logging.format",
            format!(
                "unsupported format '{}'; expected one of: {}",
                l.format,
                LOG_FORMATS.join(", ")
            ),
        ));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(validate(&Config::default()).is_ok());
    }

    #[test]
    fn test_zero_period_rejected() {
        let mut config = Config::default();
        config.autoplay.period_secs = 0;
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("autoplay.period_secs"));
    }

    #[test]
    fn test_excessive_delay_rejected() {
        let mut config = Config::default();
        config.sequencer.final_delay_ms = 120_000;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_unknown_clock_mode_rejected() {
        let mut config = Config::default();
        config.sequencer.clock_mode = "sometimes".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("clock_mode"));
    }

    #[test]
    fn test_per_step_clock_mode_accepted() {
        let mut config = Config::default();
        config.sequencer.clock_mode = "per_step".to_owned();
        assert!(validate(&config).is_ok());
    }

    #[test]
    fn test_bad_clock_seed_rejected() {
        let mut config = Config::default();
        config.sequencer.clock_seed = "18/11/2025 19:16".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_out_of_range_clock_seed_rejected() {
        let mut config = Config::default();
        config.sequencer.clock_seed = "2025-13-40T99:00:00".to_owned();
        let err = validate(&config).unwrap_err();
        assert!(err.to_string().contains("sequencer.clock_seed"));
    }

    #[test]
    fn test_unknown_log_format_rejected() {
        let mut config = Config::default();
        config.logging.format = "xml".to_owned();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_empty_initial_subject_rejected() {
        let mut config = Config::default();
        config.autoplay.initial_subject = Some(String::new());
        assert!(validate(&config).is_err());
    }
}
