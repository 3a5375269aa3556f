//! Bridge from `caseplay_config::Config` to domain types.

use std::time::Duration;

use anyhow::{Context, Result};
use caseplay_config::Config;
use caseplay_core::{ClockMode, ReferenceData, SubjectId, clock};
use caseplay_engine::{AutoplayConfig, EngineConfig, SequencerConfig};
use caseplay_telemetry::{LogConfig, LogFormat};

/// Convert config to [`LogConfig`].
pub(crate) fn to_log_config(cfg: &Config) -> LogConfig {
    let format = cfg
        .logging
        .format
        .parse::<LogFormat>()
        .unwrap_or(LogFormat::Compact);

    let mut log_config = LogConfig::new(&cfg.logging.level).with_format(format);

    for directive in &cfg.logging.directives {
        log_config = log_config.with_directive(directive);
    }

    log_config
}

/// Convert config to [`EngineConfig`].
pub(crate) fn to_engine_config(cfg: &Config) -> Result<EngineConfig> {
    let seq = &cfg.sequencer;
    let clock_seed = clock::parse_seed(&seq.clock_seed)
        .with_context(|| format!("invalid sequencer.clock_seed '{}'", seq.clock_seed))?;

    let clock_mode = match seq.clock_mode.as_str() {
        "per_step" => ClockMode::PerStep,
        _ => ClockMode::Single,
    };

    Ok(EngineConfig {
        sequencer: SequencerConfig {
            step_delay: Duration::from_millis(seq.step_delay_ms),
            final_delay: Duration::from_millis(seq.final_delay_ms),
            clock_seed,
            clock_step_secs: seq.clock_step_secs,
            clock_mode,
        },
        autoplay: AutoplayConfig {
            enabled: cfg.autoplay.enabled,
            period: Duration::from_secs(cfg.autoplay.period_secs),
        },
        initial_subject: cfg.autoplay.initial_subject.clone().map(SubjectId::from),
        ..EngineConfig::default()
    })
}

/// Load the reference data named in config, or the built-in tables.
pub(crate) fn load_reference(cfg: &Config) -> Result<ReferenceData> {
    match &cfg.data.reference_file {
        Some(path) => ReferenceData::load(path)
            .with_context(|| format!("failed to load reference data from {}", path.display())),
        None => ReferenceData::builtin().context("built-in reference data is invalid"),
    }
}
