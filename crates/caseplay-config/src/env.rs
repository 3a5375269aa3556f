//! Environment variable fallbacks.
//!
//! Env vars are **fallback**, not override: they only apply to fields that
//! no config file set.

use std::collections::HashMap;

use tracing::{debug, warn};

use crate::merge::{ConfigLayer, FieldSources};

/// How an environment value is converted into TOML.
#[derive(Debug, Clone, Copy)]
enum ValueKind {
    Str,
    Bool,
    Integer,
}

/// Mapping from environment variable name to config field path.
struct EnvMapping {
    var_name: &'static str,
    field_path: &'static str,
    kind: ValueKind,
}

/// All supported `CASEPLAY_*` env var mappings.
const ENV_MAPPINGS: &[EnvMapping] = &[
    EnvMapping {
        var_name: "CASEPLAY_LOG_LEVEL",
        field_path: "logging.level",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CASEPLAY_LOG_FORMAT",
        field_path: "logging.format",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CASEPLAY_AUTOPLAY",
        field_path: "autoplay.enabled",
        kind: ValueKind::Bool,
    },
    EnvMapping {
        var_name: "CASEPLAY_AUTOPLAY_PERIOD_SECS",
        field_path: "autoplay.period_secs",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "CASEPLAY_INITIAL_SUBJECT",
        field_path: "autoplay.initial_subject",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CASEPLAY_STEP_DELAY_MS",
        field_path: "sequencer.step_delay_ms",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "CASEPLAY_FINAL_DELAY_MS",
        field_path: "sequencer.final_delay_ms",
        kind: ValueKind::Integer,
    },
    EnvMapping {
        var_name: "CASEPLAY_CLOCK_MODE",
        field_path: "sequencer.clock_mode",
        kind: ValueKind::Str,
    },
    EnvMapping {
        var_name: "CASEPLAY_REFERENCE_FILE",
        field_path: "data.reference_file",
        kind: ValueKind::Str,
    },
];

/// Snapshot the process environment.
#[must_use]
pub fn collect_env_vars() -> HashMap<String, String> {
    std::env::vars().collect()
}

/// Apply env var fallbacks for fields no config file set.
///
/// Returns the number of fields filled from the environment. Values that
/// cannot be converted to the field's type are skipped with a warning.
pub fn apply_env_fallbacks<S: ::std::hash::BuildHasher>(
    merged: &mut toml::Value,
    sources: &mut FieldSources,
    env_vars: &HashMap<String, String, S>,
) -> usize {
    let mut count: usize = 0;

    for mapping in ENV_MAPPINGS {
        if sources
            .get(mapping.field_path)
            .is_some_and(|layer| *layer != ConfigLayer::Defaults)
        {
            continue;
        }

        let Some(raw) = env_vars.get(mapping.var_name) else {
            continue;
        };

        let Some(value) = convert(raw, mapping.kind) else {
            warn!(
                var = mapping.var_name,
                value = %raw,
                "ignoring env var with invalid value"
            );
            continue;
        };

        debug!(
            var = mapping.var_name,
            field = mapping.field_path,
            "applying env var fallback"
        );
        set_field(merged, mapping.field_path, value);
        sources.insert(mapping.field_path.to_owned(), ConfigLayer::Environment);
        count = count.saturating_add(1);
    }

    count
}

fn convert(raw: &str, kind: ValueKind) -> Option<toml::Value> {
    match kind {
        ValueKind::Str => Some(toml::Value::String(raw.to_owned())),
        ValueKind::Bool => match raw.trim().to_ascii_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(toml::Value::Boolean(true)),
            "0" | "false" | "no" | "off" => Some(toml::Value::Boolean(false)),
            _ => None,
        },
        ValueKind::Integer => raw.trim().parse::<i64>().ok().map(toml::Value::Integer),
    }
}

/// Set a dotted field path, creating intermediate tables as needed.
fn set_field(root: &mut toml::Value, path: &str, value: toml::Value) {
    let mut current = root;
    let mut parts = path.split('.').peekable();
    while let Some(part) = parts.next() {
        let Some(table) = current.as_table_mut() else {
            return;
        };
        if parts.peek().is_none() {
            table.insert(part.to_owned(), value);
            return;
        }
        current = table
            .entry(part.to_owned())
            .or_insert_with(|| toml::Value::Table(toml::map::Map::new()));
    }
}
