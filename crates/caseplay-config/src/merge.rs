use std::collections::BTreeMap;
use std::fmt;

/// Which configuration layer set a value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigLayer {
    /// Embedded `defaults.toml`.
    Defaults,
    /// User-level config file.
    User,
    /// Workspace or explicitly named config file.
    Workspace,
    /// `CASEPLAY_*` environment variable fallback.
    Environment,
}

impl fmt::Display for ConfigLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Defaults => f.write_str("defaults"),
            Self::User => f.write_str("user"),
            Self::Workspace => f.write_str("workspace"),
            Self::Environment => f.write_str("env"),
        }
    }
}

/// Dotted field path → layer that last set it.
pub type FieldSources = BTreeMap<String, ConfigLayer>;

/// Deep-merge `overlay` into `base`, recording which layer set each leaf
/// field.
///
/// - Tables merge recursively per-field.
/// - Scalars and arrays from the overlay **replace** the base value.
pub fn deep_merge_tracking(
    base: &mut toml::Value,
    overlay: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    match (base, overlay) {
        (toml::Value::Table(base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let path = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{prefix}.{key}")
                };

                if let Some(base_val) = base_table.get_mut(key) {
                    if overlay_val.is_table() {
                        deep_merge_tracking(base_val, overlay_val, &path, layer, sources);
                    } else {
                        *base_val = overlay_val.clone();
                        sources.insert(path, layer.clone());
                    }
                } else {
                    base_table.insert(key.clone(), overlay_val.clone());
                    record_all_leaves(overlay_val, &path, layer, sources);
                }
            }
        },
        (base, overlay) => {
            *base = overlay.clone();
            sources.insert(prefix.to_owned(), layer.clone());
        },
    }
}

/// Walk a value tree and record all leaf paths with their source layer.
pub fn record_all_leaves(
    val: &toml::Value,
    prefix: &str,
    layer: &ConfigLayer,
    sources: &mut FieldSources,
) {
    if let toml::Value::Table(table) = val {
        for (key, child) in table {
            let path = if prefix.is_empty() {
                key.clone()
            } else {
                format!("{prefix}.{key}")
            };
            record_all_leaves(child, &path, layer, sources);
        }
    } else {
        sources.insert(prefix.to_owned(), layer.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> toml::Value {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn test_scalar_overlay_replaces() {
        let mut base = parse("[autoplay]\nenabled = true\nperiod_secs = 16\n");
        let overlay = parse("[autoplay]\nperiod_secs = 4\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        assert_eq!(base["autoplay"]["period_secs"].as_integer(), Some(4));
        assert_eq!(base["autoplay"]["enabled"].as_bool(), Some(true));
        assert_eq!(sources.get("autoplay.period_secs"), Some(&ConfigLayer::User));
        assert!(!sources.contains_key("autoplay.enabled"));
    }

    #[test]
    fn test_new_table_records_all_leaves() {
        let mut base = parse("[logging]\nlevel = \"info\"\n");
        let overlay = parse("[data]\nreference_file = \"ref.toml\"\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(
            &mut base,
            &overlay,
            "",
            &ConfigLayer::Workspace,
            &mut sources,
        );

        assert_eq!(base["data"]["reference_file"].as_str(), Some("ref.toml"));
        assert_eq!(
            sources.get("data.reference_file"),
            Some(&ConfigLayer::Workspace)
        );
    }

    #[test]
    fn test_arrays_replace_rather_than_append() {
        let mut base = parse("[logging]\ndirectives = [\"a=debug\"]\n");
        let overlay = parse("[logging]\ndirectives = [\"b=trace\"]\n");
        let mut sources = FieldSources::new();

        deep_merge_tracking(&mut base, &overlay, "", &ConfigLayer::User, &mut sources);

        let directives = base["logging"]["directives"].as_array().unwrap();
        assert_eq!(directives.len(), 1);
        assert_eq!(directives[0].as_str(), Some("b=trace"));
    }
}
