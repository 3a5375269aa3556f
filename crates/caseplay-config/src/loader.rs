//! Config file discovery and layered loading.
//!
//! Implements the `Config::load()` algorithm:
//! 1. Parse `defaults.toml` → base
//! 2. Merge `~/.caseplay/config.toml` (user)
//! 3. Merge the workspace file (explicit path, or `./caseplay.toml`)
//! 4. Apply env var fallbacks for fields no file set
//! 5. Deserialize merged tree → `Config`
//! 6. Validate
//! 7. Return `ResolvedConfig`

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::env::{apply_env_fallbacks, collect_env_vars};
use crate::error::{ConfigError, ConfigResult};
use crate::merge::{ConfigLayer, FieldSources, deep_merge_tracking, record_all_leaves};
use crate::show::ResolvedConfig;
use crate::types::Config;
use crate::validate;

/// Embedded default configuration.
const DEFAULTS_TOML: &str = include_str!("defaults.toml");

/// Workspace config file looked up in the current directory.
const WORKSPACE_FILE: &str = "caseplay.toml";

/// Maximum allowed config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1_048_576;

/// Load the configuration with layered file precedence.
///
/// `workspace_file` names the highest-priority file. An explicitly named
/// file must exist; when `None`, `./caseplay.toml` is merged if present.
///
/// `home_override` replaces the user config directory (the directory that
/// contains `config.toml`), bypassing `~/.caseplay` and `CASEPLAY_HOME`.
///
/// # Errors
///
/// Returns a [`ConfigError`] if any config file is malformed, or if the
/// final merged configuration fails validation.
pub fn load(
    workspace_file: Option<&Path>,
    home_override: Option<&Path>,
) -> ConfigResult<ResolvedConfig> {
    let env_vars = collect_env_vars();

    // 1. Parse embedded defaults.
    let mut merged: toml::Value =
        toml::from_str(DEFAULTS_TOML).map_err(|e| ConfigError::ParseError {
            path: "<embedded defaults>".to_owned(),
            source: e,
        })?;

    let mut field_sources = FieldSources::new();
    let mut loaded_files = Vec::new();
    record_all_leaves(&merged, "", &ConfigLayer::Defaults, &mut field_sources);

    // 2. User config.
    let user_dir = match home_override {
        Some(dir) => Some(dir.to_path_buf()),
        None => user_config_dir(env_vars.get("CASEPLAY_HOME").map(String::as_str)),
    };
    if let Some(dir) = user_dir {
        let user_path = dir.join("config.toml");
        if let Some(overlay) = try_load_file(&user_path)? {
            deep_merge_tracking(
                &mut merged,
                &overlay,
                "",
                &ConfigLayer::User,
                &mut field_sources,
            );
            loaded_files.push(user_path.display().to_string());
            info!(path = %user_path.display(), "loaded user config");
        }
    }

    // 3. Workspace config.
    let workspace_overlay = match workspace_file {
        Some(path) => Some((read_toml(path)?, path.to_path_buf())),
        None => {
            let path = PathBuf::from(WORKSPACE_FILE);
            try_load_file(&path)?.map(|overlay| (overlay, path))
        },
    };
    if let Some((overlay, path)) = workspace_overlay {
        deep_merge_tracking(
            &mut merged,
            &overlay,
            "",
            &ConfigLayer::Workspace,
            &mut field_sources,
        );
        loaded_files.push(path.display().to_string());
        info!(path = %path.display(), "loaded workspace config");
    }

    // 4. Apply env var fallbacks for unset fields.
    let env_count = apply_env_fallbacks(&mut merged, &mut field_sources, &env_vars);
    if env_count > 0 {
        debug!(count = env_count, "applied environment variable fallbacks");
    }

    // 5. Deserialize.
    let config: Config =
        merged
            .try_into()
            .map_err(|e: toml::de::Error| ConfigError::ParseError {
                path: "<merged config>".to_owned(),
                source: e,
            })?;

    // 6. Validate.
    validate::validate(&config)?;

    Ok(ResolvedConfig {
        config,
        field_sources,
        loaded_files,
    })
}

/// Load a config from a specific file path (no layering).
///
/// # Errors
///
/// Returns a [`ConfigError`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> ConfigResult<Config> {
    let value = read_toml(path)?;
    let config: Config = value
        .try_into()
        .map_err(|e: toml::de::Error| ConfigError::ParseError {
            path: path.display().to_string(),
            source: e,
        })?;
    validate::validate(&config)?;
    Ok(config)
}

/// Resolve the user config directory.
///
/// `CASEPLAY_HOME` wins when it names an existing directory; otherwise
/// `~/.caseplay` is used.
fn user_config_dir(caseplay_home: Option<&str>) -> Option<PathBuf> {
    if let Some(home) = caseplay_home {
        let path = PathBuf::from(home);
        if path.is_dir() {
            return Some(path);
        }
        tracing::warn!(path = home, "CASEPLAY_HOME is not a directory; ignoring");
    }
    directories::BaseDirs::new().map(|dirs| dirs.home_dir().join(".caseplay"))
}

/// Read and parse a file that must exist.
fn read_toml(path: &Path) -> ConfigResult<toml::Value> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
        path: path.display().to_string(),
        source: e,
    })?;
    parse_checked(&content, path)
}

/// Try to load a file, returning `None` if the file doesn't exist.
fn try_load_file(path: &Path) -> ConfigResult<Option<toml::Value>> {
    let content = match std::fs::read_to_string(path) {
        Ok(c) => c,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "config file not found, skipping");
            return Ok(None);
        },
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.display().to_string(),
                source: e,
            });
        },
    };
    parse_checked(&content, path).map(Some)
}

fn parse_checked(content: &str, path: &Path) -> ConfigResult<toml::Value> {
    if content.len() as u64 > MAX_CONFIG_FILE_SIZE {
        return Err(ConfigError::ValidationError {
            field: path.display().to_string(),
            message: format!(
                "config file is {} bytes, exceeding the {} byte limit",
                content.len(),
                MAX_CONFIG_FILE_SIZE
            ),
        });
    }

    toml::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.display().to_string(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_defaults_parse() {
        let val: toml::Value = toml::from_str(DEFAULTS_TOML).unwrap();
        assert!(val.get("sequencer").is_some());
        assert!(val.get("autoplay").is_some());
    }

    #[test]
    fn test_defaults_deserialize_to_default_config() {
        let config: Config = toml::from_str(DEFAULTS_TOML).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_with_empty_home() {
        let home = tempfile::tempdir().unwrap();
        let resolved = load(None, Some(home.path())).unwrap();
        assert_eq!(resolved.config.sequencer.step_delay_ms, 700);
        assert_eq!(resolved.config.autoplay.period_secs, 16);
        assert_eq!(
            resolved.field_sources.get("autoplay.period_secs"),
            Some(&ConfigLayer::Defaults)
        );
    }

    #[test]
    fn test_workspace_overrides_user() {
        let home = tempfile::tempdir().unwrap();
        std::fs::write(
            home.path().join("config.toml"),
            "[autoplay]\nperiod_secs = 8\nenabled = false\n",
        )
        .unwrap();

        let mut workspace = tempfile::NamedTempFile::new().unwrap();
        writeln!(workspace, "[autoplay]\nperiod_secs = 4\n").unwrap();

        let resolved = load(Some(workspace.path()), Some(home.path())).unwrap();

        assert_eq!(resolved.config.autoplay.period_secs, 4);
        assert!(!resolved.config.autoplay.enabled);
        assert_eq!(resolved.loaded_files.len(), 2);
        assert_eq!(
            resolved.field_sources.get("autoplay.period_secs"),
            Some(&ConfigLayer::Workspace)
        );
        assert_eq!(
            resolved.field_sources.get("autoplay.enabled"),
            Some(&ConfigLayer::User)
        );
    }

    #[test]
    fn test_explicit_workspace_file_must_exist() {
        let home = tempfile::tempdir().unwrap();
        let err = load(Some(Path::new("/nonexistent/caseplay.toml")), Some(home.path()))
            .unwrap_err();
        assert!(matches!(err, ConfigError::ReadError { .. }));
    }

    #[test]
    fn test_invalid_merged_config_rejected() {
        let home = tempfile::tempdir().unwrap();
        let mut workspace = tempfile::NamedTempFile::new().unwrap();
        writeln!(workspace, "[sequencer]\nclock_mode = \"never\"\n").unwrap();

        let err = load(Some(workspace.path()), Some(home.path())).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }

    #[test]
    fn test_load_file_partial() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sequencer]\nstep_delay_ms = 10\n").unwrap();

        let config = load_file(file.path()).unwrap();
        assert_eq!(config.sequencer.step_delay_ms, 10);
        assert_eq!(config.sequencer.final_delay_ms, 500);
    }

    #[test]
    fn test_load_file_nonexistent() {
        let result = load_file(Path::new("/nonexistent/config.toml"));
        assert!(matches!(result, Err(ConfigError::ReadError { .. })));
    }

    #[test]
    fn test_try_load_file_missing() {
        let result = try_load_file(Path::new("/nonexistent/config.toml")).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_oversized_config_rejected() {
        let big = "# padding\n".repeat(110_000);
        let err = parse_checked(&big, Path::new("big.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::ValidationError { .. }));
    }
}
