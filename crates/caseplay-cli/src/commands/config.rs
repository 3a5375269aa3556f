//! CLI handlers for the `caseplay config` subcommand.

use anyhow::Result;
use caseplay_config::{ResolvedConfig, ShowFormat};

use crate::theme::Theme;

/// Show the resolved configuration with source annotations.
pub(crate) fn show_config(resolved: &ResolvedConfig, format: &str) -> Result<()> {
    let show_format = match format {
        "json" => ShowFormat::Json,
        _ => ShowFormat::Toml,
    };

    let output = resolved
        .show(show_format)
        .map_err(|e| anyhow::anyhow!("failed to format config: {e}"))?;

    println!("{output}");
    Ok(())
}

/// Report that the configuration is valid and which files were loaded.
#[allow(clippy::unnecessary_wraps)]
pub(crate) fn validate_config(resolved: &ResolvedConfig) -> Result<()> {
    println!("{}", Theme::success("Configuration is valid."));
    if !resolved.loaded_files.is_empty() {
        println!("\nLoaded files:");
        for path in &resolved.loaded_files {
            println!("  - {path}");
        }
    }
    Ok(())
}
