//! Source-annotated display for `config show`.

use std::fmt::{self, Write as _};

use crate::merge::FieldSources;
use crate::types::Config;

/// A resolved configuration together with source annotations.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The final merged configuration.
    pub config: Config,
    /// Dotted field path → which layer set the value.
    pub field_sources: FieldSources,
    /// Config file paths that were loaded (in precedence order).
    pub loaded_files: Vec<String>,
}

/// Output format for `config show`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShowFormat {
    /// TOML with inline comments showing source.
    Toml,
    /// JSON (for programmatic consumption).
    Json,
}

impl ResolvedConfig {
    /// Format the resolved config.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn show(&self, format: ShowFormat) -> Result<String, fmt::Error> {
        match format {
            ShowFormat::Toml => self.show_toml(),
            ShowFormat::Json => serde_json::to_string_pretty(&self.config).map_err(|_| fmt::Error),
        }
    }

    fn show_toml(&self) -> Result<String, fmt::Error> {
        let toml_str = toml::to_string_pretty(&self.config).map_err(|_| fmt::Error)?;

        let mut output = String::new();
        output.push_str("# Resolved caseplay configuration\n");
        output.push_str("# Source annotations: [defaults] [user] [workspace] [env]\n");

        if !self.loaded_files.is_empty() {
            output.push_str("#\n# Loaded files (in precedence order):\n");
            for (i, path) in self.loaded_files.iter().enumerate() {
                writeln!(output, "#   {}. {path}", i.saturating_add(1))?;
            }
        }
        output.push('\n');

        let mut section = String::new();
        for line in toml_str.lines() {
            let trimmed = line.trim();
            if let Some(name) = trimmed
                .strip_prefix('[')
                .and_then(|rest| rest.strip_suffix(']'))
            {
                section = name.to_owned();
            }

            let annotation = trimmed
                .split_once('=')
                .map(|(key, _)| format!("{section}.{}", key.trim()))
                .and_then(|path| self.field_sources.get(&path));

            match annotation {
                Some(layer) => writeln!(output, "{line}  # [{layer}]")?,
                None => writeln!(output, "{line}")?,
            }
        }

        Ok(output)
    }
}
