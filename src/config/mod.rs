//! Preview configuration from `preview.toml`.
//!
//! # Module Structure
//!
//! ```text
//! config/
//! ├── section/       # Configuration section definitions
//! │   ├── compiler   # [compiler]
//! │   ├── serve      # [serve]
//! │   └── theme      # [theme]
//! ├── types/         # Utility types
//! │   ├── error      # ConfigError, ConfigDiagnostics
//! │   └── field      # FieldPath
//! └── mod.rs         # PreviewConfig (this file)
//! ```
//!
//! The file is optional. When none is found searching upward from the
//! working directory, defaults apply.

pub mod section;
pub mod types;
mod util;

use util::find_config_file;

pub use section::{BackendKind, CompilerConfig, ServeConfig, ThemeConfig};
pub use types::{ConfigDiagnostics, ConfigError, FieldPath};

use crate::{
    cli::{Cli, Commands},
    debug, log,
};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing preview.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PreviewConfig {
    /// Absolute path to the loaded config file, if any (internal use only)
    #[serde(skip)]
    pub config_path: Option<PathBuf>,

    /// Compiler backend selection
    #[serde(default)]
    pub compiler: CompilerConfig,

    /// Playground server settings
    #[serde(default)]
    pub serve: ServeConfig,

    /// Editor theme ids
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl PreviewConfig {
    /// Load configuration for the invoked command.
    ///
    /// Searches upward from cwd for `cli.config`, then applies CLI overrides
    /// and validates the result.
    pub fn load(cli: &Cli) -> Result<Self> {
        let cwd = std::env::current_dir().context("Failed to get current working directory")?;

        let mut config = match find_config_file(&cwd, &cli.config) {
            Some(path) => {
                debug!("config"; "loading {}", path.display());
                let mut config = Self::from_path(&path)?;
                config.config_path = Some(path);
                config
            }
            None => {
                debug!("config"; "no {} found, using defaults", cli.config.display());
                Self::default()
            }
        };

        config.apply_command_options(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;

        if !ignored.is_empty() {
            Self::print_unknown_fields_warning(&ignored, path);
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Print warning about unknown fields.
    fn print_unknown_fields_warning(fields: &[String], path: &Path) {
        let display_path = path
            .file_name()
            .map(|n| n.to_string_lossy())
            .unwrap_or_else(|| path.to_string_lossy());
        log!("warning"; "unknown fields in {}, ignoring:", display_path);
        for field in fields {
            eprintln!("- {}", field);
        }
    }

    // ========================================================================
    // cli configuration updates
    // ========================================================================

    /// Apply command-specific configuration options.
    fn apply_command_options(&mut self, cli: &Cli) {
        Self::update_option(&mut self.compiler.backend, cli.backend.as_ref());

        match &cli.command {
            Commands::Serve { interface, port } => {
                Self::update_option(&mut self.serve.interface, interface.as_ref());
                Self::update_option(&mut self.serve.port, port.as_ref());
            }
            Commands::Watch { .. } | Commands::Build { .. } => {}
        }
    }

    /// Update config option if CLI value is provided.
    fn update_option<T: Clone>(config_option: &mut T, cli_option: Option<&T>) {
        if let Some(option) = cli_option {
            *config_option = option.clone();
        }
    }

    // ========================================================================
    // validation
    // ========================================================================

    /// Validate all sections, collecting every error before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        self.compiler.validate(&mut diag);
        self.serve.validate(&mut diag);
        self.theme.validate(&mut diag);

        diag.into_result().map_err(ConfigError::Diagnostics)
    }
}

// ============================================================================
// Test Helpers (available to all modules via `use crate::config::test_*`)
// ============================================================================

/// Parse config, panicking on unknown fields (to catch config typos in tests).
#[cfg(test)]
pub fn test_parse_config(content: &str) -> PreviewConfig {
    let (parsed, ignored) = PreviewConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

// ============================================================================
// tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;
    use tempfile::TempDir;

    fn cli(args: &[&str]) -> Cli {
        Cli::try_parse_from(std::iter::once("em-preview").chain(args.iter().copied())).unwrap()
    }

    #[test]
    fn test_from_str_invalid_toml() {
        let result: Result<PreviewConfig, _> = toml::from_str("[compiler\nbackend = \"emblem\"");
        assert!(result.is_err());
    }

    #[test]
    fn test_preview_config_default() {
        let config = PreviewConfig::default();

        assert!(config.config_path.is_none());
        assert_eq!(config.compiler.backend, BackendKind::Emblem);
        assert_eq!(config.serve.port, 5277);
        assert_eq!(config.theme.dark, "vs-dark");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_unknown_fields_detected() {
        let content = "[theme]\nlight = \"vs\"\n[unknown_section]\nfield = \"value\"";
        let (config, ignored) = PreviewConfig::parse_with_ignored(content).unwrap();

        assert_eq!(config.theme.light, "vs");
        assert!(ignored.iter().any(|f| f.contains("unknown_section")));
    }

    #[test]
    fn test_from_path() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preview.toml");
        fs::write(&path, "[compiler]\nbackend = \"markdown\"\n").unwrap();

        let config = PreviewConfig::from_path(&path).unwrap();
        assert_eq!(config.compiler.backend, BackendKind::Markdown);
    }

    #[test]
    fn test_from_path_missing() {
        let dir = TempDir::new().unwrap();
        let err = PreviewConfig::from_path(&dir.path().join("nope.toml")).unwrap_err();
        assert!(err.to_string().contains("IO error"));
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = test_parse_config("[serve]\nport = 8000");
        config.apply_command_options(&cli(&["--backend", "markdown", "serve", "--port", "9000"]));

        assert_eq!(config.compiler.backend, BackendKind::Markdown);
        assert_eq!(config.serve.port, 9000);
        assert_eq!(config.serve.ws_port, 35729);
    }

    #[test]
    fn test_cli_without_overrides_keeps_config() {
        let mut config = test_parse_config("[compiler]\nbackend = \"markdown\"");
        config.apply_command_options(&cli(&["build", "notes.md"]));
        assert_eq!(config.compiler.backend, BackendKind::Markdown);
    }

    #[test]
    fn test_validate_collects_sections() {
        let config = test_parse_config(
            "[compiler]\nbackend = \"command\"\n[theme]\nlight = \"a\"\ndark = \"a\"",
        );
        match config.validate() {
            Err(ConfigError::Diagnostics(diag)) => assert_eq!(diag.len(), 2),
            other => panic!("expected diagnostics, got {other:?}"),
        }
    }
}
