//! `[theme]` section configuration.
//!
//! Editor theme identifiers handed to the browser for each color preference.
//!
//! ```toml
//! [theme]
//! light = "vs"
//! dark = "vs-dark"
//! ```

use serde::{Deserialize, Serialize};

use crate::config::{ConfigDiagnostics, FieldPath};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeConfig {
    pub light: String,
    pub dark: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            light: "vs".into(),
            dark: "vs-dark".into(),
        }
    }
}

impl ThemeConfig {
    const LIGHT: FieldPath = FieldPath::new("theme.light");
    const DARK: FieldPath = FieldPath::new("theme.dark");

    pub fn validate(&self, diag: &mut ConfigDiagnostics) {
        if self.light.trim().is_empty() {
            diag.error(Self::LIGHT, "theme id must not be empty");
        }
        if self.dark.trim().is_empty() {
            diag.error(Self::DARK, "theme id must not be empty");
        }
        if !self.light.is_empty() && self.light == self.dark {
            diag.error_with_hint(
                Self::DARK,
                format!("same theme `{}` for light and dark", self.dark),
                "the editor would never change appearance",
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::test_parse_config;

    #[test]
    fn test_theme_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.theme.light, "vs");
        assert_eq!(config.theme.dark, "vs-dark");
    }

    #[test]
    fn test_theme_override() {
        let config = test_parse_config("[theme]\ndark = \"hc-black\"");
        assert_eq!(config.theme.light, "vs");
        assert_eq!(config.theme.dark, "hc-black");
    }

    #[test]
    fn test_theme_validation() {
        let mut diag = ConfigDiagnostics::new();
        ThemeConfig::default().validate(&mut diag);
        assert!(diag.is_empty());

        let mut diag = ConfigDiagnostics::new();
        ThemeConfig {
            light: String::new(),
            dark: "x".into(),
        }
        .validate(&mut diag);
        assert_eq!(diag.len(), 1);

        let mut diag = ConfigDiagnostics::new();
        ThemeConfig {
            light: "x".into(),
            dark: "x".into(),
        }
        .validate(&mut diag);
        assert_eq!(diag.len(), 1);
    }
}
