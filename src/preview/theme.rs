//! Theme synchronization with the host's dark-mode preference.

use serde::{Deserialize, Serialize};

use crate::config::ThemeConfig;

/// Visual appearance of the editing surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeId {
    Light,
    Dark,
}

impl ThemeId {
    /// Map the "prefers dark" signal to a theme.
    #[inline]
    pub const fn for_preference(prefers_dark: bool) -> Self {
        if prefers_dark { Self::Dark } else { Self::Light }
    }
}

/// Maps preference events to editor theme identifiers.
///
/// Stateless apart from the two configured names; never looks at editor
/// content.
#[derive(Debug, Clone)]
pub struct ThemeSync {
    light: String,
    dark: String,
}

impl ThemeSync {
    pub fn new(config: &ThemeConfig) -> Self {
        Self {
            light: config.light.clone(),
            dark: config.dark.clone(),
        }
    }

    /// Theme applied when a session starts.
    pub fn initial_theme(&self, prefers_dark: bool) -> ThemeId {
        ThemeId::for_preference(prefers_dark)
    }

    /// Theme applied after a preference-change event.
    pub fn on_preference_changed(&self, prefers_dark: bool) -> ThemeId {
        ThemeId::for_preference(prefers_dark)
    }

    /// Identifier the editor surface understands.
    pub fn name(&self, theme: ThemeId) -> &str {
        match theme {
            ThemeId::Light => &self.light,
            ThemeId::Dark => &self.dark,
        }
    }
}

impl Default for ThemeSync {
    fn default() -> Self {
        Self::new(&ThemeConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preference_mapping() {
        let sync = ThemeSync::default();
        assert_eq!(sync.initial_theme(true), ThemeId::Dark);
        assert_eq!(sync.initial_theme(false), ThemeId::Light);
        assert_eq!(sync.on_preference_changed(true), ThemeId::Dark);
        assert_eq!(sync.on_preference_changed(false), ThemeId::Light);
    }

    #[test]
    fn test_default_names() {
        let sync = ThemeSync::default();
        assert_eq!(sync.name(ThemeId::Light), "vs");
        assert_eq!(sync.name(ThemeId::Dark), "vs-dark");
    }

    #[test]
    fn test_configured_names() {
        let sync = ThemeSync::new(&ThemeConfig {
            light: "solarized-light".into(),
            dark: "solarized-dark".into(),
        });
        let theme = sync.on_preference_changed(true);
        assert_eq!(sync.name(theme), "solarized-dark");
    }
}
