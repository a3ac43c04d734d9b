//! Map palette loaded from TOML
//!
//! A theme maps named map parts (background, graticule, legend, popup)
//! to CSS colors. Every token is exposed to the rendered page as a CSS custom
//! property, so a theme file only needs to list the colors it changes.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when loading or parsing themes
#[derive(Error, Debug)]
pub enum ThemeError {
    #[error("Failed to read theme file: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Failed to parse theme TOML: {0}")]
    ParseError(#[from] toml::de::Error),
}

/// Named colors for the map chrome
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub name: Option<String>,
    /// Token name -> CSS color, sorted for stable output
    pub colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlTheme {
    metadata: Option<TomlMetadata>,
    #[serde(default)]
    colors: BTreeMap<String, String>,
}

#[derive(Deserialize)]
struct TomlMetadata {
    name: Option<String>,
}

/// Dark map style, close to the hosted `dark-v10` look
const DEFAULT_THEME: &str = r##"
[metadata]
name = "dark"

[colors]
background = "#191a1a"
ocean = "#191a1a"
graticule = "#2c2e2e"
equator = "#3a3c3c"
legend-background = "#ffffff"
legend-text = "#333333"
popup-background = "#ffffff"
popup-text = "#333333"
marker-outline = "#000000"
"##;

impl Theme {
    pub fn from_file(path: &Path) -> Result<Self, ThemeError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_str(&content)
    }

    /// Parse a theme, filling unset tokens from the default theme
    pub fn from_str(content: &str) -> Result<Self, ThemeError> {
        let parsed: TomlTheme = toml::from_str(content)?;
        let mut theme = Self::default();
        theme.name = parsed.metadata.and_then(|m| m.name).or(theme.name);
        theme.colors.extend(parsed.colors);
        Ok(theme)
    }

    pub fn resolve(&self, token: &str) -> Option<&str> {
        self.colors.get(token).map(String::as_str)
    }

    /// Resolve a token, falling back to a mid gray
    pub fn color(&self, token: &str) -> &str {
        self.resolve(token).unwrap_or("#808080")
    }

    /// `:root { --token: value; ... }` block for the page stylesheet
    pub fn css_variables(&self) -> String {
        let mut css = String::from(":root {\n");
        for (token, value) in &self.colors {
            css.push_str(&format!("      --{}: {};\n", token, value));
        }
        css.push_str("    }");
        css
    }
}

impl Default for Theme {
    fn default() -> Self {
        let parsed: TomlTheme =
            toml::from_str(DEFAULT_THEME).expect("Default theme should be valid TOML");
        Self {
            name: parsed.metadata.and_then(|m| m.name),
            colors: parsed.colors,
        }
    }
}
