//! Logger configuration

mod presets;

use serde::{Deserialize, Serialize};

/// Output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    /// Multi-line, human oriented.
    Pretty,
    /// Single line per event.
    #[default]
    Compact,
    /// One JSON object per event.
    Json,
}

impl Format {
    /// Parses a format name; unknown names fall back to [`Format::Compact`].
    #[must_use]
    pub fn parse(name: &str) -> Self {
        match name.to_lowercase().as_str() {
            "pretty" => Format::Pretty,
            "json" => Format::Json,
            _ => Format::Compact,
        }
    }
}

/// What each event line shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub colors: bool,
    pub time: bool,
    /// File and line of the call site.
    pub source: bool,
    pub target: bool,
    /// JSON only: lift event fields to the top level.
    pub flatten: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            colors: true,
            time: true,
            source: false,
            target: true,
            flatten: false,
        }
    }
}

/// Logger configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// `EnvFilter` directives, e.g. `"info,vigil_validator=debug"`.
    pub level: String,
    pub format: Format,
    pub display: DisplayConfig,
    /// Keep a [`ReloadHandle`](crate::ReloadHandle) to change `level` at runtime.
    pub reloadable: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: Format::default(),
            display: DisplayConfig::default(),
            reloadable: false,
        }
    }
}
