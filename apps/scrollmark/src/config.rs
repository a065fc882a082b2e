//! `scrollmark.toml` loading.

use anyhow::Context;
use serde::Deserialize;
use sm_layout::LayoutConfig;
use sm_page::PageConfig;
use sm_tracker::TrackerConfig;
use std::path::Path;

pub const DEFAULT_CONFIG_FILE: &str = "scrollmark.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub page: PageConfig,
    pub viewport: ViewportSettings,
    pub tracker: TrackerSettings,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ViewportSettings {
    pub width: f64,
    pub height: f64,
    pub line_height: f64,
    pub char_width: f64,
    /// Distance scrolled between two observation steps when tracking.
    pub scroll_step: f64,
}

impl Default for ViewportSettings {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            width: layout.viewport_width,
            height: layout.viewport_height,
            line_height: layout.line_height,
            char_width: layout.char_width,
            scroll_step: 40.0,
        }
    }
}

impl ViewportSettings {
    pub fn layout_config(&self) -> LayoutConfig {
        LayoutConfig {
            viewport_width: self.width,
            viewport_height: self.height,
            line_height: self.line_height,
            char_width: self.char_width,
        }
    }
}

/// Selectors only. The visibility threshold is fixed at
/// [`sm_tracker::VISIBILITY_THRESHOLD`].
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct TrackerSettings {
    pub card_selector: String,
    pub toc_selector: String,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self::from(TrackerConfig::default())
    }
}

impl From<TrackerConfig> for TrackerSettings {
    fn from(config: TrackerConfig) -> Self {
        Self {
            card_selector: config.card_selector,
            toc_selector: config.toc_entry_selector,
        }
    }
}

impl TrackerSettings {
    pub fn tracker_config(&self) -> TrackerConfig {
        TrackerConfig {
            card_selector: self.card_selector.clone(),
            toc_entry_selector: self.toc_selector.clone(),
        }
    }
}

impl AppConfig {
    /// Loads `path`, or the defaults when it does not exist. A file that
    /// exists but does not parse is an error.
    pub fn load_or_default(path: &Path) -> anyhow::Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => Self::parse(&content)
                .with_context(|| format!("invalid config file {}", path.display())),
            Err(error) if error.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            Err(error) => {
                Err(error).with_context(|| format!("failed to read config file {}", path.display()))
            }
        }
    }

    /// Loads `path`, which must exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file {}", path.display()))?;
        Self::parse(&content).with_context(|| format!("invalid config file {}", path.display()))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        Ok(toml::from_str(content)?)
    }
}
