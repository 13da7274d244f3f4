use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::data::filter::TextMatchMode;
use crate::data::pagination::DEFAULT_LINK_RADIUS;
use crate::data::schema::{ViewConfig, DEFAULT_PAGE_SIZE};
use crate::data::value::Collation;
use crate::error::ViewError;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub behavior: BehaviorConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for sort arrows and the paginator
    pub use_glyphs: bool,

    /// Colour headers and status messages
    pub color: bool,

    /// Show a row number column
    pub show_row_numbers: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BehaviorConfig {
    /// Rows per page when a view opens
    pub default_page_size: usize,

    /// Page links shown either side of the current page
    pub page_link_radius: usize,

    /// How the search box matches: substring, fuzzy or regex
    pub search_mode: TextMatchMode,

    /// Sort text columns ignoring case
    pub case_insensitive_sort: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            color: true,
            show_row_numbers: false,
        }
    }
}

impl Default for BehaviorConfig {
    fn default() -> Self {
        Self {
            default_page_size: DEFAULT_PAGE_SIZE,
            page_link_radius: DEFAULT_LINK_RADIUS,
            search_mode: TextMatchMode::Substring,
            case_insensitive_sort: true,
        }
    }
}

impl BehaviorConfig {
    /// Apply these settings to a view configuration
    pub fn apply<R>(&self, config: ViewConfig<R>) -> Result<ViewConfig<R>, ViewError> {
        let collation = if self.case_insensitive_sort {
            Collation::CaseInsensitive
        } else {
            Collation::CaseSensitive
        };
        config
            .with_text_collation(collation)
            .with_search_mode(self.search_mode)
            .with_page_size(self.default_page_size)
    }
}

impl Config {
    /// Load config from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            // Create default config if it doesn't exist
            let default_config = Self::default();
            default_config.save()?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    /// Load config from an explicit path
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config {}", path.display()))?;

        debug!(target: "config", "Loaded config from {}", path.display());
        Ok(config)
    }

    /// Save config to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::get_config_path()?;
        self.save_to(config_path)
    }

    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config {}", path.display()))?;

        Ok(())
    }

    /// Get the default config file path
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("tripdesk").join("config.toml"))
    }

    /// Create a default config file with comments
    pub fn create_default_with_comments() -> String {
        r#"# Tripdesk Configuration File
# Location: ~/.config/tripdesk/config.toml (Linux)
#           ~/Library/Application Support/tripdesk/config.toml (macOS)
#           %APPDATA%\tripdesk\config.toml (Windows)

[display]
# Use Unicode glyphs for sort arrows and the paginator
# Set to false for ASCII-only output
use_glyphs = true

# Colour table headers and status messages
color = true

# Show a row number column in tables
show_row_numbers = false

[behavior]
# Rows per page when a view opens
default_page_size = 10

# Page links shown either side of the current page in the paginator
page_link_radius = 1

# Search matching: "substring", "fuzzy" or "regex" (always case-insensitive)
search_mode = "substring"

# Sort text columns ignoring case ("alice" before "Bob")
case_insensitive_sort = true
"#
        .to_string()
    }
}
