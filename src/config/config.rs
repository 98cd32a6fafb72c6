use crate::data::business::{clamp_criteria_value, DEFAULT_MAX_RESULTS, DEFAULT_RADIUS_KM};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Used when neither the command line, the environment nor the config
/// file name an API
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Environment variable that overrides the configured API base URL
pub const API_URL_ENV: &str = "LEAD_SCOUT_API_URL";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api: ApiConfig,
    pub search: SearchConfig,
    pub display: DisplayConfig,
    pub export: ExportConfig,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Base URL of the business search API
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Radius the form starts with, in kilometres
    pub default_radius_km: u32,

    /// Result cap the form starts with
    pub default_max_results: u32,

    /// Industries offered as quick-select presets
    pub popular_industries: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Use Unicode glyphs for icons
    pub use_glyphs: bool,

    /// Show row numbers in the results table
    pub show_row_numbers: bool,

    pub icons: IconConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct IconConfig {
    pub selected: String,
    pub unselected: String,
    pub call: String,
    pub email: String,
    pub rating: String,
    pub error: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory CSV exports are written to (current directory if unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            default_radius_km: DEFAULT_RADIUS_KM,
            default_max_results: DEFAULT_MAX_RESULTS,
            popular_industries: [
                "Restaurants",
                "Insurance",
                "Real Estate",
                "Plumbers",
                "Dentists",
                "Lawyers",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            use_glyphs: true,
            show_row_numbers: false,
            icons: IconConfig::default(),
        }
    }
}

impl Default for IconConfig {
    fn default() -> Self {
        Self {
            selected: "☑".to_string(),
            unselected: "☐".to_string(),
            call: "📞".to_string(),
            email: "✉".to_string(),
            rating: "⭐".to_string(),
            error: "❌".to_string(),
        }
    }
}

impl IconConfig {
    /// ASCII alternatives for terminals without glyph support
    pub fn simple() -> Self {
        Self {
            selected: "[x]".to_string(),
            unselected: "[ ]".to_string(),
            call: "Call".to_string(),
            email: "Email".to_string(),
            rating: "*".to_string(),
            error: "[X]".to_string(),
        }
    }
}

impl SearchConfig {
    pub fn radius_km(&self) -> u32 {
        clamp_criteria_value(self.default_radius_km)
    }

    pub fn max_results(&self) -> u32 {
        clamp_criteria_value(self.default_max_results)
    }
}

impl Config {
    /// Load config from the default location, writing defaults if missing
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;

        if !config_path.exists() {
            let default_config = Self::default();
            default_config.save_to(&config_path)?;
            return Ok(default_config);
        }

        Self::load_from(&config_path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file {}", path.display()))?;
        let mut config: Config = toml::from_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))?;

        if !config.display.use_glyphs {
            config.display.icons = IconConfig::simple();
        }

        Ok(config)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;

        Ok(())
    }

    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("lead-scout").join("config.toml"))
    }

    /// Pick the API base URL: explicit override (flag or environment) first,
    /// then the config file, then the local default
    pub fn resolve_api_url(&self, override_url: Option<&str>) -> String {
        override_url
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .or_else(|| {
                self.api
                    .base_url
                    .as_deref()
                    .map(str::trim)
                    .filter(|url| !url.is_empty())
            })
            .unwrap_or(DEFAULT_API_URL)
            .to_string()
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export
            .directory
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Default config file content with comments
    pub fn create_default_with_comments() -> String {
        r#"# lead-scout configuration file
# Location: ~/.config/lead-scout/config.toml (Linux)
#           ~/Library/Application Support/lead-scout/config.toml (macOS)
#           %APPDATA%\lead-scout\config.toml (Windows)

[api]
# Base URL of the business search API.
# LEAD_SCOUT_API_URL or --api-url take precedence over this value.
# base_url = "http://localhost:8000"

[search]
# Starting values for the advanced search options (1-100)
default_radius_km = 10
default_max_results = 20

# Quick-select presets (Alt+1 .. Alt+9 in the search form)
popular_industries = ["Restaurants", "Insurance", "Real Estate", "Plumbers", "Dentists", "Lawyers"]

[display]
# Set to false for ASCII-only icons
use_glyphs = true

# Show row numbers in the results table
show_row_numbers = false

[export]
# Directory for CSV exports (defaults to the current directory)
# directory = "/home/me/leads"
"#
        .to_string()
    }
}
