use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::{
    model::DEFAULT_LANG,
    pricing::{DEFAULT_MODEL, ModelPricing, PricingTable},
    units::Units,
};

pub const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const OPENWEATHER_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Offset of the zone used to stamp weather reports (UTC+03:00).
pub const DISPLAY_UTC_OFFSET_SECS: i32 = 3 * 3600;

/// Settings for the chat-completion provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenAiSettings {
    pub base_url: String,
    pub default_model: String,
    pub pricing: PricingTable,
}

impl Default for OpenAiSettings {
    fn default() -> Self {
        Self {
            base_url: OPENAI_BASE_URL.to_string(),
            default_model: DEFAULT_MODEL.to_string(),
            pricing: PricingTable::default(),
        }
    }
}

/// Settings for the OpenWeather provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OpenWeatherSettings {
    pub base_url: String,
    pub units: Units,
    pub lang: String,
    /// Report timestamps are rendered in this fixed zone, not in the city's own zone.
    pub display_utc_offset_secs: i32,
}

impl Default for OpenWeatherSettings {
    fn default() -> Self {
        Self {
            base_url: OPENWEATHER_BASE_URL.to_string(),
            units: Units::Metric,
            lang: DEFAULT_LANG.to_string(),
            display_utc_offset_secs: DISPLAY_UTC_OFFSET_SECS,
        }
    }
}

/// Top-level configuration stored on disk.
///
/// API keys are never stored here; they come from the environment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub openai: OpenAiSettings,
    pub openweather: OpenWeatherSettings,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return defaults.
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(&path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "apicast", "apicast")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Set or replace the token rates for a model (or model-family prefix).
    pub fn set_model_pricing(&mut self, model: &str, pricing: ModelPricing) -> Result<()> {
        if model.trim().is_empty() {
            return Err(anyhow!("Model name must not be empty"));
        }
        if !(pricing.prompt_per_million >= 0.0 && pricing.completion_per_million >= 0.0) {
            return Err(anyhow!("Token rates must be non-negative numbers"));
        }

        self.openai.pricing.set(model.trim(), pricing);
        Ok(())
    }
}
