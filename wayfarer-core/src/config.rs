use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::ProviderId;

pub const DEFAULT_USER_AGENT: &str = "weather-app/1.0";
pub const DEFAULT_CONTACT_EMAIL: &str = "contact@example.com";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Per-provider overrides. Anything left out falls back to the provider's defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub base_url: Option<String>,
    pub timeout_secs: Option<u64>,
}

/// Fully resolved endpoint settings handed to a provider client.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderSettings {
    pub base_url: String,
    pub timeout: Duration,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FlightsConfig {
    /// SerpApi key. `SERPAPI_KEY` in the environment takes precedence.
    pub api_key: Option<String>,
    pub currency: String,
    pub max_results: usize,
}

impl Default for FlightsConfig {
    fn default() -> Self {
        Self { api_key: None, currency: "EUR".to_string(), max_results: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    /// Days requested from the secondary provider.
    pub forecast_days: u8,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self { forecast_days: 3 }
    }
}

/// Top-level configuration stored on disk.
///
/// Built once at startup and passed by reference to every client, so tests can
/// point each provider at a substitute endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub user_agent: String,

    /// Nominatim requires a way to contact the application's operator.
    pub contact_email: String,

    /// Example TOML:
    /// [providers.nws]
    /// base_url = "https://api.weather.gov"
    /// timeout_secs = 10
    pub providers: HashMap<String, ProviderConfig>,

    pub flights: FlightsConfig,
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_string(),
            contact_email: DEFAULT_CONTACT_EMAIL.to_string(),
            providers: HashMap::new(),
            flights: FlightsConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let cfg = Self::read_from(path)?;

        cfg.validate()
            .with_context(|| format!("Invalid config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Parse without validating, so an invalid file can still be edited and saved.
    pub fn read_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Save config to the platform config directory.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save config, creating parent directories as needed.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "wayfarer", "wayfarer")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn validate(&self) -> Result<()> {
        for (name, provider) in &self.providers {
            ProviderId::try_from(name.as_str())?;
            if provider.timeout_secs == Some(0) {
                bail!("Provider '{name}' has a zero timeout");
            }
        }
        if self.flights.max_results == 0 {
            bail!("flights.max_results must be at least 1");
        }
        if !(1..=16).contains(&self.weather.forecast_days) {
            bail!("weather.forecast_days must be between 1 and 16");
        }
        Ok(())
    }

    /// Apply `SERPAPI_KEY` and `CONTACT_EMAIL` from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(key) = lookup("SERPAPI_KEY").filter(|v| !v.trim().is_empty()) {
            self.flights.api_key = Some(key);
        }
        if let Some(email) = lookup("CONTACT_EMAIL").filter(|v| !v.trim().is_empty()) {
            self.contact_email = email;
        }
        self
    }

    /// Endpoint settings for a provider, with defaults filled in.
    pub fn provider_settings(&self, id: ProviderId) -> ProviderSettings {
        let overrides = self.provider_config(id);

        let base_url = overrides
            .and_then(|p| p.base_url.clone())
            .unwrap_or_else(|| id.default_base_url().to_string());
        let timeout_secs = overrides.and_then(|p| p.timeout_secs).unwrap_or(DEFAULT_TIMEOUT_SECS);

        ProviderSettings { base_url, timeout: Duration::from_secs(timeout_secs) }
    }

    pub fn provider_config(&self, id: ProviderId) -> Option<&ProviderConfig> {
        self.providers.get(id.as_str())
    }

    /// Point a provider at another endpoint (mirrors, local stubs).
    pub fn set_provider_base_url(&mut self, id: ProviderId, base_url: impl Into<String>) {
        self.providers.entry(id.as_str().to_string()).or_default().base_url = Some(base_url.into());
    }

    pub fn set_provider_timeout(&mut self, id: ProviderId, timeout_secs: u64) {
        self.providers.entry(id.as_str().to_string()).or_default().timeout_secs =
            Some(timeout_secs);
    }

    /// `User-Agent` header value, e.g. `weather-app/1.0 (contact@example.com)`.
    pub fn user_agent_header(&self) -> String {
        format!("{} ({})", self.user_agent, self.contact_email)
    }

    pub fn set_flight_api_key(&mut self, api_key: String) {
        self.flights.api_key = Some(api_key);
    }

    /// Returns the flight search API key, if present.
    pub fn flight_api_key(&self) -> Option<&str> {
        self.flights.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
