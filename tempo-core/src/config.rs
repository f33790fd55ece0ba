use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

/// Fallback city when neither the location lookup nor the config yields one.
pub const DEFAULT_LOCATION: &str = "São Paulo";

/// Forecast length requested when the config does not say otherwise.
pub const DEFAULT_FORECAST_DAYS: u8 = 7;

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// WeatherAPI.com API key.
    pub api_key: Option<String>,

    /// City used when the location lookup comes back empty.
    pub default_location: Option<String>,

    /// Number of forecast days to request (API caps this at 14).
    pub forecast_days: Option<u8>,
}

impl Config {
    /// API key, or an error telling the user how to set one.
    pub fn api_key(&self) -> Result<&str> {
        self.api_key.as_deref().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `tempo configure` and enter your WeatherAPI.com key."
            )
        })
    }

    pub fn default_location(&self) -> &str {
        self.default_location.as_deref().unwrap_or(DEFAULT_LOCATION)
    }

    pub fn forecast_days(&self) -> u8 {
        self.forecast_days.unwrap_or(DEFAULT_FORECAST_DAYS)
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    pub fn set_default_location(&mut self, location: String) {
        self.default_location = if location.trim().is_empty() { None } else { Some(location) };
    }

    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::project_dirs()?.config_dir().join("config.toml"))
    }

    /// Path to the favorites database, creating the data directory as needed.
    pub fn database_path() -> Result<PathBuf> {
        let dirs = Self::project_dirs()?;
        let data_dir = dirs.data_dir();

        fs::create_dir_all(data_dir)
            .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

        Ok(data_dir.join("favorites.sqlite3"))
    }

    fn project_dirs() -> Result<ProjectDirs> {
        ProjectDirs::from("dev", "tempocerto", "tempo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn api_key_errors_when_not_set() {
        let cfg = Config::default();
        let err = cfg.api_key().unwrap_err();

        assert!(err.to_string().contains("No API key configured"));
        assert!(err.to_string().contains("Hint: run `tempo configure`"));
    }

    #[test]
    fn api_key_returned_once_set() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());

        assert_eq!(cfg.api_key().unwrap(), "KEY");
    }

    #[test]
    fn default_location_falls_back() {
        let mut cfg = Config::default();
        assert_eq!(cfg.default_location(), DEFAULT_LOCATION);

        cfg.set_default_location("Curitiba".into());
        assert_eq!(cfg.default_location(), "Curitiba");

        // Blank input clears the override again.
        cfg.set_default_location("   ".into());
        assert_eq!(cfg.default_location(), DEFAULT_LOCATION);
    }

    #[test]
    fn forecast_days_falls_back() {
        let mut cfg = Config::default();
        assert_eq!(cfg.forecast_days(), DEFAULT_FORECAST_DAYS);

        cfg.forecast_days = Some(3);
        assert_eq!(cfg.forecast_days(), 3);
    }

    #[test]
    fn config_roundtrips_through_toml() {
        let cfg = Config {
            api_key: Some("KEY".into()),
            default_location: Some("Recife".into()),
            forecast_days: Some(5),
        };

        let text = toml::to_string_pretty(&cfg).unwrap();
        let back: Config = toml::from_str(&text).unwrap();

        assert_eq!(back.api_key.as_deref(), Some("KEY"));
        assert_eq!(back.default_location.as_deref(), Some("Recife"));
        assert_eq!(back.forecast_days, Some(5));
    }
}
