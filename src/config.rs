use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::{info, warn};

pub const CONFIG_PATH: &str = "config.toml";

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
#[serde(default)]
pub struct Config {
    pub location: LocationConfig,
    pub api: ApiConfig,
    pub ui: UiConfig,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    pub auto_detect: bool,     // Use IP geolocation if true
    pub fallback_lat: f64,     // Used whenever detection fails or is off
    pub fallback_lon: f64,
    pub timeout_secs: u64,     // Give up on detection after this long
    pub max_fix_age_secs: u64, // Reuse a previous fix younger than this
}

impl Default for LocationConfig {
    fn default() -> Self {
        Self {
            auto_detect: true,
            fallback_lat: 40.7128,
            fallback_lon: -74.0060,
            timeout_secs: 5,
            max_fix_age_secs: 300,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct ApiConfig {
    pub forecast_url: String,
    pub geocode_url: String,
    pub user_agent: String,
    pub request_timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            geocode_url: "https://nominatim.openstreetmap.org/reverse".to_string(),
            user_agent: format!("SparkClock/{}", env!("CARGO_PKG_VERSION")),
            request_timeout_secs: 10,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct UiConfig {
    pub default_view: String, // "Clock", "Forecast" or "Mascot"
    pub tick_rate_ms: u64,
    pub loading_screen_ms: u64,
    pub banner_secs: u64,
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            default_view: "Clock".to_string(),
            tick_rate_ms: 100,
            loading_screen_ms: 1500,
            banner_secs: 5,
        }
    }
}

impl Config {
    /// Loads config.toml from the working directory.
    /// If it doesn't exist, creates a default one.
    pub fn load() -> Self {
        Self::load_from(CONFIG_PATH)
    }

    pub fn load_from(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();

        match fs::read_to_string(path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => return config,
                Err(e) => {
                    // Leave a broken file alone so the user can fix it
                    warn!("Failed to parse {}: {}. Using defaults.", path.display(), e);
                    return Config::default();
                }
            },
            Err(e) if e.kind() != std::io::ErrorKind::NotFound => {
                warn!("Could not read {}: {}. Using defaults.", path.display(), e);
                return Config::default();
            }
            Err(_) => {}
        }

        let default_config = Config::default();

        // Save default config to disk for the user to edit later
        match toml::to_string_pretty(&default_config) {
            Ok(toml_string) => {
                if fs::write(path, toml_string).is_err() {
                    warn!("Could not write default {} to disk.", path.display());
                }
            }
            Err(e) => warn!("Could not serialize default config: {}", e),
        }

        info!("Loaded default configuration.");
        default_config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        let config = Config::load_from(&path);

        assert_eq!(config, Config::default());
        let written = fs::read_to_string(&path).unwrap();
        let reparsed: Config = toml::from_str(&written).unwrap();
        assert_eq!(reparsed, config);
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[location]\nauto_detect = false\n\n[ui]\ndefault_view = \"Forecast\"\n").unwrap();

        let config = Config::load_from(&path);

        assert!(!config.location.auto_detect);
        assert_eq!(config.location.fallback_lat, 40.7128);
        assert_eq!(config.location.timeout_secs, 5);
        assert_eq!(config.ui.default_view, "Forecast");
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn broken_file_is_not_overwritten() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "this is = = not toml").unwrap();

        let config = Config::load_from(&path);

        assert_eq!(config, Config::default());
        assert_eq!(fs::read_to_string(&path).unwrap(), "this is = = not toml");
    }
}
