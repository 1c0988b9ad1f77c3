use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use url::Url;

use crate::error::ConfigError;

/// Environment variable naming an explicit config file.
pub const CONFIG_PATH_ENV: &str = "HEATGUARD_CONFIG";
pub const HOST_ENV: &str = "HOST";
pub const PORT_ENV: &str = "PORT";
pub const MODEL_PATH_ENV: &str = "HEAT_STRESS_MODEL_PATH";
pub const OPENWEATHERMAP_KEY_ENV: &str = "OPENWEATHERMAP_API_KEY";
pub const WEATHERAPI_KEY_ENV: &str = "WEATHERAPI_KEY";
pub const WEATHER_TIMEOUT_ENV: &str = "HEATGUARD_WEATHER_TIMEOUT_SECS";

/// Configuration validation errors
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Result of config validation
#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub errors: Vec<ConfigValidationError>,
    pub warnings: Vec<ConfigValidationError>,
}

impl ValidationResult {
    /// Returns true if there are no errors (warnings are OK)
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn add_error(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.errors.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    pub fn add_warning(&mut self, field: impl Into<String>, message: impl Into<String>) {
        self.warnings.push(ConfigValidationError {
            field: field.into(),
            message: message.into(),
        });
    }

    /// Get a single-line message summarizing all errors
    pub fn error_summary(&self) -> String {
        self.errors
            .iter()
            .map(|e| e.to_string())
            .collect::<Vec<_>>()
            .join("; ")
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Listener settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Heat-stress model settings
    #[serde(default)]
    pub model: ModelConfig,

    /// Weather provider settings
    #[serde(default)]
    pub weather: WeatherConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Path to the serialized classifier. A missing file is not an error.
    #[serde(default = "default_model_path")]
    pub path: PathBuf,
}

fn default_model_path() -> PathBuf {
    PathBuf::from("heat_stress_model.json")
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    /// OpenWeatherMap API key. Usually supplied via the environment.
    #[serde(default)]
    pub openweathermap_api_key: Option<String>,

    /// WeatherAPI key. Usually supplied via the environment.
    #[serde(default)]
    pub weatherapi_key: Option<String>,

    #[serde(default = "default_openweathermap_url")]
    pub openweathermap_url: String,

    #[serde(default = "default_weatherapi_url")]
    pub weatherapi_url: String,

    /// Timeout for each outbound provider request
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_openweathermap_url() -> String {
    "https://api.openweathermap.org".to_string()
}

fn default_weatherapi_url() -> String {
    "https://api.weatherapi.com".to_string()
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            openweathermap_api_key: None,
            weatherapi_key: None,
            openweathermap_url: default_openweathermap_url(),
            weatherapi_url: default_weatherapi_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl Config {
    /// Load configuration: defaults, then the optional TOML file, then the
    /// process environment.
    pub fn load() -> Result<Self, ConfigError> {
        let env = |key: &str| std::env::var(key).ok();

        let mut config = match Self::config_path(env) {
            Some(path) if path.exists() => {
                tracing::info!("Loading configuration from {}", path.display());
                Self::from_file(&path)?
            }
            _ => Self::default(),
        };

        config.apply_env(env)?;
        Ok(config)
    }

    /// Load configuration and validate it
    ///
    /// Warnings are logged. Returns an error if validation fails with
    /// critical errors.
    pub fn load_validated() -> Result<(Self, ValidationResult), ConfigError> {
        let config = Self::load()?;
        let validation = config.validate();

        if !validation.is_valid() {
            return Err(ConfigError::Invalid(validation.error_summary()));
        }

        for warning in &validation.warnings {
            tracing::warn!("Config warning: {}", warning);
        }

        Ok((config, validation))
    }

    /// Parse a TOML config file. Missing sections fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| ConfigError::Unreadable {
                path: path.display().to_string(),
                message: e.to_string(),
            })?;

        toml::from_str(&contents).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Apply environment overrides using `lookup` to read variables.
    ///
    /// Empty values are treated as unset.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        if let Some(host) = get(HOST_ENV) {
            self.server.host = host;
        }

        if let Some(port) = get(PORT_ENV) {
            self.server.port = port.parse().map_err(|_| {
                ConfigError::Invalid(format!("{} must be a port number, got: {}", PORT_ENV, port))
            })?;
        }

        if let Some(path) = get(MODEL_PATH_ENV) {
            self.model.path = PathBuf::from(path);
        }

        if let Some(key) = get(OPENWEATHERMAP_KEY_ENV) {
            self.weather.openweathermap_api_key = Some(key);
        }

        if let Some(key) = get(WEATHERAPI_KEY_ENV) {
            self.weather.weatherapi_key = Some(key);
        }

        if let Some(timeout) = get(WEATHER_TIMEOUT_ENV) {
            self.weather.timeout_secs = timeout.parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "{} must be a whole number of seconds, got: {}",
                    WEATHER_TIMEOUT_ENV, timeout
                ))
            })?;
        }

        Ok(())
    }

    /// Validate the configuration
    pub fn validate(&self) -> ValidationResult {
        let mut result = ValidationResult::default();

        if self.server.port == 0 {
            result.add_error("server.port", "Port cannot be 0");
        }

        if self.server.host.trim().is_empty() {
            result.add_error("server.host", "Host cannot be empty");
        }

        Self::validate_url(
            &self.weather.openweathermap_url,
            "weather.openweathermap_url",
            &mut result,
        );
        Self::validate_url(&self.weather.weatherapi_url, "weather.weatherapi_url", &mut result);

        if self.weather.timeout_secs == 0 {
            result.add_error("weather.timeout_secs", "Timeout must be greater than 0");
        } else if self.weather.timeout_secs > 120 {
            result.add_warning(
                "weather.timeout_secs",
                "Provider timeout is unusually long (>120s)",
            );
        }

        if self.weather.openweathermap_api_key.is_none() {
            result.add_warning(
                "weather.openweathermap_api_key",
                format!("{} is not configured", OPENWEATHERMAP_KEY_ENV),
            );
        }

        if self.weather.weatherapi_key.is_none() {
            result.add_warning(
                "weather.weatherapi_key",
                format!("{} is not configured", WEATHERAPI_KEY_ENV),
            );
        }

        if !self.model.path.exists() {
            result.add_warning(
                "model.path",
                format!(
                    "Model file not found, rule-based predictions will be used: {}",
                    self.model.path.display()
                ),
            );
        }

        result
    }

    fn validate_url(url_str: &str, field_name: &str, result: &mut ValidationResult) {
        match Url::parse(url_str) {
            Ok(url) => {
                if url.scheme() != "http" && url.scheme() != "https" {
                    result.add_error(
                        field_name,
                        format!("URL must use http or https scheme, got: {}", url.scheme()),
                    );
                }

                if url.host().is_none() {
                    result.add_error(field_name, "URL must have a host");
                }
            }
            Err(e) => {
                result.add_error(field_name, format!("Invalid URL: {}", e));
            }
        }
    }

    /// Explicit `HEATGUARD_CONFIG` path, else the per-user config file.
    fn config_path<F>(lookup: F) -> Option<PathBuf>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(CONFIG_PATH_ENV)
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from)
            .or_else(|| dirs::config_dir().map(|d| d.join("heatguard").join("config.toml")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.model.path, PathBuf::from("heat_stress_model.json"));
        assert_eq!(config.weather.timeout_secs, 10);
        assert!(config.weather.openweathermap_api_key.is_none());
    }

    #[test]
    fn test_default_config_is_valid() {
        let result = Config::default().validate();
        assert!(result.is_valid(), "Default config should be valid: {:?}", result.errors);
    }

    #[test]
    fn test_missing_keys_are_warnings() {
        let result = Config::default().validate();
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("OPENWEATHERMAP_API_KEY is not configured")));
        assert!(result
            .warnings
            .iter()
            .any(|w| w.message.contains("WEATHERAPI_KEY is not configured")));
    }

    #[test]
    fn test_env_overrides() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[
                ("PORT", "8080"),
                ("HOST", "0.0.0.0"),
                ("HEAT_STRESS_MODEL_PATH", "/srv/models/forest.json"),
                ("OPENWEATHERMAP_API_KEY", "owm-key"),
                ("WEATHERAPI_KEY", "wa-key"),
                ("HEATGUARD_WEATHER_TIMEOUT_SECS", "3"),
            ]))
            .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.model.path, PathBuf::from("/srv/models/forest.json"));
        assert_eq!(config.weather.openweathermap_api_key.as_deref(), Some("owm-key"));
        assert_eq!(config.weather.weatherapi_key.as_deref(), Some("wa-key"));
        assert_eq!(config.weather.timeout_secs, 3);
    }

    #[test]
    fn test_empty_env_values_are_unset() {
        let mut config = Config::default();
        config
            .apply_env(lookup(&[("WEATHERAPI_KEY", "   "), ("PORT", "")]))
            .unwrap();
        assert!(config.weather.weatherapi_key.is_none());
        assert_eq!(config.server.port, 5000);
    }

    #[test]
    fn test_invalid_port() {
        let mut config = Config::default();
        let err = config.apply_env(lookup(&[("PORT", "http")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn test_zero_port_is_error() {
        let mut config = Config::default();
        config.server.port = 0;
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.field == "server.port"));
    }

    #[test]
    fn test_invalid_provider_url() {
        let mut config = Config::default();
        config.weather.weatherapi_url = "ftp://api.weatherapi.com".to_string();
        let result = config.validate();
        assert!(!result.is_valid());
        assert!(result.errors.iter().any(|e| e.message.contains("http or https")));

        config.weather.weatherapi_url = "not-a-url".to_string();
        let result = config.validate();
        assert!(result.errors.iter().any(|e| e.field == "weather.weatherapi_url"));
    }

    #[test]
    fn test_from_file_partial_sections() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            "[server]\nport = 9000\n\n[weather]\ntimeout_secs = 5\n",
        )
        .unwrap();

        let config = Config::from_file(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.weather.timeout_secs, 5);
        assert_eq!(config.weather.weatherapi_url, "https://api.weatherapi.com");
        assert_eq!(config.model.path, PathBuf::from("heat_stress_model.json"));
    }

    #[test]
    fn test_from_file_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::from_file(&path).unwrap_err();
        assert!(matches!(err, ConfigError::ParseError(_)));
    }

    #[test]
    fn test_explicit_config_path() {
        let path = Config::config_path(lookup(&[("HEATGUARD_CONFIG", "/etc/heatguard.toml")]));
        assert_eq!(path, Some(PathBuf::from("/etc/heatguard.toml")));
    }

    #[test]
    fn test_validation_result_error_summary() {
        let mut result = ValidationResult::default();
        result.add_error("field1", "error1");
        result.add_error("field2", "error2");
        let summary = result.error_summary();
        assert!(summary.contains("field1: error1"));
        assert!(summary.contains("field2: error2"));
    }
}
