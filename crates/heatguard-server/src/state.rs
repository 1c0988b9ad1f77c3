use anyhow::{Context, Result};
use std::time::Duration;

use heatguard_core::Config;
use heatguard_predict::ModelAdapter;
use heatguard_weather::{AggregatorSettings, WeatherAggregator};

/// Everything request handlers need. Built once at startup and shared
/// read-only.
#[derive(Debug, Clone)]
pub struct AppState {
    pub adapter: ModelAdapter,
    pub weather: WeatherAggregator,
}

impl AppState {
    pub fn new(adapter: ModelAdapter, weather: WeatherAggregator) -> Self {
        Self { adapter, weather }
    }

    /// Load the model (if any) and configure the weather providers.
    pub fn from_config(config: &Config) -> Result<Self> {
        let adapter = ModelAdapter::load(&config.model.path);

        let weather = WeatherAggregator::new(AggregatorSettings {
            openweathermap_api_key: config.weather.openweathermap_api_key.clone(),
            weatherapi_key: config.weather.weatherapi_key.clone(),
            openweathermap_url: config.weather.openweathermap_url.clone(),
            weatherapi_url: config.weather.weatherapi_url.clone(),
            timeout: Duration::from_secs(config.weather.timeout_secs),
        })
        .context("Failed to configure weather providers")?;

        tracing::info!(
            "Predictions will use the {} path",
            if adapter.is_model_loaded() {
                "model"
            } else {
                "rule-based"
            }
        );

        Ok(Self::new(adapter, weather))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_default_config() {
        let mut config = Config::default();
        config.model.path = "/nonexistent/heat_stress_model.json".into();

        let state = AppState::from_config(&config).unwrap();
        assert!(!state.adapter.is_model_loaded());
        assert!(state.weather.configured_providers().is_empty());
    }

    #[test]
    fn test_from_config_rejects_bad_provider_url() {
        let mut config = Config::default();
        config.weather.openweathermap_url = "not a url".into();

        let err = AppState::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("weather providers"));
    }
}
