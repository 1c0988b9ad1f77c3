//! Fans a city lookup out to both providers and merges the payloads.

use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

use crate::provider::ProviderClient;
use crate::types::{AggregatedWeather, Provider, WeatherError};

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const USER_AGENT: &str = concat!("heatguard/", env!("CARGO_PKG_VERSION"));

/// Provider credentials and endpoints
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub openweathermap_api_key: Option<String>,
    pub weatherapi_key: Option<String>,
    pub openweathermap_url: String,
    pub weatherapi_url: String,
    /// Applied to every outbound request
    pub timeout: Duration,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            openweathermap_api_key: None,
            weatherapi_key: None,
            openweathermap_url: Provider::OpenWeatherMap.default_base_url().to_string(),
            weatherapi_url: Provider::WeatherApi.default_base_url().to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct WeatherAggregator {
    openweathermap: ProviderClient,
    weatherapi: ProviderClient,
}

impl WeatherAggregator {
    pub fn new(settings: AggregatorSettings) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(WeatherError::Client)?;
        let client = Arc::new(client);

        let openweathermap = ProviderClient::new(
            Provider::OpenWeatherMap,
            client.clone(),
            &settings.openweathermap_url,
            settings.openweathermap_api_key,
        )?;
        let weatherapi = ProviderClient::new(
            Provider::WeatherApi,
            client,
            &settings.weatherapi_url,
            settings.weatherapi_key,
        )?;

        for provider in [&openweathermap, &weatherapi] {
            if provider.is_configured() {
                tracing::info!("Weather provider {} configured", provider.provider());
            } else {
                tracing::warn!(
                    "Weather provider {} disabled: {} is not set",
                    provider.provider(),
                    provider.provider().key_variable()
                );
            }
        }

        Ok(Self {
            openweathermap,
            weatherapi,
        })
    }

    pub fn configured_providers(&self) -> Vec<Provider> {
        [&self.openweathermap, &self.weatherapi]
            .into_iter()
            .filter(|p| p.is_configured())
            .map(ProviderClient::provider)
            .collect()
    }

    /// Look up current weather for `city` from both providers concurrently.
    ///
    /// A blank city fails before any request is made. An unconfigured
    /// provider contributes an in-band error payload; any other provider
    /// failure fails the whole lookup.
    #[tracing::instrument(skip(self), level = "debug")]
    pub async fn get_weather(&self, city: &str) -> Result<AggregatedWeather, WeatherError> {
        if city.trim().is_empty() {
            return Err(WeatherError::EmptyCity);
        }

        let (openweathermap, weatherapi) = tokio::join!(
            self.openweathermap.fetch(city),
            self.weatherapi.fetch(city)
        );

        let openweathermap = openweathermap.inspect_err(log_failure)?;
        let weatherapi = weatherapi.inspect_err(log_failure)?;

        Ok(AggregatedWeather {
            city: city.to_string(),
            openweathermap,
            weatherapi,
        })
    }
}

fn log_failure(error: &WeatherError) {
    tracing::warn!("Weather lookup failed: {}", error);
}
