use serde::Serialize;
use serde_json::Value;

/// External weather data source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Provider {
    OpenWeatherMap,
    WeatherApi,
}

impl Provider {
    /// Key used for this provider in aggregated responses
    pub fn name(&self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "openweathermap",
            Self::WeatherApi => "weatherapi",
        }
    }

    /// Environment variable that carries the API key
    pub fn key_variable(&self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "OPENWEATHERMAP_API_KEY",
            Self::WeatherApi => "WEATHERAPI_KEY",
        }
    }

    pub fn default_base_url(&self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "https://api.openweathermap.org",
            Self::WeatherApi => "https://api.weatherapi.com",
        }
    }

    /// Current-conditions endpoint, relative to the base URL
    pub fn endpoint(&self) -> &'static str {
        match self {
            Self::OpenWeatherMap => "data/2.5/weather",
            Self::WeatherApi => "v1/current.json",
        }
    }

    /// Query parameters for a current-conditions lookup
    pub fn query<'a>(&self, city: &'a str, api_key: &'a str) -> Vec<(&'static str, &'a str)> {
        match self {
            Self::OpenWeatherMap => vec![("q", city), ("appid", api_key), ("units", "metric")],
            Self::WeatherApi => vec![("key", api_key), ("q", city), ("aqi", "no")],
        }
    }

    /// In-band payload returned when the provider has no API key
    pub fn unconfigured_payload(&self) -> Value {
        serde_json::json!({
            "error": format!("{} is not configured", self.key_variable())
        })
    }
}

impl std::fmt::Display for Provider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Both provider payloads for one city
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregatedWeather {
    pub city: String,
    pub openweathermap: Value,
    pub weatherapi: Value,
}

/// Weather lookup errors
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("City cannot be empty")]
    EmptyCity,

    #[error("{provider} request failed: {source}")]
    Upstream {
        provider: Provider,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    #[error("Invalid base URL for {provider}: {message}")]
    InvalidUrl { provider: Provider, message: String },
}
