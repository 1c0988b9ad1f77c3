use reqwest::Client;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

use crate::types::{Provider, WeatherError};

/// Current-conditions client for a single provider.
#[derive(Debug, Clone)]
pub struct ProviderClient {
    provider: Provider,
    client: Arc<Client>,
    endpoint: Url,
    api_key: Option<String>,
}

impl ProviderClient {
    /// `base_url` is the provider root, e.g. `https://api.weatherapi.com`.
    pub fn new(
        provider: Provider,
        client: Arc<Client>,
        base_url: &str,
        api_key: Option<String>,
    ) -> Result<Self, WeatherError> {
        let invalid = |message: String| WeatherError::InvalidUrl { provider, message };

        // Without a trailing slash `join` would drop the last path segment.
        let mut base = base_url.trim().to_string();
        if !base.ends_with('/') {
            base.push('/');
        }

        let endpoint = Url::parse(&base)
            .and_then(|b| b.join(provider.endpoint()))
            .map_err(|e| invalid(e.to_string()))?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(invalid(format!("unsupported scheme {}", endpoint.scheme())));
        }

        Ok(Self {
            provider,
            client,
            endpoint,
            api_key: api_key.filter(|k| !k.trim().is_empty()),
        })
    }

    pub fn provider(&self) -> Provider {
        self.provider
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    /// Fetch current conditions for `city`.
    ///
    /// Without an API key this returns the in-band error payload and makes
    /// no request. Transport failures, non-2xx statuses and non-JSON bodies
    /// are errors.
    pub async fn fetch(&self, city: &str) -> Result<Value, WeatherError> {
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("{} skipped: no API key", self.provider);
            return Ok(self.provider.unconfigured_payload());
        };

        tracing::debug!("Fetching {} weather for {}", self.provider, city);

        let upstream = |source: reqwest::Error| WeatherError::Upstream {
            provider: self.provider,
            source,
        };

        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&self.provider.query(city, api_key))
            .send()
            .await
            .map_err(upstream)?
            .error_for_status()
            .map_err(upstream)?;

        let body: Value = response.json().await.map_err(upstream)?;
        Ok(body)
    }
}
