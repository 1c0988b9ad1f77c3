//! City weather lookups across OpenWeatherMap and WeatherAPI.
//!
//! Provider payloads are passed through untouched. A provider without an
//! API key reports an in-band error instead of failing the lookup.

pub mod aggregator;
pub mod provider;
pub mod types;

pub use aggregator::{AggregatorSettings, WeatherAggregator};
pub use provider::ProviderClient;
pub use types::*;
