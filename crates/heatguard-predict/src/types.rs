use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A single set of weather inputs for one prediction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WeatherReading {
    /// Air temperature in °C
    pub temperature: f64,
    /// Relative humidity in percent. Not range-checked.
    pub humidity: f64,
    pub wind_speed: f64,
}

impl WeatherReading {
    pub fn new(temperature: f64, humidity: f64, wind_speed: f64) -> Self {
        Self {
            temperature,
            humidity,
            wind_speed,
        }
    }

    /// Feature vector in the order classifiers are trained on.
    pub fn features(&self) -> [f64; 3] {
        [self.temperature, self.humidity, self.wind_speed]
    }
}

/// Heat-stress risk category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLabel {
    Low,
    Moderate,
    High,
}

impl RiskLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for RiskLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Label text that is not one of the known risk categories.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown risk label: {0}")]
pub struct UnknownLabel(pub String);

impl FromStr for RiskLabel {
    type Err = UnknownLabel;

    /// Case-insensitive, surrounding whitespace ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Self::Low),
            "moderate" => Ok(Self::Moderate),
            "high" => Ok(Self::High),
            _ => Err(UnknownLabel(s.to_string())),
        }
    }
}

/// Which decision path produced a prediction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PredictionSource {
    #[serde(rename = "ml_model")]
    ModelBased,
    #[serde(rename = "rule_based")]
    RuleBased,
}

impl PredictionSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ModelBased => "ml_model",
            Self::RuleBased => "rule_based",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub label: RiskLabel,
    pub inputs: WeatherReading,
    pub source: PredictionSource,
}
