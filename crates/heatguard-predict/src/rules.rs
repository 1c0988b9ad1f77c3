//! Rule-based heat-stress estimate used when no classifier is loaded.

use crate::types::RiskLabel;

/// Score at or above which risk is `High`.
pub const HIGH_THRESHOLD: f64 = 42.0;
/// Score at or above which risk is `Moderate`.
pub const MODERATE_THRESHOLD: f64 = 34.0;

/// Linear threshold input `temperature + 0.1 * humidity - 0.4 * wind_speed`.
///
/// Not a calibrated heat index.
pub fn heat_index_like(temperature: f64, humidity: f64, wind_speed: f64) -> f64 {
    temperature + 0.1 * humidity - 0.4 * wind_speed
}

/// Map raw inputs to a risk category. Inputs are never clamped.
pub fn estimate(temperature: f64, humidity: f64, wind_speed: f64) -> RiskLabel {
    let score = heat_index_like(temperature, humidity, wind_speed);

    if score >= HIGH_THRESHOLD {
        RiskLabel::High
    } else if score >= MODERATE_THRESHOLD {
        RiskLabel::Moderate
    } else {
        RiskLabel::Low
    }
}
