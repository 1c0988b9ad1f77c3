//! Shape checks for raw prediction payloads.

use serde_json::{Map, Value};

use crate::types::WeatherReading;

/// Fields every prediction payload must carry, in reporting order.
pub const REQUIRED_FIELDS: [&str; 3] = ["temperature", "humidity", "wind_speed"];

/// Check that `payload` has the three required numeric fields.
///
/// Returns the first problem found, or `None` when the payload is usable.
pub fn validate(payload: &Map<String, Value>) -> Option<String> {
    for field in REQUIRED_FIELDS {
        match payload.get(field) {
            None => return Some(format!("Missing required field: {}", field)),
            Some(value) if !value.is_number() => {
                return Some(format!("Field '{}' must be a number", field));
            }
            Some(_) => {}
        }
    }
    None
}

/// Validate `payload` and coerce it into a [`WeatherReading`].
pub fn reading_from_payload(payload: &Map<String, Value>) -> Result<WeatherReading, String> {
    if let Some(message) = validate(payload) {
        return Err(message);
    }

    let number = |field: &str| {
        payload
            .get(field)
            .and_then(Value::as_f64)
            .ok_or_else(|| format!("Field '{}' must be a number", field))
    };

    Ok(WeatherReading::new(
        number("temperature")?,
        number("humidity")?,
        number("wind_speed")?,
    ))
}
