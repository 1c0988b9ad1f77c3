use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::hyper::body::Bytes;
use warp::reply::Response;
use warp::Reply;

use heatguard_core::AppError;
use heatguard_predict::{reading_from_payload, PredictionSource, RiskLabel, WeatherReading};

use crate::error_mapping::{error_reply, from_weather_error, json_error};
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub model_loaded: bool,
}

#[derive(Debug, Serialize)]
pub struct PredictResponse {
    pub prediction: RiskLabel,
    pub inputs: WeatherReading,
    pub model_source: PredictionSource,
}

pub fn health(state: Arc<AppState>) -> Response {
    warp::reply::json(&HealthResponse {
        status: "ok",
        model_loaded: state.adapter.is_model_loaded(),
    })
    .into_response()
}

pub fn predict(body: Bytes, state: Arc<AppState>) -> Response {
    let payload = match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(map)) => map,
        _ => {
            return error_reply(&AppError::Validation(
                "Request body must be a JSON object".into(),
            ))
        }
    };

    let reading = match reading_from_payload(&payload) {
        Ok(reading) => reading,
        Err(message) => return error_reply(&AppError::Validation(message)),
    };

    let result = state.adapter.predict_reading(reading);
    tracing::debug!(
        "Predicted {} ({}) for {:?}",
        result.label,
        result.source.as_str(),
        result.inputs
    );

    warp::reply::json(&PredictResponse {
        prediction: result.label,
        inputs: result.inputs,
        model_source: result.source,
    })
    .into_response()
}

pub async fn weather(
    query: HashMap<String, String>,
    state: Arc<AppState>,
) -> Result<Response, Infallible> {
    let city = query.get("city").map(|c| c.trim()).unwrap_or_default();
    if city.is_empty() {
        return Ok(json_error(
            "Query parameter 'city' is required",
            StatusCode::BAD_REQUEST,
        ));
    }

    let response = match state.weather.get_weather(city).await {
        Ok(weather) => warp::reply::json(&weather).into_response(),
        Err(e) => error_reply(&from_weather_error(e)),
    };
    Ok(response)
}
