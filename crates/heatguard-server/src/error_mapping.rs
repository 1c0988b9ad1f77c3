//! Translation from crate errors to `AppError` and from `AppError` to HTTP.

use heatguard_core::{AppError, ReqwestErrorExt};
use heatguard_weather::WeatherError;
use serde::Serialize;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::Reply;

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub error: String,
}

pub fn from_weather_error(e: WeatherError) -> AppError {
    match e {
        WeatherError::EmptyCity => AppError::InternalValue(e.to_string()),
        WeatherError::Upstream { provider, source } => {
            AppError::Network(source.into_network_error(provider.name()))
        }
        WeatherError::Client(_) | WeatherError::InvalidUrl { .. } => AppError::Other(e.into()),
    }
}

pub fn status_for(err: &AppError) -> StatusCode {
    match err {
        AppError::Validation(_) => StatusCode::BAD_REQUEST,
        AppError::Network(_) => StatusCode::BAD_GATEWAY,
        AppError::InternalValue(_) | AppError::Config(_) | AppError::Other(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

/// JSON `{"error": ...}` reply for `err`. Server-side detail is logged, not
/// sent.
pub fn error_reply(err: &AppError) -> Response {
    let status = status_for(err);

    match err {
        AppError::Validation(msg) => tracing::debug!("Rejected request: {}", msg),
        AppError::Network(e) => tracing::warn!("Upstream failure from {}: {}", e.provider(), e),
        _ => tracing::error!("Request failed: {}", err),
    }

    json_error(err.user_message(), status)
}

pub fn json_error(message: impl Into<String>, status: StatusCode) -> Response {
    warp::reply::with_status(
        warp::reply::json(&ErrorBody {
            error: message.into(),
        }),
        status,
    )
    .into_response()
}
