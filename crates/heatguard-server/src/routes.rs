use std::collections::HashMap;
use std::convert::Infallible;
use std::sync::Arc;
use warp::http::StatusCode;
use warp::reply::Response;
use warp::{Filter, Rejection, Reply};

use crate::error_mapping::json_error;
use crate::handlers;
use crate::state::AppState;

/// Largest accepted `/predict` body.
pub const MAX_BODY_BYTES: u64 = 16 * 1024;

fn with_state(
    state: Arc<AppState>,
) -> impl Filter<Extract = (Arc<AppState>,), Error = Infallible> + Clone {
    warp::any().map(move || state.clone())
}

/// All routes with CORS, JSON error replies and request tracing applied.
pub fn routes(
    state: Arc<AppState>,
) -> impl Filter<Extract = (impl Reply,), Error = Infallible> + Clone {
    let health = warp::path("health")
        .and(warp::path::end())
        .and(warp::get())
        .and(with_state(state.clone()))
        .map(handlers::health);

    let predict = warp::path("predict")
        .and(warp::path::end())
        .and(warp::post())
        .and(warp::body::content_length_limit(MAX_BODY_BYTES))
        .and(warp::body::bytes())
        .and(with_state(state.clone()))
        .map(handlers::predict);

    let weather = warp::path("weather")
        .and(warp::path::end())
        .and(warp::get())
        .and(warp::query::<HashMap<String, String>>())
        .and(with_state(state))
        .and_then(handlers::weather);

    let cors = warp::cors()
        .allow_any_origin()
        .allow_methods(vec!["GET", "POST", "OPTIONS"])
        .allow_headers(vec!["content-type"]);

    health
        .or(predict)
        .or(weather)
        .with(cors)
        .recover(handle_rejection)
        .with(warp::trace::request())
}

async fn handle_rejection(err: Rejection) -> Result<Response, Infallible> {
    let (message, status) = if err.is_not_found() {
        ("Not found", StatusCode::NOT_FOUND)
    } else if err.find::<warp::reject::MethodNotAllowed>().is_some() {
        ("Method not allowed", StatusCode::METHOD_NOT_ALLOWED)
    } else if err.find::<warp::reject::PayloadTooLarge>().is_some() {
        ("Request body too large", StatusCode::PAYLOAD_TOO_LARGE)
    } else if err.find::<warp::reject::LengthRequired>().is_some() {
        ("Content-Length header is required", StatusCode::LENGTH_REQUIRED)
    } else if err.find::<warp::reject::InvalidQuery>().is_some() {
        ("Invalid query string", StatusCode::BAD_REQUEST)
    } else if err.find::<warp::cors::CorsForbidden>().is_some() {
        ("CORS request forbidden", StatusCode::FORBIDDEN)
    } else {
        tracing::error!("Unhandled rejection: {:?}", err);
        ("Internal server error", StatusCode::INTERNAL_SERVER_ERROR)
    };

    Ok(json_error(message, status))
}
