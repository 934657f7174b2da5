// src/routes.rs
use std::convert::Infallible;
use std::sync::Arc;

use log::info;
use warp::reject::Rejection;
use warp::{Filter, Reply};

use crate::handlers::analyze::analyze_dataset;
use crate::handlers::correlate::correlate_datasets;
use crate::handlers::error::ApiError;
use crate::handlers::feedback::report_feedback;
use crate::services::explainer::Explainer;
use crate::services::safety::SafetyFilter;

// Add recovery handling for our custom errors
async fn handle_rejection(err: Rejection) -> Result<impl Reply, Infallible> {
    let code;
    let message;

    if err.is_not_found() {
        code = warp::http::StatusCode::NOT_FOUND;
        message = "Not Found".to_string();
    } else if let Some(api_error) = err.find::<ApiError>() {
        code = api_error.status;
        message = api_error.message.clone();
    } else if err.find::<warp::filters::body::BodyDeserializeError>().is_some() {
        code = warp::http::StatusCode::BAD_REQUEST;
        message = "Invalid request body".to_string();
    } else {
        code = warp::http::StatusCode::INTERNAL_SERVER_ERROR;
        message = "Internal Server Error".to_string();
    }

    Ok(warp::reply::with_status(
        warp::reply::json(&serde_json::json!({
            "error": message,
        })),
        code,
    ))
}

pub fn routes(
    safety: Arc<SafetyFilter>,
    explainer: Arc<dyn Explainer>,
) -> impl Filter<Extract = impl Reply, Error = Infallible> + Clone {
    info!("Configuring routes...");

    let safety_filter = warp::any().map(move || safety.clone());
    let explainer_filter = warp::any().map(move || explainer.clone());

    let analyze_route = warp::path!("api" / "v1" / "analyze")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 256))
        .and(warp::body::json())
        .and(safety_filter.clone())
        .and(explainer_filter.clone())
        .and_then(analyze_dataset);

    let correlate_route = warp::path!("api" / "v1" / "correlate")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 512))
        .and(warp::body::json())
        .and(safety_filter.clone())
        .and(explainer_filter.clone())
        .and_then(correlate_datasets);

    let feedback_route = warp::path!("api" / "v1" / "report" / "feedback")
        .and(warp::post())
        .and(warp::body::content_length_limit(1024 * 64))
        .and(warp::body::json())
        .and(safety_filter)
        .and(explainer_filter)
        .and_then(report_feedback);

    info!("All routes configured successfully.");

    analyze_route
        .or(correlate_route)
        .or(feedback_route)
        .recover(handle_rejection)
}
