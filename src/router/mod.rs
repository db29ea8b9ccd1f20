//! Router configuration
//!
//! All relay endpoints are mounted at the root, matching the paths Tableau
//! and existing admin scripts already call.

use axum::{
    Router, middleware,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any;
use std::time::Duration;
use tower::ServiceBuilder;
use tower_http::{
    catch_panic::CatchPanicLayer, cors::CorsLayer, timeout::TimeoutLayer, trace::TraceLayer,
};

use crate::app_state::AppState;
use crate::config::REQUEST_TIMEOUT_SECS;
use crate::error::ApiError;
use crate::handlers::{health, tableau, webhook};
use crate::middleware::{metrics_middleware, request_logger_middleware};

/// Build the application router.
pub fn build_router(app_state: AppState) -> Router {
    let relay = Router::new()
        .route("/webhook", post(webhook::receive_event))
        .route("/create_tableau_webhook", post(tableau::create_webhook))
        .route("/list_tableau_webhooks", get(tableau::list_webhooks))
        .route("/delete_tableau_webhook", post(tableau::delete_webhook))
        // route_layer so MatchedPath is available to the metrics labels
        .route_layer(middleware::from_fn(metrics_middleware));

    let ops = Router::new()
        .route("/health", get(health::health_check))
        .route("/metrics", get(health::metrics));

    relay
        .merge(ops)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                // Outbound timeouts are bounded below this, so it only fires as a backstop.
                .layer(TimeoutLayer::with_status_code(
                    axum::http::StatusCode::GATEWAY_TIMEOUT,
                    Duration::from_secs(REQUEST_TIMEOUT_SECS),
                ))
                .layer(CorsLayer::permissive())
                .layer(middleware::from_fn(request_logger_middleware))
                .layer(CatchPanicLayer::custom(handle_panic)),
        )
        .with_state(app_state)
}

/// A panicking handler becomes a structured 500 instead of a dropped connection.
fn handle_panic(payload: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic payload".to_string()
    };

    ApiError::Internal(format!("handler panicked: {}", detail)).into_response()
}
