//! Route definitions.

mod hub;

use std::sync::Arc;

use axum::http::Uri;
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::Router;
use tower_http::trace::TraceLayer;

use datagate_core::errors::HubError;

use crate::error::ApiError;
use crate::state::AppState;

pub fn app_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/hub", get(hub::hub_info))
        .route("/hub/{product}/{key}", get(hub::get_product))
        .route("/health", get(hub::health))
        .fallback(not_found)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Backstop for requests for nonexistent resources.
async fn not_found(uri: Uri) -> Response {
    let path = uri.path().to_string();
    ApiError::new(HubError::NotFound(path.clone()), path).into_response()
}
