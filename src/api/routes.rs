//! Router assembly for the proxy

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::api::handlers;
use crate::middleware::rate_limit::ThrottleLayer;
use crate::AppState;

/// Build the application router.
///
/// `/api/edits` accepts POST only; every other method gets the canonical
/// 405 body without any request processing.
pub fn create_router(state: Arc<AppState>) -> Router {
    let throttle = state
        .settings
        .rate_limit
        .enabled
        .then(|| ThrottleLayer::new(&state.settings.rate_limit));

    let mut app = Router::new()
        .route("/health", get(handlers::health))
        .route(
            "/api/edits",
            post(handlers::apply_edit).fallback(handlers::method_not_allowed),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    if let Some(throttle) = throttle {
        app = app.layer(throttle);
    }

    app
}
