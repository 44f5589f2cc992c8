//! HTTP route handlers and router assembly.

pub mod bootstrap;
pub mod health;

use std::sync::Arc;

use axum::Router;
use axum::http::{HeaderValue, header};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::cors::{ALLOWED_HEADERS, OriginPolicy};
use crate::state::AppState;

/// Build the complete router with CORS, tracing, and response hardening.
///
/// `max_concurrent` bounds in-flight requests on the bootstrap endpoint.
pub fn build_router(state: Arc<AppState>, origins: OriginPolicy, max_concurrent: usize) -> Router {
    // Concurrency-limit the bootstrap route; each request holds a pooled
    // database connection and an outbound identity call.
    let bootstrap_routes = bootstrap::router()
        .layer(tower::limit::ConcurrencyLimitLayer::new(max_concurrent));

    Router::new()
        .merge(bootstrap_routes)
        .merge(health::router())
        .layer(TraceLayer::new_for_http())
        .layer(origins.into_layer())
        .layer(SetResponseHeaderLayer::if_not_present(
            header::ACCESS_CONTROL_ALLOW_HEADERS,
            HeaderValue::from_static(ALLOWED_HEADERS),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::CACHE_CONTROL,
            HeaderValue::from_static("no-store"),
        ))
        .with_state(state)
}
