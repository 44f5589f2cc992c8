//! First-admin bootstrap route: `/v1/assign-first-admin`
//!
//! `POST` with `{"check_signup_enabled": true}` reports whether self-service
//! admin signup is open (no auth). `POST` with `{"user_id": "..."}` and a
//! bearer token grants the admin role, subject to the bootstrap policy.
//! `OPTIONS` answers browser preflights with an empty 200.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode, header};
use axum::routing::post;
use axum::{Json, Router};
use rolegate_core::{BootstrapRequest, BootstrapResponse, bearer_token};

use crate::error::AppError;
use crate::state::AppState;

/// Path of the bootstrap endpoint.
pub const PATH: &str = "/v1/assign-first-admin";

/// Build the bootstrap router.
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route(PATH, post(assign_first_admin).options(preflight))
}

/// `POST /v1/assign-first-admin`
///
/// The body is read raw and classified, never rejected by an extractor, so
/// that a bad credential is reported before a malformed body.
async fn assign_first_admin(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<BootstrapResponse>, AppError> {
    let bearer = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token);

    let request = BootstrapRequest::from_json(&body);
    let response = state.bootstrap.handle(bearer, request).await?;

    Ok(Json(response))
}

/// `OPTIONS /v1/assign-first-admin` — empty 200.
///
/// Behind [`build_router`](super::build_router) the CORS layer answers
/// `OPTIONS` first; this covers the route when mounted on its own.
async fn preflight() -> StatusCode {
    StatusCode::OK
}
