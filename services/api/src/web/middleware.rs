//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};
use std::sync::Arc;
use tracing::warn;
use uuid::Uuid;

use crate::error::HttpError;
use crate::web::state::AppState;

/// The identity resolved from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser(pub Uuid);

/// Pulls the token out of an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    let (scheme, token) = value.trim().split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Middleware that validates the bearer token and extracts the user id.
///
/// If valid, inserts an `AuthUser` into request extensions for handlers to use.
/// If missing or invalid, the request ends here with 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, HttpError> {
    // 1. Extract the bearer token
    let token = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .ok_or_else(|| HttpError::Unauthorized("Not authorized, no token".to_string()))?;

    // 2. Verify it and resolve the subject
    let user_id = state.tokens.verify(token).map_err(|e| {
        warn!("Rejected bearer token: {}", e);
        HttpError::Unauthorized("Not authorized, token failed".to_string())
    })?;

    // 3. Insert the identity into request extensions
    req.extensions_mut().insert(AuthUser(user_id));

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
