//! services/api/src/web/middleware.rs
//!
//! Authentication middleware for protecting routes.

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use mentorshub_core::domain::TokenKind;
use std::sync::Arc;
use tracing::debug;

use crate::web::auth::{cookie_value, ACCESS_COOKIE};
use crate::web::state::AppState;

/// Middleware that validates the access-token cookie and extracts the user_id.
///
/// If valid, inserts the user_id into request extensions for handlers to use.
/// If invalid or missing, returns 401 Unauthorized.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, StatusCode> {
    // 1. Extract the access cookie
    let access_id =
        cookie_value(req.headers(), ACCESS_COOKIE).ok_or(StatusCode::UNAUTHORIZED)?;

    // 2. Validate it against the auth store, get user_id
    let user_id = state
        .auth
        .validate_auth_token(&access_id, TokenKind::Access)
        .await
        .map_err(|e| {
            debug!("Failed to validate access token: {:?}", e);
            StatusCode::UNAUTHORIZED
        })?;

    // 3. Insert user_id into request extensions
    req.extensions_mut().insert(user_id);

    // 4. Continue to the handler
    Ok(next.run(req).await)
}
