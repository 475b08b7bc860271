//! services/api/src/web/auth.rs
//!
//! Authentication endpoints for user signup, login, token refresh, and logout.
//!
//! Successful signup/login sets two HTTP-only cookies: a short-lived access
//! token and a longer-lived refresh token, both opaque ids backed by rows
//! in the auth store.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{AppendHeaders, IntoResponse},
    Json,
};
use chrono::{Duration, Utc};
use mentorshub_core::domain::TokenKind;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::web::state::AppState;

pub const ACCESS_COOKIE: &str = "access_token";
pub const REFRESH_COOKIE: &str = "refresh_token";

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

#[derive(Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Serialize, ToSchema)]
pub struct AuthResponse {
    pub user_id: Uuid,
    pub email: String,
}

//=========================================================================================
// Cookie Helpers
//=========================================================================================

fn auth_cookie(name: &str, value: &str, max_age_secs: i64) -> String {
    format!(
        "{}={}; HttpOnly; Secure; SameSite=Strict; Path=/; Max-Age={}",
        name, value, max_age_secs
    )
}

pub(crate) fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    let cookie_header = headers.get(header::COOKIE)?.to_str().ok()?;
    cookie_header.split(';').find_map(|c| {
        c.trim()
            .strip_prefix(name)
            .and_then(|rest| rest.strip_prefix('='))
            .map(str::to_string)
    })
}

/// Creates an access/refresh token pair and returns the matching cookies.
async fn issue_token_pair(
    state: &Arc<AppState>,
    user_id: Uuid,
) -> Result<AppendHeaders<[(header::HeaderName, String); 2]>, (StatusCode, String)> {
    let access_id = Uuid::new_v4().to_string();
    let refresh_id = Uuid::new_v4().to_string();
    let access_ttl = state.config.access_token_max_age_secs;
    let refresh_ttl = state.config.refresh_token_max_age_secs;

    state
        .auth
        .create_auth_token(
            &access_id,
            user_id,
            TokenKind::Access,
            Utc::now() + Duration::seconds(access_ttl),
        )
        .await
        .map_err(|e| {
            error!("Failed to create access token: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;
    state
        .auth
        .create_auth_token(
            &refresh_id,
            user_id,
            TokenKind::Refresh,
            Utc::now() + Duration::seconds(refresh_ttl),
        )
        .await
        .map_err(|e| {
            error!("Failed to create refresh token: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create session".to_string(),
            )
        })?;

    Ok(AppendHeaders([
        (
            header::SET_COOKIE,
            auth_cookie(ACCESS_COOKIE, &access_id, access_ttl),
        ),
        (
            header::SET_COOKIE,
            auth_cookie(REFRESH_COOKIE, &refresh_id, refresh_ttl),
        ),
    ]))
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /auth/signup - Create a new user account
#[utoipa::path(
    post,
    path = "/auth/signup",
    request_body = SignupRequest,
    responses(
        (status = 201, description = "User created successfully", body = AuthResponse),
        (status = 400, description = "Invalid request"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn signup_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SignupRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Hash the password
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| {
            error!("Failed to hash password: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to hash password".to_string(),
            )
        })?
        .to_string();

    // 2. Create user in the auth store
    let user = state
        .auth
        .create_user_with_email(&req.email, &password_hash)
        .await
        .map_err(|e| {
            error!("Failed to create user: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to create user".to_string(),
            )
        })?;

    // 3. Issue the cookie pair
    let cookies = issue_token_pair(&state, user.user_id).await?;

    let response = AuthResponse {
        user_id: user.user_id,
        email: user.email.unwrap_or_default(),
    };

    Ok((StatusCode::CREATED, cookies, Json(response)))
}

/// POST /auth/login - Login with existing account
#[utoipa::path(
    post,
    path = "/auth/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 500, description = "Internal server error")
    )
)]
pub async fn login_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Get user by email
    let user_creds = state.auth.get_user_by_email(&req.email).await.map_err(|e| {
        error!("Failed to get user: {:?}", e);
        (
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        )
    })?;

    // 2. Verify password
    let parsed_hash = PasswordHash::new(&user_creds.hashed_password).map_err(|e| {
        error!("Failed to parse password hash: {:?}", e);
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Authentication error".to_string(),
        )
    })?;

    let valid = Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .is_ok();

    if !valid {
        return Err((
            StatusCode::UNAUTHORIZED,
            "Invalid email or password".to_string(),
        ));
    }

    // 3. Issue the cookie pair
    let cookies = issue_token_pair(&state, user_creds.user_id).await?;

    let response = AuthResponse {
        user_id: user_creds.user_id,
        email: user_creds.email,
    };

    Ok((StatusCode::OK, cookies, Json(response)))
}

/// POST /auth/refresh - Rotate the access token off a valid refresh token
#[utoipa::path(
    post,
    path = "/auth/refresh",
    responses(
        (status = 200, description = "Access token refreshed"),
        (status = 401, description = "Missing or expired refresh token")
    )
)]
pub async fn refresh_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    // 1. Extract the refresh cookie
    let refresh_id = cookie_value(&headers, REFRESH_COOKIE)
        .ok_or((StatusCode::UNAUTHORIZED, "No refresh token".to_string()))?;

    // 2. Validate it and get the owner
    let user_id = state
        .auth
        .validate_auth_token(&refresh_id, TokenKind::Refresh)
        .await
        .map_err(|_| {
            (
                StatusCode::UNAUTHORIZED,
                "Invalid refresh token".to_string(),
            )
        })?;

    // 3. Issue a fresh access token
    let access_id = Uuid::new_v4().to_string();
    let access_ttl = state.config.access_token_max_age_secs;
    state
        .auth
        .create_auth_token(
            &access_id,
            user_id,
            TokenKind::Access,
            Utc::now() + Duration::seconds(access_ttl),
        )
        .await
        .map_err(|e| {
            error!("Failed to create access token: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to refresh session".to_string(),
            )
        })?;

    let cookie = auth_cookie(ACCESS_COOKIE, &access_id, access_ttl);
    Ok((StatusCode::OK, [(header::SET_COOKIE, cookie)]))
}

/// POST /auth/logout - Logout and invalidate both tokens
#[utoipa::path(
    post,
    path = "/auth/logout",
    responses(
        (status = 200, description = "Logout successful"),
        (status = 401, description = "No active session")
    )
)]
pub async fn logout_handler(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let access_id = cookie_value(&headers, ACCESS_COOKIE);
    let refresh_id = cookie_value(&headers, REFRESH_COOKIE);
    if access_id.is_none() && refresh_id.is_none() {
        return Err((StatusCode::UNAUTHORIZED, "No session found".to_string()));
    }

    for token_id in [access_id, refresh_id].into_iter().flatten() {
        if let Err(e) = state.auth.delete_auth_token(&token_id).await {
            error!("Failed to delete auth token: {:?}", e);
        }
    }

    // Clear both cookies
    let cookies = AppendHeaders([
        (header::SET_COOKIE, auth_cookie(ACCESS_COOKIE, "", 0)),
        (header::SET_COOKIE, auth_cookie(REFRESH_COOKIE, "", 0)),
    ]);

    Ok((StatusCode::OK, cookies))
}
