//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the session REST endpoints and the master
//! definition for the OpenAPI specification.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    Extension,
};
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mentorshub_core::domain::{Pricing, Session, SessionFormat};
use mentorshub_core::ports::PortError;
use mentorshub_core::usecases::{BookSessionInput, SessionError};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};
use uuid::Uuid;

use crate::web::state::AppState;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        book_session_handler,
        list_user_sessions_handler,
        list_mentor_sessions_handler,
        approve_session_handler,
        reject_session_handler,
        cancel_session_handler,
        complete_session_handler,
        join_check_handler,
    ),
    components(
        schemas(BookSessionRequest, RejectSessionRequest, SessionResponse, JoinCheckResponse, ErrorBody)
    ),
    tags(
        (name = "MentorsHub API", description = "Session booking and lifecycle endpoints.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Deserialize, ToSchema)]
pub struct BookSessionRequest {
    pub mentor_id: Uuid,
    pub topic: String,
    pub session_type: String,
    /// "one-on-one" or "group".
    pub session_format: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub hours: u32,
    /// "free" or "paid".
    pub pricing: String,
    pub total_amount: Option<f64>,
    pub message: Option<String>,
    #[serde(default)]
    pub payment_completed: bool,
}

#[derive(Deserialize, ToSchema)]
pub struct RejectSessionRequest {
    pub reason: String,
}

/// A session as returned by every endpoint.
#[derive(Serialize, ToSchema)]
pub struct SessionResponse {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub session_type: String,
    pub session_format: String,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub hours: u32,
    pub status: String,
    pub pricing: String,
    pub payment_status: Option<String>,
    pub total_amount: Option<f64>,
    pub message: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl From<Session> for SessionResponse {
    fn from(s: Session) -> Self {
        Self {
            id: s.id,
            mentor_id: s.mentor_id,
            user_id: s.user_id,
            topic: s.topic,
            session_type: s.session_type,
            session_format: s.session_format.as_str().to_string(),
            date: s.date,
            start_time: s.start_time,
            end_time: s.end_time,
            hours: s.hours,
            status: s.status.as_str().to_string(),
            pricing: s.pricing.as_str().to_string(),
            payment_status: s.payment_status.map(|p| p.as_str().to_string()),
            total_amount: s.total_amount,
            message: s.message,
            rejection_reason: s.rejection_reason,
            created_at: s.created_at,
        }
    }
}

/// Join eligibility: a result, not an error, so this always comes back 200.
#[derive(Serialize, ToSchema)]
pub struct JoinCheckResponse {
    pub allowed: bool,
    pub reason: Option<String>,
}

/// The error body every failing endpoint produces.
#[derive(Serialize, ToSchema)]
pub struct ErrorBody {
    pub success: bool,
    pub message: String,
}

type HandlerError = (StatusCode, Json<ErrorBody>);

fn error_body(status: StatusCode, message: impl Into<String>) -> HandlerError {
    (
        status,
        Json(ErrorBody {
            success: false,
            message: message.into(),
        }),
    )
}

/// Maps usecase errors onto the HTTP taxonomy: validation and bad
/// transitions are 400, missing sessions 404, everything else 500.
fn map_session_error(e: SessionError) -> HandlerError {
    match e {
        SessionError::Validation(msg) => error_body(StatusCode::BAD_REQUEST, msg),
        SessionError::InvalidTransition(msg) => error_body(StatusCode::BAD_REQUEST, msg),
        SessionError::Port(PortError::NotFound(msg)) => error_body(StatusCode::NOT_FOUND, msg),
        SessionError::Port(PortError::Unauthorized) => {
            error_body(StatusCode::UNAUTHORIZED, "Unauthorized")
        }
        SessionError::Port(PortError::Unexpected(msg)) => {
            error!("Session operation failed: {}", msg);
            error_body(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Book a new mentorship session.
#[utoipa::path(
    post,
    path = "/sessions",
    request_body = BookSessionRequest,
    responses(
        (status = 201, description = "Session booked", body = SessionResponse),
        (status = 400, description = "Invalid booking data", body = ErrorBody),
        (status = 500, description = "Internal server error", body = ErrorBody)
    )
)]
pub async fn book_session_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
    Json(req): Json<BookSessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let session_format = SessionFormat::parse(&req.session_format).ok_or_else(|| {
        error_body(
            StatusCode::BAD_REQUEST,
            format!("invalid session format '{}'", req.session_format),
        )
    })?;
    let pricing = Pricing::parse(&req.pricing).ok_or_else(|| {
        error_body(
            StatusCode::BAD_REQUEST,
            format!("invalid pricing '{}'", req.pricing),
        )
    })?;

    let input = BookSessionInput {
        mentor_id: req.mentor_id,
        user_id,
        topic: req.topic,
        session_type: req.session_type,
        session_format,
        date: req.date,
        start_time: req.start_time,
        hours: req.hours,
        pricing,
        total_amount: req.total_amount,
        message: req.message,
        payment_completed: req.payment_completed,
    };

    let session = app_state
        .sessions
        .book(input)
        .await
        .map_err(map_session_error)?;
    Ok((StatusCode::CREATED, Json(SessionResponse::from(session))))
}

/// List the authenticated user's sessions.
#[utoipa::path(
    get,
    path = "/sessions/user",
    responses(
        (status = 200, description = "Sessions for the authenticated user", body = [SessionResponse])
    )
)]
pub async fn list_user_sessions_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let sessions = app_state
        .sessions
        .list_by_user(user_id)
        .await
        .map_err(map_session_error)?;
    let body: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(body))
}

/// List the authenticated mentor's sessions.
#[utoipa::path(
    get,
    path = "/sessions/mentor",
    responses(
        (status = 200, description = "Sessions for the authenticated mentor", body = [SessionResponse])
    )
)]
pub async fn list_mentor_sessions_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(user_id): Extension<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let sessions = app_state
        .sessions
        .list_by_mentor(user_id)
        .await
        .map_err(map_session_error)?;
    let body: Vec<SessionResponse> = sessions.into_iter().map(SessionResponse::from).collect();
    Ok(Json(body))
}

/// Approve a pending session (mentor action).
#[utoipa::path(
    post,
    path = "/sessions/{id}/approve",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session approved", body = SessionResponse),
        (status = 400, description = "Session is not pending", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn approve_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = app_state
        .sessions
        .approve(session_id)
        .await
        .map_err(map_session_error)?;
    Ok(Json(SessionResponse::from(session)))
}

/// Reject a pending session with a reason (mentor action).
#[utoipa::path(
    post,
    path = "/sessions/{id}/reject",
    params(("id" = Uuid, Path, description = "Session id")),
    request_body = RejectSessionRequest,
    responses(
        (status = 200, description = "Session rejected", body = SessionResponse),
        (status = 400, description = "Session is not pending or reason missing", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn reject_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
    Json(req): Json<RejectSessionRequest>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = app_state
        .sessions
        .reject(session_id, &req.reason)
        .await
        .map_err(map_session_error)?;
    Ok(Json(SessionResponse::from(session)))
}

/// Cancel a session (either party).
#[utoipa::path(
    post,
    path = "/sessions/{id}/cancel",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session canceled", body = SessionResponse),
        (status = 400, description = "Session is already terminal", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn cancel_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = app_state
        .sessions
        .cancel(session_id)
        .await
        .map_err(map_session_error)?;
    Ok(Json(SessionResponse::from(session)))
}

/// Mark a session as completed.
#[utoipa::path(
    post,
    path = "/sessions/{id}/complete",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Session completed", body = SessionResponse),
        (status = 400, description = "Session is not in progress", body = ErrorBody),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn complete_session_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let session = app_state
        .sessions
        .complete(session_id)
        .await
        .map_err(map_session_error)?;
    Ok(Json(SessionResponse::from(session)))
}

/// Check whether joining the session is currently allowed.
#[utoipa::path(
    get,
    path = "/sessions/{id}/join-check",
    params(("id" = Uuid, Path, description = "Session id")),
    responses(
        (status = 200, description = "Join window evaluation", body = JoinCheckResponse),
        (status = 404, description = "Session not found", body = ErrorBody)
    )
)]
pub async fn join_check_handler(
    State(app_state): State<Arc<AppState>>,
    Path(session_id): Path<Uuid>,
) -> Result<impl IntoResponse, HandlerError> {
    let window = app_state
        .sessions
        .check_join(session_id, app_state.config.early_join_minutes, Utc::now())
        .await
        .map_err(map_session_error)?;
    Ok(Json(JoinCheckResponse {
        allowed: window.is_allowed(),
        reason: window.reason().map(str::to_string),
    }))
}
