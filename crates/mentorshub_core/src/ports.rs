//! crates/mentorshub_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like databases or APIs.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::domain::{
    AuthToken, PaymentStatus, Session, SessionStatus, TokenKind, User, UserCredentials,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., database, network).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
    #[error("Unauthorized")]
    Unauthorized,
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// Persistence for session documents. Sessions are created once and then
/// status-transitioned; there is no delete.
#[async_trait]
pub trait SessionRepository: Send + Sync {
    async fn create_session(&self, session: Session) -> PortResult<Session>;

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session>;

    async fn list_sessions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Session>>;

    async fn list_sessions_by_mentor(&self, mentor_id: Uuid) -> PortResult<Vec<Session>>;

    /// Writes a new status, plus the rejection reason and/or payment status
    /// when the transition carries one.
    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        rejection_reason: Option<&str>,
        payment_status: Option<PaymentStatus>,
    ) -> PortResult<Session>;
}

/// Persistence for users and the opaque tokens backing auth cookies.
#[async_trait]
pub trait AuthStore: Send + Sync {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User>;

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials>;

    async fn create_auth_token(
        &self,
        token_id: &str,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()>;

    /// Validates an unexpired token of the given kind and returns its owner.
    async fn validate_auth_token(&self, token_id: &str, kind: TokenKind) -> PortResult<Uuid>;

    async fn get_auth_token(&self, token_id: &str) -> PortResult<AuthToken>;

    async fn delete_auth_token(&self, token_id: &str) -> PortResult<()>;
}
