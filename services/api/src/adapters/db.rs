//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete implementation
//! of the `SessionRepository` and `AuthStore` ports from the `core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use mentorshub_core::domain::{
    AuthToken, PaymentStatus, Pricing, Session, SessionFormat, SessionStatus, TokenKind, User,
    UserCredentials,
};
use mentorshub_core::ports::{AuthStore, PortError, PortResult, SessionRepository};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the `SessionRepository` and `AuthStore` ports.
#[derive(Clone)]
pub struct DbAdapter {
    pool: PgPool,
}

impl DbAdapter {
    /// Creates a new `DbAdapter`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::Error> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

// Enum-valued columns are stored as TEXT; `to_domain` parses them and treats
// unknown values as corrupt rows.

#[derive(FromRow)]
struct SessionRecord {
    id: Uuid,
    mentor_id: Uuid,
    user_id: Uuid,
    topic: String,
    session_type: String,
    session_format: String,
    date: NaiveDate,
    start_time: NaiveTime,
    end_time: NaiveTime,
    hours: i32,
    status: String,
    pricing: String,
    payment_status: Option<String>,
    total_amount: Option<f64>,
    message: Option<String>,
    rejection_reason: Option<String>,
    created_at: DateTime<Utc>,
}

impl SessionRecord {
    fn to_domain(self) -> PortResult<Session> {
        let status = SessionStatus::parse(&self.status)
            .ok_or_else(|| PortError::Unexpected(format!("invalid status '{}'", self.status)))?;
        let pricing = Pricing::parse(&self.pricing)
            .ok_or_else(|| PortError::Unexpected(format!("invalid pricing '{}'", self.pricing)))?;
        let session_format = SessionFormat::parse(&self.session_format).ok_or_else(|| {
            PortError::Unexpected(format!("invalid session format '{}'", self.session_format))
        })?;
        let payment_status = match self.payment_status {
            None => None,
            Some(raw) => Some(PaymentStatus::parse(&raw).ok_or_else(|| {
                PortError::Unexpected(format!("invalid payment status '{}'", raw))
            })?),
        };

        Ok(Session {
            id: self.id,
            mentor_id: self.mentor_id,
            user_id: self.user_id,
            topic: self.topic,
            session_type: self.session_type,
            session_format,
            date: self.date,
            start_time: self.start_time,
            end_time: self.end_time,
            hours: self.hours as u32,
            status,
            pricing,
            payment_status,
            total_amount: self.total_amount,
            message: self.message,
            rejection_reason: self.rejection_reason,
            created_at: self.created_at,
        })
    }
}

#[derive(FromRow)]
struct UserRecord {
    user_id: Uuid,
    email: Option<String>,
}

impl UserRecord {
    fn to_domain(self) -> User {
        User {
            user_id: self.user_id,
            email: self.email,
        }
    }
}

#[derive(FromRow)]
struct UserCredentialsRecord {
    user_id: Uuid,
    email: String,
    hashed_password: String,
}

impl UserCredentialsRecord {
    fn to_domain(self) -> UserCredentials {
        UserCredentials {
            user_id: self.user_id,
            email: self.email,
            hashed_password: self.hashed_password,
        }
    }
}

#[derive(FromRow)]
struct AuthTokenRecord {
    id: String,
    user_id: Uuid,
    kind: String,
    expires_at: DateTime<Utc>,
}

impl AuthTokenRecord {
    fn to_domain(self) -> PortResult<AuthToken> {
        let kind = TokenKind::parse(&self.kind)
            .ok_or_else(|| PortError::Unexpected(format!("invalid token kind '{}'", self.kind)))?;
        Ok(AuthToken {
            id: self.id,
            user_id: self.user_id,
            kind,
            expires_at: self.expires_at,
        })
    }
}

const SESSION_COLUMNS: &str = "id, mentor_id, user_id, topic, session_type, session_format, \
     date, start_time, end_time, hours, status, pricing, payment_status, total_amount, \
     message, rejection_reason, created_at";

//=========================================================================================
// `SessionRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl SessionRepository for DbAdapter {
    async fn create_session(&self, session: Session) -> PortResult<Session> {
        let sql = format!(
            "INSERT INTO sessions ({SESSION_COLUMNS}) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17) \
             RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(session.id)
            .bind(session.mentor_id)
            .bind(session.user_id)
            .bind(&session.topic)
            .bind(&session.session_type)
            .bind(session.session_format.as_str())
            .bind(session.date)
            .bind(session.start_time)
            .bind(session.end_time)
            .bind(session.hours as i32)
            .bind(session.status.as_str())
            .bind(session.pricing.as_str())
            .bind(session.payment_status.map(|p| p.as_str()))
            .bind(session.total_amount)
            .bind(&session.message)
            .bind(&session.rejection_reason)
            .bind(session.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        record.to_domain()
    }

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session> {
        let sql = format!("SELECT {SESSION_COLUMNS} FROM sessions WHERE id = $1");
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(session_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Session {} not found", session_id))
                }
                _ => PortError::Unexpected(e.to_string()),
            })?;
        record.to_domain()
    }

    async fn list_sessions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE user_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(user_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_sessions_by_mentor(&self, mentor_id: Uuid) -> PortResult<Vec<Session>> {
        let sql = format!(
            "SELECT {SESSION_COLUMNS} FROM sessions WHERE mentor_id = $1 ORDER BY created_at DESC"
        );
        let records = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(mentor_id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        rejection_reason: Option<&str>,
        payment_status: Option<PaymentStatus>,
    ) -> PortResult<Session> {
        let sql = format!(
            "UPDATE sessions SET status = $2, \
             rejection_reason = COALESCE($3, rejection_reason), \
             payment_status = COALESCE($4, payment_status) \
             WHERE id = $1 RETURNING {SESSION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, SessionRecord>(&sql)
            .bind(session_id)
            .bind(status.as_str())
            .bind(rejection_reason)
            .bind(payment_status.map(|p| p.as_str()))
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Session {} not found", session_id))
                }
                _ => PortError::Unexpected(e.to_string()),
            })?;
        record.to_domain()
    }
}

//=========================================================================================
// `AuthStore` Trait Implementation
//=========================================================================================

#[async_trait]
impl AuthStore for DbAdapter {
    async fn create_user_with_email(
        &self,
        email: &str,
        hashed_password: &str,
    ) -> PortResult<User> {
        let record = sqlx::query_as::<_, UserRecord>(
            "INSERT INTO users (user_id, email, hashed_password) VALUES ($1, $2, $3) \
             RETURNING user_id, email",
        )
        .bind(Uuid::new_v4())
        .bind(email)
        .bind(hashed_password)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(record.to_domain())
    }

    async fn get_user_by_email(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, UserCredentialsRecord>(
            "SELECT user_id, email, hashed_password FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => {
                PortError::NotFound(format!("User with email {} not found", email))
            }
            _ => PortError::Unexpected(e.to_string()),
        })?;
        Ok(record.to_domain())
    }

    async fn create_auth_token(
        &self,
        token_id: &str,
        user_id: Uuid,
        kind: TokenKind,
        expires_at: DateTime<Utc>,
    ) -> PortResult<()> {
        sqlx::query(
            "INSERT INTO auth_tokens (id, user_id, kind, expires_at) VALUES ($1, $2, $3, $4)",
        )
        .bind(token_id)
        .bind(user_id)
        .bind(kind.as_str())
        .bind(expires_at)
        .execute(&self.pool)
        .await
        .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }

    async fn validate_auth_token(&self, token_id: &str, kind: TokenKind) -> PortResult<Uuid> {
        let token = self.get_auth_token(token_id).await?;
        if token.kind != kind || token.expires_at < Utc::now() {
            return Err(PortError::Unauthorized);
        }
        Ok(token.user_id)
    }

    async fn get_auth_token(&self, token_id: &str) -> PortResult<AuthToken> {
        let record = sqlx::query_as::<_, AuthTokenRecord>(
            "SELECT id, user_id, kind, expires_at FROM auth_tokens WHERE id = $1",
        )
        .bind(token_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::Unauthorized,
            _ => PortError::Unexpected(e.to_string()),
        })?;
        record.to_domain()
    }

    async fn delete_auth_token(&self, token_id: &str) -> PortResult<()> {
        sqlx::query("DELETE FROM auth_tokens WHERE id = $1")
            .bind(token_id)
            .execute(&self.pool)
            .await
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        Ok(())
    }
}
