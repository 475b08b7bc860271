//! crates/mentorshub_core/src/usecases.rs
//!
//! Session lifecycle use cases. Each operation checks the state machine
//! against the stored session before writing, so a failed transition never
//! touches the persisted status.

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

use crate::domain::{PaymentStatus, Pricing, Session, SessionFormat, SessionStatus};
use crate::ports::{PortError, SessionRepository};
use crate::schedule::{self, JoinWindow};

/// Errors surfaced by the session use cases.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("Invalid session data: {0}")]
    Validation(String),
    #[error("Invalid status transition: {0}")]
    InvalidTransition(String),
    #[error(transparent)]
    Port(#[from] PortError),
}

pub type SessionResult<T> = Result<T, SessionError>;

/// Input for booking a new session.
#[derive(Debug, Clone)]
pub struct BookSessionInput {
    pub mentor_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub session_type: String,
    pub session_format: SessionFormat,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    pub hours: u32,
    pub pricing: Pricing,
    pub total_amount: Option<f64>,
    pub message: Option<String>,
    /// Whether a paid booking already carries a confirmed payment.
    pub payment_completed: bool,
}

/// The session lifecycle service, operating through the repository port.
#[derive(Clone)]
pub struct SessionUsecases {
    repo: Arc<dyn SessionRepository>,
}

impl SessionUsecases {
    pub fn new(repo: Arc<dyn SessionRepository>) -> Self {
        Self { repo }
    }

    /// Books a session. Free sessions start `Pending` awaiting mentor
    /// approval; paid sessions become `Upcoming` only once their payment is
    /// confirmed, otherwise they also wait in `Pending`.
    pub async fn book(&self, input: BookSessionInput) -> SessionResult<Session> {
        if input.topic.trim().is_empty() {
            return Err(SessionError::Validation("topic must not be empty".into()));
        }
        if input.hours == 0 {
            return Err(SessionError::Validation(
                "session must last at least one hour".into(),
            ));
        }
        if input.hours > 24 {
            return Err(SessionError::Validation(
                "session may last at most 24 hours".into(),
            ));
        }
        if input.pricing == Pricing::Paid && input.total_amount.is_none() {
            return Err(SessionError::Validation(
                "paid sessions require a total amount".into(),
            ));
        }

        let (status, payment_status) = match input.pricing {
            Pricing::Free => (SessionStatus::Pending, None),
            Pricing::Paid if input.payment_completed => {
                (SessionStatus::Upcoming, Some(PaymentStatus::Completed))
            }
            Pricing::Paid => (SessionStatus::Pending, Some(PaymentStatus::Pending)),
        };

        let session = Session {
            id: Uuid::new_v4(),
            mentor_id: input.mentor_id,
            user_id: input.user_id,
            topic: input.topic,
            session_type: input.session_type,
            session_format: input.session_format,
            date: input.date,
            start_time: input.start_time,
            end_time: schedule::end_time_after(input.start_time, input.hours),
            hours: input.hours,
            status,
            pricing: input.pricing,
            payment_status,
            total_amount: input.total_amount,
            message: input.message,
            rejection_reason: None,
            created_at: Utc::now(),
        };

        Ok(self.repo.create_session(session).await?)
    }

    /// Mentor approval. Valid only from `Pending`.
    pub async fn approve(&self, session_id: Uuid) -> SessionResult<Session> {
        let session = self.repo.get_session_by_id(session_id).await?;
        require_status(&session, &[SessionStatus::Pending], "approve")?;
        Ok(self
            .repo
            .update_session_status(session_id, SessionStatus::Approved, None, None)
            .await?)
    }

    /// Mentor rejection. Valid only from `Pending`; the reason is stored
    /// for user visibility.
    pub async fn reject(&self, session_id: Uuid, reason: &str) -> SessionResult<Session> {
        if reason.trim().is_empty() {
            return Err(SessionError::Validation(
                "a rejection reason is required".into(),
            ));
        }
        let session = self.repo.get_session_by_id(session_id).await?;
        require_status(&session, &[SessionStatus::Pending], "reject")?;
        Ok(self
            .repo
            .update_session_status(session_id, SessionStatus::Rejected, Some(reason), None)
            .await?)
    }

    /// Cancellation by either party. Valid from `Pending`, `Approved` or
    /// `Upcoming`. Irreversible; refund handling lives elsewhere.
    pub async fn cancel(&self, session_id: Uuid) -> SessionResult<Session> {
        let session = self.repo.get_session_by_id(session_id).await?;
        require_status(
            &session,
            &[
                SessionStatus::Pending,
                SessionStatus::Approved,
                SessionStatus::Upcoming,
            ],
            "cancel",
        )?;
        Ok(self
            .repo
            .update_session_status(session_id, SessionStatus::Canceled, None, None)
            .await?)
    }

    /// Marks a session as held. Valid from `Approved` or `Upcoming`.
    pub async fn complete(&self, session_id: Uuid) -> SessionResult<Session> {
        let session = self.repo.get_session_by_id(session_id).await?;
        require_status(
            &session,
            &[SessionStatus::Approved, SessionStatus::Upcoming],
            "complete",
        )?;
        Ok(self
            .repo
            .update_session_status(session_id, SessionStatus::Completed, None, None)
            .await?)
    }

    /// Moves an approved session to `Upcoming` once it is ready to run
    /// (payment confirmed, or free).
    pub async fn mark_upcoming(&self, session_id: Uuid) -> SessionResult<Session> {
        let session = self.repo.get_session_by_id(session_id).await?;
        require_status(&session, &[SessionStatus::Approved], "mark upcoming")?;
        let payment = match session.pricing {
            Pricing::Paid => Some(PaymentStatus::Completed),
            Pricing::Free => None,
        };
        Ok(self
            .repo
            .update_session_status(session_id, SessionStatus::Upcoming, None, payment)
            .await?)
    }

    pub async fn get(&self, session_id: Uuid) -> SessionResult<Session> {
        Ok(self.repo.get_session_by_id(session_id).await?)
    }

    pub async fn list_by_user(&self, user_id: Uuid) -> SessionResult<Vec<Session>> {
        Ok(self.repo.list_sessions_by_user(user_id).await?)
    }

    pub async fn list_by_mentor(&self, mentor_id: Uuid) -> SessionResult<Vec<Session>> {
        Ok(self.repo.list_sessions_by_mentor(mentor_id).await?)
    }

    /// Evaluates the early-join window for a session at `now`.
    pub async fn check_join(
        &self,
        session_id: Uuid,
        early_join_minutes: i64,
        now: DateTime<Utc>,
    ) -> SessionResult<JoinWindow> {
        let session = self.repo.get_session_by_id(session_id).await?;
        Ok(schedule::can_join_session_now(
            session.date,
            session.start_time,
            session.hours,
            early_join_minutes,
            now,
        ))
    }
}

fn require_status(
    session: &Session,
    allowed: &[SessionStatus],
    action: &str,
) -> SessionResult<()> {
    if allowed.contains(&session.status) {
        Ok(())
    } else {
        Err(SessionError::InvalidTransition(format!(
            "cannot {} a session in '{}' state",
            action,
            session.status.as_str()
        )))
    }
}
