//! crates/mentorshub_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use uuid::Uuid;

/// The lifecycle state of a booked mentorship session.
///
/// Transitions are one-directional: `Pending -> Approved -> Upcoming ->
/// Completed`, with `Canceled` reachable from `Pending`, `Approved` or
/// `Upcoming`, and `Rejected` only from `Pending`. `Completed`, `Canceled`
/// and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Pending,
    Approved,
    Upcoming,
    Completed,
    Canceled,
    Rejected,
}

impl SessionStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionStatus::Pending => "pending",
            SessionStatus::Approved => "approved",
            SessionStatus::Upcoming => "upcoming",
            SessionStatus::Completed => "completed",
            SessionStatus::Canceled => "canceled",
            SessionStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(SessionStatus::Pending),
            "approved" => Some(SessionStatus::Approved),
            "upcoming" => Some(SessionStatus::Upcoming),
            "completed" => Some(SessionStatus::Completed),
            "canceled" => Some(SessionStatus::Canceled),
            "rejected" => Some(SessionStatus::Rejected),
            _ => None,
        }
    }

    /// Terminal states admit no further transitions.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            SessionStatus::Completed | SessionStatus::Canceled | SessionStatus::Rejected
        )
    }
}

/// Whether a session is a one-on-one meeting or a group event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionFormat {
    OneOnOne,
    Group,
}

impl SessionFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionFormat::OneOnOne => "one-on-one",
            SessionFormat::Group => "group",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "one-on-one" => Some(SessionFormat::OneOnOne),
            "group" => Some(SessionFormat::Group),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pricing {
    Free,
    Paid,
}

impl Pricing {
    pub fn as_str(&self) -> &'static str {
        match self {
            Pricing::Free => "free",
            Pricing::Paid => "paid",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "free" => Some(Pricing::Free),
            "paid" => Some(Pricing::Paid),
            _ => None,
        }
    }
}

/// Payment state of a paid session. A `Pricing::Paid` session always
/// carries one of these; free sessions carry none.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Pending,
    Completed,
    Failed,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Completed => "completed",
            PaymentStatus::Failed => "failed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "pending" => Some(PaymentStatus::Pending),
            "completed" => Some(PaymentStatus::Completed),
            "failed" => Some(PaymentStatus::Failed),
            _ => None,
        }
    }
}

/// A booked mentorship slot between a user and a mentor.
///
/// Sessions are never deleted; every lifecycle change is a status
/// transition on the stored row.
#[derive(Debug, Clone)]
pub struct Session {
    pub id: Uuid,
    pub mentor_id: Uuid,
    pub user_id: Uuid,
    pub topic: String,
    pub session_type: String,
    pub session_format: SessionFormat,
    pub date: NaiveDate,
    pub start_time: NaiveTime,
    /// Derived from `start_time + hours`, wrapping at the 24h boundary.
    pub end_time: NaiveTime,
    pub hours: u32,
    pub status: SessionStatus,
    pub pricing: Pricing,
    pub payment_status: Option<PaymentStatus>,
    pub total_amount: Option<f64>,
    pub message: Option<String>,
    pub rejection_reason: Option<String>,
    pub created_at: DateTime<Utc>,
}

// Represents a user - used throughout app
#[derive(Debug, Clone)]
pub struct User {
    pub user_id: Uuid,
    pub email: Option<String>,
}

// Only used internally for login/signup - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub user_id: Uuid,
    pub email: String,
    pub hashed_password: String,
}

/// Which of the two auth cookies a stored token backs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    Access,
    Refresh,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TokenKind::Access => "access",
            TokenKind::Refresh => "refresh",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "access" => Some(TokenKind::Access),
            "refresh" => Some(TokenKind::Refresh),
            _ => None,
        }
    }
}

// Represents a browser login token (auth cookie backing row)
#[derive(Debug, Clone)]
pub struct AuthToken {
    pub id: String,
    pub user_id: Uuid,
    pub kind: TokenKind,
    pub expires_at: DateTime<Utc>,
}
