//! Integration tests for the session lifecycle use cases.
//!
//! These run against an in-memory repository so the state machine can be
//! exercised without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveTime};
use mentorshub_core::domain::{
    PaymentStatus, Pricing, Session, SessionFormat, SessionStatus,
};
use mentorshub_core::ports::{PortError, PortResult, SessionRepository};
use mentorshub_core::usecases::{BookSessionInput, SessionError, SessionUsecases};
use uuid::Uuid;

// ---------------------------------------------------------------------------
// In-memory repository
// ---------------------------------------------------------------------------

#[derive(Default)]
struct MemoryRepo {
    sessions: Mutex<HashMap<Uuid, Session>>,
}

#[async_trait]
impl SessionRepository for MemoryRepo {
    async fn create_session(&self, session: Session) -> PortResult<Session> {
        self.sessions
            .lock()
            .unwrap()
            .insert(session.id, session.clone());
        Ok(session)
    }

    async fn get_session_by_id(&self, session_id: Uuid) -> PortResult<Session> {
        self.sessions
            .lock()
            .unwrap()
            .get(&session_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(session_id.to_string()))
    }

    async fn list_sessions_by_user(&self, user_id: Uuid) -> PortResult<Vec<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_sessions_by_mentor(&self, mentor_id: Uuid) -> PortResult<Vec<Session>> {
        Ok(self
            .sessions
            .lock()
            .unwrap()
            .values()
            .filter(|s| s.mentor_id == mentor_id)
            .cloned()
            .collect())
    }

    async fn update_session_status(
        &self,
        session_id: Uuid,
        status: SessionStatus,
        rejection_reason: Option<&str>,
        payment_status: Option<PaymentStatus>,
    ) -> PortResult<Session> {
        let mut sessions = self.sessions.lock().unwrap();
        let session = sessions
            .get_mut(&session_id)
            .ok_or_else(|| PortError::NotFound(session_id.to_string()))?;
        session.status = status;
        if let Some(reason) = rejection_reason {
            session.rejection_reason = Some(reason.to_string());
        }
        if payment_status.is_some() {
            session.payment_status = payment_status;
        }
        Ok(session.clone())
    }
}

fn usecases() -> (SessionUsecases, Arc<MemoryRepo>) {
    let repo = Arc::new(MemoryRepo::default());
    (SessionUsecases::new(repo.clone()), repo)
}

fn booking(pricing: Pricing) -> BookSessionInput {
    BookSessionInput {
        mentor_id: Uuid::new_v4(),
        user_id: Uuid::new_v4(),
        topic: "Intro to systems design".to_string(),
        session_type: "career".to_string(),
        session_format: SessionFormat::OneOnOne,
        date: NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        start_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
        hours: 3,
        pricing,
        total_amount: match pricing {
            Pricing::Paid => Some(45.0),
            Pricing::Free => None,
        },
        message: None,
        payment_completed: false,
    }
}

// ---------------------------------------------------------------------------
// Booking
// ---------------------------------------------------------------------------

#[tokio::test]
async fn booking_derives_wrapped_end_time() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();

    assert_eq!(session.end_time, NaiveTime::from_hms_opt(2, 0, 0).unwrap());
}

#[tokio::test]
async fn free_booking_is_pending_without_payment_status() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();

    assert_eq!(session.status, SessionStatus::Pending);
    assert!(session.payment_status.is_none());
}

#[tokio::test]
async fn paid_booking_without_confirmed_payment_stays_pending() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Paid)).await.unwrap();

    assert_eq!(session.status, SessionStatus::Pending);
    assert_eq!(session.payment_status, Some(PaymentStatus::Pending));
}

#[tokio::test]
async fn paid_booking_with_confirmed_payment_is_upcoming() {
    let (uc, _) = usecases();
    let mut input = booking(Pricing::Paid);
    input.payment_completed = true;

    let session = uc.book(input).await.unwrap();

    assert_eq!(session.status, SessionStatus::Upcoming);
    assert_eq!(session.payment_status, Some(PaymentStatus::Completed));
}

#[tokio::test]
async fn paid_booking_requires_amount() {
    let (uc, _) = usecases();
    let mut input = booking(Pricing::Paid);
    input.total_amount = None;

    let result = uc.book(input).await;
    assert!(matches!(result, Err(SessionError::Validation(_))));
}

#[tokio::test]
async fn booking_rejects_durations_longer_than_a_day() {
    let (uc, _) = usecases();

    let mut input = booking(Pricing::Free);
    input.hours = 25;
    let result = uc.book(input).await;
    assert!(matches!(result, Err(SessionError::Validation(_))));

    // Straight off the wire a duration can be any u32; it must be rejected,
    // not wrapped into a plausible-looking end time.
    let mut input = booking(Pricing::Free);
    input.hours = u32::MAX;
    let result = uc.book(input).await;
    assert!(matches!(result, Err(SessionError::Validation(_))));
}

#[tokio::test]
async fn booking_rejects_empty_topic() {
    let (uc, _) = usecases();
    let mut input = booking(Pricing::Free);
    input.topic = "   ".to_string();

    let result = uc.book(input).await;
    assert!(matches!(result, Err(SessionError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Transitions
// ---------------------------------------------------------------------------

#[tokio::test]
async fn approve_moves_pending_to_approved() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();

    let approved = uc.approve(session.id).await.unwrap();
    assert_eq!(approved.status, SessionStatus::Approved);
}

#[tokio::test]
async fn approve_fails_outside_pending_and_leaves_status_unchanged() {
    let (uc, repo) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();
    uc.approve(session.id).await.unwrap();

    let result = uc.approve(session.id).await;
    assert!(matches!(result, Err(SessionError::InvalidTransition(_))));

    let stored = repo.get_session_by_id(session.id).await.unwrap();
    assert_eq!(stored.status, SessionStatus::Approved);
}

#[tokio::test]
async fn reject_requires_reason_and_stores_it() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();

    let result = uc.reject(session.id, "").await;
    assert!(matches!(result, Err(SessionError::Validation(_))));

    let rejected = uc
        .reject(session.id, "schedule conflict")
        .await
        .unwrap();
    assert_eq!(rejected.status, SessionStatus::Rejected);
    assert_eq!(rejected.rejection_reason.as_deref(), Some("schedule conflict"));
}

#[tokio::test]
async fn reject_fails_on_non_pending_session() {
    let (uc, repo) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();
    uc.cancel(session.id).await.unwrap();

    let result = uc.reject(session.id, "too late").await;
    assert!(matches!(result, Err(SessionError::InvalidTransition(_))));

    let stored = repo.get_session_by_id(session.id).await.unwrap();
    assert_eq!(stored.status, SessionStatus::Canceled);
    assert!(stored.rejection_reason.is_none());
}

#[tokio::test]
async fn cancel_reachable_from_pending_approved_and_upcoming() {
    let (uc, _) = usecases();

    let pending = uc.book(booking(Pricing::Free)).await.unwrap();
    assert_eq!(
        uc.cancel(pending.id).await.unwrap().status,
        SessionStatus::Canceled
    );

    let approved = uc.book(booking(Pricing::Free)).await.unwrap();
    uc.approve(approved.id).await.unwrap();
    assert_eq!(
        uc.cancel(approved.id).await.unwrap().status,
        SessionStatus::Canceled
    );

    let mut paid = booking(Pricing::Paid);
    paid.payment_completed = true;
    let upcoming = uc.book(paid).await.unwrap();
    assert_eq!(
        uc.cancel(upcoming.id).await.unwrap().status,
        SessionStatus::Canceled
    );
}

#[tokio::test]
async fn cancel_is_terminal() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();
    uc.cancel(session.id).await.unwrap();

    let result = uc.cancel(session.id).await;
    assert!(matches!(result, Err(SessionError::InvalidTransition(_))));
}

#[tokio::test]
async fn complete_valid_from_approved_or_upcoming_only() {
    let (uc, _) = usecases();

    let session = uc.book(booking(Pricing::Free)).await.unwrap();
    let result = uc.complete(session.id).await;
    assert!(matches!(result, Err(SessionError::InvalidTransition(_))));

    uc.approve(session.id).await.unwrap();
    let completed = uc.complete(session.id).await.unwrap();
    assert_eq!(completed.status, SessionStatus::Completed);
}

#[tokio::test]
async fn mark_upcoming_confirms_payment_for_paid_sessions() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Paid)).await.unwrap();
    uc.approve(session.id).await.unwrap();

    let upcoming = uc.mark_upcoming(session.id).await.unwrap();
    assert_eq!(upcoming.status, SessionStatus::Upcoming);
    assert_eq!(upcoming.payment_status, Some(PaymentStatus::Completed));
}

#[tokio::test]
async fn free_session_reaches_upcoming_without_payment_status() {
    let (uc, _) = usecases();
    let session = uc.book(booking(Pricing::Free)).await.unwrap();
    uc.approve(session.id).await.unwrap();

    let upcoming = uc.mark_upcoming(session.id).await.unwrap();
    assert_eq!(upcoming.status, SessionStatus::Upcoming);
    assert!(upcoming.payment_status.is_none());
}

#[tokio::test]
async fn operations_on_missing_session_report_not_found() {
    let (uc, _) = usecases();

    let result = uc.approve(Uuid::new_v4()).await;
    assert!(matches!(
        result,
        Err(SessionError::Port(PortError::NotFound(_)))
    ));
}

#[tokio::test]
async fn listings_filter_by_party() {
    let (uc, _) = usecases();
    let input = booking(Pricing::Free);
    let user_id = input.user_id;
    let mentor_id = input.mentor_id;
    uc.book(input).await.unwrap();
    uc.book(booking(Pricing::Free)).await.unwrap();

    let for_user = uc.list_by_user(user_id).await.unwrap();
    assert_eq!(for_user.len(), 1);

    let for_mentor = uc.list_by_mentor(mentor_id).await.unwrap();
    assert_eq!(for_mentor.len(), 1);
}
