//! crates/mentorshub_core/src/schedule.rs
//!
//! Time arithmetic for session scheduling: end-time derivation, expiry,
//! and the early-join window. All instants are evaluated in UTC.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, Timelike, Utc};

/// How many minutes before the scheduled start a participant may join.
pub const DEFAULT_EARLY_JOIN_MINUTES: i64 = 5;

/// Derives the end time of a session from its start time and duration.
///
/// The hour component wraps at the 24h boundary; the minute component is
/// preserved unchanged. `23:00 + 3h` gives `02:00`.
pub fn end_time_after(start: NaiveTime, hours: u32) -> NaiveTime {
    // Reduce the duration first so the sum stays well below u32::MAX even
    // for unvalidated inputs.
    let hour = (start.hour() + hours % 24) % 24;
    // Hour is already reduced mod 24 and minute/second come from a valid
    // NaiveTime, so this cannot fail.
    NaiveTime::from_hms_opt(hour, start.minute(), start.second())
        .unwrap_or(start)
}

/// The UTC instant at which a session begins.
pub fn start_instant(date: NaiveDate, start_time: NaiveTime) -> DateTime<Utc> {
    date.and_time(start_time).and_utc()
}

/// The UTC instant at which a session ends.
///
/// When the derived end time wraps past midnight the session ends on the
/// following day.
pub fn end_instant(date: NaiveDate, start_time: NaiveTime, hours: u32) -> DateTime<Utc> {
    let end_time = end_time_after(start_time, hours);
    let end_date = if end_time <= start_time && hours > 0 {
        date + Duration::days(1)
    } else {
        date
    };
    end_date.and_time(end_time).and_utc()
}

/// Whether the session's scheduled window has already passed.
///
/// This is a read-time predicate, not a stored state: nothing marks a
/// session expired, callers evaluate it against `now`.
pub fn is_session_expired(
    date: NaiveDate,
    start_time: NaiveTime,
    hours: u32,
    now: DateTime<Utc>,
) -> bool {
    now > end_instant(date, start_time, hours)
}

/// Outcome of a join-eligibility check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinWindow {
    Allowed,
    /// The early-join window has not opened yet.
    NotYetOpen,
    /// The session's scheduled window has passed.
    Expired,
}

impl JoinWindow {
    pub fn is_allowed(&self) -> bool {
        matches!(self, JoinWindow::Allowed)
    }

    /// A short human-readable reason for a denied join, `None` when allowed.
    pub fn reason(&self) -> Option<&'static str> {
        match self {
            JoinWindow::Allowed => None,
            JoinWindow::NotYetOpen => Some("session has not started yet"),
            JoinWindow::Expired => Some("session has expired"),
        }
    }
}

/// Checks whether joining is permitted at `now`.
///
/// The window opens `early_join_minutes` before the scheduled start and
/// closes when the session expires. Outside the window the caller gets a
/// reason, not an error: there is nothing to retry, they wait or abandon.
pub fn can_join_session_now(
    date: NaiveDate,
    start_time: NaiveTime,
    hours: u32,
    early_join_minutes: i64,
    now: DateTime<Utc>,
) -> JoinWindow {
    let opens_at = start_instant(date, start_time) - Duration::minutes(early_join_minutes);
    if now < opens_at {
        return JoinWindow::NotYetOpen;
    }
    if is_session_expired(date, start_time, hours, now) {
        return JoinWindow::Expired;
    }
    JoinWindow::Allowed
}
