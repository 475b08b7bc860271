pub mod domain;
pub mod ports;
pub mod schedule;
pub mod usecases;

pub use domain::{
    AuthToken, PaymentStatus, Pricing, Session, SessionFormat, SessionStatus, TokenKind, User,
    UserCredentials,
};
pub use ports::{AuthStore, PortError, PortResult, SessionRepository};
pub use schedule::{can_join_session_now, is_session_expired, JoinWindow, DEFAULT_EARLY_JOIN_MINUTES};
pub use usecases::{BookSessionInput, SessionError, SessionResult, SessionUsecases};
