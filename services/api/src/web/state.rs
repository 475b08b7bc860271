//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use std::sync::Arc;

use mentorshub_core::ports::AuthStore;
use mentorshub_core::usecases::SessionUsecases;

use crate::config::Config;
use crate::web::rooms::RoomRegistry;

/// The shared application state, created once at startup and passed to all handlers.
#[derive(Clone)]
pub struct AppState {
    pub sessions: SessionUsecases,
    pub auth: Arc<dyn AuthStore>,
    pub config: Arc<Config>,
    pub rooms: Arc<RoomRegistry>,
}
