pub mod auth;
pub mod middleware;
pub mod protocol;
pub mod rest;
pub mod rooms;
pub mod state;
pub mod ws_handler;

// Re-export the main WebSocket handler to make it easily accessible
// to the binary that will build the web server router.
pub use middleware::require_auth;
pub use rest::{
    approve_session_handler, book_session_handler, cancel_session_handler,
    complete_session_handler, join_check_handler, list_mentor_sessions_handler,
    list_user_sessions_handler, reject_session_handler,
};
pub use rooms::RoomRegistry;
pub use ws_handler::ws_handler;
