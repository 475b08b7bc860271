//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        approve_session_handler,
        auth::{login_handler, logout_handler, refresh_handler, signup_handler},
        book_session_handler, cancel_session_handler, complete_session_handler,
        join_check_handler, list_mentor_sessions_handler, list_user_sessions_handler,
        middleware::require_auth,
        reject_session_handler,
        rest::ApiDoc,
        rooms::RoomRegistry,
        state::AppState,
        ws_handler,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{get, post},
    Router,
};
use mentorshub_core::usecases::SessionUsecases;
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let rooms = Arc::new(RoomRegistry::new());
    let app_state = Arc::new(AppState {
        sessions: SessionUsecases::new(db_adapter.clone()),
        auth: db_adapter,
        config: config.clone(),
        rooms: rooms.clone(),
    });

    let cors = CorsLayer::new()
        .allow_origin(
            config
                .cors_origin
                .parse::<HeaderValue>()
                .map_err(|e| ApiError::Internal(format!("Invalid CORS_ORIGIN: {}", e)))?,
        )
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/signup", post(signup_handler))
        .route("/auth/login", post(login_handler))
        .route("/auth/refresh", post(refresh_handler))
        .route("/auth/logout", post(logout_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/sessions", post(book_session_handler))
        .route("/sessions/user", get(list_user_sessions_handler))
        .route("/sessions/mentor", get(list_mentor_sessions_handler))
        .route("/sessions/{id}/approve", post(approve_session_handler))
        .route("/sessions/{id}/reject", post(reject_session_handler))
        .route("/sessions/{id}/cancel", post(cancel_session_handler))
        .route("/sessions/{id}/complete", post(complete_session_handler))
        .route("/sessions/{id}/join-check", get(join_check_handler))
        .route("/ws", get(ws_handler))
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(rooms))
        .await?;

    Ok(())
}

/// Waits for Ctrl-C, then closes every signaling connection so clients see
/// a Close frame instead of a dropped socket.
async fn shutdown_signal(rooms: Arc<RoomRegistry>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        info!("Shutdown signal received.");
        rooms.shutdown_all().await;
    }
}
