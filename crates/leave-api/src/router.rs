//! Router configuration and server setup.

use axum::{
    http::HeaderValue,
    routing::{delete, get, post},
    Router,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ApiConfig;
use crate::handlers;
use crate::state::AppState;

fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| match o.parse() {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!(origin = %o, "Ignoring invalid CORS origin");
                    None
                }
            })
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Creates the API router with all routes configured.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config);

    Router::new()
        // Health
        .route("/api/health", get(handlers::health))
        // Telegram
        .route(
            "/telegram/webhook",
            post(handlers::telegram_webhook).get(handlers::telegram_webhook_info),
        )
        .route(
            "/telegram/setup-user",
            post(handlers::setup_user).get(handlers::setup_user_usage),
        )
        // Leave requests
        .route(
            "/api/users/:id/leave-requests",
            get(handlers::list_user_leave_requests),
        )
        .route("/api/users/:id/leave-stats", get(handlers::user_leave_stats))
        .route(
            "/api/leave-requests",
            get(handlers::list_leave_requests).post(handlers::create_leave_request),
        )
        .route(
            "/api/leave-requests/:id",
            delete(handlers::delete_leave_request),
        )
        .route(
            "/api/leave-requests/:id/approve",
            post(handlers::approve_leave_request),
        )
        .route(
            "/api/leave-requests/:id/reject",
            post(handlers::reject_leave_request),
        )
        // Apply middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Starts the API server.
pub async fn serve(config: ApiConfig, state: AppState) -> Result<(), std::io::Error> {
    let addr = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("API server listening on {}", addr);
    axum::serve(listener, create_router(state)).await
}
