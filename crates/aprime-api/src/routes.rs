//! Router construction and server startup.

use std::future::Future;

use axum::extract::DefaultBodyLimit;
use axum::http::Method;
use axum::routing::{delete, get, post};
use axum::Router;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use aprime_core::error::AprimeError;

use crate::handlers;
use crate::state::AppState;

/// Request body limit for every route.
const BODY_LIMIT_BYTES: usize = 1024 * 1024;

/// Build the axum router with all API routes and middleware.
pub fn create_router(state: AppState) -> Router {
    // The web client is served from its own origin.
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    let api_routes = Router::new()
        .route("/sessions", get(handlers::list_sessions))
        .route("/sessions/{id}", delete(handlers::delete_session))
        .route("/new_chat", post(handlers::new_chat))
        .route("/chat_history/{id}", get(handlers::chat_history))
        .route("/chat", post(handlers::chat));

    Router::new()
        .route("/health", get(handlers::health))
        .nest("/api", api_routes)
        .layer(DefaultBodyLimit::max(BODY_LIMIT_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

/// Serve the API on `addr` until `shutdown` resolves.
pub async fn start_server<F>(addr: &str, state: AppState, shutdown: F) -> Result<(), AprimeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| AprimeError::Api(format!("Failed to bind {}: {}", addr, e)))?;

    tracing::info!("Starting API server on {}", addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await
        .map_err(|e| AprimeError::Api(format!("Server error: {}", e)))?;

    tracing::info!("API server stopped");
    Ok(())
}
