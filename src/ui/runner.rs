//! Server runner: router assembly and the serve loop.

use std::{net::SocketAddr, sync::Arc};

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::ui::{
    handler::{http as http_handler, websocket},
    signal::shutdown_signal,
    state::AppState,
};

/// Assemble the hub's router. Split out so tests can drive the exact same
/// routes against an in-process listener.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/ws", get(websocket::websocket_handler))
        .route("/api/health", get(http_handler::health_check))
        .route("/api/chat/history", get(http_handler::get_chat_history))
        .route("/internal/notifications", post(http_handler::push_notification))
        .route(
            "/internal/sessions/{session_id}/status",
            put(http_handler::update_session_status),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until a shutdown signal arrives.
pub async fn run(addr: SocketAddr, state: Arc<AppState>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("communication hub listening on {}", addr);

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
}
