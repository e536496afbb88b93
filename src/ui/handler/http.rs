//! HTTP API endpoint handlers.
//!
//! 外向きは health と chat 履歴の read-through、内向き（collaborator 専用）
//! は通知プッシュとセッション状態ミラーの 2 本です。

use std::sync::Arc;

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};

use crate::{
    domain::{ChatMessageRecord, NotificationRecord, RoomError, SessionId, UserId},
    infrastructure::dto::{
        http::{HistoryQuery, StatusUpdateRequest},
        websocket::ServerEvent,
    },
    ui::state::AppState,
    usecase::{PushNotificationUseCase, SessionStatusUseCase},
};

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}

/// Read-through to the chat collaborator's conversation history.
pub async fn get_chat_history(
    State(state): State<Arc<AppState>>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<ChatMessageRecord>>, (StatusCode, String)> {
    let user_a = UserId::new(query.user_a)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;
    let user_b = UserId::new(query.user_b)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let history = state.chat_store.history(&user_a, &user_b).await.map_err(|e| {
        tracing::warn!("chat history fetch failed: {}", e);
        (
            StatusCode::BAD_GATEWAY,
            "chat history is unavailable".to_string(),
        )
    })?;

    Ok(Json(history))
}

/// Relay an already-persisted notification to its recipient, if online.
///
/// Called by the notification collaborator after it has stored the record;
/// an offline recipient is not an error, the push is simply dropped.
pub async fn push_notification(
    State(state): State<Arc<AppState>>,
    Json(record): Json<NotificationRecord>,
) -> (StatusCode, Json<serde_json::Value>) {
    let usecase = PushNotificationUseCase::new(state.registry.clone());
    let delivered = match usecase.execute(&record).await {
        Some(connection) => {
            state
                .deliver(
                    &connection,
                    &ServerEvent::NewNotification {
                        notification: record.clone(),
                    },
                )
                .await;
            true
        }
        None => {
            tracing::debug!(
                "recipient '{}' ({}) offline, dropping notification '{}'",
                record.recipient_id,
                record.recipient_role,
                record.id
            );
            false
        }
    };

    (
        StatusCode::ACCEPTED,
        Json(serde_json::json!({"delivered": delivered})),
    )
}

/// Mirror a session status transition pushed by the booking collaborator.
pub async fn update_session_status(
    State(state): State<Arc<AppState>>,
    Path(session_id): Path<String>,
    Json(request): Json<StatusUpdateRequest>,
) -> Result<StatusCode, (StatusCode, String)> {
    let session_id = SessionId::new(session_id)
        .map_err(|e| (StatusCode::BAD_REQUEST, e.to_string()))?;

    let usecase = SessionStatusUseCase::new(state.rooms.clone());
    match usecase.execute(&session_id, request.status).await {
        Ok(()) => Ok(StatusCode::NO_CONTENT),
        Err(e @ RoomError::SessionEnded(_))
        | Err(e @ RoomError::InvalidStatusTransition { .. }) => {
            Err((StatusCode::CONFLICT, e.to_string()))
        }
    }
}
