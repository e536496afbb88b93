//! HTTP API DTOs for the communication hub.

use serde::{Deserialize, Serialize};

use crate::domain::RoomStatus;

/// Query for the chat history pass-through endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryQuery {
    pub user_a: String,
    pub user_b: String,
}

/// Body of the session-status mirror endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: RoomStatus,
}
