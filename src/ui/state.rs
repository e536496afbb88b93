//! Server state and connection management.

use std::{collections::HashMap, sync::Arc};

use tokio::sync::{Mutex, mpsc};

use crate::{
    domain::{ChatStore, ConnectionId, ConnectionRegistry, PresenceSubscriptions, RoomDirectory},
    infrastructure::{
        dto::websocket::ServerEvent, presence::InMemoryPresenceSubscriptions,
        registry::InMemoryConnectionRegistry, rooms::InMemoryRoomDirectory,
    },
};

/// Client connection information
pub struct ClientInfo {
    /// Outbound message channel drained by the connection's writer task
    pub sender: mpsc::UnboundedSender<String>,
}

/// Shared application state
///
/// Ports are injected so tests can instantiate independent hubs; there is
/// no module-level socket state anywhere.
pub struct AppState {
    pub registry: Arc<dyn ConnectionRegistry>,
    pub subscriptions: Arc<dyn PresenceSubscriptions>,
    pub rooms: Arc<dyn RoomDirectory>,
    pub chat_store: Arc<dyn ChatStore>,
    /// Every live transport by connection ref, registered or not. Inserted
    /// at socket accept, removed at socket close; delivery always resolves
    /// through this map.
    pub connections: Arc<Mutex<HashMap<ConnectionId, ClientInfo>>>,
}

impl AppState {
    /// Build a hub with in-memory registry/presence/rooms and the given
    /// chat collaborator.
    pub fn new(chat_store: Arc<dyn ChatStore>) -> Self {
        Self {
            registry: Arc::new(InMemoryConnectionRegistry::new()),
            subscriptions: Arc::new(InMemoryPresenceSubscriptions::new()),
            rooms: Arc::new(InMemoryRoomDirectory::new()),
            chat_store,
            connections: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Deliver an event to one connection. A missing or closed connection
    /// is a silent drop: the transport raced away, which is expected.
    pub async fn deliver(&self, connection: &ConnectionId, event: &ServerEvent) {
        // Serialization of our own event enums cannot fail
        let json = serde_json::to_string(event).unwrap();
        let connections = self.connections.lock().await;
        if let Some(info) = connections.get(connection) {
            if info.sender.send(json).is_err() {
                tracing::debug!("connection '{}' closed mid-delivery", connection);
            }
        } else {
            tracing::debug!("dropping event for unknown connection '{}'", connection);
        }
    }

    /// Deliver one event to several connections.
    pub async fn deliver_many(&self, recipients: &[ConnectionId], event: &ServerEvent) {
        let json = serde_json::to_string(event).unwrap();
        let connections = self.connections.lock().await;
        for connection in recipients {
            if let Some(info) = connections.get(connection)
                && info.sender.send(json.clone()).is_err()
            {
                tracing::debug!("connection '{}' closed mid-delivery", connection);
            }
        }
    }
}
