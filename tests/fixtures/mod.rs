//! Shared fixtures for integration tests.
//!
//! テストごとに独立した hub を OS 割り当てポートで立ち上げ、
//! reqwest / tokio-tungstenite のクライアントから叩きます。

// 各テストバイナリが使うヘルパーの組み合わせは異なる
#![allow(dead_code)]

use std::{net::SocketAddr, sync::Arc, time::Duration};

use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use fitlink_hub::{
    common::logger::setup_logger, infrastructure::collaborator::InMemoryChatStore,
    ui::state::AppState,
};

/// A hub instance serving on an ephemeral local port.
pub struct TestServer {
    addr: SocketAddr,
    pub chat_store: Arc<InMemoryChatStore>,
}

impl TestServer {
    /// Start a fresh hub with in-memory state.
    pub async fn start() -> Self {
        setup_logger("fitlink_hub", "debug");

        let chat_store = Arc::new(InMemoryChatStore::new());
        let state = Arc::new(AppState::new(chat_store.clone()));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Failed to read local addr");

        let app = fitlink_hub::app(state);
        tokio::spawn(async move {
            axum::serve(listener, app).await.expect("Server crashed");
        });

        Self { addr, chat_store }
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn ws_url(&self) -> String {
        format!("ws://{}/ws", self.addr)
    }

    /// Open a WebSocket client against this hub.
    pub async fn connect(&self) -> WsClient {
        let (stream, _) = connect_async(self.ws_url())
            .await
            .expect("Failed to connect websocket");
        WsClient { stream }
    }
}

/// Thin JSON-speaking wrapper around a tungstenite client.
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Send one JSON event.
    pub async fn send(&mut self, event: serde_json::Value) {
        self.stream
            .send(Message::Text(event.to_string().into()))
            .await
            .expect("Failed to send websocket message");
    }

    /// Receive the next JSON event, skipping control frames.
    pub async fn recv(&mut self) -> serde_json::Value {
        let deadline = Duration::from_secs(5);
        loop {
            let msg = tokio::time::timeout(deadline, self.stream.next())
                .await
                .expect("Timed out waiting for websocket event")
                .expect("Websocket closed unexpectedly")
                .expect("Websocket read error");
            if let Message::Text(text) = msg {
                return serde_json::from_str(&text).expect("Event was not valid JSON");
            }
        }
    }

    /// Receive the next event and assert its `type`.
    pub async fn recv_event(&mut self, expected_type: &str) -> serde_json::Value {
        let event = self.recv().await;
        assert_eq!(
            event["type"], expected_type,
            "unexpected event: {event}"
        );
        event
    }

    /// Assert that no event arrives within a short window.
    pub async fn expect_silence(&mut self) {
        let result = tokio::time::timeout(Duration::from_millis(300), self.stream.next()).await;
        if let Ok(Some(Ok(Message::Text(text)))) = result {
            panic!("expected no event, got: {text}");
        }
    }

    /// Register this client and return the hub-assigned connection ref.
    pub async fn register(&mut self, role: &str, identity: &str) -> String {
        self.send(serde_json::json!({
            "type": format!("register-{role}"),
            "identity": identity,
        }))
        .await;
        let ack = self.recv_event("registered").await;
        assert_eq!(ack["role"], role);
        ack["connection_id"]
            .as_str()
            .expect("registered ack missing connection_id")
            .to_string()
    }

    /// Close the transport from the client side.
    pub async fn close(mut self) {
        self.stream
            .close(None)
            .await
            .expect("Failed to close websocket");
    }
}
