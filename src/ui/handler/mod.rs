//! UI 層のリクエストハンドラ（WebSocket / HTTP）

pub mod http;
pub mod websocket;
