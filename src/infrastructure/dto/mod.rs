//! Data transfer objects for the hub's wire surfaces.

pub mod http;
pub mod websocket;
