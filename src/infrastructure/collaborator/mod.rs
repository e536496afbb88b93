//! External collaborator clients.
//!
//! The hub consumes the chat-persistence REST collaborator through the
//! domain `ChatStore` port: an HTTP client for production and an in-memory
//! implementation for tests and local runs.

pub mod http;
pub mod inmemory;

pub use http::HttpChatStore;
pub use inmemory::InMemoryChatStore;
