//! Real-time communication hub for the Fitlink coaching marketplace.
//!
//! Binds long-lived WebSocket connections to role-qualified identities
//! (member / coach / operator), tracks presence, relays chat messages,
//! pushes notifications and coordinates mesh video-call signaling for
//! session-scoped rooms. Booking, payments and profile CRUD live in
//! other services; this crate only owns connection-scoped state.

pub mod common;
pub mod domain;
pub mod infrastructure;
pub mod ui;
pub mod usecase;

pub use ui::{app, run};
