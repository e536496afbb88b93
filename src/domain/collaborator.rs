//! Ports for external REST collaborators.
//!
//! Chat persistence lives outside the hub; messages are persisted there
//! *before* any relay so history order is always the true send order.

use async_trait::async_trait;
use thiserror::Error;

use super::{
    entity::ChatMessageRecord,
    value_object::{MessageBody, UserId},
};

/// Errors from external collaborator calls.
#[derive(Debug, Error)]
pub enum CollaboratorError {
    /// Transport-level failure (connection refused, timeout, bad body)
    #[error("collaborator request failed: {0}")]
    Request(String),

    /// Collaborator answered with a non-success status
    #[error("collaborator returned status {status}")]
    Status { status: u16 },
}

/// External chat persistence collaborator.
///
/// `persist` must complete before the hub relays anything: a persistence
/// failure skips the relay entirely, never the other way round.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Persist an outgoing message and return the durable, ordered record.
    async fn persist(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<ChatMessageRecord, CollaboratorError>;

    /// Fetch the conversation history between two users, in send order.
    async fn history(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<ChatMessageRecord>, CollaboratorError>;
}
