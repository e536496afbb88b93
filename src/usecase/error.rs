//! UseCase layer error definitions.

use thiserror::Error;

use crate::domain::CollaboratorError;

/// Errors surfaced to the sender of a chat message.
///
/// A missing recipient is *not* an error: the live relay is best-effort and
/// the recipient catches up via history.
#[derive(Debug, Error)]
pub enum SendMessageError {
    /// The persistence collaborator failed; the relay was skipped entirely
    /// (the hub never relays unpersisted data).
    #[error("failed to persist message: {0}")]
    Persist(#[from] CollaboratorError),
}
