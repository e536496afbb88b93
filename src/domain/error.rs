//! Domain layer error definitions.

use thiserror::Error;

/// Errors related to Value Objects validation
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueObjectError {
    /// UserId validation error
    #[error("UserId cannot be empty")]
    UserIdEmpty,

    /// UserId too long error
    #[error("UserId cannot exceed {max} characters (got {actual})")]
    UserIdTooLong { max: usize, actual: usize },

    /// SessionId validation error
    #[error("SessionId cannot be empty")]
    SessionIdEmpty,

    /// SessionId too long error
    #[error("SessionId cannot exceed {max} characters (got {actual})")]
    SessionIdTooLong { max: usize, actual: usize },

    /// ConnectionId invalid format error (not a valid UUID)
    #[error("ConnectionId must be a valid UUID (got: {0})")]
    ConnectionIdInvalidFormat(String),

    /// DisplayName validation error
    #[error("DisplayName cannot be empty")]
    DisplayNameEmpty,

    /// DisplayName too long error
    #[error("DisplayName cannot exceed {max} characters (got {actual})")]
    DisplayNameTooLong { max: usize, actual: usize },

    /// MessageBody validation error
    #[error("Message body cannot be empty")]
    MessageBodyEmpty,

    /// MessageBody too long error
    #[error("Message body cannot exceed {max} characters (got {actual})")]
    MessageBodyTooLong { max: usize, actual: usize },
}

/// Errors related to call-room domain logic
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RoomError {
    /// Any operation against an ENDED room is rejected, not ignored; the
    /// caller surfaces this to the end user as "session has ended".
    #[error("session {0} has already ended")]
    SessionEnded(String),

    /// Room status may only move WAITING -> LIVE -> ENDED
    #[error("invalid status transition for session {session_id}: {from} -> {to}")]
    InvalidStatusTransition {
        session_id: String,
        from: &'static str,
        to: &'static str,
    },
}
