//! Video Signaling Coordinator port: the room directory.
//!
//! Owns room membership per call session, independent of the Connection
//! Registry — a participant can be registered globally without being in any
//! room. Rooms are created on first join (or on an early status mirror) and
//! kept after ending so the terminal ENDED state keeps rejecting joins.

use async_trait::async_trait;

use super::{
    entity::{CallRoom, RoomMember, RoomStatus},
    error::RoomError,
    value_object::{ConnectionId, SessionId, Timestamp},
};

/// Result of a successful `join` call.
#[derive(Debug, Clone)]
pub struct JoinOutcome {
    /// Mirrored status at join time
    pub status: RoomStatus,
    /// Members that were already in the room — exactly N-1 entries for the
    /// Nth joiner. Each receives its own `user-joined` event and initiates
    /// its own offer to the newcomer (mesh topology).
    pub peers: Vec<RoomMember>,
    /// Full roster after the join, newcomer included
    pub roster: Vec<RoomMember>,
}

/// Result of a `leave` call.
#[derive(Debug, Clone)]
pub struct LeaveOutcome {
    pub session_id: SessionId,
    /// The member that was removed, absent when the leave was a no-op
    /// (double-leave is an expected race, not an error)
    pub removed: Option<RoomMember>,
    /// Members still in the room after the leave
    pub remaining: Vec<RoomMember>,
}

/// Directory of session-scoped call rooms.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RoomDirectory: Send + Sync {
    /// Add a member to the room for `session_id`, creating the room in the
    /// `Waiting` state on first join.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SessionEnded` when the mirrored status is
    /// `Ended`; the caller surfaces this as "session has ended".
    async fn join(
        &self,
        session_id: SessionId,
        member: RoomMember,
        now: Timestamp,
    ) -> Result<JoinOutcome, RoomError>;

    /// Remove a member by connection ref. Idempotent; never transitions the
    /// room status — emptying a room does not end it.
    async fn leave(&self, session_id: &SessionId, connection: &ConnectionId) -> LeaveOutcome;

    /// Remove the connection from every room it is a member of. The
    /// transport-close cleanup path; converges with explicit leaves.
    async fn leave_all(&self, connection: &ConnectionId) -> Vec<LeaveOutcome>;

    /// Resolve a relay target: `Some` only while `to` is still a member of
    /// the session's room. `None` is the expected mid-handshake race when a
    /// participant has already left — callers drop the signal silently.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SessionEnded` when the room has ended.
    async fn relay_target(
        &self,
        session_id: &SessionId,
        to: &ConnectionId,
    ) -> Result<Option<RoomMember>, RoomError>;

    /// Mirror a status transition decided by the external booking
    /// collaborator. Creates a member-less room entry when the mirror
    /// arrives before the first join.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SessionEnded` for transitions out of `Ended`
    /// and `RoomError::InvalidStatusTransition` for regressions.
    async fn set_status(
        &self,
        session_id: &SessionId,
        status: RoomStatus,
        now: Timestamp,
    ) -> Result<(), RoomError>;

    /// Snapshot of the room for `session_id`, if one exists.
    async fn get(&self, session_id: &SessionId) -> Option<CallRoom>;
}
