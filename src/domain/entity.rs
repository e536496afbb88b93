//! Core domain models for the communication hub.

use serde::{Deserialize, Serialize};

use super::{
    error::RoomError,
    value_object::{
        ConnectionId, DisplayName, MessageBody, Role, SessionId, Timestamp, UserId,
    },
};

/// Lifecycle status of a call room.
///
/// The durable status is owned by the external booking collaborator; the
/// hub only mirrors it to make relay decisions. `Ended` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoomStatus {
    Waiting,
    Live,
    Ended,
}

impl RoomStatus {
    /// Get the status name as used in wire events and logs.
    pub fn as_str(&self) -> &'static str {
        match self {
            RoomStatus::Waiting => "waiting",
            RoomStatus::Live => "live",
            RoomStatus::Ended => "ended",
        }
    }
}

/// A participant currently signaling inside a call room.
///
/// Addressed by `connection`, not by identity: a reconnecting participant
/// re-joins under a fresh connection ref.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoomMember {
    /// Connection ref peers send signals to
    pub connection: ConnectionId,
    /// Marketplace identity of the participant
    pub participant_id: UserId,
    /// Name shown to the other participants
    pub display_name: DisplayName,
    /// Timestamp when the participant joined the room
    pub joined_at: Timestamp,
}

impl RoomMember {
    /// Create a new room member.
    pub fn new(
        connection: ConnectionId,
        participant_id: UserId,
        display_name: DisplayName,
        joined_at: Timestamp,
    ) -> Self {
        Self {
            connection,
            participant_id,
            display_name,
            joined_at,
        }
    }
}

/// A session-scoped video-call room.
///
/// Tracks transient socket membership only; created on first join (or on an
/// early status mirror) and kept after ending so the terminal state keeps
/// rejecting joins.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CallRoom {
    /// Booked session this room belongs to
    pub session_id: SessionId,
    /// Mirrored lifecycle status
    pub status: RoomStatus,
    /// Participants currently in the room
    pub members: Vec<RoomMember>,
    /// Timestamp when the room was created
    pub created_at: Timestamp,
}

impl CallRoom {
    /// Create a new room in the `Waiting` state.
    pub fn new(session_id: SessionId, created_at: Timestamp) -> Self {
        Self {
            session_id,
            status: RoomStatus::Waiting,
            members: Vec::new(),
            created_at,
        }
    }

    /// Add a member to the room.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SessionEnded` if the room has already ended.
    pub fn add_member(&mut self, member: RoomMember) -> Result<(), RoomError> {
        if self.status == RoomStatus::Ended {
            return Err(RoomError::SessionEnded(self.session_id.as_str().to_string()));
        }
        // A re-join on the same transport replaces the stale entry
        self.members.retain(|m| m.connection != member.connection);
        self.members.push(member);
        Ok(())
    }

    /// Remove a member by connection ref. Removing an absent member is a
    /// no-op; both the explicit-leave and transport-close paths call this.
    pub fn remove_member(&mut self, connection: &ConnectionId) -> bool {
        let before = self.members.len();
        self.members.retain(|m| &m.connection != connection);
        self.members.len() != before
    }

    /// Get a member by connection ref.
    pub fn get_member(&self, connection: &ConnectionId) -> Option<&RoomMember> {
        self.members.iter().find(|m| &m.connection == connection)
    }

    /// Whether the given connection is currently a member.
    pub fn contains(&self, connection: &ConnectionId) -> bool {
        self.get_member(connection).is_some()
    }

    /// Transition the mirrored status.
    ///
    /// # Errors
    ///
    /// Returns `RoomError::SessionEnded` for any transition out of `Ended`
    /// and `RoomError::InvalidStatusTransition` for regressions
    /// (`Live -> Waiting`, re-entering `Waiting`).
    pub fn set_status(&mut self, status: RoomStatus) -> Result<(), RoomError> {
        match (self.status, status) {
            (from, to) if from == to => Ok(()),
            (RoomStatus::Ended, _) => Err(RoomError::SessionEnded(
                self.session_id.as_str().to_string(),
            )),
            (RoomStatus::Waiting, RoomStatus::Live)
            | (RoomStatus::Waiting, RoomStatus::Ended)
            | (RoomStatus::Live, RoomStatus::Ended) => {
                self.status = status;
                Ok(())
            }
            (from, to) => Err(RoomError::InvalidStatusTransition {
                session_id: self.session_id.as_str().to_string(),
                from: from.as_str(),
                to: to.as_str(),
            }),
        }
    }
}

/// A chat message as persisted by the external chat collaborator.
///
/// The hub never creates ids or timestamps for these; the record is handed
/// back by the store and relayed verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessageRecord {
    /// Durable message id (consumers dedup on this)
    pub id: uuid::Uuid,
    pub sender_id: UserId,
    pub receiver_id: UserId,
    pub body: MessageBody,
    /// Unix millis assigned by the store; defines history order
    pub created_at: Timestamp,
}

/// A notification as persisted by the external notification collaborator.
///
/// Read/unread state lives in the collaborator; the hub only relays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationRecord {
    pub id: uuid::Uuid,
    pub recipient_id: UserId,
    pub recipient_role: Role,
    pub message: String,
    /// Collaborator-defined notification type (e.g. "booking-confirmed")
    pub kind: String,
    pub created_at: Timestamp,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn member(name: &str) -> RoomMember {
        RoomMember::new(
            ConnectionId::generate(),
            UserId::new(name.to_string()).unwrap(),
            DisplayName::new(name.to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    fn room() -> CallRoom {
        CallRoom::new(
            SessionId::new("S1".to_string()).unwrap(),
            Timestamp::new(1000),
        )
    }

    #[test]
    fn test_room_new_is_waiting_and_empty() {
        // テスト項目: 新しい Room は WAITING 状態かつ空で作成される
        let room = room();
        assert_eq!(room.status, RoomStatus::Waiting);
        assert!(room.members.is_empty());
    }

    #[test]
    fn test_add_and_remove_member() {
        // テスト項目: メンバーの追加・削除が membership に反映される
        let mut room = room();
        let alice = member("alice");
        let conn = alice.connection;

        room.add_member(alice).unwrap();
        assert!(room.contains(&conn));

        assert!(room.remove_member(&conn));
        assert!(!room.contains(&conn));
    }

    #[test]
    fn test_remove_member_is_idempotent() {
        // テスト項目: 二重 leave（明示 + transport close）が no-op になる
        let mut room = room();
        let alice = member("alice");
        let conn = alice.connection;
        room.add_member(alice).unwrap();

        assert!(room.remove_member(&conn));
        assert!(!room.remove_member(&conn));
    }

    #[test]
    fn test_add_member_rejected_after_end() {
        // テスト項目: ENDED の Room への join は明示的に拒否される
        let mut room = room();
        room.set_status(RoomStatus::Ended).unwrap();

        let result = room.add_member(member("alice"));
        assert_eq!(result, Err(RoomError::SessionEnded("S1".to_string())));
    }

    #[test]
    fn test_status_forward_transitions() {
        // テスト項目: WAITING -> LIVE -> ENDED は許可される
        let mut room = room();
        room.set_status(RoomStatus::Live).unwrap();
        assert_eq!(room.status, RoomStatus::Live);
        room.set_status(RoomStatus::Ended).unwrap();
        assert_eq!(room.status, RoomStatus::Ended);
    }

    #[test]
    fn test_status_regression_rejected() {
        // テスト項目: LIVE -> WAITING の逆行は拒否される
        let mut room = room();
        room.set_status(RoomStatus::Live).unwrap();

        let result = room.set_status(RoomStatus::Waiting);
        assert!(matches!(
            result,
            Err(RoomError::InvalidStatusTransition { .. })
        ));
    }

    #[test]
    fn test_ended_is_terminal() {
        // テスト項目: ENDED からはどの状態にも遷移できない
        let mut room = room();
        room.set_status(RoomStatus::Ended).unwrap();

        assert_eq!(
            room.set_status(RoomStatus::Live),
            Err(RoomError::SessionEnded("S1".to_string()))
        );
        assert_eq!(
            room.set_status(RoomStatus::Waiting),
            Err(RoomError::SessionEnded("S1".to_string()))
        );
    }

    #[test]
    fn test_emptying_room_does_not_end_it() {
        // テスト項目: 全員退出しても status は変わらない（ENDED は外部が決める）
        let mut room = room();
        let alice = member("alice");
        let conn = alice.connection;
        room.add_member(alice).unwrap();
        room.set_status(RoomStatus::Live).unwrap();

        room.remove_member(&conn);
        assert!(room.members.is_empty());
        assert_eq!(room.status, RoomStatus::Live);
    }
}
