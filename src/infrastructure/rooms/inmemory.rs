//! InMemory Room Directory 実装
//!
//! ドメイン層が定義する RoomDirectory trait の具体的な実装。
//! SessionId をキーとする HashMap をインメモリ台帳として使用します。
//!
//! ENDED になった Room もエントリとして保持し続けます。terminal 状態を
//! 忘れると、空になった Room への join が新しい WAITING Room を作ってしまい
//! 「ended したセッションには join できない」という契約が壊れるためです。

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    CallRoom, ConnectionId, JoinOutcome, LeaveOutcome, RoomDirectory, RoomError, RoomMember,
    RoomStatus, SessionId, Timestamp,
};

/// インメモリ Room Directory 実装
pub struct InMemoryRoomDirectory {
    rooms: Arc<Mutex<HashMap<SessionId, CallRoom>>>,
}

impl InMemoryRoomDirectory {
    /// 新しい InMemoryRoomDirectory を作成
    pub fn new() -> Self {
        Self {
            rooms: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryRoomDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RoomDirectory for InMemoryRoomDirectory {
    async fn join(
        &self,
        session_id: SessionId,
        member: RoomMember,
        now: Timestamp,
    ) -> Result<JoinOutcome, RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(session_id.clone())
            .or_insert_with(|| CallRoom::new(session_id, now));

        let peers = room.members.clone();
        room.add_member(member)?;

        Ok(JoinOutcome {
            status: room.status,
            peers,
            roster: room.members.clone(),
        })
    }

    async fn leave(&self, session_id: &SessionId, connection: &ConnectionId) -> LeaveOutcome {
        let mut rooms = self.rooms.lock().await;
        let Some(room) = rooms.get_mut(session_id) else {
            return LeaveOutcome {
                session_id: session_id.clone(),
                removed: None,
                remaining: Vec::new(),
            };
        };

        let removed = room.get_member(connection).cloned();
        room.remove_member(connection);
        LeaveOutcome {
            session_id: session_id.clone(),
            removed,
            remaining: room.members.clone(),
        }
    }

    async fn leave_all(&self, connection: &ConnectionId) -> Vec<LeaveOutcome> {
        let mut rooms = self.rooms.lock().await;
        let mut outcomes = Vec::new();
        for (session_id, room) in rooms.iter_mut() {
            if let Some(removed) = room.get_member(connection).cloned() {
                room.remove_member(connection);
                outcomes.push(LeaveOutcome {
                    session_id: session_id.clone(),
                    removed: Some(removed),
                    remaining: room.members.clone(),
                });
            }
        }
        outcomes
    }

    async fn relay_target(
        &self,
        session_id: &SessionId,
        to: &ConnectionId,
    ) -> Result<Option<RoomMember>, RoomError> {
        let rooms = self.rooms.lock().await;
        let Some(room) = rooms.get(session_id) else {
            return Ok(None);
        };
        if room.status == RoomStatus::Ended {
            return Err(RoomError::SessionEnded(session_id.as_str().to_string()));
        }
        Ok(room.get_member(to).cloned())
    }

    async fn set_status(
        &self,
        session_id: &SessionId,
        status: RoomStatus,
        now: Timestamp,
    ) -> Result<(), RoomError> {
        let mut rooms = self.rooms.lock().await;
        let room = rooms
            .entry(session_id.clone())
            .or_insert_with(|| CallRoom::new(session_id.clone(), now));
        room.set_status(status)
    }

    async fn get(&self, session_id: &SessionId) -> Option<CallRoom> {
        let rooms = self.rooms.lock().await;
        rooms.get(session_id).cloned()
    }
}
