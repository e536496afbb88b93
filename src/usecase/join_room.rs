//! UseCase: ビデオルーム参加処理
//!
//! N 人目の参加は既存メンバー N-1 人それぞれへの `user-joined` fan-out を
//! 生みます。offer を出すのは通知を受けた既存メンバー側であり、hub は
//! signaling を自分からは一切発しません（mesh topology の中継のみ）。

use std::sync::Arc;

use crate::common::time::get_utc_timestamp;
use crate::domain::{
    ConnectionId, DisplayName, RoomDirectory, RoomError, RoomMember, RoomStatus, SessionId,
    Timestamp, UserId,
};

/// Result of a room join: the new member plus the fan-out plan.
#[derive(Debug, Clone)]
pub struct JoinRoomOutcome {
    pub status: RoomStatus,
    pub member: RoomMember,
    /// Existing members (exactly N-1) who each receive `user-joined`
    pub peers: Vec<RoomMember>,
    /// Full roster after the join, for the newcomer's acknowledgement
    pub roster: Vec<RoomMember>,
}

/// ルーム参加のユースケース
pub struct JoinRoomUseCase {
    rooms: Arc<dyn RoomDirectory>,
}

impl JoinRoomUseCase {
    /// 新しい JoinRoomUseCase を作成
    pub fn new(rooms: Arc<dyn RoomDirectory>) -> Self {
        Self { rooms }
    }

    /// ルーム参加を実行
    ///
    /// # Errors
    ///
    /// `RoomError::SessionEnded` - セッションが終了済み。呼び出し側は
    /// 「session has ended」としてエンドユーザーに提示する
    pub async fn execute(
        &self,
        session_id: SessionId,
        connection: ConnectionId,
        participant_id: UserId,
        display_name: DisplayName,
    ) -> Result<JoinRoomOutcome, RoomError> {
        let now = Timestamp::new(get_utc_timestamp());
        let member = RoomMember::new(connection, participant_id, display_name, now);

        let outcome = self.rooms.join(session_id, member.clone(), now).await?;

        Ok(JoinRoomOutcome {
            status: outcome.status,
            member,
            peers: outcome.peers,
            roster: outcome.roster,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::rooms::InMemoryRoomDirectory;

    fn uid(s: &str) -> UserId {
        UserId::new(s.to_string()).unwrap()
    }

    fn sid(s: &str) -> SessionId {
        SessionId::new(s.to_string()).unwrap()
    }

    fn name(s: &str) -> DisplayName {
        DisplayName::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_join_order_a_b_c_produces_1_then_2_fanouts() {
        // テスト項目: A, B, C の順の join で B は 1 件、C は 2 件の
        //             user-joined を発生させる
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        let usecase = JoinRoomUseCase::new(rooms);
        let conn_a = ConnectionId::generate();
        let conn_b = ConnectionId::generate();
        let conn_c = ConnectionId::generate();

        let out_a = usecase
            .execute(sid("S1"), conn_a, uid("a"), name("A"))
            .await
            .unwrap();
        let out_b = usecase
            .execute(sid("S1"), conn_b, uid("b"), name("B"))
            .await
            .unwrap();
        let out_c = usecase
            .execute(sid("S1"), conn_c, uid("c"), name("C"))
            .await
            .unwrap();

        assert_eq!(out_a.peers.len(), 0);
        assert_eq!(out_b.peers.len(), 1);
        assert_eq!(out_b.peers[0].connection, conn_a);
        assert_eq!(out_c.peers.len(), 2);
        assert_eq!(out_c.roster.len(), 3);
    }

    #[tokio::test]
    async fn test_first_join_creates_waiting_room() {
        // テスト項目: 最初の join が WAITING の Room を作る
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        let usecase = JoinRoomUseCase::new(rooms);

        let outcome = usecase
            .execute(sid("S1"), ConnectionId::generate(), uid("coach"), name("Coach"))
            .await
            .unwrap();

        assert_eq!(outcome.status, RoomStatus::Waiting);
        assert_eq!(outcome.roster.len(), 1);
    }

    #[tokio::test]
    async fn test_join_ended_session_is_rejected() {
        // テスト項目: 終了済みセッションへの join は拒否される
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        rooms
            .set_status(&sid("S1"), RoomStatus::Ended, Timestamp::new(0))
            .await
            .unwrap();
        let usecase = JoinRoomUseCase::new(rooms);

        let result = usecase
            .execute(sid("S1"), ConnectionId::generate(), uid("late"), name("Late"))
            .await;

        assert!(matches!(result, Err(RoomError::SessionEnded(_))));
    }
}
