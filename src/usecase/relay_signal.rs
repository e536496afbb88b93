//! UseCase: signaling 中継処理
//!
//! offer（send-signal）と answer（return-signal）の両方向を扱います。
//! payload は opaque なまま触らず、宛先がまだ Room のメンバーであることの
//! 確認だけを行います。宛先が既に退出している場合は silent drop ——
//! handshake 途中の退出で必ず起きるレースであり、エラーではありません。
//! 1 つの peer の失敗が Room の他のメンバーへ波及しない isolation は
//! この silent drop によって成り立っています。

use std::sync::Arc;

use crate::domain::{ConnectionId, RoomDirectory, RoomError, SessionId};

/// signaling 中継のユースケース
pub struct RelaySignalUseCase {
    rooms: Arc<dyn RoomDirectory>,
}

impl RelaySignalUseCase {
    /// 新しい RelaySignalUseCase を作成
    pub fn new(rooms: Arc<dyn RoomDirectory>) -> Self {
        Self { rooms }
    }

    /// 中継先を解決する
    ///
    /// # Returns
    ///
    /// * `Ok(Some(connection))` - 宛先はまだメンバー。payload を届けてよい
    /// * `Ok(None)` - 宛先は退出済みか Room が無い。silent drop
    ///
    /// # Errors
    ///
    /// `RoomError::SessionEnded` - セッション終了済み。呼び出し元に拒否を返す
    pub async fn execute(
        &self,
        session_id: &SessionId,
        to: &ConnectionId,
    ) -> Result<Option<ConnectionId>, RoomError> {
        let target = self.rooms.relay_target(session_id, to).await?;
        Ok(target.map(|member| member.connection))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DisplayName, RoomMember, RoomStatus, Timestamp, UserId};
    use crate::infrastructure::rooms::InMemoryRoomDirectory;

    fn sid(s: &str) -> SessionId {
        SessionId::new(s.to_string()).unwrap()
    }

    fn member(name: &str, conn: ConnectionId) -> RoomMember {
        RoomMember::new(
            conn,
            UserId::new(name.to_string()).unwrap(),
            DisplayName::new(name.to_string()).unwrap(),
            Timestamp::new(0),
        )
    }

    #[tokio::test]
    async fn test_relay_to_live_member() {
        // テスト項目: 在室メンバーへの relay は接続を返す
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        let conn = ConnectionId::generate();
        rooms
            .join(sid("S1"), member("a", conn), Timestamp::new(0))
            .await
            .unwrap();
        let usecase = RelaySignalUseCase::new(rooms);

        assert_eq!(usecase.execute(&sid("S1"), &conn).await.unwrap(), Some(conn));
    }

    #[tokio::test]
    async fn test_relay_to_departed_member_is_silent_drop() {
        // テスト項目: 退出済みメンバーへの relay は None（エラー無し）
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        let conn = ConnectionId::generate();
        rooms
            .join(sid("S1"), member("a", conn), Timestamp::new(0))
            .await
            .unwrap();
        rooms.leave(&sid("S1"), &conn).await;
        let usecase = RelaySignalUseCase::new(rooms);

        assert_eq!(usecase.execute(&sid("S1"), &conn).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_relay_into_ended_session_is_rejected() {
        // テスト項目: 終了済みセッションへの relay は明示的に拒否される
        let rooms = Arc::new(InMemoryRoomDirectory::new());
        let conn = ConnectionId::generate();
        rooms
            .join(sid("S1"), member("a", conn), Timestamp::new(0))
            .await
            .unwrap();
        rooms
            .set_status(&sid("S1"), RoomStatus::Ended, Timestamp::new(0))
            .await
            .unwrap();
        let usecase = RelaySignalUseCase::new(rooms);

        assert!(matches!(
            usecase.execute(&sid("S1"), &conn).await,
            Err(RoomError::SessionEnded(_))
        ));
    }
}
