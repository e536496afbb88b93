//! UseCase: ビデオルーム退出処理
//!
//! 明示的な leave 用。transport close 経由の退出は DisconnectUseCase の
//! leave_all と同じ cleanup に収束します。空になった Room を ENDED に
//! するかどうかは外部 booking collaborator の判断で、ここでは遷移しません。

use std::sync::Arc;

use crate::domain::{ConnectionId, LeaveOutcome, RoomDirectory, SessionId};

/// ルーム退出のユースケース
pub struct LeaveRoomUseCase {
    rooms: Arc<dyn RoomDirectory>,
}

impl LeaveRoomUseCase {
    /// 新しい LeaveRoomUseCase を作成
    pub fn new(rooms: Arc<dyn RoomDirectory>) -> Self {
        Self { rooms }
    }

    /// ルーム退出を実行（冪等。二重 leave は removed: None で返る）
    pub async fn execute(&self, session_id: &SessionId, connection: &ConnectionId) -> LeaveOutcome {
        self.rooms.leave(session_id, connection).await
    }
}
