//! UseCase: セッション状態のミラー処理
//!
//! 正本の状態は外部 booking collaborator が持ち、hub は relay 判定のために
//! WAITING -> LIVE -> ENDED の遷移をミラーするだけです。逆行と ENDED 後の
//! 遷移は拒否します。

use std::sync::Arc;

use crate::common::time::get_utc_timestamp;
use crate::domain::{RoomDirectory, RoomError, RoomStatus, SessionId, Timestamp};

/// セッション状態ミラーのユースケース
pub struct SessionStatusUseCase {
    rooms: Arc<dyn RoomDirectory>,
}

impl SessionStatusUseCase {
    /// 新しい SessionStatusUseCase を作成
    pub fn new(rooms: Arc<dyn RoomDirectory>) -> Self {
        Self { rooms }
    }

    /// 状態遷移をミラーする
    ///
    /// # Errors
    ///
    /// * `RoomError::SessionEnded` - ENDED からの遷移
    /// * `RoomError::InvalidStatusTransition` - 逆行（LIVE -> WAITING など）
    pub async fn execute(&self, session_id: &SessionId, status: RoomStatus) -> Result<(), RoomError> {
        let now = Timestamp::new(get_utc_timestamp());
        self.rooms.set_status(session_id, status, now).await
    }
}
