//! UseCase: 通知プッシュ処理
//!
//! レコードは外部 collaborator が永続化済みで、hub は best-effort の
//! relay だけを行います。受信者 offline は silent drop。既読・未読の
//! 状態はここでは一切触りません。

use std::sync::Arc;

use crate::domain::{ConnectionId, ConnectionRegistry, NotificationRecord};

/// 通知プッシュのユースケース
pub struct PushNotificationUseCase {
    registry: Arc<dyn ConnectionRegistry>,
}

impl PushNotificationUseCase {
    /// 新しい PushNotificationUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>) -> Self {
        Self { registry }
    }

    /// 通知の配信先を解決する
    ///
    /// # Returns
    ///
    /// 受信者が `(recipient_id, recipient_role)` で登録していればその接続、
    /// offline なら None（drop）
    pub async fn execute(&self, record: &NotificationRecord) -> Option<ConnectionId> {
        self.registry
            .lookup(&record.recipient_id, record.recipient_role)
            .await
    }
}
