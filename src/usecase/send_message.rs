//! UseCase: チャットメッセージ送信処理
//!
//! 順序は「persist してから relay する」ことだけで保証します：
//! collaborator が採番・付番した永続レコードをそのまま relay するため、
//! socket 越しに取りこぼしても履歴側では必ず送信順に並びます。
//!
//! 受信者が offline の場合は silent drop（キューもリトライも無し）。
//! persist が失敗した場合は relay を丸ごとスキップし、送信者にだけ
//! 配信失敗を返します。未永続データを relay する経路は存在しません。

use std::sync::Arc;

use crate::domain::{
    ChatMessageRecord, ChatStore, ConnectionId, ConnectionRegistry, MessageBody, UserId,
};

use super::error::SendMessageError;

/// Result of a successful send: the durable record plus the live
/// connections it should be relayed to (possibly none).
#[derive(Debug, Clone)]
pub struct SendMessageOutcome {
    pub record: ChatMessageRecord,
    pub recipient_connections: Vec<ConnectionId>,
}

/// メッセージ送信のユースケース
pub struct SendMessageUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    chat_store: Arc<dyn ChatStore>,
}

impl SendMessageUseCase {
    /// 新しい SendMessageUseCase を作成
    pub fn new(registry: Arc<dyn ConnectionRegistry>, chat_store: Arc<dyn ChatStore>) -> Self {
        Self {
            registry,
            chat_store,
        }
    }

    /// メッセージ送信を実行
    ///
    /// # Returns
    ///
    /// * `Ok(SendMessageOutcome)` - 永続レコードと relay 対象接続
    /// * `Err(SendMessageError)` - persist 失敗（relay はスキップ済み）
    pub async fn execute(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<SendMessageOutcome, SendMessageError> {
        // 1. 外部 collaborator へ永続化（ロック外での await）
        let record = self
            .chat_store
            .persist(sender_id, receiver_id.clone(), body)
            .await?;

        // 2. 受信者の生きている接続を registry から解決
        //    （identity 単位。同一 identity の複数 role 接続には重複配信され、
        //    受信側が message id で dedup する契約）
        let recipient_connections = self.registry.connections_of(&receiver_id).await;

        Ok(SendMessageOutcome {
            record,
            recipient_connections,
        })
    }
}
