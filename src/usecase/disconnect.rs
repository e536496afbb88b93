//! UseCase: 接続切断処理
//!
//! 明示的な切断とトランスポート close 検知の両方がここに収束します。
//! クラッシュしたクライアントが Room に幽霊メンバーとして残らないよう、
//! どちらの経路でも同じ cleanup（registry 解除 / presence offline 通知 /
//! 購読破棄 / 全 Room からの退出）を通します。

use std::sync::Arc;

use crate::domain::{
    ConnectionId, ConnectionRegistry, PresenceSubscriptions, Role, RoomDirectory, RoomMember,
    SessionId, UserId,
};

use super::register_connection::{PresenceUpdate, build_presence_update};

/// One room the connection was removed from, plus who should hear about it.
#[derive(Debug, Clone)]
pub struct RoomDeparture {
    pub session_id: SessionId,
    pub member: RoomMember,
    /// Connections of the members still in the room
    pub recipients: Vec<ConnectionId>,
}

/// Result of a disconnect cleanup.
#[derive(Debug, Clone)]
pub struct DisconnectOutcome {
    /// Offline transition to fan out, when the identity went fully offline
    pub presence: Option<PresenceUpdate>,
    /// `user-left` broadcasts for every room the connection was in
    pub departures: Vec<RoomDeparture>,
}

/// 接続切断のユースケース
pub struct DisconnectUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    subscriptions: Arc<dyn PresenceSubscriptions>,
    rooms: Arc<dyn RoomDirectory>,
}

impl DisconnectUseCase {
    /// 新しい DisconnectUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        subscriptions: Arc<dyn PresenceSubscriptions>,
        rooms: Arc<dyn RoomDirectory>,
    ) -> Self {
        Self {
            registry,
            subscriptions,
            rooms,
        }
    }

    /// 切断 cleanup を実行
    ///
    /// # Arguments
    ///
    /// * `registration` - このトランスポートが register 済みなら
    ///   `(identity, role)`。未登録のまま閉じた接続では None
    /// * `connection` - 閉じたトランスポートの接続 ref
    pub async fn execute(
        &self,
        registration: Option<(UserId, Role)>,
        connection: ConnectionId,
    ) -> DisconnectOutcome {
        // 1. 全ての Room から退出（未登録でも membership は持ち得ない
        //    はずだが、冪等なのでそのまま通す）
        let departures = self
            .rooms
            .leave_all(&connection)
            .await
            .into_iter()
            .filter_map(|outcome| {
                outcome.removed.map(|member| RoomDeparture {
                    session_id: outcome.session_id,
                    member,
                    recipients: outcome.remaining.iter().map(|m| m.connection).collect(),
                })
            })
            .collect();

        // 2. Registry から解除し、identity が完全に offline になったときだけ
        //    presence 通知と購読破棄を行う（別 role の接続が残っていれば
        //    その接続の購読はまだ生きている）
        let mut presence = None;
        if let Some((identity, role)) = registration {
            let removal = self.registry.remove(&identity, role, &connection).await;
            if removal.went_offline {
                presence = Some(
                    build_presence_update(
                        &*self.registry,
                        &*self.subscriptions,
                        identity.clone(),
                        false,
                    )
                    .await,
                );
                self.subscriptions.drop_observer(&identity).await;
            }
        }

        DisconnectOutcome {
            presence,
            departures,
        }
    }
}
