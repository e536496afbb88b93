//! UseCase: 接続登録処理
//!
//! Connection Registry への登録と、それに伴う presence 通知対象の選定。
//! 同一 (identity, role) への再登録は reconnect の正常系であり、
//! 「last write wins」で旧エントリを黙って置き換えます。

use std::sync::Arc;

use crate::common::time::get_utc_timestamp;
use crate::domain::{
    ConnectionId, ConnectionRegistry, PresenceSubscriptions, Role, Timestamp, UserId,
};

/// One presence transition and the connections that should hear about it.
#[derive(Debug, Clone)]
pub struct PresenceUpdate {
    pub target_id: UserId,
    pub is_online: bool,
    /// Live connections of every current subscriber of the target
    pub recipients: Vec<ConnectionId>,
}

/// Result of registering a connection.
#[derive(Debug, Clone)]
pub struct RegisterConnectionOutcome {
    pub registered_at: Timestamp,
    /// Connection that lost its registry binding (reconnect overwrite)
    pub replaced: Option<ConnectionId>,
    /// Online transition to fan out, when the identity just came online
    pub presence: Option<PresenceUpdate>,
}

/// 接続登録のユースケース
pub struct RegisterConnectionUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    subscriptions: Arc<dyn PresenceSubscriptions>,
}

impl RegisterConnectionUseCase {
    /// 新しい RegisterConnectionUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        subscriptions: Arc<dyn PresenceSubscriptions>,
    ) -> Self {
        Self {
            registry,
            subscriptions,
        }
    }

    /// 接続登録を実行
    ///
    /// # Returns
    ///
    /// 登録時刻・置き換えられた旧接続・presence 通知の配信計画
    pub async fn execute(
        &self,
        identity: UserId,
        role: Role,
        connection: ConnectionId,
    ) -> RegisterConnectionOutcome {
        let registered_at = Timestamp::new(get_utc_timestamp());
        let outcome = self
            .registry
            .register(identity.clone(), role, connection, registered_at)
            .await;

        let presence = if outcome.came_online {
            Some(
                build_presence_update(&*self.registry, &*self.subscriptions, identity, true).await,
            )
        } else {
            None
        };

        RegisterConnectionOutcome {
            registered_at,
            replaced: outcome.replaced,
            presence,
        }
    }
}

/// 購読者の生きている接続を集めて presence 配信計画を組み立てる
pub(crate) async fn build_presence_update(
    registry: &dyn ConnectionRegistry,
    subscriptions: &dyn PresenceSubscriptions,
    target_id: UserId,
    is_online: bool,
) -> PresenceUpdate {
    let mut recipients = Vec::new();
    for observer in subscriptions.observers_of(&target_id).await {
        recipients.extend(registry.connections_of(&observer).await);
    }
    PresenceUpdate {
        target_id,
        is_online,
        recipients,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::{
        presence::InMemoryPresenceSubscriptions, registry::InMemoryConnectionRegistry,
    };

    fn uid(s: &str) -> UserId {
        UserId::new(s.to_string()).unwrap()
    }

    fn fixtures() -> (
        Arc<InMemoryConnectionRegistry>,
        Arc<InMemoryPresenceSubscriptions>,
        RegisterConnectionUseCase,
    ) {
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let subscriptions = Arc::new(InMemoryPresenceSubscriptions::new());
        let usecase = RegisterConnectionUseCase::new(registry.clone(), subscriptions.clone());
        (registry, subscriptions, usecase)
    }

    #[tokio::test]
    async fn test_register_notifies_subscribers() {
        // テスト項目: 登録時、対象を購読中の observer の接続が通知対象になる
        // given (前提条件): bob が coach-1 を購読し、自身も登録済み
        let (registry, subscriptions, usecase) = fixtures();
        let bob_conn = ConnectionId::generate();
        registry
            .register(uid("bob"), Role::Member, bob_conn, Timestamp::new(0))
            .await;
        subscriptions.subscribe(uid("bob"), uid("coach-1")).await;

        // when (操作): coach-1 が登録する
        let outcome = usecase
            .execute(uid("coach-1"), Role::Coach, ConnectionId::generate())
            .await;

        // then (期待する結果): online 通知が bob の接続へ向く
        let presence = outcome.presence.expect("should come online");
        assert!(presence.is_online);
        assert_eq!(presence.target_id, uid("coach-1"));
        assert_eq!(presence.recipients, vec![bob_conn]);
    }

    #[tokio::test]
    async fn test_register_without_subscribers_has_no_recipients() {
        // テスト項目: 購読者がいなければ通知対象は空（broadcast storm しない）
        let (_registry, _subscriptions, usecase) = fixtures();

        let outcome = usecase
            .execute(uid("coach-1"), Role::Coach, ConnectionId::generate())
            .await;

        let presence = outcome.presence.expect("should come online");
        assert!(presence.recipients.is_empty());
    }

    #[tokio::test]
    async fn test_reregistration_reports_replaced_connection() {
        // テスト項目: reconnect で旧接続が replaced として返り、presence は再通知されない
        let (_registry, _subscriptions, usecase) = fixtures();
        let old_conn = ConnectionId::generate();
        let new_conn = ConnectionId::generate();
        usecase.execute(uid("alice"), Role::Member, old_conn).await;

        let outcome = usecase.execute(uid("alice"), Role::Member, new_conn).await;

        assert_eq!(outcome.replaced, Some(old_conn));
        assert!(outcome.presence.is_none());
    }
}
