//! UseCase: presence 購読の登録・解除
//!
//! 購読は ephemeral で、observer の切断時に DisconnectUseCase が破棄します。

use std::sync::Arc;

use crate::domain::{ConnectionRegistry, PresenceSubscriptions, UserId};

/// presence 購読のユースケース
pub struct WatchStatusUseCase {
    registry: Arc<dyn ConnectionRegistry>,
    subscriptions: Arc<dyn PresenceSubscriptions>,
}

impl WatchStatusUseCase {
    /// 新しい WatchStatusUseCase を作成
    pub fn new(
        registry: Arc<dyn ConnectionRegistry>,
        subscriptions: Arc<dyn PresenceSubscriptions>,
    ) -> Self {
        Self {
            registry,
            subscriptions,
        }
    }

    /// 購読を登録し、対象の現在の online 状態を返す
    ///
    /// 購読直後のクライアントは対象の現況を知らないため、初期状態を
    /// 返して UI 層からそのまま通知できるようにしています。
    pub async fn subscribe(&self, observer: UserId, target: UserId) -> bool {
        self.subscriptions
            .subscribe(observer, target.clone())
            .await;
        !self.registry.connections_of(&target).await.is_empty()
    }

    /// 購読を解除する（以後、再購読まで通知は届かない）
    pub async fn unsubscribe(&self, observer: &UserId, target: &UserId) {
        self.subscriptions.unsubscribe(observer, target).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ConnectionId, Role, Timestamp};
    use crate::infrastructure::{
        presence::InMemoryPresenceSubscriptions, registry::InMemoryConnectionRegistry,
    };

    fn uid(s: &str) -> UserId {
        UserId::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_subscribe_returns_current_status() {
        // テスト項目: subscribe は対象の現在の online 状態を返す
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let subscriptions = Arc::new(InMemoryPresenceSubscriptions::new());
        let usecase = WatchStatusUseCase::new(registry.clone(), subscriptions.clone());

        // coach-1 は未登録 -> offline
        assert!(!usecase.subscribe(uid("alice"), uid("coach-1")).await);

        // coach-1 登録後 -> online
        registry
            .register(
                uid("coach-1"),
                Role::Coach,
                ConnectionId::generate(),
                Timestamp::new(0),
            )
            .await;
        assert!(usecase.subscribe(uid("bob"), uid("coach-1")).await);
    }

    #[tokio::test]
    async fn test_unsubscribe_removes_interest() {
        // テスト項目: unsubscribe で購読が解除される
        let registry = Arc::new(InMemoryConnectionRegistry::new());
        let subscriptions = Arc::new(InMemoryPresenceSubscriptions::new());
        let usecase = WatchStatusUseCase::new(registry, subscriptions.clone());

        usecase.subscribe(uid("alice"), uid("coach-1")).await;
        usecase.unsubscribe(&uid("alice"), &uid("coach-1")).await;

        assert!(subscriptions.observers_of(&uid("coach-1")).await.is_empty());
    }
}
