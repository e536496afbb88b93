//! InMemory Presence Subscriptions 実装
//!
//! target -> observers の正引きと observer -> targets の逆引きを両方持ち、
//! observer の切断時に全購読を O(購読数) で破棄できるようにしています。
//! 購読は ephemeral であり、永続化されません。

use std::{
    collections::{HashMap, HashSet},
    sync::Arc,
};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{PresenceSubscriptions, UserId};

#[derive(Default)]
struct SubscriptionMaps {
    /// target -> observers watching it
    observers_by_target: HashMap<UserId, HashSet<UserId>>,
    /// observer -> targets it watches (reverse index for disconnect cleanup)
    targets_by_observer: HashMap<UserId, HashSet<UserId>>,
}

/// インメモリ Presence Subscriptions 実装
pub struct InMemoryPresenceSubscriptions {
    maps: Arc<Mutex<SubscriptionMaps>>,
}

impl InMemoryPresenceSubscriptions {
    /// 新しい InMemoryPresenceSubscriptions を作成
    pub fn new() -> Self {
        Self {
            maps: Arc::new(Mutex::new(SubscriptionMaps::default())),
        }
    }
}

impl Default for InMemoryPresenceSubscriptions {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PresenceSubscriptions for InMemoryPresenceSubscriptions {
    async fn subscribe(&self, observer: UserId, target: UserId) {
        let mut maps = self.maps.lock().await;
        maps.observers_by_target
            .entry(target.clone())
            .or_default()
            .insert(observer.clone());
        maps.targets_by_observer
            .entry(observer)
            .or_default()
            .insert(target);
    }

    async fn unsubscribe(&self, observer: &UserId, target: &UserId) {
        let mut maps = self.maps.lock().await;
        if let Some(observers) = maps.observers_by_target.get_mut(target) {
            observers.remove(observer);
            if observers.is_empty() {
                maps.observers_by_target.remove(target);
            }
        }
        if let Some(targets) = maps.targets_by_observer.get_mut(observer) {
            targets.remove(target);
            if targets.is_empty() {
                maps.targets_by_observer.remove(observer);
            }
        }
    }

    async fn observers_of(&self, target: &UserId) -> Vec<UserId> {
        let maps = self.maps.lock().await;
        maps.observers_by_target
            .get(target)
            .map(|observers| observers.iter().cloned().collect())
            .unwrap_or_default()
    }

    async fn drop_observer(&self, observer: &UserId) {
        let mut maps = self.maps.lock().await;
        if let Some(targets) = maps.targets_by_observer.remove(observer) {
            for target in targets {
                if let Some(observers) = maps.observers_by_target.get_mut(&target) {
                    observers.remove(observer);
                    if observers.is_empty() {
                        maps.observers_by_target.remove(&target);
                    }
                }
            }
        }
    }
}
