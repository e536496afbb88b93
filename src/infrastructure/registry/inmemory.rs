//! InMemory Connection Registry 実装
//!
//! ドメイン層が定義する ConnectionRegistry trait の具体的な実装。
//! `(UserId, Role)` をキーとする HashMap を唯一の台帳として使用します。
//!
//! 再登録は「last write wins」：reconnect 時に新しい transport が同じキーで
//! register してくるのは正常系であり、旧エントリは黙って上書きされます。
//! （旧 transport は閉じられず、registry 経由では到達不能になるだけ）

use std::{collections::HashMap, sync::Arc};

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{
    ConnectionId, ConnectionRegistry, RegistrationOutcome, RemovalOutcome, Role, Timestamp,
    UserId,
};

/// One live registration entry.
#[derive(Debug, Clone)]
struct RegistryEntry {
    connection: ConnectionId,
    #[allow(dead_code)]
    registered_at: Timestamp,
}

/// インメモリ Connection Registry 実装
pub struct InMemoryConnectionRegistry {
    entries: Arc<Mutex<HashMap<(UserId, Role), RegistryEntry>>>,
}

impl InMemoryConnectionRegistry {
    /// 新しい InMemoryConnectionRegistry を作成
    pub fn new() -> Self {
        Self {
            entries: Arc::new(Mutex::new(HashMap::new())),
        }
    }
}

impl Default for InMemoryConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ConnectionRegistry for InMemoryConnectionRegistry {
    async fn register(
        &self,
        identity: UserId,
        role: Role,
        connection: ConnectionId,
        registered_at: Timestamp,
    ) -> RegistrationOutcome {
        let mut entries = self.entries.lock().await;
        let came_online = !entries.keys().any(|(id, _)| id == &identity);
        let replaced = entries
            .insert(
                (identity, role),
                RegistryEntry {
                    connection,
                    registered_at,
                },
            )
            .map(|old| old.connection);
        RegistrationOutcome {
            came_online,
            replaced,
        }
    }

    async fn lookup(&self, identity: &UserId, role: Role) -> Option<ConnectionId> {
        let entries = self.entries.lock().await;
        entries
            .get(&(identity.clone(), role))
            .map(|entry| entry.connection)
    }

    async fn connections_of(&self, identity: &UserId) -> Vec<ConnectionId> {
        let entries = self.entries.lock().await;
        entries
            .iter()
            .filter(|((id, _), _)| id == identity)
            .map(|(_, entry)| entry.connection)
            .collect()
    }

    async fn remove(
        &self,
        identity: &UserId,
        role: Role,
        connection: &ConnectionId,
    ) -> RemovalOutcome {
        let mut entries = self.entries.lock().await;
        let key = (identity.clone(), role);

        // Only evict while the entry still points at the closing transport;
        // a stale pre-reconnect close must not remove the fresh binding.
        let removed = match entries.get(&key) {
            Some(entry) if &entry.connection == connection => {
                entries.remove(&key);
                true
            }
            _ => false,
        };

        let went_offline = removed && !entries.keys().any(|(id, _)| id == identity);
        RemovalOutcome {
            removed,
            went_offline,
        }
    }
}
