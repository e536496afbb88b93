//! InMemory ChatStore 実装
//!
//! テストとローカル起動用。挿入順をそのまま履歴順として保持するので、
//! 「relay を逃したメッセージも履歴では送信順で見える」という性質を
//! そのまま検証できます。

use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::common::time::get_utc_timestamp;
use crate::domain::{
    ChatMessageRecord, ChatStore, CollaboratorError, MessageBody, Timestamp, UserId,
};

/// インメモリ ChatStore 実装
pub struct InMemoryChatStore {
    records: Arc<Mutex<Vec<ChatMessageRecord>>>,
    /// テストから collaborator 障害を注入するためのフラグ
    fail_next: Arc<Mutex<bool>>,
}

impl InMemoryChatStore {
    /// 新しい InMemoryChatStore を作成
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            fail_next: Arc::new(Mutex::new(false)),
        }
    }

    /// 次の persist 呼び出しを失敗させる（障害注入）
    pub async fn fail_next_persist(&self) {
        *self.fail_next.lock().await = true;
    }

    /// 保存済みレコード数
    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    /// レコードが存在しないか
    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }
}

impl Default for InMemoryChatStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ChatStore for InMemoryChatStore {
    async fn persist(
        &self,
        sender_id: UserId,
        receiver_id: UserId,
        body: MessageBody,
    ) -> Result<ChatMessageRecord, CollaboratorError> {
        {
            let mut fail_next = self.fail_next.lock().await;
            if *fail_next {
                *fail_next = false;
                return Err(CollaboratorError::Request(
                    "injected persist failure".to_string(),
                ));
            }
        }

        let record = ChatMessageRecord {
            id: uuid::Uuid::new_v4(),
            sender_id,
            receiver_id,
            body,
            created_at: Timestamp::new(get_utc_timestamp()),
        };
        let mut records = self.records.lock().await;
        records.push(record.clone());
        Ok(record)
    }

    async fn history(
        &self,
        user_a: &UserId,
        user_b: &UserId,
    ) -> Result<Vec<ChatMessageRecord>, CollaboratorError> {
        let records = self.records.lock().await;
        Ok(records
            .iter()
            .filter(|r| {
                (&r.sender_id == user_a && &r.receiver_id == user_b)
                    || (&r.sender_id == user_b && &r.receiver_id == user_a)
            })
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uid(s: &str) -> UserId {
        UserId::new(s.to_string()).unwrap()
    }

    #[tokio::test]
    async fn test_history_preserves_persistence_order() {
        // テスト項目: 履歴は persist した順で返される
        let store = InMemoryChatStore::new();
        for i in 0..3 {
            store
                .persist(
                    uid("alice"),
                    uid("coach-1"),
                    MessageBody::text(format!("msg {i}")).unwrap(),
                )
                .await
                .unwrap();
        }

        let history = store.history(&uid("alice"), &uid("coach-1")).await.unwrap();

        assert_eq!(history.len(), 3);
        for (i, record) in history.iter().enumerate() {
            assert_eq!(
                record.body,
                MessageBody::text(format!("msg {i}")).unwrap()
            );
        }
    }

    #[tokio::test]
    async fn test_history_is_symmetric() {
        // テスト項目: 履歴は (a,b) と (b,a) のどちらから引いても同じ
        let store = InMemoryChatStore::new();
        store
            .persist(
                uid("alice"),
                uid("coach-1"),
                MessageBody::text("hi".to_string()).unwrap(),
            )
            .await
            .unwrap();
        store
            .persist(
                uid("coach-1"),
                uid("alice"),
                MessageBody::text("hello".to_string()).unwrap(),
            )
            .await
            .unwrap();

        let a = store.history(&uid("alice"), &uid("coach-1")).await.unwrap();
        let b = store.history(&uid("coach-1"), &uid("alice")).await.unwrap();

        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[tokio::test]
    async fn test_injected_failure_fails_once() {
        // テスト項目: fail_next_persist は次の 1 回だけ失敗させる
        let store = InMemoryChatStore::new();
        store.fail_next_persist().await;

        let first = store
            .persist(
                uid("alice"),
                uid("coach-1"),
                MessageBody::text("lost".to_string()).unwrap(),
            )
            .await;
        let second = store
            .persist(
                uid("alice"),
                uid("coach-1"),
                MessageBody::text("kept".to_string()).unwrap(),
            )
            .await;

        assert!(first.is_err());
        assert!(second.is_ok());
        assert_eq!(store.len().await, 1);
    }
}
