use crate::subscription::Subscription;
use crate::traits::{DocumentKey, DocumentSnapshot, DocumentStore};
use async_trait::async_trait;
use dashboard_core::DashboardResult;
use serde_json::Value;
use std::collections::HashMap;
use tokio::sync::{broadcast, RwLock};

const CHANNEL_CAPACITY: usize = 64;

/// In-process document store.
/// Every write is broadcast to subscribers of the written key.
#[derive(Debug)]
pub struct MemoryStore {
    documents: RwLock<HashMap<DocumentKey, Value>>,
    tx: broadcast::Sender<DocumentSnapshot>,
}

impl MemoryStore {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            documents: RwLock::new(HashMap::new()),
            tx,
        }
    }

    /// Seed a document without notifying anyone.
    pub async fn insert(&self, key: DocumentKey, value: Value) {
        self.documents.write().await.insert(key, value);
    }

    fn publish(&self, key: &DocumentKey, value: &Value) {
        // No receivers is fine: nobody is subscribed yet.
        let _ = self.tx.send(DocumentSnapshot {
            key: key.clone(),
            value: Some(value.clone()),
        });
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, key: &DocumentKey) -> DashboardResult<Option<Value>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn create_if_absent(&self, key: &DocumentKey, initial: Value) -> DashboardResult<Value> {
        let mut documents = self.documents.write().await;
        if let Some(existing) = documents.get(key) {
            return Ok(existing.clone());
        }
        documents.insert(key.clone(), initial.clone());
        self.publish(key, &initial);
        tracing::debug!("Created document {}", key);
        Ok(initial)
    }

    async fn replace(&self, key: &DocumentKey, value: Value) -> DashboardResult<()> {
        let mut documents = self.documents.write().await;
        documents.insert(key.clone(), value.clone());
        self.publish(key, &value);
        tracing::debug!("Replaced document {}", key);
        Ok(())
    }

    async fn subscribe(&self, key: &DocumentKey) -> DashboardResult<Subscription> {
        // Holding the lock orders the initial read before any later write.
        let documents = self.documents.read().await;
        let rx = self.tx.subscribe();
        let initial = DocumentSnapshot {
            key: key.clone(),
            value: documents.get(key).cloned(),
        };
        Ok(Subscription::new(initial, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_create_if_absent_keeps_existing() {
        let store = MemoryStore::new();
        let key = DocumentKey::new("boards", "u1");

        let created = store.create_if_absent(&key, json!({"v": 1})).await.unwrap();
        assert_eq!(created, json!({"v": 1}));

        let kept = store.create_if_absent(&key, json!({"v": 2})).await.unwrap();
        assert_eq!(kept, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_subscription_sees_current_then_writes() {
        let store = MemoryStore::new();
        let key = DocumentKey::new("notes", "u1");
        store.insert(key.clone(), json!({"v": 0})).await;

        let mut sub = store.subscribe(&key).await.unwrap();
        store.replace(&key, json!({"v": 1})).await.unwrap();
        store
            .replace(&DocumentKey::new("notes", "u2"), json!({"v": 9}))
            .await
            .unwrap();
        store.replace(&key, json!({"v": 2})).await.unwrap();

        assert_eq!(sub.next().await.unwrap().value, Some(json!({"v": 0})));
        assert_eq!(sub.next().await.unwrap().value, Some(json!({"v": 1})));
        assert_eq!(sub.next().await.unwrap().value, Some(json!({"v": 2})));
    }

    #[tokio::test]
    async fn test_subscribe_to_missing_document() {
        let store = MemoryStore::new();
        let mut sub = store
            .subscribe(&DocumentKey::new("boards", "nobody"))
            .await
            .unwrap();
        assert!(!sub.next().await.unwrap().exists());
    }
}
