//! Local, renderable copy of one remote document.
//!
//! The remote copy is authoritative: every emission replaces local state
//! wholesale. Local edits are applied optimistically and then committed as a
//! full-document replace. A failed commit is logged and kept as a pending
//! [`CommitFailure`] until a retry succeeds or the next emission overwrites
//! local state; it is never retried automatically.

use chrono::{DateTime, Utc};
use dashboard_core::DashboardResult;
use dashboard_domain::{
    BoardDocument, KeywordList, NoteBook, BOARDS_COLLECTION, KEYWORDS_COLLECTION,
    NOTES_COLLECTION,
};
use dashboard_persistence::{DocumentKey, DocumentSnapshot, DocumentStore, Subscription};
use serde_json::Value;
use std::sync::Arc;

/// A per-user document kept in sync with the store.
pub trait SyncedDocument: Clone + Send + Sync + 'static {
    const COLLECTION: &'static str;

    fn empty(owner_id: &str) -> Self;

    /// Decode a remote value, repairing whatever is malformed.
    fn from_remote(owner_id: &str, value: &Value) -> Self;

    fn to_remote(&self) -> Value;
}

impl SyncedDocument for BoardDocument {
    const COLLECTION: &'static str = BOARDS_COLLECTION;

    fn empty(owner_id: &str) -> Self {
        BoardDocument::empty(owner_id)
    }

    fn from_remote(owner_id: &str, value: &Value) -> Self {
        BoardDocument::from_remote(owner_id, value)
    }

    fn to_remote(&self) -> Value {
        BoardDocument::to_remote(self)
    }
}

impl SyncedDocument for NoteBook {
    const COLLECTION: &'static str = NOTES_COLLECTION;

    fn empty(owner_id: &str) -> Self {
        NoteBook::empty(owner_id)
    }

    fn from_remote(owner_id: &str, value: &Value) -> Self {
        NoteBook::from_remote(owner_id, value)
    }

    fn to_remote(&self) -> Value {
        NoteBook::to_remote(self)
    }
}

impl SyncedDocument for KeywordList {
    const COLLECTION: &'static str = KEYWORDS_COLLECTION;

    fn empty(owner_id: &str) -> Self {
        KeywordList::empty(owner_id)
    }

    fn from_remote(owner_id: &str, value: &Value) -> Self {
        KeywordList::from_remote(owner_id, value)
    }

    fn to_remote(&self) -> Value {
        KeywordList::to_remote(self)
    }
}

/// A commit the store rejected. Local state still holds the edit.
#[derive(Debug, Clone)]
pub struct CommitFailure {
    pub key: DocumentKey,
    pub reason: String,
    pub failed_at: DateTime<Utc>,
}

pub struct Replica<D: SyncedDocument> {
    store: Arc<dyn DocumentStore>,
    key: DocumentKey,
    local: D,
    subscription: Option<Subscription>,
    commit_failure: Option<CommitFailure>,
}

impl<D: SyncedDocument> Replica<D> {
    /// Subscribe to the user's document and apply the first emission. A
    /// document that does not exist yet is created empty.
    pub async fn open(store: Arc<dyn DocumentStore>, owner_id: &str) -> DashboardResult<Self> {
        let key = DocumentKey::new(D::COLLECTION, owner_id);
        let mut subscription = store.subscribe(&key).await?;

        let mut replica = Self {
            store,
            key,
            local: D::empty(owner_id),
            subscription: None,
            commit_failure: None,
        };

        match subscription.next().await {
            Some(snapshot) if snapshot.exists() => replica.apply(snapshot),
            _ => {
                let initial = replica.local.to_remote();
                if let Err(e) = replica.store.create_if_absent(&replica.key, initial).await {
                    tracing::error!("Failed to create {}: {}", replica.key, e);
                }
            }
        }

        replica.subscription = Some(subscription);
        tracing::debug!("Opened replica of {}", replica.key);
        Ok(replica)
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    pub fn owner_id(&self) -> &str {
        &self.key.id
    }

    pub fn local(&self) -> &D {
        &self.local
    }

    pub fn is_subscribed(&self) -> bool {
        self.subscription.is_some()
    }

    /// Replace local state with a remote snapshot. A vanished document
    /// renders as empty.
    pub fn apply(&mut self, snapshot: DocumentSnapshot) {
        self.local = match &snapshot.value {
            Some(value) => D::from_remote(&self.key.id, value),
            None => D::empty(&self.key.id),
        };
        self.commit_failure = None;
    }

    /// Wait for the next remote snapshot without applying it.
    /// `None` when unsubscribed or the store went away.
    pub async fn next_snapshot(&mut self) -> Option<DocumentSnapshot> {
        match self.subscription.as_mut() {
            Some(subscription) => subscription.next().await,
            None => None,
        }
    }

    /// Wait for the next emission and apply it.
    pub async fn next_emission(&mut self) -> bool {
        match self.next_snapshot().await {
            Some(snapshot) => {
                self.apply(snapshot);
                true
            }
            None => false,
        }
    }

    /// Apply every emission that is already queued. Returns how many were applied.
    pub fn apply_pending(&mut self) -> usize {
        let mut applied = 0;
        loop {
            let next = match self.subscription.as_mut() {
                Some(subscription) => subscription.try_next(),
                None => None,
            };
            let Some(snapshot) = next else {
                break;
            };
            self.apply(snapshot);
            applied += 1;
        }
        applied
    }

    /// Apply `edit` to local state and commit when it reports a change.
    pub async fn update<F>(&mut self, edit: F) -> DashboardResult<bool>
    where
        F: FnOnce(&mut D) -> DashboardResult<bool>,
    {
        let changed = edit(&mut self.local)?;
        if changed {
            self.commit().await;
        }
        Ok(changed)
    }

    /// Write the full local document. Failures are logged and recorded,
    /// never returned.
    pub async fn commit(&mut self) -> bool {
        let value = self.local.to_remote();
        match self.store.replace(&self.key, value).await {
            Ok(()) => {
                self.commit_failure = None;
                true
            }
            Err(e) => {
                tracing::error!("Error updating {}: {}", self.key, e);
                self.commit_failure = Some(CommitFailure {
                    key: self.key.clone(),
                    reason: e.to_string(),
                    failed_at: Utc::now(),
                });
                false
            }
        }
    }

    pub fn pending_commit_failure(&self) -> Option<&CommitFailure> {
        self.commit_failure.as_ref()
    }

    /// Re-send the current local state after a failed commit.
    pub async fn retry_commit(&mut self) -> bool {
        if self.commit_failure.is_none() {
            return true;
        }
        tracing::info!("Retrying commit of {}", self.key);
        self.commit().await
    }

    /// Stop listening for emissions.
    pub fn close(&mut self) {
        if self.subscription.take().is_some() {
            tracing::debug!("Unsubscribed from {}", self.key);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::DashboardError;
    use dashboard_domain::NoteCategory;
    use dashboard_persistence::MemoryStore;
    use serde_json::json;

    mockall::mock! {
        pub Store {}

        #[async_trait::async_trait]
        impl DocumentStore for Store {
            async fn get(&self, key: &DocumentKey) -> DashboardResult<Option<Value>>;
            async fn create_if_absent(&self, key: &DocumentKey, initial: Value) -> DashboardResult<Value>;
            async fn replace(&self, key: &DocumentKey, value: Value) -> DashboardResult<()>;
            async fn subscribe(&self, key: &DocumentKey) -> DashboardResult<Subscription>;
        }
    }

    fn rejecting_store() -> MockStore {
        let mut store = MockStore::new();
        store.expect_subscribe().returning(|key| {
            let (_tx, rx) = tokio::sync::broadcast::channel(1);
            Ok(Subscription::new(
                DocumentSnapshot {
                    key: key.clone(),
                    value: Some(json!({"notes": []})),
                },
                rx,
            ))
        });
        store
            .expect_replace()
            .returning(|_, _| Err(DashboardError::Store("permission denied".into())));
        store
    }

    #[tokio::test]
    async fn test_open_creates_missing_document() {
        let store = Arc::new(MemoryStore::new());
        let replica = Replica::<NoteBook>::open(store.clone(), "u1").await.unwrap();

        assert!(replica.local().notes.is_empty());
        let stored = store
            .get(&DocumentKey::new(NOTES_COLLECTION, "u1"))
            .await
            .unwrap();
        assert_eq!(stored, Some(json!({"userId": "u1", "notes": []})));
    }

    #[tokio::test]
    async fn test_emissions_replace_local_state() {
        let store = Arc::new(MemoryStore::new());
        let mut replica = Replica::<NoteBook>::open(store.clone(), "u1").await.unwrap();
        // The creation write is echoed back.
        replica.apply_pending();

        store
            .replace(
                &DocumentKey::new(NOTES_COLLECTION, "u1"),
                json!({"notes": [{"id": "n1", "content": "from elsewhere", "category": "akun", "createdAt": 1}]}),
            )
            .await
            .unwrap();

        assert!(replica.next_emission().await);
        assert_eq!(replica.local().notes[0].content, "from elsewhere");
    }

    #[tokio::test]
    async fn test_commit_failure_keeps_local_edit_and_is_retryable() {
        let store: Arc<dyn DocumentStore> = Arc::new(rejecting_store());
        let mut replica = Replica::<NoteBook>::open(store, "u1").await.unwrap();

        let changed = replica
            .update(|book| Ok(book.add("draft", NoteCategory::Catatan, 1).is_some()))
            .await
            .unwrap();

        assert!(changed);
        assert_eq!(replica.local().notes.len(), 1);
        let failure = replica.pending_commit_failure().unwrap();
        assert!(failure.reason.contains("permission denied"));

        assert!(!replica.retry_commit().await);
        assert!(replica.pending_commit_failure().is_some());
    }

    #[tokio::test]
    async fn test_unchanged_update_does_not_commit() {
        let mut store = MockStore::new();
        store.expect_subscribe().returning(|key| {
            let (_tx, rx) = tokio::sync::broadcast::channel(1);
            Ok(Subscription::new(
                DocumentSnapshot {
                    key: key.clone(),
                    value: Some(json!({"notes": []})),
                },
                rx,
            ))
        });
        store.expect_replace().never();

        let mut replica = Replica::<NoteBook>::open(Arc::new(store), "u1").await.unwrap();
        let changed = replica
            .update(|book| Ok(book.add("   ", NoteCategory::Catatan, 1).is_some()))
            .await
            .unwrap();
        assert!(!changed);
    }

    #[tokio::test]
    async fn test_close_ends_emissions() {
        let store = Arc::new(MemoryStore::new());
        let mut replica = Replica::<NoteBook>::open(store, "u1").await.unwrap();
        replica.close();
        assert!(!replica.is_subscribed());
        assert!(!replica.next_emission().await);
    }
}
