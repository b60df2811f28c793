use crate::store::atomic_writer::AtomicWriter;
use crate::subscription::Subscription;
use crate::traits::{
    ChangeDetector, DocumentKey, DocumentSnapshot, DocumentStore, PersistenceMetadata,
};
use crate::watch::FileWatcher;
use async_trait::async_trait;
use dashboard_core::{DashboardError, DashboardResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use uuid::Uuid;

pub const FORMAT_VERSION: u32 = 1;
const CHANNEL_CAPACITY: usize = 64;

/// On-disk wrapper around one document
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: Value,
}

/// Directory-backed document store
/// Each document lives at `<root>/<collection>/<id>.json`
///
/// Writes made through this instance are published to subscribers directly.
/// With [`JsonDocumentStore::watching_external_changes`], writes made by other
/// processes are picked up through a [`FileWatcher`] and published too.
#[derive(Clone)]
pub struct JsonDocumentStore {
    inner: Arc<Inner>,
}

struct Inner {
    root: PathBuf,
    instance_id: Uuid,
    tx: broadcast::Sender<DocumentSnapshot>,
    write_lock: Mutex<()>,
    watcher: Option<FileWatcher>,
    watch_started: AtomicBool,
}

impl JsonDocumentStore {
    /// Create a new store rooted at `root`
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self::build(root.as_ref().to_path_buf(), Uuid::new_v4(), false)
    }

    /// Create a store with a specific instance ID
    /// (useful for testing or coordinating across instances)
    pub fn with_instance_id(root: impl AsRef<Path>, instance_id: Uuid) -> Self {
        Self::build(root.as_ref().to_path_buf(), instance_id, false)
    }

    /// Same store, but subscriptions also observe writes from other processes
    pub fn watching_external_changes(root: impl AsRef<Path>) -> Self {
        Self::build(root.as_ref().to_path_buf(), Uuid::new_v4(), true)
    }

    fn build(root: PathBuf, instance_id: Uuid, watch: bool) -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            inner: Arc::new(Inner {
                root,
                instance_id,
                tx,
                write_lock: Mutex::new(()),
                watcher: watch.then(FileWatcher::new),
                watch_started: AtomicBool::new(false),
            }),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.inner.instance_id
    }

    pub fn root(&self) -> &Path {
        &self.inner.root
    }

    /// File backing `key`. Keys that would escape the root are rejected.
    pub fn path_for(&self, key: &DocumentKey) -> DashboardResult<PathBuf> {
        for part in [&key.collection, &key.id] {
            let mut components = Path::new(part.as_str()).components();
            let single_normal = matches!(components.next(), Some(Component::Normal(_)))
                && components.next().is_none();
            if !single_normal {
                return Err(DashboardError::Validation(format!(
                    "invalid document key segment '{}'",
                    part
                )));
            }
        }
        Ok(self
            .inner
            .root
            .join(&key.collection)
            .join(format!("{}.json", key.id)))
    }

    async fn read_document(&self, key: &DocumentKey) -> DashboardResult<Option<Value>> {
        let path = self.path_for(key)?;
        if !path.exists() {
            return Ok(None);
        }
        let envelope = read_envelope(&path).await?;
        Ok(Some(envelope.data))
    }

    async fn write_document(&self, key: &DocumentKey, value: &Value) -> DashboardResult<()> {
        let path = self.path_for(key)?;
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, self.inner.instance_id),
            data: value.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)
            .map_err(|e| DashboardError::Serialization(e.to_string()))?;
        AtomicWriter::write_atomic(&path, &bytes).await?;

        tracing::info!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(())
    }

    fn publish(&self, key: &DocumentKey, value: &Value) {
        let _ = self.inner.tx.send(DocumentSnapshot {
            key: key.clone(),
            value: Some(value.clone()),
        });
    }

    async fn ensure_watching(&self) -> DashboardResult<()> {
        let Some(watcher) = &self.inner.watcher else {
            return Ok(());
        };
        if self.inner.watch_started.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        tokio::fs::create_dir_all(&self.inner.root).await?;
        let root = tokio::fs::canonicalize(&self.inner.root).await?;
        let mut changes = watcher.subscribe();
        watcher.start_watching(root.clone()).await?;

        let tx = self.inner.tx.clone();
        let instance_id = self.inner.instance_id;
        tokio::spawn(async move {
            loop {
                let event = match changes.recv().await {
                    Ok(event) => event,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                };
                let Some(key) = key_for_path(&root, &event.path) else {
                    continue;
                };
                match read_envelope(&event.path).await {
                    // Our own writes were already published by `replace`.
                    Ok(envelope) if envelope.metadata.instance_id == instance_id => {}
                    Ok(envelope) => {
                        tracing::info!("External change detected for {}", key);
                        let _ = tx.send(DocumentSnapshot {
                            key,
                            value: Some(envelope.data),
                        });
                    }
                    Err(e) => {
                        tracing::warn!("Ignoring unreadable change to {}: {}", event.path.display(), e);
                    }
                }
            }
        });
        Ok(())
    }
}

impl std::fmt::Debug for JsonDocumentStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonDocumentStore")
            .field("root", &self.inner.root)
            .field("instance_id", &self.inner.instance_id)
            .field("watching", &self.inner.watcher.is_some())
            .finish()
    }
}

/// Parse a document file. Files without an envelope are taken as the bare
/// document, so hand-written files load too.
async fn read_envelope(path: &Path) -> DashboardResult<JsonEnvelope> {
    let bytes = AtomicWriter::read_all(path).await?;
    let value: Value = serde_json::from_slice(&bytes)
        .map_err(|e| DashboardError::Serialization(e.to_string()))?;

    let is_envelope = value.get("version").is_some()
        && value.get("metadata").is_some()
        && value.get("data").is_some();
    if !is_envelope {
        return Ok(JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(FORMAT_VERSION, Uuid::nil()),
            data: value,
        });
    }

    let envelope: JsonEnvelope = serde_json::from_value(value)
        .map_err(|e| DashboardError::Serialization(e.to_string()))?;
    if envelope.version != FORMAT_VERSION {
        return Err(DashboardError::Serialization(format!(
            "Unsupported format version: {}",
            envelope.version
        )));
    }
    Ok(envelope)
}

fn key_for_path(root: &Path, path: &Path) -> Option<DocumentKey> {
    let relative = path.strip_prefix(root).ok()?;
    let mut components = relative.components();
    let collection = match components.next()? {
        Component::Normal(c) => c.to_str()?.to_string(),
        _ => return None,
    };
    let file = match components.next()? {
        Component::Normal(f) => Path::new(f),
        _ => return None,
    };
    if components.next().is_some() || file.extension()? != "json" {
        return None;
    }
    let id = file.file_stem()?.to_str()?.to_string();
    Some(DocumentKey::new(collection, id))
}

#[async_trait]
impl DocumentStore for JsonDocumentStore {
    async fn get(&self, key: &DocumentKey) -> DashboardResult<Option<Value>> {
        self.read_document(key).await
    }

    async fn create_if_absent(&self, key: &DocumentKey, initial: Value) -> DashboardResult<Value> {
        let _guard = self.inner.write_lock.lock().await;
        if let Some(existing) = self.read_document(key).await? {
            return Ok(existing);
        }
        self.write_document(key, &initial).await?;
        self.publish(key, &initial);
        Ok(initial)
    }

    async fn replace(&self, key: &DocumentKey, value: Value) -> DashboardResult<()> {
        let _guard = self.inner.write_lock.lock().await;
        self.write_document(key, &value).await?;
        self.publish(key, &value);
        Ok(())
    }

    async fn subscribe(&self, key: &DocumentKey) -> DashboardResult<Subscription> {
        self.ensure_watching().await?;
        let _guard = self.inner.write_lock.lock().await;
        let rx = self.inner.tx.subscribe();
        let initial = DocumentSnapshot {
            key: key.clone(),
            value: self.read_document(key).await?,
        };
        Ok(Subscription::new(initial, rx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_replace_and_get() {
        let dir = tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let key = DocumentKey::new("boards", "u1");

        assert!(store.get(&key).await.unwrap().is_none());

        let data = json!({"userId": "u1", "columns": {}});
        store.replace(&key, data.clone()).await.unwrap();

        assert!(dir.path().join("boards").join("u1.json").exists());
        assert_eq!(store.get(&key).await.unwrap(), Some(data));
    }

    #[tokio::test]
    async fn test_envelope_records_instance() {
        let dir = tempdir().unwrap();
        let instance_id = Uuid::new_v4();
        let store = JsonDocumentStore::with_instance_id(dir.path(), instance_id);
        let key = DocumentKey::new("notes", "u1");
        store.replace(&key, json!({"notes": []})).await.unwrap();

        let envelope = read_envelope(&store.path_for(&key).unwrap()).await.unwrap();
        assert_eq!(envelope.version, FORMAT_VERSION);
        assert_eq!(envelope.metadata.instance_id, instance_id);
    }

    #[tokio::test]
    async fn test_bare_document_files_load() {
        let dir = tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let key = DocumentKey::new("keywords", "u1");
        let path = store.path_for(&key).unwrap();
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, r#"{"keywords": []}"#).unwrap();

        assert_eq!(store.get(&key).await.unwrap(), Some(json!({"keywords": []})));
    }

    #[tokio::test]
    async fn test_create_if_absent_does_not_overwrite() {
        let dir = tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let key = DocumentKey::new("boards", "u1");

        store.replace(&key, json!({"v": 1})).await.unwrap();
        let value = store.create_if_absent(&key, json!({"v": 2})).await.unwrap();
        assert_eq!(value, json!({"v": 1}));
    }

    #[tokio::test]
    async fn test_subscription_receives_local_writes() {
        let dir = tempdir().unwrap();
        let store = JsonDocumentStore::new(dir.path());
        let key = DocumentKey::new("boards", "u1");

        let mut sub = store.subscribe(&key).await.unwrap();
        assert!(!sub.next().await.unwrap().exists());

        store.replace(&key, json!({"v": 1})).await.unwrap();
        assert_eq!(sub.next().await.unwrap().value, Some(json!({"v": 1})));
    }

    #[test]
    fn test_keys_cannot_escape_root() {
        let store = JsonDocumentStore::new("/tmp/dashboard-test");
        assert!(store.path_for(&DocumentKey::new("boards", "../etc")).is_err());
        assert!(store.path_for(&DocumentKey::new("boards", "a/b")).is_err());
        assert!(store.path_for(&DocumentKey::new("", "u1")).is_err());
        assert!(store.path_for(&DocumentKey::new("boards", "u1")).is_ok());
    }

    #[test]
    fn test_key_for_path() {
        let root = Path::new("/data");
        assert_eq!(
            key_for_path(root, Path::new("/data/boards/u1.json")),
            Some(DocumentKey::new("boards", "u1"))
        );
        assert_eq!(key_for_path(root, Path::new("/data/boards/.tmp123")), None);
        assert_eq!(key_for_path(root, Path::new("/other/boards/u1.json")), None);
    }
}
