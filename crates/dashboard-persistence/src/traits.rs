use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashboard_core::DashboardResult;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use uuid::Uuid;

use crate::subscription::Subscription;

/// Address of one document: a collection name plus the owning user's id.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentKey {
    pub collection: String,
    pub id: String,
}

impl DocumentKey {
    pub fn new(collection: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            collection: collection.into(),
            id: id.into(),
        }
    }
}

impl fmt::Display for DocumentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.collection, self.id)
    }
}

/// State of a document at one point in time. `value` is `None` when the
/// document does not exist.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentSnapshot {
    pub key: DocumentKey,
    pub value: Option<Value>,
}

impl DocumentSnapshot {
    pub fn exists(&self) -> bool {
        self.value.is_some()
    }
}

/// Metadata for persistence operations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the instance that performed the save
    pub instance_id: Uuid,
    /// When this data was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(format_version: u32, instance_id: Uuid) -> Self {
        Self {
            format_version,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Remote document store with whole-document semantics.
///
/// There is no field-level update and no version check: `replace` always
/// overwrites, and the last write wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current value of the document, if it exists.
    async fn get(&self, key: &DocumentKey) -> DashboardResult<Option<Value>>;

    /// Store `initial` unless the document already exists. Returns the
    /// value that is stored afterwards.
    async fn create_if_absent(&self, key: &DocumentKey, initial: Value) -> DashboardResult<Value>;

    /// Overwrite the whole document.
    async fn replace(&self, key: &DocumentKey, value: Value) -> DashboardResult<()>;

    /// Open a live subscription. It yields the current snapshot first and
    /// then one snapshot per change.
    async fn subscribe(&self, key: &DocumentKey) -> DashboardResult<Subscription>;
}

/// Trait for detecting changes to the storage files
/// Used for multi-instance coordination
#[async_trait]
pub trait ChangeDetector: Send + Sync {
    /// Start watching a file or directory for changes
    async fn start_watching(&self, path: PathBuf) -> DashboardResult<()>;

    /// Stop watching
    async fn stop_watching(&self) -> DashboardResult<()>;

    /// Subscribe to change events
    fn subscribe(&self) -> tokio::sync::broadcast::Receiver<ChangeEvent>;

    /// Check if currently watching
    fn is_watching(&self) -> bool;
}

/// Event indicating a change to a watched file
#[derive(Debug, Clone)]
pub struct ChangeEvent {
    /// Path to the file that changed
    pub path: PathBuf,
    /// When the change was detected
    pub detected_at: DateTime<Utc>,
}
