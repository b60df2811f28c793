use crate::traits::{ChangeDetector, ChangeEvent};
use chrono::Utc;
use dashboard_core::DashboardResult;
use notify::{EventKind, RecursiveMode, Watcher};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;

/// File system watcher for the document directory
/// Uses the `notify` crate for cross-platform file watching
/// Spawns the watcher in a tokio task to handle the Send requirement
///
/// Reports creations and modifications of `.json` files anywhere below the
/// watched root. Atomic writes show up as a rename onto the target path,
/// which `notify` reports as a modify event.
pub struct FileWatcher {
    tx: broadcast::Sender<ChangeEvent>,
    task_handle: Arc<Mutex<Option<tokio::task::JoinHandle<()>>>>,
    watching: Arc<AtomicBool>,
}

impl FileWatcher {
    /// Create a new file watcher
    /// The broadcast channel has a buffer size of 32
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(32);
        Self {
            tx,
            task_handle: Arc::new(Mutex::new(None)),
            watching: Arc::new(AtomicBool::new(false)),
        }
    }

    fn is_document_event(event: &notify::Event) -> bool {
        matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_))
    }

    fn abort_task(&self) -> bool {
        let handle = match self.task_handle.lock() {
            Ok(mut guard) => guard.take(),
            Err(poisoned) => poisoned.into_inner().take(),
        };
        self.watching.store(false, Ordering::SeqCst);
        match handle {
            Some(handle) => {
                handle.abort();
                true
            }
            None => false,
        }
    }
}

impl Default for FileWatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for FileWatcher {
    fn drop(&mut self) {
        self.abort_task();
    }
}

#[async_trait::async_trait]
impl ChangeDetector for FileWatcher {
    async fn start_watching(&self, path: PathBuf) -> DashboardResult<()> {
        tokio::fs::create_dir_all(&path).await?;
        // Canonicalize to absolute path so it matches OS event paths
        let root = tokio::fs::canonicalize(&path).await?;

        self.abort_task();

        let tx = self.tx.clone();
        let watching = self.watching.clone();
        watching.store(true, Ordering::SeqCst);

        let handle = tokio::spawn(async move {
            let watcher = notify::recommended_watcher(move |res: notify::Result<notify::Event>| {
                match res {
                    Ok(event) if Self::is_document_event(&event) => {
                        for path in event
                            .paths
                            .iter()
                            .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                        {
                            let _ = tx.send(ChangeEvent {
                                path: path.clone(),
                                detected_at: Utc::now(),
                            });
                        }
                    }
                    Ok(_) => {}
                    Err(e) => {
                        tracing::warn!("File watcher error: {}", e);
                    }
                }
            });

            match watcher {
                Ok(mut watcher) => {
                    if let Err(e) = watcher.watch(&root, RecursiveMode::Recursive) {
                        tracing::error!("Failed to watch directory: {}", e);
                    } else {
                        tracing::info!("Started watching directory: {}", root.display());
                        // Keep watcher alive
                        std::future::pending::<()>().await;
                    }
                }
                Err(e) => {
                    tracing::error!("Failed to create watcher: {}", e);
                }
            }
            watching.store(false, Ordering::SeqCst);
        });

        match self.task_handle.lock() {
            Ok(mut guard) => *guard = Some(handle),
            Err(poisoned) => *poisoned.into_inner() = Some(handle),
        }

        Ok(())
    }

    async fn stop_watching(&self) -> DashboardResult<()> {
        if self.abort_task() {
            tracing::info!("Stopped file watching");
        }
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    fn is_watching(&self) -> bool {
        self.watching.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;
    use tokio::time::{sleep, Duration};

    #[tokio::test]
    async fn test_file_watcher_detects_changes() {
        let dir = tempdir().unwrap();
        let root = tokio::fs::canonicalize(dir.path()).await.unwrap();
        let file_path = root.join("boards").join("u1.json");
        tokio::fs::create_dir_all(file_path.parent().unwrap())
            .await
            .unwrap();
        tokio::fs::write(&file_path, b"{}").await.unwrap();

        let watcher = FileWatcher::new();
        let mut rx = watcher.subscribe();

        watcher.start_watching(root.clone()).await.unwrap();
        assert!(watcher.is_watching());

        // Give watcher time to start
        sleep(Duration::from_millis(100)).await;

        tokio::fs::write(&file_path, b"{\"changed\":true}")
            .await
            .unwrap();

        // Wait for change event (with timeout)
        let result = tokio::time::timeout(Duration::from_secs(2), rx.recv()).await;

        watcher.stop_watching().await.unwrap();
        assert!(!watcher.is_watching());

        // Timing is platform-dependent, so only check the event if one arrived
        if let Ok(Ok(event)) = result {
            assert_eq!(event.path, file_path);
        }
    }
}
