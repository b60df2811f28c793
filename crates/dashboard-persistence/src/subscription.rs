use tokio::sync::broadcast::{self, error::RecvError};

use crate::traits::{DocumentKey, DocumentSnapshot};

/// Live feed of one document.
///
/// Yields the snapshot captured when the subscription was opened, then every
/// later change to the same key in delivery order. Dropping the value
/// unsubscribes.
#[derive(Debug)]
pub struct Subscription {
    key: DocumentKey,
    initial: Option<DocumentSnapshot>,
    rx: broadcast::Receiver<DocumentSnapshot>,
}

impl Subscription {
    pub fn new(initial: DocumentSnapshot, rx: broadcast::Receiver<DocumentSnapshot>) -> Self {
        Self {
            key: initial.key.clone(),
            initial: Some(initial),
            rx,
        }
    }

    pub fn key(&self) -> &DocumentKey {
        &self.key
    }

    /// Wait for the next snapshot. Returns `None` once the store is gone.
    pub async fn next(&mut self) -> Option<DocumentSnapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.recv().await {
                Ok(snapshot) if snapshot.key == self.key => return Some(snapshot),
                Ok(_) => continue,
                // Every snapshot carries the full document, so skipping
                // ahead to the next one loses nothing.
                Err(RecvError::Lagged(skipped)) => {
                    tracing::warn!("Subscription to {} lagged by {} snapshots", self.key, skipped);
                    continue;
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next snapshot if one is already queued, without waiting.
    pub fn try_next(&mut self) -> Option<DocumentSnapshot> {
        if let Some(initial) = self.initial.take() {
            return Some(initial);
        }
        loop {
            match self.rx.try_recv() {
                Ok(snapshot) if snapshot.key == self.key => return Some(snapshot),
                Ok(_) => continue,
                Err(broadcast::error::TryRecvError::Lagged(_)) => continue,
                Err(_) => return None,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_initial_then_matching_changes() {
        let (tx, rx) = broadcast::channel(8);
        let key = DocumentKey::new("boards", "u1");
        let other = DocumentKey::new("boards", "u2");
        let mut sub = Subscription::new(
            DocumentSnapshot {
                key: key.clone(),
                value: None,
            },
            rx,
        );

        tx.send(DocumentSnapshot {
            key: other,
            value: Some(json!(1)),
        })
        .unwrap();
        tx.send(DocumentSnapshot {
            key: key.clone(),
            value: Some(json!(2)),
        })
        .unwrap();

        assert_eq!(sub.next().await.unwrap().value, None);
        assert_eq!(sub.next().await.unwrap().value, Some(json!(2)));
        assert!(sub.try_next().is_none());

        drop(tx);
        assert!(sub.next().await.is_none());
    }
}
