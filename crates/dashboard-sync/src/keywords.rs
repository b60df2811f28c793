use crate::replica::{CommitFailure, Replica};
use dashboard_core::{Confirm, DashboardError, DashboardResult};
use dashboard_domain::{now_millis, Keyword, KeywordCategory, KeywordList, KeywordSort};
use dashboard_persistence::DocumentStore;
use std::sync::Arc;

pub const DELETE_KEYWORD_PROMPT: &str = "Are you sure you want to delete this keyword?";

/// Live keyword research list of the signed-in user.
pub struct KeywordsView {
    store: Arc<dyn DocumentStore>,
    replica: Option<Replica<KeywordList>>,
}

impl KeywordsView {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            replica: None,
        }
    }

    pub async fn mount(&mut self, user_id: Option<&str>) -> DashboardResult<bool> {
        self.unmount();
        let Some(user_id) = user_id else {
            return Ok(false);
        };
        self.replica = Some(Replica::open(self.store.clone(), user_id).await?);
        Ok(true)
    }

    pub fn is_mounted(&self) -> bool {
        self.replica.is_some()
    }

    pub fn list(&self, sort: KeywordSort, filter: Option<KeywordCategory>) -> Vec<&Keyword> {
        self.replica
            .as_ref()
            .map(|replica| replica.local().list(sort, filter))
            .unwrap_or_default()
    }

    pub fn find(&self, id: &str) -> Option<&Keyword> {
        self.replica.as_ref()?.local().find(id)
    }

    pub async fn add(
        &mut self,
        text: &str,
        category: KeywordCategory,
    ) -> DashboardResult<Option<String>> {
        let mut id = None;
        self.mounted_mut()?
            .update(|list| {
                id = list.add(text, category, now_millis());
                Ok(id.is_some())
            })
            .await?;
        Ok(id)
    }

    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> DashboardResult<bool> {
        let replica = self.mounted_mut()?;
        if !confirm.confirm(DELETE_KEYWORD_PROMPT) {
            tracing::debug!("Delete of keyword {} declined", id);
            return Ok(false);
        }
        replica.update(|list| Ok(list.remove(id))).await
    }

    pub async fn next_emission(&mut self) -> bool {
        match self.replica.as_mut() {
            Some(replica) => replica.next_emission().await,
            None => false,
        }
    }

    pub fn apply_pending(&mut self) -> usize {
        self.replica.as_mut().map_or(0, Replica::apply_pending)
    }

    pub fn pending_commit_failure(&self) -> Option<&CommitFailure> {
        self.replica.as_ref()?.pending_commit_failure()
    }

    pub async fn retry_commit(&mut self) -> DashboardResult<bool> {
        Ok(self.mounted_mut()?.retry_commit().await)
    }

    pub fn unmount(&mut self) {
        if let Some(mut replica) = self.replica.take() {
            replica.close();
        }
    }

    fn mounted_mut(&mut self) -> DashboardResult<&mut Replica<KeywordList>> {
        self.replica.as_mut().ok_or(DashboardError::NotSignedIn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use dashboard_core::AlwaysConfirm;
    use dashboard_persistence::MemoryStore;

    #[tokio::test]
    async fn test_keywords_sorted_and_filtered() {
        let store = Arc::new(MemoryStore::new());
        let mut view = KeywordsView::new(store);
        view.mount(Some("u1")).await.unwrap();
        view.apply_pending();

        view.add("zombie mod", KeywordCategory::Mods).await.unwrap();
        view.add("Aquarium world", KeywordCategory::World).await.unwrap();
        view.add("blocky addon", KeywordCategory::Addon).await.unwrap();
        assert_eq!(view.add(" ", KeywordCategory::Other).await.unwrap(), None);

        let texts: Vec<_> = view
            .list(KeywordSort::Alphabetical, None)
            .iter()
            .map(|k| k.text.as_str())
            .collect();
        assert_eq!(texts, vec!["Aquarium world", "blocky addon", "zombie mod"]);

        let mods = view.list(KeywordSort::Date, Some(KeywordCategory::Mods));
        assert_eq!(mods.len(), 1);
        assert_eq!(mods[0].text, "zombie mod");
    }

    #[tokio::test]
    async fn test_delete_requires_confirmation() {
        let mut view = KeywordsView::new(Arc::new(MemoryStore::new()));
        view.mount(Some("u1")).await.unwrap();
        let id = view
            .add("skins", KeywordCategory::Other)
            .await
            .unwrap()
            .unwrap();

        assert!(!view.delete(&id, &|_: &str| false).await.unwrap());
        assert!(view.find(&id).is_some());

        assert!(view.delete(&id, &AlwaysConfirm).await.unwrap());
        assert!(view.find(&id).is_none());
    }
}
