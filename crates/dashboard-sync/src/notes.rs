use crate::replica::{CommitFailure, Replica};
use dashboard_core::{Confirm, DashboardError, DashboardResult};
use dashboard_domain::{now_millis, Note, NoteBook, NoteCategory};
use dashboard_persistence::DocumentStore;
use std::sync::Arc;

pub const DELETE_NOTE_PROMPT: &str = "Are you sure you want to delete this note?";

/// Live notes of the signed-in user.
pub struct NotesView {
    store: Arc<dyn DocumentStore>,
    replica: Option<Replica<NoteBook>>,
}

impl NotesView {
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

    pub fn book(&self) -> Option<&NoteBook> {
        self.replica.as_ref().map(Replica::local)
    }

    /// Newest first.
    pub fn list(&self, filter: Option<NoteCategory>) -> Vec<&Note> {
        self.book()
            .map(|book| book.list(filter))
            .unwrap_or_default()
    }

    /// Returns the new note's id, or `None` for blank content.
    pub async fn add(
        &mut self,
        content: &str,
        category: NoteCategory,
    ) -> DashboardResult<Option<String>> {
        let mut id = None;
        self.mounted_mut()?
            .update(|book| {
                id = book.add(content, category, now_millis());
                Ok(id.is_some())
            })
            .await?;
        Ok(id)
    }

    pub async fn edit(&mut self, id: &str, content: &str) -> DashboardResult<bool> {
        self.mounted_mut()?
            .update(|book| Ok(book.edit(id, content, now_millis())))
            .await
    }

    pub async fn delete(&mut self, id: &str, confirm: &dyn Confirm) -> DashboardResult<bool> {
        let replica = self.mounted_mut()?;
        if !confirm.confirm(DELETE_NOTE_PROMPT) {
            tracing::debug!("Delete of note {} declined", id);
            return Ok(false);
        }
        replica.update(|book| Ok(book.remove(id))).await
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

    fn mounted_mut(&mut self) -> DashboardResult<&mut Replica<NoteBook>> {
        self.replica.as_mut().ok_or(DashboardError::NotSignedIn)
    }
}
