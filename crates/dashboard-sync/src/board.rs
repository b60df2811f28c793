//! Board reconciler: the live three-column board of the signed-in user.
//!
//! Owns the board [`Replica`] and the [`TimerManager`]. After every emission
//! and every local mutation the running timers are made to match the set of
//! in-progress tasks that carry a deadline.

use crate::replica::{CommitFailure, Replica};
use crate::timer::{TimerManager, TimerTick};
use dashboard_core::{Confirm, CountdownLocale, DashboardError, DashboardResult};
use dashboard_domain::commands::{AddTask, Command, CommandContext, DeleteTask, MoveTask};
use dashboard_domain::{
    now_millis, remaining_time_label, BoardDocument, ColumnKey, TaskId, TaskState,
};
use dashboard_persistence::{DocumentSnapshot, DocumentStore};
use std::sync::Arc;

pub const DELETE_TASK_PROMPT: &str = "Are you sure you want to delete this task?";

/// Something the view should re-render for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// A remote snapshot replaced the local board.
    Emission,
    /// A countdown ticked; re-render that task's remaining time.
    Tick(TimerTick),
}

enum Wakeup {
    Snapshot(Option<DocumentSnapshot>),
    Tick(TimerTick),
}

pub struct BoardReconciler {
    store: Arc<dyn DocumentStore>,
    replica: Option<Replica<BoardDocument>>,
    timers: TimerManager,
}

impl BoardReconciler {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self {
            store,
            replica: None,
            timers: TimerManager::new(),
        }
    }

    /// Mount the board of `user_id`. With no signed-in user nothing is
    /// mounted and `Ok(false)` is returned.
    pub async fn mount(&mut self, user_id: Option<&str>) -> DashboardResult<bool> {
        self.unmount();

        let Some(user_id) = user_id else {
            tracing::debug!("No signed-in user, board not mounted");
            return Ok(false);
        };

        let replica = Replica::open(self.store.clone(), user_id).await?;
        self.replica = Some(replica);
        self.sync_timers();
        tracing::info!("Mounted board for {}", user_id);
        Ok(true)
    }

    pub fn is_mounted(&self) -> bool {
        self.replica.is_some()
    }

    pub fn board(&self) -> Option<&BoardDocument> {
        self.replica.as_ref().map(Replica::local)
    }

    pub fn timers(&self) -> &TimerManager {
        &self.timers
    }

    /// Remaining-time label for a task, if it has a deadline.
    pub fn remaining_label(&self, task_id: &str, locale: CountdownLocale) -> Option<String> {
        let deadline = self.board()?.find_task(task_id)?.deadline?;
        Some(remaining_time_label(deadline, now_millis(), locale))
    }

    /// Wait for the next remote emission or timer tick.
    /// `None` once unmounted or the subscription ended.
    pub async fn next_event(&mut self) -> Option<BoardEvent> {
        let replica = self.replica.as_mut()?;
        let wakeup = tokio::select! {
            snapshot = replica.next_snapshot() => Wakeup::Snapshot(snapshot),
            tick = self.timers.next_tick() => Wakeup::Tick(tick),
        };

        match wakeup {
            Wakeup::Snapshot(Some(snapshot)) => {
                self.apply_snapshot(snapshot);
                Some(BoardEvent::Emission)
            }
            Wakeup::Snapshot(None) => None,
            Wakeup::Tick(tick) => Some(BoardEvent::Tick(tick)),
        }
    }

    /// Apply emissions that are already queued without waiting.
    pub fn apply_pending(&mut self) -> usize {
        let applied = match self.replica.as_mut() {
            Some(replica) => replica.apply_pending(),
            None => 0,
        };
        if applied > 0 {
            self.sync_timers();
        }
        applied
    }

    /// Returns the new task's id, or `None` when `content` is blank.
    pub async fn add_task(&mut self, content: &str, days: u32) -> DashboardResult<Option<TaskId>> {
        let before: Vec<TaskId> = self
            .mounted()?
            .local()
            .column(ColumnKey::Todo)
            .task_ids()
            .cloned()
            .collect();

        let added = self
            .run(&AddTask {
                content: content.to_string(),
                days,
            })
            .await?;
        if !added {
            return Ok(None);
        }

        let id = self
            .board()
            .and_then(|board| {
                board
                    .column(ColumnKey::Todo)
                    .task_ids()
                    .find(|id| !before.contains(id))
                    .cloned()
            });
        Ok(id)
    }

    /// Move a task to the end of `to`. No-op when it is not in `from`.
    pub async fn move_task(
        &mut self,
        task_id: &str,
        from: ColumnKey,
        to: ColumnKey,
    ) -> DashboardResult<bool> {
        self.run(&MoveTask {
            task_id: task_id.to_string(),
            from,
            to,
        })
        .await
    }

    /// Forward arrow: todo to in progress, in progress to done.
    pub async fn advance(&mut self, task_id: &str) -> DashboardResult<bool> {
        let Some(from) = self.mounted()?.local().locate(task_id) else {
            return Ok(false);
        };
        match TaskState::from(from).advance() {
            Some(target) => self.move_task(task_id, from, target.into()).await,
            None => Ok(false),
        }
    }

    /// Completion checkbox: done goes back to todo, anything else to done.
    pub async fn toggle_done(&mut self, task_id: &str) -> DashboardResult<bool> {
        let Some(from) = self.mounted()?.local().locate(task_id) else {
            return Ok(false);
        };
        let target = TaskState::from(from).toggle_done();
        self.move_task(task_id, from, target.into()).await
    }

    /// Delete after confirmation. A declined prompt leaves everything as is.
    pub async fn delete_task(
        &mut self,
        column: ColumnKey,
        task_id: &str,
        confirm: &dyn Confirm,
    ) -> DashboardResult<bool> {
        self.mounted()?;
        if !confirm.confirm(DELETE_TASK_PROMPT) {
            tracing::debug!("Delete of {} declined", task_id);
            return Ok(false);
        }

        let deleted = self
            .run(&DeleteTask {
                column,
                task_id: task_id.to_string(),
            })
            .await?;
        if deleted {
            self.timers.stop(task_id);
        }
        Ok(deleted)
    }

    pub fn pending_commit_failure(&self) -> Option<&CommitFailure> {
        self.replica.as_ref()?.pending_commit_failure()
    }

    pub async fn retry_commit(&mut self) -> DashboardResult<bool> {
        Ok(self.mounted_mut()?.retry_commit().await)
    }

    /// Drop the subscription and every timer.
    pub fn unmount(&mut self) {
        if let Some(mut replica) = self.replica.take() {
            replica.close();
            tracing::info!("Unmounted board for {}", replica.owner_id());
        }
        self.timers.stop_all();
    }

    fn mounted(&self) -> DashboardResult<&Replica<BoardDocument>> {
        self.replica.as_ref().ok_or(DashboardError::NotSignedIn)
    }

    fn mounted_mut(&mut self) -> DashboardResult<&mut Replica<BoardDocument>> {
        self.replica.as_mut().ok_or(DashboardError::NotSignedIn)
    }

    async fn run(&mut self, command: &dyn Command) -> DashboardResult<bool> {
        let now_ms = now_millis();
        let replica = self.mounted_mut()?;
        let changed = replica
            .update(|board| {
                let mut context = CommandContext::new(board, now_ms);
                command.execute(&mut context)
            })
            .await?;

        if changed {
            tracing::debug!("{}", command.description());
            self.sync_timers();
        }
        Ok(changed)
    }

    fn apply_snapshot(&mut self, snapshot: DocumentSnapshot) {
        if let Some(replica) = self.replica.as_mut() {
            replica.apply(snapshot);
        }
        self.sync_timers();
    }

    fn sync_timers(&mut self) {
        let wanted = self
            .replica
            .as_ref()
            .map(|replica| replica.local().timed_task_ids())
            .unwrap_or_default();
        self.timers.sync(&wanted);
    }
}

impl Drop for BoardReconciler {
    fn drop(&mut self) {
        self.unmount();
    }
}
