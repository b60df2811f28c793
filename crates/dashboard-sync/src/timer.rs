//! Per-task countdown refresh timers.
//!
//! Every in-progress task with a deadline owns one repeating 1-second tick
//! while the board view is mounted. Ticks only tell the view to re-render the
//! remaining time; the deadline itself never changes.
//!
//! Invariant: at most one registration per task id, and every registration
//! is released by [`TimerManager::stop`], [`TimerManager::stop_all`] or
//! dropping the manager.

use chrono::{DateTime, Utc};
use dashboard_domain::TaskId;
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};

pub const TICK_PERIOD: Duration = Duration::from_secs(1);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimerTick {
    pub task_id: TaskId,
    pub at: DateTime<Utc>,
}

/// One running timer. Dropping it cancels the tick task.
#[derive(Debug)]
struct TimerHandle {
    task: JoinHandle<()>,
}

impl Drop for TimerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

#[derive(Debug)]
pub struct TimerManager {
    handles: HashMap<TaskId, TimerHandle>,
    last_ticks: HashMap<TaskId, DateTime<Utc>>,
    tick_tx: mpsc::UnboundedSender<TimerTick>,
    tick_rx: mpsc::UnboundedReceiver<TimerTick>,
}

impl TimerManager {
    pub fn new() -> Self {
        let (tick_tx, tick_rx) = mpsc::unbounded_channel();
        Self {
            handles: HashMap::new(),
            last_ticks: HashMap::new(),
            tick_tx,
            tick_rx,
        }
    }

    /// Register a repeating tick for `task_id`. No-op when one already runs.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, task_id: &str) -> bool {
        if self.handles.contains_key(task_id) {
            return false;
        }

        let tx = self.tick_tx.clone();
        let id = task_id.to_string();
        let task = tokio::spawn(async move {
            let mut interval = time::interval_at(Instant::now() + TICK_PERIOD, TICK_PERIOD);
            interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                interval.tick().await;
                let tick = TimerTick {
                    task_id: id.clone(),
                    at: Utc::now(),
                };
                if tx.send(tick).is_err() {
                    break;
                }
            }
        });

        self.handles.insert(task_id.to_string(), TimerHandle { task });
        tracing::debug!("Started countdown timer for {}", task_id);
        true
    }

    /// Cancel the timer for `task_id`. No-op when none is registered.
    pub fn stop(&mut self, task_id: &str) -> bool {
        self.last_ticks.remove(task_id);
        match self.handles.remove(task_id) {
            Some(_handle) => {
                tracing::debug!("Stopped countdown timer for {}", task_id);
                true
            }
            None => false,
        }
    }

    /// Cancel every registration. Returns how many were running.
    pub fn stop_all(&mut self) -> usize {
        let stopped = self.handles.len();
        self.handles.clear();
        self.last_ticks.clear();
        while self.tick_rx.try_recv().is_ok() {}
        if stopped > 0 {
            tracing::debug!("Stopped {} countdown timers", stopped);
        }
        stopped
    }

    /// Make the running set equal to `wanted`: start what is missing and
    /// stop everything else.
    pub fn sync<'a>(&mut self, wanted: impl IntoIterator<Item = &'a TaskId>) {
        let wanted: Vec<&TaskId> = wanted.into_iter().collect();
        let stale: Vec<TaskId> = self
            .handles
            .keys()
            .filter(|id| !wanted.contains(id))
            .cloned()
            .collect();
        for id in stale {
            self.stop(&id);
        }
        for id in wanted {
            self.start(id);
        }
    }

    pub fn is_running(&self, task_id: &str) -> bool {
        self.handles.contains_key(task_id)
    }

    pub fn active_count(&self) -> usize {
        self.handles.len()
    }

    pub fn active_ids(&self) -> Vec<TaskId> {
        let mut ids: Vec<TaskId> = self.handles.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Record a tick. Ticks from timers that were stopped meanwhile are dropped.
    pub fn record_tick(&mut self, tick: &TimerTick) -> bool {
        if !self.handles.contains_key(&tick.task_id) {
            return false;
        }
        self.last_ticks.insert(tick.task_id.clone(), tick.at);
        true
    }

    pub fn last_tick(&self, task_id: &str) -> Option<DateTime<Utc>> {
        self.last_ticks.get(task_id).copied()
    }

    /// Wait for the next tick of a live timer and record it.
    /// Pending forever while no timer runs.
    pub async fn next_tick(&mut self) -> TimerTick {
        loop {
            // The manager holds a sender itself, so the channel never closes.
            let Some(tick) = self.tick_rx.recv().await else {
                std::future::pending::<()>().await;
                continue;
            };
            if self.record_tick(&tick) {
                return tick;
            }
        }
    }
}

impl Default for TimerManager {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TimerManager {
    fn drop(&mut self) {
        self.stop_all();
    }
}
