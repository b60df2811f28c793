//! Task lifecycle derived from column membership.
//!
//! There is no stored status field: a task's state is whichever column holds
//! it. Two affordances drive transitions. The forward arrow walks
//! `Todo -> InProgress -> Done`. The checkbox sends any unfinished task
//! straight to `Done` and a finished one back to `Todo`.

use serde::{Deserialize, Serialize};

use crate::column::ColumnKey;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TaskState {
    Todo,
    InProgress,
    Done,
}

impl From<ColumnKey> for TaskState {
    fn from(key: ColumnKey) -> Self {
        match key {
            ColumnKey::Todo => Self::Todo,
            ColumnKey::InProgress => Self::InProgress,
            ColumnKey::Done => Self::Done,
        }
    }
}

impl From<TaskState> for ColumnKey {
    fn from(state: TaskState) -> Self {
        match state {
            TaskState::Todo => Self::Todo,
            TaskState::InProgress => Self::InProgress,
            TaskState::Done => Self::Done,
        }
    }
}

impl TaskState {
    /// Target of the forward arrow. `None` for finished tasks.
    pub fn advance(self) -> Option<TaskState> {
        match self {
            Self::Todo => Some(Self::InProgress),
            Self::InProgress => Some(Self::Done),
            Self::Done => None,
        }
    }

    /// Target of the completion checkbox.
    pub fn toggle_done(self) -> TaskState {
        match self {
            Self::Done => Self::Todo,
            Self::Todo | Self::InProgress => Self::Done,
        }
    }

    /// Whether tasks in this state run a countdown (given a deadline).
    pub fn is_timed(self) -> bool {
        self == Self::InProgress
    }
}
