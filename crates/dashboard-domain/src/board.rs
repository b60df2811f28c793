//! The per-user board document.
//!
//! A board always carries exactly the three columns of [`ColumnKey`]. Remote
//! payloads are decoded through [`BoardDocument::from_remote`], which repairs
//! any missing or malformed column into an empty one instead of failing. The
//! repair only affects the local copy; it reaches the store with the next
//! explicit commit.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::column::{Column, ColumnKey};
use crate::state::TaskState;
use crate::task::{Task, TaskId};

pub const BOARDS_COLLECTION: &str = "boards";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardColumns {
    pub todo: Column,
    pub in_progress: Column,
    pub done: Column,
}

impl Default for BoardColumns {
    fn default() -> Self {
        Self {
            todo: Column::empty(ColumnKey::Todo),
            in_progress: Column::empty(ColumnKey::InProgress),
            done: Column::empty(ColumnKey::Done),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardDocument {
    #[serde(rename = "userId")]
    pub owner_id: String,
    pub columns: BoardColumns,
}

impl BoardDocument {
    pub fn empty(owner_id: impl Into<String>) -> Self {
        Self {
            owner_id: owner_id.into(),
            columns: BoardColumns::default(),
        }
    }

    /// Decode a remote payload, substituting an empty column for every
    /// column that is missing or whose `tasks` is not a list.
    pub fn from_remote(owner_id: &str, value: &Value) -> Self {
        let mut board = Self::empty(owner_id);

        let Some(columns) = value.get("columns").and_then(Value::as_object) else {
            tracing::warn!("Board for {} has no columns, using empty board", owner_id);
            return board;
        };

        for key in ColumnKey::ALL {
            let tasks = match columns.get(key.as_str()).and_then(|c| c.get("tasks")) {
                Some(Value::Array(entries)) => decode_tasks(key, entries),
                Some(_) => {
                    tracing::warn!("Column {} has non-list tasks, repairing as empty", key);
                    Vec::new()
                }
                None => {
                    tracing::warn!("Column {} missing from remote board, repairing as empty", key);
                    Vec::new()
                }
            };
            *board.column_mut(key) = Column::with_tasks(key, tasks);
        }

        board
    }

    /// Full persistable form of the board.
    pub fn to_remote(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }

    pub fn column(&self, key: ColumnKey) -> &Column {
        match key {
            ColumnKey::Todo => &self.columns.todo,
            ColumnKey::InProgress => &self.columns.in_progress,
            ColumnKey::Done => &self.columns.done,
        }
    }

    pub fn column_mut(&mut self, key: ColumnKey) -> &mut Column {
        match key {
            ColumnKey::Todo => &mut self.columns.todo,
            ColumnKey::InProgress => &mut self.columns.in_progress,
            ColumnKey::Done => &mut self.columns.done,
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        ColumnKey::ALL.into_iter().map(move |key| self.column(key))
    }

    /// Column currently holding the task, which is also its state.
    pub fn locate(&self, task_id: &str) -> Option<ColumnKey> {
        ColumnKey::ALL
            .into_iter()
            .find(|key| self.column(*key).contains(task_id))
    }

    pub fn find_task(&self, task_id: &str) -> Option<&Task> {
        self.columns().find_map(|column| column.find(task_id))
    }

    pub fn contains_task(&self, task_id: &str) -> bool {
        self.locate(task_id).is_some()
    }

    pub fn task_count(&self) -> usize {
        self.columns().map(|c| c.tasks.len()).sum()
    }

    /// Tasks that should have a running countdown: in a timed state with a deadline.
    pub fn timed_task_ids(&self) -> Vec<TaskId> {
        self.columns()
            .filter(|column| TaskState::from(column.id).is_timed())
            .flat_map(|column| column.tasks.iter())
            .filter(|t| t.deadline.is_some())
            .map(|t| t.id.clone())
            .collect()
    }
}

fn decode_tasks(key: ColumnKey, entries: &[Value]) -> Vec<Task> {
    entries
        .iter()
        .filter_map(|entry| {
            let task = Task::from_remote(entry);
            if task.is_none() {
                tracing::warn!("Dropping malformed task entry in column {}", key);
            }
            task
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_empty_board_has_three_columns() {
        let board = BoardDocument::empty("u1");
        let keys: Vec<_> = board.columns().map(|c| c.id).collect();
        assert_eq!(keys, ColumnKey::ALL.to_vec());
        assert_eq!(board.column(ColumnKey::InProgress).title, "In Progress");
        assert_eq!(board.task_count(), 0);
    }

    #[test]
    fn test_missing_column_is_repaired() {
        let value = json!({
            "userId": "u1",
            "columns": {
                "todo": {"id": "todo", "title": "To Do", "tasks": [
                    {"id": "task-1", "content": "Buy milk", "completed": false}
                ]},
                "done": {"id": "done", "title": "Done", "tasks": []}
            }
        });

        let board = BoardDocument::from_remote("u1", &value);
        assert!(board.column(ColumnKey::InProgress).tasks.is_empty());
        assert_eq!(board.column(ColumnKey::Todo).tasks.len(), 1);
        assert_eq!(board.locate("task-1"), Some(ColumnKey::Todo));
    }

    #[test]
    fn test_non_list_tasks_are_repaired() {
        let value = json!({
            "columns": {
                "todo": {"tasks": "oops"},
                "inProgress": {"tasks": null},
                "done": {}
            }
        });
        let board = BoardDocument::from_remote("u1", &value);
        assert_eq!(board, BoardDocument::empty("u1"));
    }

    #[test]
    fn test_missing_columns_object_gives_empty_board() {
        let board = BoardDocument::from_remote("u1", &json!({"userId": "u1"}));
        assert_eq!(board, BoardDocument::empty("u1"));
    }

    #[test]
    fn test_titles_come_from_static_table() {
        let value = json!({
            "columns": {
                "todo": {"id": "todo", "title": "Renamed", "tasks": []}
            }
        });
        let board = BoardDocument::from_remote("u1", &value);
        assert_eq!(board.column(ColumnKey::Todo).title, "To Do");
    }

    #[test]
    fn test_to_remote_wire_shape() {
        let mut board = BoardDocument::empty("u1");
        board
            .column_mut(ColumnKey::InProgress)
            .push(Task::new("task-9".into(), "Write".into(), 2, 0));

        let value = board.to_remote();
        assert_eq!(value["userId"], "u1");
        assert_eq!(value["columns"]["inProgress"]["id"], "inProgress");
        assert_eq!(value["columns"]["inProgress"]["tasks"][0]["id"], "task-9");
        assert_eq!(BoardDocument::from_remote("u1", &value), board);
    }

    #[test]
    fn test_timed_task_ids_only_in_progress_with_deadline() {
        let mut board = BoardDocument::empty("u1");
        board
            .column_mut(ColumnKey::Todo)
            .push(Task::new("a".into(), "A".into(), 1, 0));
        board
            .column_mut(ColumnKey::InProgress)
            .push(Task::new("b".into(), "B".into(), 1, 0));
        let mut untimed = Task::new("c".into(), "C".into(), 1, 0);
        untimed.deadline = None;
        board.column_mut(ColumnKey::InProgress).push(untimed);

        assert_eq!(board.timed_task_ids(), vec!["b".to_string()]);
    }
}
