use super::{Command, CommandContext};
use crate::column::ColumnKey;
use crate::task::{Task, TaskId, MAX_DEADLINE_DAYS, MIN_DEADLINE_DAYS};
use dashboard_core::{DashboardError, DashboardResult};

/// Create a task in the todo column, due `days` days from now
pub struct AddTask {
    pub content: String,
    pub days: u32,
}

impl Command for AddTask {
    fn execute(&self, context: &mut CommandContext) -> DashboardResult<bool> {
        if self.content.trim().is_empty() {
            return Ok(false);
        }
        if !(MIN_DEADLINE_DAYS..=MAX_DEADLINE_DAYS).contains(&self.days) {
            return Err(DashboardError::Validation(format!(
                "deadline must be between {} and {} days, got {}",
                MIN_DEADLINE_DAYS, MAX_DEADLINE_DAYS, self.days
            )));
        }

        let board = &*context.board;
        let id = Task::generate_id(context.now_ms, |candidate| board.contains_task(candidate));
        let task = Task::new(id, self.content.clone(), self.days, context.now_ms);
        context.board.column_mut(ColumnKey::Todo).push(task);
        Ok(true)
    }

    fn description(&self) -> String {
        format!("Add task: '{}'", self.content)
    }
}

/// Move a task to the end of another column
pub struct MoveTask {
    pub task_id: TaskId,
    pub from: ColumnKey,
    pub to: ColumnKey,
}

impl Command for MoveTask {
    fn execute(&self, context: &mut CommandContext) -> DashboardResult<bool> {
        let Some(task) = context.board.column_mut(self.from).take(&self.task_id) else {
            return Ok(false);
        };
        context.board.column_mut(self.to).push(task);
        Ok(true)
    }

    fn description(&self) -> String {
        format!("Move task {} from {} to {}", self.task_id, self.from, self.to)
    }
}

/// Permanently remove a task from a column
pub struct DeleteTask {
    pub column: ColumnKey,
    pub task_id: TaskId,
}

impl Command for DeleteTask {
    fn execute(&self, context: &mut CommandContext) -> DashboardResult<bool> {
        Ok(context.board.column_mut(self.column).take(&self.task_id).is_some())
    }

    fn description(&self) -> String {
        format!("Delete task {} from {}", self.task_id, self.column)
    }
}
