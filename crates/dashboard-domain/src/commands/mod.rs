use dashboard_core::DashboardResult;

use crate::BoardDocument;

pub mod task_commands;

pub use task_commands::*;

/// Trait for board commands that mutate state
/// Commands represent one user intent applied to a locally held board
pub trait Command: Send + Sync {
    /// Execute this command against the board.
    /// Returns `false` when the command had nothing to do and left the board untouched.
    fn execute(&self, context: &mut CommandContext) -> DashboardResult<bool>;

    /// Human-readable description of what this command does
    fn description(&self) -> String;
}

/// Context passed to commands for mutation
pub struct CommandContext<'a> {
    pub board: &'a mut BoardDocument,
    /// Wall-clock time of the user action, in epoch millis
    pub now_ms: i64,
}

impl<'a> CommandContext<'a> {
    pub fn new(board: &'a mut BoardDocument, now_ms: i64) -> Self {
        Self { board, now_ms }
    }
}
