pub mod board;
pub mod column;
pub mod commands;
pub mod countdown;
pub mod keyword;
pub mod note;
pub mod prompt;
pub mod state;
pub mod task;

pub use board::{BoardDocument, BOARDS_COLLECTION};
pub use column::{Column, ColumnKey};
pub use countdown::{remaining_time_label, RemainingTime};
pub use keyword::{Keyword, KeywordCategory, KeywordList, KeywordSort, KEYWORDS_COLLECTION};
pub use note::{Note, NoteBook, NoteCategory, NOTES_COLLECTION};
pub use prompt::{AppDescription, BackgroundPrompt, IconPrompt};
pub use state::TaskState;
pub use task::{Task, TaskId};

use chrono::Utc;

/// Milliseconds since the Unix epoch, the unit used for every persisted timestamp.
pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}
