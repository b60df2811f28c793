pub mod board;
pub mod keywords;
pub mod notes;
pub mod replica;
pub mod timer;

pub use board::{BoardEvent, BoardReconciler};
pub use keywords::KeywordsView;
pub use notes::NotesView;
pub use replica::{CommitFailure, Replica, SyncedDocument};
pub use timer::{TimerManager, TimerTick, TICK_PERIOD};
