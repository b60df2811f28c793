pub mod assist;
pub mod board;
pub mod keyword;
pub mod note;
