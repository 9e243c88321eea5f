// src/practice/mod.rs

pub mod filters;
pub mod session;

pub use filters::{KindFilter, MistakeFilterOptions, PracticeMode, QuestionKind};
pub use session::PracticeSession;
