// src/quiz/mod.rs

pub mod daily;
pub mod exam;
pub mod timer;
pub mod topic;

pub use daily::DailyDrill;
pub use exam::{ExamEvent, ExamSession, ExamStatus};
pub use timer::Countdown;
pub use topic::{QuizStatus, TopicQuiz};
