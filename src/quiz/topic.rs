// src/quiz/topic.rs

use std::collections::HashMap;

use serde::Serialize;

use crate::{
    error::AppError,
    models::question::Question,
    store::MistakeSink,
    utils::random::{RandomSource, shuffle},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizStatus {
    Loading,
    /// Loading failed; `error` holds the message.
    Failed,
    /// Loaded, nothing answered yet.
    Ready,
    Answering,
    Answered,
    Finished,
}

/// A sequential run through one topic's question bank.
///
/// Answers are locked on first submission. Once finished, only `restart` leaves
/// the terminal state.
#[derive(Debug, Clone)]
pub struct TopicQuiz {
    topic_id: String,
    questions: Vec<Question>,
    current_index: usize,
    user_answers: HashMap<String, String>,
    score: u32,
    is_finished: bool,
    loading: bool,
    error: Option<String>,
}

impl TopicQuiz {
    /// A session waiting for its bank.
    pub fn loading(topic_id: impl Into<String>) -> Self {
        Self {
            topic_id: topic_id.into(),
            questions: Vec::new(),
            current_index: 0,
            user_answers: HashMap::new(),
            score: 0,
            is_finished: false,
            loading: true,
            error: None,
        }
    }

    /// Takes the outcome of fetching the bank. An empty bank counts as a failure.
    pub fn load<R>(&mut self, fetched: Result<Vec<Question>, AppError>, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        self.loading = false;
        match fetched {
            Ok(questions) if questions.is_empty() => {
                tracing::warn!("Topic {} has no usable questions", self.topic_id);
                self.error = Some(format!("No questions available for topic {}", self.topic_id));
            }
            Ok(mut questions) => {
                shuffle(&mut questions, rng);
                self.questions = questions;
                self.error = None;
            }
            Err(e) => {
                tracing::warn!("Failed to load topic {}: {}", self.topic_id, e.message());
                self.error = Some(e.message().to_string());
            }
        }
    }

    pub fn status(&self) -> QuizStatus {
        if self.loading {
            QuizStatus::Loading
        } else if self.error.is_some() {
            QuizStatus::Failed
        } else if self.is_finished {
            QuizStatus::Finished
        } else if self.current_answer().is_some() {
            QuizStatus::Answered
        } else if self.user_answers.is_empty() && self.current_index == 0 {
            QuizStatus::Ready
        } else {
            QuizStatus::Answering
        }
    }

    pub fn topic_id(&self) -> &str {
        &self.topic_id
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&Question> {
        self.questions.get(self.current_index)
    }

    /// The locked answer to the current question, if any.
    pub fn current_answer(&self) -> Option<&str> {
        self.current_question()
            .and_then(|q| self.user_answers.get(&q.id))
            .map(String::as_str)
    }

    pub fn user_answers(&self) -> &HashMap<String, String> {
        &self.user_answers
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn is_finished(&self) -> bool {
        self.is_finished
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Answers the current question.
    ///
    /// Returns whether the answer was correct, or `None` when nothing was recorded
    /// (no current question, already answered, or finished). A wrong answer is
    /// reported to `sink` exactly once, together with the recorded answer.
    pub fn submit_answer<S>(&mut self, choice_id: &str, sink: &mut S) -> Option<bool>
    where
        S: MistakeSink + ?Sized,
    {
        if self.is_finished {
            return None;
        }
        let question = self.questions.get(self.current_index)?;
        if self.user_answers.contains_key(&question.id) {
            return None;
        }

        let is_correct = question.is_correct(choice_id);
        if is_correct {
            self.score += 1;
        } else {
            sink.add_mistake(question, &self.topic_id);
        }
        self.user_answers
            .insert(question.id.clone(), choice_id.to_string());
        Some(is_correct)
    }

    /// Moves on, or finishes after the last question.
    pub fn next_question(&mut self) {
        if self.is_finished || self.loading || self.error.is_some() {
            return;
        }
        if self.current_index + 1 >= self.questions.len() {
            self.is_finished = true;
        } else {
            self.current_index += 1;
        }
    }

    /// Reshuffles the same questions and clears every answer.
    pub fn restart<R>(&mut self, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        shuffle(&mut self.questions, rng);
        self.current_index = 0;
        self.user_answers.clear();
        self.score = 0;
        self.is_finished = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{progress::MistakeRecord, question::fixtures::question_with};
    use crate::store::MistakeBook;

    #[derive(Default)]
    struct Recorder(Vec<(String, String)>);

    impl MistakeSink for Recorder {
        fn add_mistake(&mut self, question: &Question, topic_id: &str) {
            self.0.push((question.id.clone(), topic_id.to_string()));
        }
    }

    fn loaded() -> TopicQuiz {
        let mut quiz = TopicQuiz::loading("test-slug");
        let bank = vec![question_with("q1", "c1", "c2"), question_with("q2", "c3", "c4")];
        // 0.999 keeps the bank order
        quiz.load(Ok(bank), &mut || 0.999);
        quiz
    }

    #[test]
    fn test_loads_questions() {
        let quiz = TopicQuiz::loading("test-slug");
        assert_eq!(quiz.status(), QuizStatus::Loading);

        let quiz = loaded();
        assert_eq!(quiz.status(), QuizStatus::Ready);
        assert_eq!(quiz.questions().len(), 2);
        assert_eq!(quiz.current_question().map(|q| q.id.as_str()), Some("q1"));
    }

    #[test]
    fn test_two_question_scenario() {
        let mut quiz = loaded();
        let mut sink = Recorder::default();

        assert_eq!(quiz.submit_answer("c1", &mut sink), Some(true));
        assert_eq!(quiz.status(), QuizStatus::Answered);
        quiz.next_question();
        assert_eq!(quiz.status(), QuizStatus::Answering);
        assert_eq!(quiz.submit_answer("c2", &mut sink), Some(false));

        assert_eq!(quiz.score(), 1);
        assert_eq!(quiz.user_answers().get("q1").map(String::as_str), Some("c1"));
        assert_eq!(quiz.user_answers().get("q2").map(String::as_str), Some("c2"));
        assert_eq!(sink.0, vec![("q2".to_string(), "test-slug".to_string())]);

        quiz.next_question();
        assert!(quiz.is_finished());
        assert_eq!(quiz.status(), QuizStatus::Finished);
        assert_eq!(quiz.submit_answer("c3", &mut sink), None);
    }

    #[test]
    fn test_double_submission_records_one_mistake() {
        let mut quiz = loaded();
        let mut book = MistakeBook::default();

        assert_eq!(quiz.submit_answer("c2", &mut book), Some(false));
        assert_eq!(quiz.submit_answer("c2", &mut book), None);
        assert_eq!(quiz.submit_answer("c1", &mut book), None);

        let record: Option<&MistakeRecord> = book.mistake("q1");
        assert_eq!(record.map(|m| m.count), Some(1));
        assert_eq!(quiz.score(), 0);
    }

    #[test]
    fn test_restart_resets_state() {
        let mut quiz = loaded();
        let mut sink = Recorder::default();
        quiz.submit_answer("c1", &mut sink);
        quiz.next_question();
        quiz.next_question();
        assert!(quiz.is_finished());

        quiz.restart(&mut || 0.0);
        assert!(!quiz.is_finished());
        assert_eq!(quiz.score(), 0);
        assert!(quiz.user_answers().is_empty());
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.questions().len(), 2);
    }

    #[test]
    fn test_load_failures() {
        let mut empty = TopicQuiz::loading("values");
        empty.load(Ok(Vec::new()), &mut || 0.5);
        assert_eq!(empty.status(), QuizStatus::Failed);
        assert!(empty.current_question().is_none());

        let mut failed = TopicQuiz::loading("values");
        failed.load(
            Err(AppError::LoadFailure("Failed to load topic data".to_string())),
            &mut || 0.5,
        );
        assert_eq!(failed.error(), Some("Failed to load topic data"));

        let mut sink = Recorder::default();
        assert_eq!(failed.submit_answer("c1", &mut sink), None);
        failed.next_question();
        assert!(!failed.is_finished());
    }
}
