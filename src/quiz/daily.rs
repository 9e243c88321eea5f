// src/quiz/daily.rs

use crate::{
    config::DAILY_PRACTICE_TOPIC_ID,
    error::AppError,
    models::question::ExamQuestion,
    store::MistakeSink,
    utils::random::{RandomSource, shuffle},
};

/// An endless card drill over every topic bank, shuffled together.
///
/// Each card takes one answer. Wrong answers go to the mistake store under the
/// question's topic; topic progress is left alone.
#[derive(Debug, Clone, Default)]
pub struct DailyDrill {
    questions: Vec<ExamQuestion>,
    index: usize,
    selected: Option<String>,
    error: Option<String>,
}

impl DailyDrill {
    pub fn new<R>(pool: Result<Vec<ExamQuestion>, AppError>, rng: &mut R) -> Self
    where
        R: RandomSource + ?Sized,
    {
        match pool {
            Ok(mut questions) => {
                shuffle(&mut questions, rng);
                Self {
                    questions,
                    ..Self::default()
                }
            }
            Err(e) => {
                tracing::warn!("Daily drill failed to load: {}", e.message());
                Self {
                    error: Some(e.message().to_string()),
                    ..Self::default()
                }
            }
        }
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&ExamQuestion> {
        self.questions.get(self.index)
    }

    /// The answer given to the current card, if any.
    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Answers the current card.
    ///
    /// Returns whether the answer was correct, or `None` if the card was already
    /// answered or there is no card.
    pub fn select_choice<S>(&mut self, choice_id: &str, sink: &mut S) -> Option<bool>
    where
        S: MistakeSink + ?Sized,
    {
        if self.selected.is_some() {
            return None;
        }
        let card = self.questions.get(self.index)?;
        let is_correct = card.question.is_correct(choice_id);
        if !is_correct {
            let topic_id = if card.topic_id.is_empty() {
                DAILY_PRACTICE_TOPIC_ID
            } else {
                &card.topic_id
            };
            sink.add_mistake(&card.question, topic_id);
        }
        self.selected = Some(choice_id.to_string());
        Some(is_correct)
    }

    /// Moves to the next card, back to the first after the last.
    pub fn next(&mut self) {
        if self.questions.is_empty() {
            return;
        }
        self.index = (self.index + 1) % self.questions.len();
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::{Question, fixtures::question};

    #[derive(Default)]
    struct Recorder(Vec<(String, String)>);

    impl MistakeSink for Recorder {
        fn add_mistake(&mut self, question: &Question, topic_id: &str) {
            self.0.push((question.id.clone(), topic_id.to_string()));
        }
    }

    fn drill() -> DailyDrill {
        let pool = vec![
            ExamQuestion::new(question("v1"), "values"),
            ExamQuestion::new(question("h1"), "history"),
            ExamQuestion::new(question("x1"), ""),
        ];
        DailyDrill::new(Ok(pool), &mut || 0.999)
    }

    #[test]
    fn test_one_answer_per_card() {
        let mut drill = drill();
        let mut sink = Recorder::default();

        assert_eq!(drill.select_choice("c2", &mut sink), Some(false));
        assert_eq!(drill.select_choice("c1", &mut sink), None);
        assert_eq!(drill.selected(), Some("c2"));
        assert_eq!(sink.0, vec![("v1".to_string(), "values".to_string())]);

        drill.next();
        assert_eq!(drill.selected(), None);
        assert_eq!(drill.select_choice("c1", &mut sink), Some(true));
        assert_eq!(sink.0.len(), 1);
    }

    #[test]
    fn test_untagged_mistake_goes_to_daily_practice() {
        let mut drill = drill();
        let mut sink = Recorder::default();
        drill.next();
        drill.next();

        assert_eq!(drill.current().map(|q| q.id()), Some("x1"));
        drill.select_choice("c2", &mut sink);
        assert_eq!(sink.0, vec![("x1".to_string(), "daily-practice".to_string())]);
    }

    #[test]
    fn test_next_wraps_to_first_card() {
        let mut drill = drill();
        for _ in 0..3 {
            drill.next();
        }
        assert_eq!(drill.index(), 0);
        assert_eq!(drill.current().map(|q| q.id()), Some("v1"));
    }

    #[test]
    fn test_failed_load_has_no_cards() {
        let mut drill = DailyDrill::new(
            Err(AppError::LoadFailure("Unable to load the question bank".to_string())),
            &mut || 0.5,
        );
        let mut sink = Recorder::default();

        assert_eq!(drill.error(), Some("Unable to load the question bank"));
        assert!(drill.current().is_none());
        assert_eq!(drill.select_choice("c1", &mut sink), None);
        drill.next();
        assert_eq!(drill.index(), 0);
    }
}
