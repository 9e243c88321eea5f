// src/models/quiz.rs

use serde::{Deserialize, Serialize};

use crate::{
    models::question::{PublicQuestion, Question},
    quiz::topic::{QuizStatus, TopicQuiz},
    store::MistakeBook,
};

/// DTO for answering the current question of a topic quiz or practice card.
#[derive(Debug, Deserialize)]
pub struct AnswerRequest {
    pub choice_id: String,
}

/// What the learner sees once a question is answered.
#[derive(Debug, Serialize)]
pub struct AnswerFeedback {
    pub choice_id: String,
    pub is_correct: bool,
    pub correct_choice_id: Option<String>,
    pub analysis: String,
}

impl AnswerFeedback {
    pub fn new(question: &Question, choice_id: &str) -> Self {
        Self {
            choice_id: choice_id.to_string(),
            is_correct: question.is_correct(choice_id),
            correct_choice_id: question.correct_choice().map(|c| c.id.clone()),
            analysis: question.analysis.clone(),
        }
    }
}

/// DTO for the topic quiz screen.
#[derive(Debug, Serialize)]
pub struct QuizResponse {
    pub topic_id: String,
    pub status: QuizStatus,
    pub total_questions: usize,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub feedback: Option<AnswerFeedback>,
    pub bookmarked: bool,
    pub score: u32,
    pub is_finished: bool,
    pub error: Option<String>,
}

impl QuizResponse {
    pub fn new(quiz: &TopicQuiz, book: &MistakeBook) -> Self {
        let current = quiz.current_question();
        let feedback = match (current, quiz.current_answer()) {
            (Some(question), Some(answer)) => Some(AnswerFeedback::new(question, answer)),
            _ => None,
        };

        Self {
            topic_id: quiz.topic_id().to_string(),
            status: quiz.status(),
            total_questions: quiz.questions().len(),
            current_index: quiz.current_index(),
            current_question: current.map(PublicQuestion::from),
            feedback,
            bookmarked: current.is_some_and(|q| book.is_bookmarked(&q.id)),
            score: quiz.score(),
            is_finished: quiz.is_finished(),
            error: quiz.error().map(str::to_string),
        }
    }
}
