// src/models/daily.rs

use serde::Serialize;

use crate::{
    models::{question::PublicQuestion, quiz::AnswerFeedback},
    quiz::DailyDrill,
    store::MistakeBook,
};

/// DTO for the daily drill card.
#[derive(Debug, Serialize)]
pub struct DailyResponse {
    pub position: usize,
    pub total: usize,
    pub topic_id: Option<String>,
    pub current_question: Option<PublicQuestion>,
    pub feedback: Option<AnswerFeedback>,
    pub bookmarked: bool,
    pub error: Option<String>,
}

impl DailyResponse {
    pub fn new(drill: &DailyDrill, book: &MistakeBook) -> Self {
        let current = drill.current();
        let feedback = match (current, drill.selected()) {
            (Some(card), Some(choice)) => Some(AnswerFeedback::new(&card.question, choice)),
            _ => None,
        };

        Self {
            position: drill.index(),
            total: drill.questions().len(),
            topic_id: current.map(|card| card.topic_id.clone()),
            current_question: current.map(|card| PublicQuestion::from(&card.question)),
            feedback,
            bookmarked: current.is_some_and(|card| book.is_bookmarked(card.id())),
            error: drill.error().map(str::to_string),
        }
    }
}
