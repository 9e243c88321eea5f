// src/models/practice.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    models::{progress::MistakeRecord, question::PublicQuestion, quiz::AnswerFeedback},
    practice::{
        KindFilter, MistakeFilterOptions, PracticeMode, PracticeSession, filters::topic_options,
    },
    store::MistakeBook,
};

/// DTO for building a practice session. Missing fields fall back to the defaults.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PracticeRequest {
    pub kind: KindFilter,
    /// A topic id, or 'all'.
    pub topic: Option<String>,
    pub min_count: Option<u32>,
    pub mode: PracticeMode,
}

impl PracticeRequest {
    pub fn filter_options(&self) -> MistakeFilterOptions {
        MistakeFilterOptions {
            kind: self.kind,
            topic_id: self.topic.clone().filter(|t| t != "all"),
            min_wrong_count: self.min_count.unwrap_or(1),
        }
    }
}

/// The mistake being drilled.
#[derive(Debug, Serialize)]
pub struct PracticeCard {
    pub question: PublicQuestion,
    pub topic_id: String,
    pub count: u32,
    pub last_wrong_at: DateTime<Utc>,
    pub bookmarked: bool,
}

impl PracticeCard {
    fn new(record: &MistakeRecord, book: &MistakeBook) -> Self {
        Self {
            question: PublicQuestion::from(&record.question),
            topic_id: record.topic_id.clone(),
            count: record.count,
            last_wrong_at: record.last_wrong_at,
            bookmarked: book.is_bookmarked(&record.question_id),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct PracticeResponse {
    pub mode: PracticeMode,
    pub options: MistakeFilterOptions,
    /// Topics the current kind filter allows, for the topic picker.
    pub topic_options: Vec<String>,
    pub matching: usize,
    pub queue_len: usize,
    pub position: usize,
    pub current: Option<PracticeCard>,
    pub feedback: Option<AnswerFeedback>,
    pub answered: u32,
    pub correct: u32,
    pub accuracy: u32,
}

impl PracticeResponse {
    /// `all_mistakes` feeds the topic picker; it is not limited by the session filters.
    pub fn new(session: &PracticeSession, all_mistakes: &[MistakeRecord], book: &MistakeBook) -> Self {
        let current = session.current();
        let feedback = match (current, session.selected()) {
            (Some(record), Some(choice)) => Some(AnswerFeedback::new(&record.question, choice)),
            _ => None,
        };

        Self {
            mode: session.mode(),
            options: session.options().clone(),
            topic_options: topic_options(all_mistakes, session.options().kind),
            matching: session.records().len(),
            queue_len: session.queue_len(),
            position: session.position(),
            current: current.map(|r| PracticeCard::new(r, book)),
            feedback,
            answered: session.answered(),
            correct: session.correct(),
            accuracy: session.accuracy(),
        }
    }
}
