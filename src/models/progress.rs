// src/models/progress.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::question::Question;
use crate::utils::percentage;

/// A question the learner has answered wrong at least once.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MistakeRecord {
    pub question_id: String,
    /// Snapshot of the question at the time of the latest wrong answer.
    pub question: Question,
    pub topic_id: String,
    /// Number of wrong answers so far. Never below 1.
    pub count: u32,
    pub last_wrong_at: DateTime<Utc>,
}

/// A question the learner flagged for later review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookmarkRecord {
    pub question_id: String,
    pub question: Question,
    pub topic_id: String,
    pub added_at: DateTime<Utc>,
}

/// Cumulative answer counters for one topic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicProgressRecord {
    pub topic_id: String,
    pub total_answered: u32,
    pub correct_count: u32,
    pub last_practice_at: DateTime<Utc>,
}

impl TopicProgressRecord {
    /// Rounded share of correct answers, 0 when nothing was answered yet.
    pub fn accuracy(&self) -> u32 {
        percentage(self.correct_count, self.total_answered)
    }
}

/// DTO for toggling a bookmark.
#[derive(Debug, Deserialize)]
pub struct ToggleBookmarkRequest {
    pub question: Question,
    pub topic_id: String,
}

/// Query parameters for listing mistakes.
#[derive(Debug, Default, Deserialize)]
pub struct MistakeListParams {
    /// 'all', 'choice' or 'situation'.
    pub kind: Option<String>,
    /// A topic id, or 'all'.
    pub topic: Option<String>,
    pub min_count: Option<u32>,
}

/// Topic progress as shown on the dashboard.
#[derive(Debug, Serialize)]
pub struct TopicProgressResponse {
    #[serde(flatten)]
    pub record: TopicProgressRecord,
    pub accuracy: u32,
}

impl From<&TopicProgressRecord> for TopicProgressResponse {
    fn from(record: &TopicProgressRecord) -> Self {
        Self {
            record: record.clone(),
            accuracy: record.accuracy(),
        }
    }
}
