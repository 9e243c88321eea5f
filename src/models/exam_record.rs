// src/models/exam_record.rs

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{
    config::PASSING_SCORE_PERCENTAGE,
    models::question::{PublicQuestion, Question},
    quiz::exam::{ExamSession, ExamStatus},
    utils::{
        percentage,
        time::{TimerLevel, format_clock, format_duration},
    },
};

/// Correct/total pair for one topic of a finished exam.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicScore {
    pub correct: u32,
    pub total: u32,
}

impl TopicScore {
    pub fn percentage(&self) -> u32 {
        percentage(self.correct, self.total)
    }
}

/// A question the learner got wrong (or skipped) in an exam.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrongQuestion {
    pub question: Question,
    /// Submitted choice id, empty when the question was left unanswered.
    pub user_answer: String,
    pub correct_answer: String,
    pub topic_id: String,
}

/// The outcome of one completed exam attempt. Never mutated once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExamResult {
    pub id: String,
    pub date: DateTime<Utc>,
    pub score: u32,
    pub total: u32,
    /// Seconds between the start of the exam and its submission.
    pub duration: u64,
    pub topic_scores: BTreeMap<String, TopicScore>,
    pub wrong_questions: Vec<WrongQuestion>,
}

impl ExamResult {
    pub fn percentage(&self) -> u32 {
        percentage(self.score, self.total)
    }

    pub fn passed(&self) -> bool {
        self.percentage() >= PASSING_SCORE_PERCENTAGE
    }
}

/// Aggregated struct for displaying a result, with derived figures.
#[derive(Debug, Serialize)]
pub struct ExamResultResponse {
    #[serde(flatten)]
    pub result: ExamResult,
    pub percentage: u32,
    pub passed: bool,
    pub duration_label: String,
    /// Per-topic success rate, 0-100.
    pub topic_percentages: BTreeMap<String, u32>,
}

impl From<&ExamResult> for ExamResultResponse {
    fn from(result: &ExamResult) -> Self {
        Self {
            result: result.clone(),
            percentage: result.percentage(),
            passed: result.passed(),
            duration_label: format_duration(result.duration),
            topic_percentages: result
                .topic_scores
                .iter()
                .map(|(topic, score)| (topic.clone(), score.percentage()))
                .collect(),
        }
    }
}

/// DTO for the live exam screen. Correct answers stay hidden until the exam is finished.
#[derive(Debug, Serialize)]
pub struct ExamResponse {
    pub status: ExamStatus,
    pub questions: Vec<PublicQuestion>,
    pub current_index: usize,
    pub current_question: Option<PublicQuestion>,
    pub user_answers: HashMap<String, String>,
    pub time_remaining: u32,
    pub clock: String,
    pub timer_level: TimerLevel,
    pub answered_count: usize,
    pub progress: u32,
    pub total_questions: usize,
    pub result: Option<ExamResultResponse>,
    pub error: Option<String>,
}

impl From<&ExamSession> for ExamResponse {
    fn from(exam: &ExamSession) -> Self {
        Self {
            status: exam.status(),
            questions: exam
                .questions()
                .iter()
                .map(|q| PublicQuestion::from(&q.question))
                .collect(),
            current_index: exam.current_index(),
            current_question: exam
                .current_question()
                .map(|q| PublicQuestion::from(&q.question)),
            user_answers: exam.user_answers().clone(),
            time_remaining: exam.time_remaining(),
            clock: format_clock(exam.time_remaining()),
            timer_level: exam.timer_level(),
            answered_count: exam.answered_count(),
            progress: exam.progress(),
            total_questions: exam.total_questions(),
            result: exam.result().map(ExamResultResponse::from),
            error: exam.error().map(str::to_string),
        }
    }
}

/// DTO for answering an exam question. Answers can be changed until submission.
#[derive(Debug, Deserialize)]
pub struct SelectAnswerRequest {
    pub question_id: String,
    pub choice_id: String,
}

/// DTO for jumping to a question by position. Out-of-range positions, negative
/// ones included, are ignored.
#[derive(Debug, Deserialize)]
pub struct GoToQuestionRequest {
    pub index: i64,
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn result(score: u32, total: u32) -> ExamResult {
        ExamResult {
            id: "exam_1".to_string(),
            date: Utc.timestamp_opt(1_700_000_000, 0).unwrap(),
            score,
            total,
            duration: 125,
            topic_scores: BTreeMap::new(),
            wrong_questions: Vec::new(),
        }
    }

    #[test]
    fn test_pass_threshold() {
        assert!(result(32, 40).passed());
        assert!(!result(31, 40).passed());
        assert_eq!(result(31, 40).percentage(), 78);
        assert!(!result(0, 0).passed());
    }

    #[test]
    fn test_response_carries_derived_figures() {
        let response = ExamResultResponse::from(&result(36, 40));
        assert_eq!(response.percentage, 90);
        assert!(response.passed);
        assert_eq!(response.duration_label, "2 min 5 sec");
    }

    #[test]
    fn test_response_reports_topic_percentages() {
        let mut exam = result(3, 5);
        exam.topic_scores.insert("history".to_string(), TopicScore { correct: 2, total: 3 });
        exam.topic_scores.insert("situation".to_string(), TopicScore { correct: 1, total: 2 });

        let response = ExamResultResponse::from(&exam);
        assert_eq!(response.topic_percentages.get("history"), Some(&67));
        assert_eq!(response.topic_percentages.get("situation"), Some(&50));
    }
}
