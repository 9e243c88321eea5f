// src/quiz/exam.rs

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::{
    config::{EXAM_DURATION_SECONDS, SITUATION_QUESTION_COUNT, SITUATION_TOPIC_ID, TOPIC_QUESTION_COUNT},
    error::AppError,
    models::{
        exam_record::{ExamResult, TopicScore, WrongQuestion},
        question::{ExamQuestion, Question},
    },
    store::MistakeSink,
    utils::{
        percentage,
        random::{RandomSource, shuffle},
        time::TimerLevel,
    },
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExamStatus {
    #[default]
    Idle,
    Loading,
    InProgress,
    Finished,
}

/// Inputs that move a running exam forward.
///
/// The countdown and the learner's submit button go through the same
/// [`ExamSession::apply`], so a timeout scores exactly like a manual submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExamEvent {
    /// One second elapsed.
    Tick,
    /// The learner hands the paper in.
    Submit,
}

/// Question pools an exam is drawn from.
#[derive(Debug, Clone, Default)]
pub struct ExamPools {
    /// (topic id, questions) for every subject-matter bank that loaded.
    pub topics: Vec<(String, Vec<Question>)>,
    pub situation: Vec<Question>,
}

/// Draws a mock exam: 28 subject-matter and 12 situational questions, interleaved.
///
/// Each pool is shuffled before drawing and the combined paper is shuffled again.
/// Question ids are unique across the paper. Subject-matter questions are drawn
/// first; the situational part then skips anything already on the paper and keeps
/// drawing until it has 12 or the pool runs out.
pub fn assemble_exam<R>(pools: ExamPools, rng: &mut R) -> Result<Vec<ExamQuestion>, AppError>
where
    R: RandomSource + ?Sized,
{
    let mut seen = HashSet::new();
    let mut topical: Vec<ExamQuestion> = pools
        .topics
        .into_iter()
        .flat_map(|(topic_id, questions)| {
            questions
                .into_iter()
                .map(move |q| ExamQuestion::new(q, topic_id.clone()))
        })
        .filter(|q| seen.insert(q.id().to_string()))
        .collect();
    shuffle(&mut topical, rng);
    topical.truncate(TOPIC_QUESTION_COUNT);

    let mut on_paper: HashSet<String> = topical.iter().map(|q| q.id().to_string()).collect();
    let mut situational: Vec<ExamQuestion> = pools
        .situation
        .into_iter()
        .map(|q| ExamQuestion::new(q, SITUATION_TOPIC_ID))
        .collect();
    shuffle(&mut situational, rng);

    let mut paper = topical;
    paper.extend(
        situational
            .into_iter()
            .filter(|q| on_paper.insert(q.id().to_string()))
            .take(SITUATION_QUESTION_COUNT),
    );
    shuffle(&mut paper, rng);

    if paper.is_empty() {
        return Err(AppError::LoadFailure("Unable to load the question bank".to_string()));
    }
    Ok(paper)
}

/// Scores a paper.
///
/// A missing answer counts as wrong and is reported with an empty `user_answer`.
pub fn score_exam(
    questions: &[ExamQuestion],
    user_answers: &HashMap<String, String>,
    started_at: DateTime<Utc>,
    now: DateTime<Utc>,
) -> ExamResult {
    let mut topic_scores: BTreeMap<String, TopicScore> = BTreeMap::new();
    let mut wrong_questions = Vec::new();
    let mut score = 0;

    for exam_question in questions {
        let question = &exam_question.question;
        let topic_score = topic_scores.entry(exam_question.topic_id.clone()).or_default();
        topic_score.total += 1;

        let user_answer = user_answers.get(&question.id);
        let correct_choice = question.correct_choice();
        let is_correct = match (user_answer, correct_choice) {
            (Some(answer), Some(correct)) => answer == &correct.id,
            _ => false,
        };

        if is_correct {
            score += 1;
            topic_score.correct += 1;
        } else {
            wrong_questions.push(WrongQuestion {
                question: question.clone(),
                user_answer: user_answer.cloned().unwrap_or_default(),
                correct_answer: correct_choice.map(|c| c.id.clone()).unwrap_or_default(),
                topic_id: exam_question.topic_id.clone(),
            });
        }
    }

    let elapsed_ms = (now - started_at).num_milliseconds().max(0);

    ExamResult {
        id: generate_exam_id(now),
        date: now,
        score,
        total: questions.len() as u32,
        duration: (elapsed_ms as f64 / 1000.0).round() as u64,
        topic_scores,
        wrong_questions,
    }
}

fn generate_exam_id(now: DateTime<Utc>) -> String {
    let suffix = Uuid::new_v4().simple().to_string();
    format!("exam_{}_{}", now.timestamp_millis(), &suffix[..7])
}

/// One mock exam, from assembly to scored result.
///
/// `idle → loading → in_progress → finished`, and back to `idle` through `reset`.
/// A failed load returns to `idle` with `error` set.
#[derive(Debug, Clone)]
pub struct ExamSession {
    status: ExamStatus,
    questions: Vec<ExamQuestion>,
    current_index: usize,
    user_answers: HashMap<String, String>,
    time_remaining: u32,
    result: Option<ExamResult>,
    error: Option<String>,
    started_at: Option<DateTime<Utc>>,
    /// One-shot latch: set once the result's mistakes were handed to the store.
    outcome_recorded: bool,
}

impl Default for ExamSession {
    fn default() -> Self {
        Self {
            status: ExamStatus::Idle,
            questions: Vec::new(),
            current_index: 0,
            user_answers: HashMap::new(),
            time_remaining: EXAM_DURATION_SECONDS,
            result: None,
            error: None,
            started_at: None,
            outcome_recorded: false,
        }
    }
}

impl ExamSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enters `loading`. Ignored while an exam is running.
    pub fn begin_loading(&mut self) -> bool {
        if self.status == ExamStatus::InProgress {
            return false;
        }
        *self = Self {
            status: ExamStatus::Loading,
            ..Self::default()
        };
        true
    }

    /// Takes the assembled paper and starts the clock, or falls back to `idle`
    /// with the load error.
    pub fn start(&mut self, paper: Result<Vec<ExamQuestion>, AppError>, now: DateTime<Utc>) {
        match paper {
            Ok(questions) => {
                tracing::info!("Exam started with {} questions", questions.len());
                *self = Self {
                    status: ExamStatus::InProgress,
                    questions,
                    started_at: Some(now),
                    ..Self::default()
                };
            }
            Err(e) => {
                tracing::warn!("Exam could not start: {}", e.message());
                *self = Self {
                    error: Some(e.message().to_string()),
                    ..Self::default()
                };
            }
        }
    }

    /// Records or overwrites the answer to `question_id`.
    /// Ignored unless the exam is running and the question is on the paper.
    pub fn select_answer(&mut self, question_id: &str, choice_id: &str) {
        if self.status != ExamStatus::InProgress {
            return;
        }
        if !self.questions.iter().any(|q| q.id() == question_id) {
            return;
        }
        self.user_answers
            .insert(question_id.to_string(), choice_id.to_string());
    }

    pub fn next_question(&mut self) {
        if self.current_index + 1 < self.questions.len() {
            self.current_index += 1;
        }
    }

    pub fn prev_question(&mut self) {
        if self.current_index > 0 {
            self.current_index -= 1;
        }
    }

    pub fn go_to_question(&mut self, index: usize) {
        if index < self.questions.len() {
            self.current_index = index;
        }
    }

    /// Feeds one event into the session. Returns true when this call finished the exam.
    pub fn apply(&mut self, event: ExamEvent, now: DateTime<Utc>) -> bool {
        if self.status != ExamStatus::InProgress {
            return false;
        }
        match event {
            ExamEvent::Tick => {
                self.time_remaining = self.time_remaining.saturating_sub(1);
                if self.time_remaining == 0 {
                    tracing::info!("Exam time is up, submitting automatically");
                    self.finish_at(now);
                    return true;
                }
                false
            }
            ExamEvent::Submit => {
                self.finish_at(now);
                true
            }
        }
    }

    pub fn tick(&mut self) -> bool {
        self.apply(ExamEvent::Tick, Utc::now())
    }

    pub fn finish(&mut self) -> bool {
        self.apply(ExamEvent::Submit, Utc::now())
    }

    fn finish_at(&mut self, now: DateTime<Utc>) {
        let started_at = self.started_at.unwrap_or(now);
        let result = score_exam(&self.questions, &self.user_answers, started_at, now);
        tracing::info!(
            "Exam {} finished: {}/{} in {}s",
            result.id,
            result.score,
            result.total,
            result.duration
        );
        self.result = Some(result);
        self.status = ExamStatus::Finished;
    }

    /// Hands every wrong question of the finished exam to `sink`, once.
    ///
    /// Returns the result the first time it is called after the exam finished,
    /// `None` on every later call until `reset`. Safe to call whenever the
    /// finished state is observed.
    pub fn record_outcome<S>(&mut self, sink: &mut S) -> Option<&ExamResult>
    where
        S: MistakeSink + ?Sized,
    {
        if self.status != ExamStatus::Finished || self.outcome_recorded {
            return None;
        }
        let result = self.result.as_ref()?;
        self.outcome_recorded = true;
        for wrong in &result.wrong_questions {
            sink.add_mistake(&wrong.question, &wrong.topic_id);
        }
        Some(result)
    }

    /// Drops the exam and returns to `idle`.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn status(&self) -> ExamStatus {
        self.status
    }

    pub fn questions(&self) -> &[ExamQuestion] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn current_question(&self) -> Option<&ExamQuestion> {
        self.questions.get(self.current_index)
    }

    pub fn user_answers(&self) -> &HashMap<String, String> {
        &self.user_answers
    }

    pub fn time_remaining(&self) -> u32 {
        self.time_remaining
    }

    pub fn timer_level(&self) -> TimerLevel {
        TimerLevel::for_remaining(self.time_remaining)
    }

    pub fn result(&self) -> Option<&ExamResult> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn total_questions(&self) -> usize {
        self.questions.len()
    }

    pub fn answered_count(&self) -> usize {
        self.user_answers.len()
    }

    /// Rounded share of questions answered so far.
    pub fn progress(&self) -> u32 {
        percentage(self.answered_count() as u32, self.total_questions() as u32)
    }
}
