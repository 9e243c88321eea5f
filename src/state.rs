use std::{collections::HashMap, sync::Arc};

use axum::extract::FromRef;
use tokio::sync::Mutex;

use crate::{
    bank::QuestionSource,
    config::Config,
    error::AppError,
    practice::PracticeSession,
    quiz::{Countdown, DailyDrill, ExamSession, TopicQuiz},
    store::{ProgressRepository, ProgressStore},
    utils::random::SystemRandom,
};

/// Everything a learner's session mutates.
///
/// It sits behind a single lock, so requests and clock ticks are applied one at a
/// time, each running to completion before the next.
#[derive(Debug)]
pub struct Study {
    pub progress: ProgressStore,
    pub exam: ExamSession,
    pub countdown: Countdown,
    pub quizzes: HashMap<String, TopicQuiz>,
    pub practice: Option<PracticeSession>,
    pub daily: Option<DailyDrill>,
    pub rng: SystemRandom,
}

impl Study {
    pub fn new(progress: ProgressStore) -> Self {
        Self {
            progress,
            exam: ExamSession::new(),
            countdown: Countdown::default(),
            quizzes: HashMap::new(),
            practice: None,
            daily: None,
            rng: SystemRandom::new(),
        }
    }
}

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub repo: Arc<dyn ProgressRepository>,
    pub bank: Arc<dyn QuestionSource>,
    pub study: Arc<Mutex<Study>>,
}

impl AppState {
    /// Loads stored progress from `repo` and wires up a fresh session.
    pub async fn new(
        config: Config,
        repo: Arc<dyn ProgressRepository>,
        bank: Arc<dyn QuestionSource>,
    ) -> Result<Self, AppError> {
        let progress = ProgressStore::load(repo.as_ref()).await?;
        Ok(Self {
            config,
            repo,
            bank,
            study: Arc::new(Mutex::new(Study::new(progress))),
        })
    }

    /// Persists whatever the stores changed since the last commit.
    pub async fn commit(&self, study: &mut Study) -> Result<(), AppError> {
        study.progress.flush(self.repo.as_ref()).await
    }

    /// Runs the post-finish step of the exam, then commits.
    ///
    /// Wrong questions reach the mistake store and the result is queued for the
    /// history only on the first call after the exam finished. If storage fails,
    /// both stay pending and go out with a later commit.
    pub async fn settle_exam(&self, study: &mut Study) -> Result<(), AppError> {
        let Study { progress, exam, .. } = study;
        if let Some(result) = exam.record_outcome(&mut progress.book) {
            progress.queue_exam_result(result.clone());
        }
        progress.flush(self.repo.as_ref()).await
    }
}

impl FromRef<AppState> for Config {
    fn from_ref(state: &AppState) -> Self {
        state.config.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        bank::MemoryQuestionSource,
        models::question::{ExamQuestion, fixtures::question},
        store::memory::FailingRepository,
    };

    #[tokio::test]
    async fn test_settled_exam_is_kept_until_storage_recovers() {
        let repo = Arc::new(FailingRepository::failing_applies(1));
        let config = Config {
            database_url: "sqlite::memory:".to_string(),
            data_dir: "data".into(),
            bind_addr: ([127, 0, 0, 1], 0).into(),
            rust_log: "info".to_string(),
        };
        let state = AppState::new(
            config,
            repo.clone(),
            Arc::new(MemoryQuestionSource::default()),
        )
        .await
        .unwrap();

        let mut study = state.study.lock().await;
        study.exam.begin_loading();
        let paper = vec![ExamQuestion::new(question("q1"), "history")];
        study.exam.start(Ok(paper), chrono::Utc::now());
        study.exam.finish();

        assert!(state.settle_exam(&mut study).await.is_err());
        assert!(study.progress.book.is_mistake("q1"));
        assert!(repo.list_exam_results().await.unwrap().is_empty());

        state.settle_exam(&mut study).await.unwrap();
        assert_eq!(repo.list_exam_results().await.unwrap().len(), 1);
        assert_eq!(repo.load().await.unwrap().mistakes.len(), 1);

        state.settle_exam(&mut study).await.unwrap();
        assert_eq!(repo.list_exam_results().await.unwrap().len(), 1);
    }
}
