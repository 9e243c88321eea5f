// src/handlers/quiz.rs

use axum::{
    Json,
    extract::{Path, State},
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::quiz::{AnswerRequest, QuizResponse},
    quiz::topic::{QuizStatus, TopicQuiz},
    state::{AppState, Study},
};

fn quiz_not_started(slug: &str) -> AppError {
    AppError::NotFound(format!("No quiz started for topic {}", slug))
}

/// Starts a quiz on one topic, or restarts it with a fresh shuffle.
///
/// * A quiz that loaded fine is restarted from the questions it already holds.
/// * Otherwise the topic bank is (re)loaded. A load failure is reported in the
///   `error` field rather than as an HTTP error.
pub async fn start_quiz(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    {
        let mut guard = state.study.lock().await;
        let study = &mut *guard;
        if let Some(quiz) = study.quizzes.get_mut(&slug) {
            if !matches!(quiz.status(), QuizStatus::Failed | QuizStatus::Loading) {
                quiz.restart(&mut study.rng);
                return Ok(Json(QuizResponse::new(quiz, &study.progress.book)));
            }
        }
        study.quizzes.insert(slug.clone(), TopicQuiz::loading(&slug));
    }

    let fetched = state.bank.load_topic(&slug).await;

    let mut guard = state.study.lock().await;
    let Study {
        quizzes,
        progress,
        rng,
        ..
    } = &mut *guard;
    let quiz = quizzes
        .entry(slug.clone())
        .or_insert_with(|| TopicQuiz::loading(&slug));
    quiz.load(fetched, rng);
    tracing::info!("Topic quiz {} ready with {} questions", slug, quiz.questions().len());

    Ok(Json(QuizResponse::new(quiz, &progress.book)))
}

pub async fn get_quiz(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let study = state.study.lock().await;
    let quiz = study.quizzes.get(&slug).ok_or_else(|| quiz_not_started(&slug))?;

    Ok(Json(QuizResponse::new(quiz, &study.progress.book)))
}

/// Answers the current question.
///
/// The first answer is final: wrong answers go to the mistake store and every
/// answer counts toward the topic's progress. Later submissions change nothing.
pub async fn answer_question(
    State(state): State<AppState>,
    Path(slug): Path<String>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    let Study {
        quizzes, progress, ..
    } = &mut *guard;
    let quiz = quizzes.get_mut(&slug).ok_or_else(|| quiz_not_started(&slug))?;

    if let Some(is_correct) = quiz.submit_answer(&payload.choice_id, &mut progress.book) {
        progress.topics.record_answer(&slug, is_correct);
    }
    let response = QuizResponse::new(quiz, &progress.book);

    state.commit(&mut guard).await?;
    Ok(Json(response))
}

pub async fn next_question(
    State(state): State<AppState>,
    Path(slug): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    let study = &mut *guard;
    let quiz = study
        .quizzes
        .get_mut(&slug)
        .ok_or_else(|| quiz_not_started(&slug))?;
    quiz.next_question();

    Ok(Json(QuizResponse::new(quiz, &study.progress.book)))
}
