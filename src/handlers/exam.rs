// src/handlers/exam.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};
use chrono::Utc;

use crate::{
    bank::load_exam_pools,
    error::AppError,
    models::exam_record::{ExamResponse, ExamResultResponse, GoToQuestionRequest, SelectAnswerRequest},
    quiz::exam::{ExamStatus, assemble_exam},
    state::AppState,
};

/// Draws a new mock exam and starts its 45-minute countdown.
///
/// * Ignored while an exam is already running; the running exam is returned.
/// * If the question banks cannot be loaded the exam goes back to idle and the
///   message is returned in `error`.
pub async fn start_exam(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    if !guard.exam.begin_loading() {
        return Ok(Json(ExamResponse::from(&guard.exam)));
    }
    guard.countdown.stop();

    let study = &mut *guard;
    let paper = match load_exam_pools(state.bank.as_ref()).await {
        Ok(pools) => assemble_exam(pools, &mut study.rng),
        Err(e) => Err(e),
    };
    study.exam.start(paper, Utc::now());

    if study.exam.status() == ExamStatus::InProgress {
        study.countdown.start(state.clone());
    }

    Ok(Json(ExamResponse::from(&study.exam)))
}

/// Current exam state. A finished exam whose outcome was not yet recorded is
/// settled here.
pub async fn get_exam(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    state.settle_exam(&mut study).await?;

    Ok(Json(ExamResponse::from(&study.exam)))
}

/// Records or changes an answer. Answers stay editable until the exam ends.
pub async fn select_answer(
    State(state): State<AppState>,
    Json(payload): Json<SelectAnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study
        .exam
        .select_answer(&payload.question_id, &payload.choice_id);

    Ok(Json(ExamResponse::from(&study.exam)))
}

pub async fn next_question(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.exam.next_question();
    Ok(Json(ExamResponse::from(&study.exam)))
}

pub async fn prev_question(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.exam.prev_question();
    Ok(Json(ExamResponse::from(&study.exam)))
}

pub async fn go_to_question(
    State(state): State<AppState>,
    Json(payload): Json<GoToQuestionRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    if let Ok(index) = usize::try_from(payload.index) {
        study.exam.go_to_question(index);
    }
    Ok(Json(ExamResponse::from(&study.exam)))
}

/// Hands the paper in.
///
/// * Scores the exam and stops the countdown.
/// * Wrong and skipped questions are added to the mistake store, and the result
///   to the history, exactly once.
pub async fn finish_exam(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    if study.exam.finish() {
        study.countdown.stop();
    }
    state.settle_exam(&mut study).await?;

    Ok(Json(ExamResponse::from(&study.exam)))
}

/// Drops the current exam, running or not, and returns to idle.
pub async fn reset_exam(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.countdown.stop();
    study.exam.reset();

    Ok(Json(ExamResponse::from(&study.exam)))
}

/// Finished exams, newest first.
pub async fn list_history(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let results = state.repo.list_exam_results().await?;
    let history: Vec<ExamResultResponse> = results.iter().map(ExamResultResponse::from).collect();

    Ok(Json(history))
}
