// src/handlers/practice.rs

use axum::{
    Json,
    extract::State,
    response::IntoResponse,
};

use crate::{
    error::AppError,
    models::{
        practice::{PracticeRequest, PracticeResponse},
        quiz::AnswerRequest,
    },
    practice::PracticeSession,
    state::{AppState, Study},
};

fn no_session() -> AppError {
    AppError::NotFound("No practice session started".to_string())
}

/// The running session, re-synced with the current mistakes.
fn live_session(study: &mut Study) -> Result<&mut PracticeSession, AppError> {
    let Study {
        practice,
        progress,
        rng,
        ..
    } = study;
    let session = practice.as_mut().ok_or_else(no_session)?;
    session.sync(&progress.book.mistakes_sorted(), rng);
    Ok(session)
}

fn respond(study: &Study) -> Result<Json<PracticeResponse>, AppError> {
    let session = study.practice.as_ref().ok_or_else(no_session)?;
    let mistakes = study.progress.book.mistakes_sorted();
    Ok(Json(PracticeResponse::new(
        session,
        &mistakes,
        &study.progress.book,
    )))
}

/// Builds a practice session over the current mistakes, replacing any previous one.
pub async fn start_practice(
    State(state): State<AppState>,
    Json(payload): Json<PracticeRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    let study = &mut *guard;

    let records = study.progress.book.mistakes_sorted();
    let session = PracticeSession::new(
        &records,
        payload.filter_options(),
        payload.mode,
        &mut study.rng,
    );
    tracing::info!(
        "Practice session started: {} of {} mistakes, {} cards",
        session.records().len(),
        records.len(),
        session.queue_len()
    );
    study.practice = Some(session);

    respond(study)
}

/// Current card. Mistakes removed or added since the last call are reflected.
pub async fn get_practice(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    live_session(&mut study)?;
    respond(&study)
}

/// Answers the current card. Only the first answer per card counts and no
/// mistake is recorded.
pub async fn answer_card(
    State(state): State<AppState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    live_session(&mut study)?.select_choice(&payload.choice_id);

    respond(&study)
}

pub async fn next_card(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    live_session(&mut study)?.next();

    respond(&study)
}

/// Removes the current card's mistake from the store.
pub async fn mark_mastered(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    live_session(&mut guard)?;
    let Study {
        practice,
        progress,
        rng,
        ..
    } = &mut *guard;
    let session = practice.as_mut().ok_or_else(no_session)?;

    if let Some(question_id) = session.mark_mastered(&mut progress.book, rng) {
        tracing::info!("Question {} marked as mastered", question_id);
    }
    state.commit(&mut guard).await?;

    respond(&guard)
}

pub async fn reshuffle(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    live_session(&mut guard)?;
    let study = &mut *guard;
    study
        .practice
        .as_mut()
        .ok_or_else(no_session)?
        .reshuffle(&mut study.rng);

    respond(study)
}
