// src/handlers/daily.rs

use axum::{Json, extract::State, response::IntoResponse};

use crate::{
    bank::load_daily_pool,
    error::AppError,
    models::{daily::DailyResponse, quiz::AnswerRequest},
    quiz::DailyDrill,
    state::{AppState, Study},
};

fn no_drill() -> AppError {
    AppError::NotFound("No daily drill started".to_string())
}

/// Loads every topic bank and starts a fresh shuffled drill.
///
/// A bank that fails to load is skipped. When none loads, the drill reports the
/// failure in its `error` field.
pub async fn start_daily(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let pool = load_daily_pool(state.bank.as_ref()).await;

    let mut guard = state.study.lock().await;
    let study = &mut *guard;
    let drill = DailyDrill::new(pool, &mut study.rng);
    tracing::info!("Daily drill ready with {} cards", drill.questions().len());
    let response = DailyResponse::new(&drill, &study.progress.book);
    study.daily = Some(drill);

    Ok(Json(response))
}

pub async fn get_daily(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let study = state.study.lock().await;
    let drill = study.daily.as_ref().ok_or_else(no_drill)?;

    Ok(Json(DailyResponse::new(drill, &study.progress.book)))
}

/// Answers the current card. A wrong first answer is added to the mistakes.
pub async fn answer_daily(
    State(state): State<AppState>,
    Json(payload): Json<AnswerRequest>,
) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    let Study {
        daily, progress, ..
    } = &mut *guard;
    let drill = daily.as_mut().ok_or_else(no_drill)?;

    drill.select_choice(&payload.choice_id, &mut progress.book);
    let response = DailyResponse::new(drill, &progress.book);

    state.commit(&mut guard).await?;
    Ok(Json(response))
}

pub async fn next_daily(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut guard = state.study.lock().await;
    let study = &mut *guard;
    let drill = study.daily.as_mut().ok_or_else(no_drill)?;
    drill.next();

    Ok(Json(DailyResponse::new(drill, &study.progress.book)))
}
