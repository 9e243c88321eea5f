// src/handlers/progress.rs

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};

use crate::{error::AppError, models::progress::TopicProgressResponse, state::AppState};

/// Per-topic counters with accuracy, ordered by topic id.
pub async fn list_progress(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let study = state.study.lock().await;
    let progress: Vec<TopicProgressResponse> = study
        .progress
        .topics
        .all()
        .into_iter()
        .map(TopicProgressResponse::from)
        .collect();

    Ok(Json(progress))
}

pub async fn reset_topic(
    State(state): State<AppState>,
    Path(topic_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.progress.topics.reset_topic_progress(&topic_id);
    state.commit(&mut study).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn reset_all(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.progress.topics.reset_all_progress();
    state.commit(&mut study).await?;

    tracing::info!("Reset all topic progress");
    Ok(StatusCode::NO_CONTENT)
}
