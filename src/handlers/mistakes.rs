// src/handlers/mistakes.rs

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use validator::Validate;

use crate::{
    error::AppError,
    models::progress::{MistakeListParams, ToggleBookmarkRequest},
    practice::{
        KindFilter, MistakeFilterOptions,
        filters::{filter_mistakes, topic_options},
    },
    state::AppState,
};

fn parse_kind(raw: Option<&str>) -> Result<KindFilter, AppError> {
    match raw {
        None => Ok(KindFilter::All),
        Some(raw) => KindFilter::parse(raw)
            .ok_or_else(|| AppError::BadRequest(format!("Unknown question kind: {}", raw))),
    }
}

/// Lists mistakes, most-missed first.
///
/// * `kind`: 'all' (default), 'choice' or 'situation'.
/// * `topic`: a topic id, or 'all'. Ignored when the kind filter excludes it.
/// * `min_count`: minimum number of wrong answers (default 1).
pub async fn list_mistakes(
    State(state): State<AppState>,
    Query(params): Query<MistakeListParams>,
) -> Result<impl IntoResponse, AppError> {
    let options = MistakeFilterOptions {
        kind: parse_kind(params.kind.as_deref())?,
        topic_id: params.topic.filter(|t| t != "all"),
        min_wrong_count: params.min_count.unwrap_or(1),
    }
    .normalized();

    let study = state.study.lock().await;
    let records = filter_mistakes(&study.progress.book.mistakes_sorted(), &options);

    Ok(Json(records))
}

#[derive(Debug, Default, Deserialize)]
pub struct TopicListParams {
    pub kind: Option<String>,
}

/// Topics that have at least one mistake, restricted to the requested kind.
pub async fn list_mistake_topics(
    State(state): State<AppState>,
    Query(params): Query<TopicListParams>,
) -> Result<impl IntoResponse, AppError> {
    let kind = parse_kind(params.kind.as_deref())?;

    let study = state.study.lock().await;
    let topics = topic_options(&study.progress.book.mistakes_sorted(), kind);

    Ok(Json(topics))
}

/// Marks a mistake as mastered. Unknown ids are accepted silently.
pub async fn delete_mistake(
    State(state): State<AppState>,
    Path(question_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.progress.book.remove_mistake(&question_id);
    state.commit(&mut study).await?;

    Ok(StatusCode::NO_CONTENT)
}

pub async fn clear_mistakes(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.progress.book.clear_all_mistakes();
    state.commit(&mut study).await?;

    tracing::info!("Cleared all mistakes");
    Ok(StatusCode::NO_CONTENT)
}

/// Lists bookmarks, newest first.
pub async fn list_bookmarks(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let study = state.study.lock().await;
    Ok(Json(study.progress.book.bookmarks_sorted()))
}

/// Adds or removes a bookmark. Returns the new state.
pub async fn toggle_bookmark(
    State(state): State<AppState>,
    Json(payload): Json<ToggleBookmarkRequest>,
) -> Result<impl IntoResponse, AppError> {
    payload
        .question
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    if payload.topic_id.is_empty() {
        return Err(AppError::BadRequest("topic_id must not be empty".to_string()));
    }

    let mut study = state.study.lock().await;
    let bookmarked = study
        .progress
        .book
        .toggle_bookmark(&payload.question, &payload.topic_id);
    state.commit(&mut study).await?;

    Ok(Json(json!({
        "question_id": payload.question.id,
        "bookmarked": bookmarked,
    })))
}

pub async fn clear_bookmarks(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut study = state.study.lock().await;
    study.progress.book.clear_all_bookmarks();
    state.commit(&mut study).await?;

    Ok(StatusCode::NO_CONTENT)
}
