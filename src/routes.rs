// src/routes.rs

use axum::{
    Router,
    http::{Method, header},
    routing::{delete, get, post},
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use crate::{
    handlers::{daily, exam, mistakes, practice, progress, quiz},
    state::AppState,
};

/// Assembles the application router.
///
/// * Nests the mistake, bookmark, progress, topic quiz, exam, practice and daily drill
///   routes under `/api`.
/// * Applies global middleware (Trace, CORS).
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE]);

    let mistake_routes = Router::new()
        .route(
            "/",
            get(mistakes::list_mistakes).delete(mistakes::clear_mistakes),
        )
        .route("/topics", get(mistakes::list_mistake_topics))
        .route("/{id}", delete(mistakes::delete_mistake));

    let bookmark_routes = Router::new()
        .route(
            "/",
            get(mistakes::list_bookmarks).delete(mistakes::clear_bookmarks),
        )
        .route("/toggle", post(mistakes::toggle_bookmark));

    let progress_routes = Router::new()
        .route("/", get(progress::list_progress).delete(progress::reset_all))
        .route("/{topic}", delete(progress::reset_topic));

    let topic_routes = Router::new()
        .route("/{slug}/quiz", post(quiz::start_quiz).get(quiz::get_quiz))
        .route("/{slug}/quiz/answer", post(quiz::answer_question))
        .route("/{slug}/quiz/next", post(quiz::next_question));

    let exam_routes = Router::new()
        .route("/", get(exam::get_exam))
        .route("/start", post(exam::start_exam))
        .route("/answer", post(exam::select_answer))
        .route("/next", post(exam::next_question))
        .route("/prev", post(exam::prev_question))
        .route("/goto", post(exam::go_to_question))
        .route("/finish", post(exam::finish_exam))
        .route("/reset", post(exam::reset_exam))
        .route("/history", get(exam::list_history));

    let practice_routes = Router::new()
        .route(
            "/",
            post(practice::start_practice).get(practice::get_practice),
        )
        .route("/answer", post(practice::answer_card))
        .route("/next", post(practice::next_card))
        .route("/mastered", post(practice::mark_mastered))
        .route("/reshuffle", post(practice::reshuffle));

    let daily_routes = Router::new()
        .route("/", post(daily::start_daily).get(daily::get_daily))
        .route("/answer", post(daily::answer_daily))
        .route("/next", post(daily::next_daily));

    Router::new()
        .nest("/api/mistakes", mistake_routes)
        .nest("/api/bookmarks", bookmark_routes)
        .nest("/api/progress", progress_routes)
        .nest("/api/topics", topic_routes)
        .nest("/api/exam", exam_routes)
        .nest("/api/practice", practice_routes)
        .nest("/api/daily", daily_routes)
        // Global Middleware (applied from outside in)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
