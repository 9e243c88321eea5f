// tests/timer_tests.rs

use std::time::Duration;

use serde_json::json;

mod common;

use common::create_memory_app;

#[tokio::test(start_paused = true)]
async fn countdown_submits_exam_when_time_runs_out() {
    let app = create_memory_app(true).await;

    let (_, exam) = app.post("/api/exam/start", json!({})).await;
    assert_eq!(exam["status"], "in_progress");
    let first = exam["questions"][0]["id"].as_str().unwrap().to_string();
    app.post("/api/exam/answer", json!({ "question_id": first, "choice_id": "c1" }))
        .await;

    tokio::time::sleep(Duration::from_millis(10_500)).await;
    let (_, running) = app.get("/api/exam").await;
    assert_eq!(running["status"], "in_progress");
    assert_eq!(running["time_remaining"], 2690);

    tokio::time::sleep(Duration::from_secs(2700)).await;
    let (_, exam) = app.get("/api/exam").await;
    assert_eq!(exam["status"], "finished");
    assert_eq!(exam["time_remaining"], 0);
    assert_eq!(exam["result"]["score"], 1);

    let (_, mistakes) = app.get("/api/mistakes").await;
    assert_eq!(mistakes.as_array().unwrap().len(), 39);
    let (_, history) = app.get("/api/exam/history").await;
    assert_eq!(history.as_array().unwrap().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_stops_the_countdown() {
    let app = create_memory_app(true).await;

    app.post("/api/exam/start", json!({})).await;
    tokio::time::sleep(Duration::from_secs(5)).await;
    let (_, reset) = app.post("/api/exam/reset", json!({})).await;
    assert_eq!(reset["status"], "idle");
    assert!(!app.state.study.lock().await.countdown.is_running());

    tokio::time::sleep(Duration::from_secs(60)).await;
    let (_, exam) = app.get("/api/exam").await;
    assert_eq!(exam["status"], "idle");
    assert_eq!(exam["time_remaining"], 2700);
}
