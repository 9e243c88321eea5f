#![allow(dead_code)]

use std::{collections::HashMap, path::Path, sync::Arc};

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode},
};
use civique::{
    bank::{FsQuestionSource, MemoryQuestionSource, QuestionSource},
    config::{Config, TOPIC_FILES},
    models::question::{Choice, Question},
    routes,
    state::AppState,
    store::{MemoryRepository, ProgressRepository, SqliteRepository},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use sqlx::sqlite::SqlitePoolOptions;
use tempfile::TempDir;
use tower::ServiceExt;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    // keeps the bank files alive for the duration of the test
    _data_dir: Option<TempDir>,
}

impl TestApp {
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }
}

/// A question whose correct choice is always `c1`.
pub fn question(id: &str) -> Question {
    Question {
        id: id.to_string(),
        question_type: "single".to_string(),
        stem: format!("Stem of {}", id),
        choices: vec![
            Choice {
                id: "c1".to_string(),
                text: "Right".to_string(),
                is_correct: true,
            },
            Choice {
                id: "c2".to_string(),
                text: "Wrong".to_string(),
                is_correct: false,
            },
        ],
        analysis: format!("Because of {}", id),
        difficulty: None,
        tags: None,
    }
}

pub fn bank(prefix: &str, n: usize) -> Vec<Question> {
    (0..n).map(|i| question(&format!("{}-q{}", prefix, i))).collect()
}

fn write_bank(path: &Path, questions: &[Question]) {
    let doc = json!({
        "meta": { "sectionId": "test" },
        "questions": questions,
    });
    std::fs::write(path, doc.to_string()).unwrap();
}

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        data_dir: "data".into(),
        bind_addr: "127.0.0.1:0".parse().unwrap(),
        rust_log: "error".to_string(),
    }
}

pub async fn build_app(
    repo: Arc<dyn ProgressRepository>,
    bank: Arc<dyn QuestionSource>,
    data_dir: Option<TempDir>,
) -> TestApp {
    let state = AppState::new(test_config(), repo, bank).await.unwrap();
    TestApp {
        router: routes::create_router(state.clone()),
        state,
        _data_dir: data_dir,
    }
}

/// Full stack: SQLite in memory and bank files in a temp dir.
/// Every exam topic holds 8 questions and the situational bank 15.
pub async fn create_test_app() -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    std::fs::create_dir(dir.path().join("topics")).unwrap();
    for topic in TOPIC_FILES {
        write_bank(&dir.path().join("topics").join(format!("{}.json", topic)), &bank(topic, 8));
    }
    write_bank(&dir.path().join("situation.json"), &bank("situation", 15));

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect("sqlite::memory:")
        .await
        .unwrap();
    let repo = SqliteRepository::new(pool);
    repo.migrate().await.unwrap();

    let source = FsQuestionSource::new(dir.path());
    build_app(Arc::new(repo), Arc::new(source), Some(dir)).await
}

/// In-memory repository and banks, with the situational bank optional.
pub async fn create_memory_app(with_situation: bool) -> TestApp {
    let topics: HashMap<String, Vec<Question>> = TOPIC_FILES
        .iter()
        .map(|t| (t.to_string(), bank(t, 8)))
        .collect();
    let source = MemoryQuestionSource {
        topics,
        situation: with_situation.then(|| bank("situation", 15)),
    };
    create_memory_app_with(source).await
}

/// In-memory repository over the given banks.
pub async fn create_memory_app_with(source: MemoryQuestionSource) -> TestApp {
    build_app(Arc::new(MemoryRepository::default()), Arc::new(source), None).await
}
