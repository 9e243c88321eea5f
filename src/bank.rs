// src/bank.rs

//! Question bank loading.
//!
//! Bank files look like `{ "meta": {...}, "questions": [...] }`. Entries that are
//! null, malformed or fail validation are skipped; only an unreadable file or a
//! document without a `questions` array is an error.

use std::{collections::HashMap, path::PathBuf};

use async_trait::async_trait;
use serde_json::Value;
use validator::Validate;

use crate::{
    config::TOPIC_FILES,
    error::AppError,
    models::question::{ExamQuestion, Question},
    quiz::exam::ExamPools,
};

/// Where question banks come from.
#[async_trait]
pub trait QuestionSource: Send + Sync {
    async fn load_topic(&self, slug: &str) -> Result<Vec<Question>, AppError>;

    async fn load_situation(&self) -> Result<Vec<Question>, AppError>;
}

/// Parses a bank document, keeping only well-formed questions.
pub fn parse_bank(raw: &str) -> Result<Vec<Question>, AppError> {
    let doc: Value = serde_json::from_str(raw)
        .map_err(|e| AppError::LoadFailure(format!("Invalid question bank: {}", e)))?;

    let entries = doc
        .get("questions")
        .and_then(Value::as_array)
        .ok_or_else(|| AppError::LoadFailure("Question bank has no questions array".to_string()))?;

    let questions: Vec<Question> = entries
        .iter()
        .filter_map(|entry| serde_json::from_value::<Question>(entry.clone()).ok())
        .filter(|q| q.validate().is_ok())
        .collect();

    let skipped = entries.len() - questions.len();
    if skipped > 0 {
        tracing::warn!("Skipped {} invalid question bank entries", skipped);
    }

    Ok(questions)
}

/// Reads banks from `<root>/topics/<slug>.json` and `<root>/situation.json`.
#[derive(Debug, Clone)]
pub struct FsQuestionSource {
    root: PathBuf,
}

impl FsQuestionSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    async fn read(&self, path: PathBuf) -> Result<Vec<Question>, AppError> {
        let raw = tokio::fs::read_to_string(&path).await.map_err(|e| {
            AppError::LoadFailure(format!("Failed to load {}: {}", path.display(), e))
        })?;
        parse_bank(&raw)
    }
}

/// Rejects slugs that would escape the topics directory.
fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

#[async_trait]
impl QuestionSource for FsQuestionSource {
    async fn load_topic(&self, slug: &str) -> Result<Vec<Question>, AppError> {
        if !is_valid_slug(slug) {
            return Err(AppError::NotFound(format!("Unknown topic: {}", slug)));
        }
        self.read(self.root.join("topics").join(format!("{}.json", slug)))
            .await
    }

    async fn load_situation(&self) -> Result<Vec<Question>, AppError> {
        self.read(self.root.join("situation.json")).await
    }
}

/// Fixed banks held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuestionSource {
    pub topics: HashMap<String, Vec<Question>>,
    pub situation: Option<Vec<Question>>,
}

#[async_trait]
impl QuestionSource for MemoryQuestionSource {
    async fn load_topic(&self, slug: &str) -> Result<Vec<Question>, AppError> {
        self.topics
            .get(slug)
            .cloned()
            .ok_or_else(|| AppError::LoadFailure(format!("Failed to load topic {}", slug)))
    }

    async fn load_situation(&self) -> Result<Vec<Question>, AppError> {
        self.situation
            .clone()
            .ok_or_else(|| AppError::LoadFailure("Failed to load situation questions".to_string()))
    }
}

/// Loads every exam pool.
///
/// A topic bank that fails to load is skipped with a warning; the situational
/// bank is required.
pub async fn load_exam_pools(source: &dyn QuestionSource) -> Result<ExamPools, AppError> {
    let mut topics = Vec::with_capacity(TOPIC_FILES.len());
    for topic in TOPIC_FILES {
        match source.load_topic(topic).await {
            Ok(questions) => topics.push((topic.to_string(), questions)),
            Err(e) => tracing::warn!("Skipping topic {} for exam: {}", topic, e.message()),
        }
    }

    let situation = source.load_situation().await?;

    Ok(ExamPools { topics, situation })
}

/// Loads every topic bank into one pool for the daily drill, each question tagged
/// with its topic.
///
/// Banks that fail to load are skipped; an empty pool is a load failure.
pub async fn load_daily_pool(source: &dyn QuestionSource) -> Result<Vec<ExamQuestion>, AppError> {
    let mut pool = Vec::new();
    for topic in TOPIC_FILES {
        match source.load_topic(topic).await {
            Ok(questions) => {
                pool.extend(questions.into_iter().map(|q| ExamQuestion::new(q, topic)));
            }
            Err(e) => tracing::warn!("Skipping topic {} for daily drill: {}", topic, e.message()),
        }
    }

    if pool.is_empty() {
        return Err(AppError::LoadFailure("Unable to load the question bank".to_string()));
    }
    Ok(pool)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;

    const BANK: &str = r#"{
        "meta": {"sectionId": "situation", "sectionTitle": "situation"},
        "questions": [
            {
                "id": "sit-q1",
                "type": "single",
                "stem": "situation question",
                "analysis": "analysis",
                "choices": [
                    {"id": "c1", "text": "A", "isCorrect": true},
                    {"id": "c2", "text": "B", "isCorrect": false}
                ]
            },
            null,
            42,
            {"id": "broken"},
            {
                "id": "no-answer",
                "stem": "no correct choice",
                "choices": [{"id": "c1", "text": "A", "isCorrect": false}]
            }
        ]
    }"#;

    #[test]
    fn test_parse_skips_invalid_entries() {
        let questions = parse_bank(BANK).unwrap();
        assert_eq!(questions.len(), 1);
        assert_eq!(questions[0].id, "sit-q1");
    }

    #[test]
    fn test_parse_rejects_documents_without_questions() {
        assert!(matches!(parse_bank("{}"), Err(AppError::LoadFailure(_))));
        assert!(matches!(parse_bank("not json"), Err(AppError::LoadFailure(_))));
        assert_eq!(parse_bank(r#"{"questions": []}"#).unwrap().len(), 0);
    }

    #[test]
    fn test_slug_validation() {
        assert!(is_valid_slug("daily-practice"));
        assert!(!is_valid_slug("../secret"));
        assert!(!is_valid_slug(""));
    }

    #[tokio::test]
    async fn test_fs_source_reads_banks() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::create_dir(dir.path().join("topics")).unwrap();
        std::fs::write(dir.path().join("topics/history.json"), BANK).unwrap();
        std::fs::write(dir.path().join("situation.json"), BANK).unwrap();

        let source = FsQuestionSource::new(dir.path());
        assert_eq!(source.load_topic("history").await.unwrap().len(), 1);
        assert_eq!(source.load_situation().await.unwrap().len(), 1);
        assert!(matches!(
            source.load_topic("values").await,
            Err(AppError::LoadFailure(_))
        ));
    }

    #[tokio::test]
    async fn test_exam_pools_skip_missing_topics() {
        let source = MemoryQuestionSource {
            topics: HashMap::from([("history".to_string(), vec![question("h1")])]),
            situation: Some(vec![question("s1")]),
        };
        let pools = load_exam_pools(&source).await.unwrap();
        assert_eq!(pools.topics.len(), 1);
        assert_eq!(pools.situation.len(), 1);

        let no_situation = MemoryQuestionSource {
            situation: None,
            ..source
        };
        assert!(load_exam_pools(&no_situation).await.is_err());
    }

    #[tokio::test]
    async fn test_daily_pool_merges_available_topics() {
        let source = MemoryQuestionSource {
            topics: HashMap::from([
                ("history".to_string(), vec![question("h1"), question("h2")]),
                ("values".to_string(), vec![question("v1")]),
                ("unlisted".to_string(), vec![question("u1")]),
            ]),
            situation: None,
        };

        let pool = load_daily_pool(&source).await.unwrap();
        assert_eq!(pool.len(), 3);
        assert!(pool.iter().any(|q| q.id() == "v1" && q.topic_id == "values"));
        assert!(pool.iter().all(|q| q.id() != "u1"));
    }

    #[tokio::test]
    async fn test_daily_pool_without_banks_fails() {
        let err = load_daily_pool(&MemoryQuestionSource::default())
            .await
            .unwrap_err();
        assert_eq!(err.message(), "Unable to load the question bank");
    }
}
