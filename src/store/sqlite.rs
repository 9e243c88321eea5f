// src/store/sqlite.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{FromRow, SqlitePool, types::Json};

use crate::{
    error::AppError,
    models::{
        exam_record::{ExamResult, TopicScore, WrongQuestion},
        progress::{BookmarkRecord, MistakeRecord, TopicProgressRecord},
        question::Question,
    },
    store::{ProgressRepository, ProgressSnapshot, StoreWrite},
};

#[derive(FromRow)]
struct MistakeRow {
    question_id: String,
    question: Json<Question>,
    topic_id: String,
    count: i64,
    last_wrong_at: DateTime<Utc>,
}

impl From<MistakeRow> for MistakeRecord {
    fn from(row: MistakeRow) -> Self {
        Self {
            question_id: row.question_id,
            question: row.question.0,
            topic_id: row.topic_id,
            count: row.count.max(1) as u32,
            last_wrong_at: row.last_wrong_at,
        }
    }
}

#[derive(FromRow)]
struct BookmarkRow {
    question_id: String,
    question: Json<Question>,
    topic_id: String,
    added_at: DateTime<Utc>,
}

impl From<BookmarkRow> for BookmarkRecord {
    fn from(row: BookmarkRow) -> Self {
        Self {
            question_id: row.question_id,
            question: row.question.0,
            topic_id: row.topic_id,
            added_at: row.added_at,
        }
    }
}

#[derive(FromRow)]
struct TopicRow {
    topic_id: String,
    total_answered: i64,
    correct_count: i64,
    last_practice_at: DateTime<Utc>,
}

impl From<TopicRow> for TopicProgressRecord {
    fn from(row: TopicRow) -> Self {
        Self {
            topic_id: row.topic_id,
            total_answered: row.total_answered.max(0) as u32,
            correct_count: row.correct_count.max(0) as u32,
            last_practice_at: row.last_practice_at,
        }
    }
}

#[derive(FromRow)]
struct ExamRow {
    id: String,
    date: DateTime<Utc>,
    score: i64,
    total: i64,
    duration: i64,
    topic_scores: Json<BTreeMap<String, TopicScore>>,
    wrong_questions: Json<Vec<WrongQuestion>>,
}

impl From<ExamRow> for ExamResult {
    fn from(row: ExamRow) -> Self {
        Self {
            id: row.id,
            date: row.date,
            score: row.score.max(0) as u32,
            total: row.total.max(0) as u32,
            duration: row.duration.max(0) as u64,
            topic_scores: row.topic_scores.0,
            wrong_questions: row.wrong_questions.0,
        }
    }
}

/// SQLite-backed repository. Question snapshots are stored as JSON text.
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Applies the embedded migrations.
    pub async fn migrate(&self) -> Result<(), AppError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl ProgressRepository for SqliteRepository {
    async fn load(&self) -> Result<ProgressSnapshot, AppError> {
        let mistakes = sqlx::query_as::<_, MistakeRow>(
            "SELECT question_id, question, topic_id, count, last_wrong_at FROM mistakes",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to load mistakes: {:?}", e);
            AppError::InternalServerError(e.to_string())
        })?;

        let bookmarks = sqlx::query_as::<_, BookmarkRow>(
            "SELECT question_id, question, topic_id, added_at FROM bookmarks",
        )
        .fetch_all(&self.pool)
        .await?;

        let topics = sqlx::query_as::<_, TopicRow>(
            "SELECT topic_id, total_answered, correct_count, last_practice_at FROM topic_progress",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(ProgressSnapshot {
            mistakes: mistakes.into_iter().map(Into::into).collect(),
            bookmarks: bookmarks.into_iter().map(Into::into).collect(),
            topics: topics.into_iter().map(Into::into).collect(),
        })
    }

    async fn apply(&self, writes: &[StoreWrite]) -> Result<(), AppError> {
        let mut tx = self.pool.begin().await?;

        for write in writes {
            match write {
                StoreWrite::UpsertMistake(m) => {
                    sqlx::query(
                        r#"
                        INSERT INTO mistakes (question_id, question, topic_id, count, last_wrong_at)
                        VALUES (?, ?, ?, ?, ?)
                        ON CONFLICT(question_id) DO UPDATE SET
                            question = excluded.question,
                            topic_id = excluded.topic_id,
                            count = excluded.count,
                            last_wrong_at = excluded.last_wrong_at
                        "#,
                    )
                    .bind(&m.question_id)
                    .bind(Json(&m.question))
                    .bind(&m.topic_id)
                    .bind(i64::from(m.count))
                    .bind(m.last_wrong_at)
                    .execute(&mut *tx)
                    .await?;
                }
                StoreWrite::DeleteMistake(id) => {
                    sqlx::query("DELETE FROM mistakes WHERE question_id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                StoreWrite::ClearMistakes => {
                    sqlx::query("DELETE FROM mistakes").execute(&mut *tx).await?;
                }
                StoreWrite::UpsertBookmark(b) => {
                    sqlx::query(
                        r#"
                        INSERT INTO bookmarks (question_id, question, topic_id, added_at)
                        VALUES (?, ?, ?, ?)
                        ON CONFLICT(question_id) DO UPDATE SET
                            question = excluded.question,
                            topic_id = excluded.topic_id,
                            added_at = excluded.added_at
                        "#,
                    )
                    .bind(&b.question_id)
                    .bind(Json(&b.question))
                    .bind(&b.topic_id)
                    .bind(b.added_at)
                    .execute(&mut *tx)
                    .await?;
                }
                StoreWrite::DeleteBookmark(id) => {
                    sqlx::query("DELETE FROM bookmarks WHERE question_id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                StoreWrite::ClearBookmarks => {
                    sqlx::query("DELETE FROM bookmarks").execute(&mut *tx).await?;
                }
                StoreWrite::UpsertTopic(t) => {
                    sqlx::query(
                        r#"
                        INSERT INTO topic_progress (topic_id, total_answered, correct_count, last_practice_at)
                        VALUES (?, ?, ?, ?)
                        ON CONFLICT(topic_id) DO UPDATE SET
                            total_answered = excluded.total_answered,
                            correct_count = excluded.correct_count,
                            last_practice_at = excluded.last_practice_at
                        "#,
                    )
                    .bind(&t.topic_id)
                    .bind(i64::from(t.total_answered))
                    .bind(i64::from(t.correct_count))
                    .bind(t.last_practice_at)
                    .execute(&mut *tx)
                    .await?;
                }
                StoreWrite::DeleteTopic(id) => {
                    sqlx::query("DELETE FROM topic_progress WHERE topic_id = ?")
                        .bind(id)
                        .execute(&mut *tx)
                        .await?;
                }
                StoreWrite::ClearTopics => {
                    sqlx::query("DELETE FROM topic_progress")
                        .execute(&mut *tx)
                        .await?;
                }
            }
        }

        tx.commit().await?;
        Ok(())
    }

    async fn save_exam_result(&self, result: &ExamResult) -> Result<(), AppError> {
        sqlx::query(
            r#"
            INSERT INTO exam_results (id, date, score, total, duration, topic_scores, wrong_questions)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&result.id)
        .bind(result.date)
        .bind(i64::from(result.score))
        .bind(i64::from(result.total))
        .bind(result.duration as i64)
        .bind(Json(&result.topic_scores))
        .bind(Json(&result.wrong_questions))
        .execute(&self.pool)
        .await
        .map_err(|e| {
            tracing::error!("Failed to save exam result {}: {:?}", result.id, e);
            AppError::InternalServerError(e.to_string())
        })?;

        Ok(())
    }

    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, AppError> {
        let rows = sqlx::query_as::<_, ExamRow>(
            r#"
            SELECT id, date, score, total, duration, topic_scores, wrong_questions
            FROM exam_results
            ORDER BY date DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
