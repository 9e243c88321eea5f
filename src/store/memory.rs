// src/store/memory.rs

use std::{
    collections::HashMap,
    sync::{Mutex, MutexGuard},
};

#[cfg(test)]
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam_record::ExamResult,
        progress::{BookmarkRecord, MistakeRecord, TopicProgressRecord},
    },
    store::{ProgressRepository, ProgressSnapshot, StoreWrite},
};

#[derive(Debug, Default)]
struct Tables {
    mistakes: HashMap<String, MistakeRecord>,
    bookmarks: HashMap<String, BookmarkRecord>,
    topics: HashMap<String, TopicProgressRecord>,
    exams: Vec<ExamResult>,
    batches: usize,
}

/// Repository that keeps everything in process memory. Used by tests and throwaway runs.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    tables: Mutex<Tables>,
}

impl MemoryRepository {
    fn tables(&self) -> Result<MutexGuard<'_, Tables>, AppError> {
        self.tables
            .lock()
            .map_err(|e| AppError::InternalServerError(e.to_string()))
    }

    /// Number of non-empty `apply` calls received so far.
    pub fn applied_batches(&self) -> usize {
        self.tables().map(|t| t.batches).unwrap_or_default()
    }
}

#[async_trait]
impl ProgressRepository for MemoryRepository {
    async fn load(&self) -> Result<ProgressSnapshot, AppError> {
        let tables = self.tables()?;
        Ok(ProgressSnapshot {
            mistakes: tables.mistakes.values().cloned().collect(),
            bookmarks: tables.bookmarks.values().cloned().collect(),
            topics: tables.topics.values().cloned().collect(),
        })
    }

    async fn apply(&self, writes: &[StoreWrite]) -> Result<(), AppError> {
        let mut tables = self.tables()?;
        for write in writes {
            match write {
                StoreWrite::UpsertMistake(m) => {
                    tables.mistakes.insert(m.question_id.clone(), m.clone());
                }
                StoreWrite::DeleteMistake(id) => {
                    tables.mistakes.remove(id);
                }
                StoreWrite::ClearMistakes => tables.mistakes.clear(),
                StoreWrite::UpsertBookmark(b) => {
                    tables.bookmarks.insert(b.question_id.clone(), b.clone());
                }
                StoreWrite::DeleteBookmark(id) => {
                    tables.bookmarks.remove(id);
                }
                StoreWrite::ClearBookmarks => tables.bookmarks.clear(),
                StoreWrite::UpsertTopic(t) => {
                    tables.topics.insert(t.topic_id.clone(), t.clone());
                }
                StoreWrite::DeleteTopic(id) => {
                    tables.topics.remove(id);
                }
                StoreWrite::ClearTopics => tables.topics.clear(),
            }
        }
        if !writes.is_empty() {
            tables.batches += 1;
        }
        Ok(())
    }

    async fn save_exam_result(&self, result: &ExamResult) -> Result<(), AppError> {
        self.tables()?.exams.push(result.clone());
        Ok(())
    }

    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, AppError> {
        let mut exams = self.tables()?.exams.clone();
        exams.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(exams)
    }
}

/// Memory repository whose first few writes are refused.
#[cfg(test)]
#[derive(Debug, Default)]
pub(crate) struct FailingRepository {
    inner: MemoryRepository,
    failed_applies: AtomicUsize,
    failed_saves: AtomicUsize,
}

#[cfg(test)]
impl FailingRepository {
    pub(crate) fn failing_applies(count: usize) -> Self {
        Self {
            failed_applies: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    pub(crate) fn failing_saves(count: usize) -> Self {
        Self {
            failed_saves: AtomicUsize::new(count),
            ..Self::default()
        }
    }

    fn refuse(counter: &AtomicUsize) -> bool {
        counter
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

#[cfg(test)]
#[async_trait]
impl ProgressRepository for FailingRepository {
    async fn load(&self) -> Result<ProgressSnapshot, AppError> {
        self.inner.load().await
    }

    async fn apply(&self, writes: &[StoreWrite]) -> Result<(), AppError> {
        if Self::refuse(&self.failed_applies) {
            return Err(AppError::InternalServerError("database is locked".to_string()));
        }
        self.inner.apply(writes).await
    }

    async fn save_exam_result(&self, result: &ExamResult) -> Result<(), AppError> {
        if Self::refuse(&self.failed_saves) {
            return Err(AppError::InternalServerError("database is locked".to_string()));
        }
        self.inner.save_exam_result(result).await
    }

    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, AppError> {
        self.inner.list_exam_results().await
    }
}
