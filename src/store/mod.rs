// src/store/mod.rs

//! Per-learner progress: mistakes, bookmarks and topic counters.
//!
//! The stores are plain in-memory structs. Each mutation also appends a
//! [`StoreWrite`] to a journal; whoever owns the store drains that journal into a
//! [`ProgressRepository`] right after mutating, so storage always sees every change.

pub mod memory;
pub mod mistakes;
pub mod sqlite;
pub mod topics;

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        exam_record::ExamResult,
        progress::{BookmarkRecord, MistakeRecord, TopicProgressRecord},
    },
};

pub use memory::MemoryRepository;
pub use mistakes::{MistakeBook, MistakeSink};
pub use sqlite::SqliteRepository;
pub use topics::TopicTracker;

/// One persisted change, keyed the same way as the in-memory maps.
#[derive(Debug, Clone, PartialEq)]
pub enum StoreWrite {
    UpsertMistake(MistakeRecord),
    DeleteMistake(String),
    ClearMistakes,
    UpsertBookmark(BookmarkRecord),
    DeleteBookmark(String),
    ClearBookmarks,
    UpsertTopic(TopicProgressRecord),
    DeleteTopic(String),
    ClearTopics,
}

/// Everything read back from storage at startup.
#[derive(Debug, Clone, Default)]
pub struct ProgressSnapshot {
    pub mistakes: Vec<MistakeRecord>,
    pub bookmarks: Vec<BookmarkRecord>,
    pub topics: Vec<TopicProgressRecord>,
}

/// Durable storage behind the stores.
#[async_trait]
pub trait ProgressRepository: Send + Sync {
    async fn load(&self) -> Result<ProgressSnapshot, AppError>;

    /// Applies writes in order. Last write wins per key.
    async fn apply(&self, writes: &[StoreWrite]) -> Result<(), AppError>;

    async fn save_exam_result(&self, result: &ExamResult) -> Result<(), AppError>;

    /// Finished exams, newest first.
    async fn list_exam_results(&self) -> Result<Vec<ExamResult>, AppError>;
}

/// The mistake/bookmark store and the topic tracker of one learner.
///
/// Writes and exam results that storage refused are kept and sent again, in
/// order, on the next flush.
#[derive(Debug, Default)]
pub struct ProgressStore {
    pub book: MistakeBook,
    pub topics: TopicTracker,
    unsaved: Vec<StoreWrite>,
    unsaved_exams: Vec<ExamResult>,
}

impl ProgressStore {
    pub fn from_snapshot(snapshot: ProgressSnapshot) -> Self {
        Self {
            book: MistakeBook::from_records(snapshot.mistakes, snapshot.bookmarks),
            topics: TopicTracker::from_records(snapshot.topics),
            ..Self::default()
        }
    }

    /// Reads the stores back from `repo`.
    pub async fn load(repo: &dyn ProgressRepository) -> Result<Self, AppError> {
        let snapshot = repo.load().await?;
        tracing::info!(
            "Loaded progress: {} mistakes, {} bookmarks, {} topics",
            snapshot.mistakes.len(),
            snapshot.bookmarks.len(),
            snapshot.topics.len()
        );
        Ok(Self::from_snapshot(snapshot))
    }

    /// Drains every pending write: leftovers from a failed flush, then the
    /// mistake journal, then the topic journal.
    pub fn take_writes(&mut self) -> Vec<StoreWrite> {
        let mut writes = std::mem::take(&mut self.unsaved);
        writes.extend(self.book.take_writes());
        writes.extend(self.topics.take_writes());
        writes
    }

    /// Queues a finished exam for the history. It is saved by the next flush.
    pub fn queue_exam_result(&mut self, result: ExamResult) {
        self.unsaved_exams.push(result);
    }

    /// Whether anything is still waiting for storage.
    pub fn has_unsaved(&self) -> bool {
        !self.unsaved.is_empty()
            || !self.unsaved_exams.is_empty()
            || self.book.has_writes()
            || self.topics.has_writes()
    }

    /// Pushes pending writes, then queued exam results, to `repo`.
    ///
    /// On failure nothing is lost: the refused items stay pending.
    pub async fn flush(&mut self, repo: &dyn ProgressRepository) -> Result<(), AppError> {
        if !self.has_unsaved() {
            return Ok(());
        }

        let writes = self.take_writes();
        if !writes.is_empty() {
            if let Err(e) = repo.apply(&writes).await {
                tracing::error!("Failed to persist {} progress writes: {:?}", writes.len(), e);
                self.unsaved = writes;
                return Err(e);
            }
        }

        while let Some(result) = self.unsaved_exams.first() {
            if let Err(e) = repo.save_exam_result(result).await {
                tracing::error!("Failed to save exam result {}: {:?}", result.id, e);
                return Err(e);
            }
            self.unsaved_exams.remove(0);
        }
        Ok(())
    }
}
