// src/store/mistakes.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{
    models::{
        progress::{BookmarkRecord, MistakeRecord},
        question::Question,
    },
    store::StoreWrite,
};

/// Anything that wants to hear about wrong answers.
///
/// The quiz and exam engines report through this, so they can be driven against
/// the real store or a recording double.
pub trait MistakeSink {
    fn add_mistake(&mut self, question: &Question, topic_id: &str);
}

/// Wrong-answer counters and bookmarks, both keyed by question id.
///
/// The two maps are independent: a question may be a mistake, a bookmark, both or neither.
#[derive(Debug, Default)]
pub struct MistakeBook {
    mistakes: HashMap<String, MistakeRecord>,
    bookmarks: HashMap<String, BookmarkRecord>,
    journal: Vec<StoreWrite>,
}

impl MistakeBook {
    pub fn from_records(mistakes: Vec<MistakeRecord>, bookmarks: Vec<BookmarkRecord>) -> Self {
        Self {
            mistakes: mistakes
                .into_iter()
                .map(|m| (m.question_id.clone(), m))
                .collect(),
            bookmarks: bookmarks
                .into_iter()
                .map(|b| (b.question_id.clone(), b))
                .collect(),
            journal: Vec::new(),
        }
    }

    /// Records one wrong answer to `question`.
    ///
    /// Creates the record with count 1, or bumps the count of the existing one.
    /// The embedded snapshot is always replaced by `question`.
    pub fn add_mistake(&mut self, question: &Question, topic_id: &str) {
        self.add_mistake_at(question, topic_id, Utc::now());
    }

    pub fn add_mistake_at(&mut self, question: &Question, topic_id: &str, now: DateTime<Utc>) {
        let count = self
            .mistakes
            .get(&question.id)
            .map_or(1, |existing| existing.count.saturating_add(1));

        let record = MistakeRecord {
            question_id: question.id.clone(),
            question: question.clone(),
            topic_id: topic_id.to_string(),
            count,
            last_wrong_at: now,
        };
        self.journal.push(StoreWrite::UpsertMistake(record.clone()));
        self.mistakes.insert(question.id.clone(), record);
    }

    /// Forgets a mistake ("mastered"). Absent ids are ignored.
    pub fn remove_mistake(&mut self, question_id: &str) {
        if self.mistakes.remove(question_id).is_some() {
            self.journal
                .push(StoreWrite::DeleteMistake(question_id.to_string()));
        }
    }

    /// Flips the bookmark on `question`. Returns whether it is bookmarked afterwards.
    pub fn toggle_bookmark(&mut self, question: &Question, topic_id: &str) -> bool {
        self.toggle_bookmark_at(question, topic_id, Utc::now())
    }

    pub fn toggle_bookmark_at(
        &mut self,
        question: &Question,
        topic_id: &str,
        now: DateTime<Utc>,
    ) -> bool {
        if self.bookmarks.remove(&question.id).is_some() {
            self.journal
                .push(StoreWrite::DeleteBookmark(question.id.clone()));
            return false;
        }

        let record = BookmarkRecord {
            question_id: question.id.clone(),
            question: question.clone(),
            topic_id: topic_id.to_string(),
            added_at: now,
        };
        self.journal.push(StoreWrite::UpsertBookmark(record.clone()));
        self.bookmarks.insert(question.id.clone(), record);
        true
    }

    pub fn is_bookmarked(&self, question_id: &str) -> bool {
        self.bookmarks.contains_key(question_id)
    }

    pub fn is_mistake(&self, question_id: &str) -> bool {
        self.mistakes.contains_key(question_id)
    }

    pub fn clear_all_mistakes(&mut self) {
        if !self.mistakes.is_empty() {
            self.mistakes.clear();
            self.journal.push(StoreWrite::ClearMistakes);
        }
    }

    pub fn clear_all_bookmarks(&mut self) {
        if !self.bookmarks.is_empty() {
            self.bookmarks.clear();
            self.journal.push(StoreWrite::ClearBookmarks);
        }
    }

    pub fn mistake(&self, question_id: &str) -> Option<&MistakeRecord> {
        self.mistakes.get(question_id)
    }

    pub fn mistake_count(&self) -> usize {
        self.mistakes.len()
    }

    pub fn bookmark_count(&self) -> usize {
        self.bookmarks.len()
    }

    /// Most-missed first, then most recently missed.
    pub fn mistakes_sorted(&self) -> Vec<MistakeRecord> {
        let mut records: Vec<MistakeRecord> = self.mistakes.values().cloned().collect();
        records.sort_by(|a, b| {
            b.count
                .cmp(&a.count)
                .then_with(|| b.last_wrong_at.cmp(&a.last_wrong_at))
                .then_with(|| a.question_id.cmp(&b.question_id))
        });
        records
    }

    /// Newest bookmark first.
    pub fn bookmarks_sorted(&self) -> Vec<BookmarkRecord> {
        let mut records: Vec<BookmarkRecord> = self.bookmarks.values().cloned().collect();
        records.sort_by(|a, b| {
            b.added_at
                .cmp(&a.added_at)
                .then_with(|| a.question_id.cmp(&b.question_id))
        });
        records
    }

    pub(crate) fn take_writes(&mut self) -> Vec<StoreWrite> {
        std::mem::take(&mut self.journal)
    }

    pub(crate) fn has_writes(&self) -> bool {
        !self.journal.is_empty()
    }
}

impl MistakeSink for MistakeBook {
    fn add_mistake(&mut self, question: &Question, topic_id: &str) {
        MistakeBook::add_mistake(self, question, topic_id);
    }
}
