// src/store/topics.rs

use std::collections::HashMap;

use chrono::{DateTime, Utc};

use crate::{models::progress::TopicProgressRecord, store::StoreWrite};

/// Per-topic answer counters for the dashboard.
#[derive(Debug, Default)]
pub struct TopicTracker {
    progress: HashMap<String, TopicProgressRecord>,
    journal: Vec<StoreWrite>,
}

impl TopicTracker {
    pub fn from_records(records: Vec<TopicProgressRecord>) -> Self {
        Self {
            progress: records
                .into_iter()
                .map(|r| (r.topic_id.clone(), r))
                .collect(),
            journal: Vec::new(),
        }
    }

    pub fn record_answer(&mut self, topic_id: &str, is_correct: bool) {
        self.record_answer_at(topic_id, is_correct, Utc::now());
    }

    pub fn record_answer_at(&mut self, topic_id: &str, is_correct: bool, now: DateTime<Utc>) {
        let record = self
            .progress
            .entry(topic_id.to_string())
            .or_insert_with(|| TopicProgressRecord {
                topic_id: topic_id.to_string(),
                total_answered: 0,
                correct_count: 0,
                last_practice_at: now,
            });

        record.total_answered += 1;
        if is_correct {
            record.correct_count += 1;
        }
        record.last_practice_at = now;

        self.journal.push(StoreWrite::UpsertTopic(record.clone()));
    }

    pub fn topic_progress(&self, topic_id: &str) -> Option<&TopicProgressRecord> {
        self.progress.get(topic_id)
    }

    /// All records, ordered by topic id.
    pub fn all(&self) -> Vec<&TopicProgressRecord> {
        let mut records: Vec<&TopicProgressRecord> = self.progress.values().collect();
        records.sort_by(|a, b| a.topic_id.cmp(&b.topic_id));
        records
    }

    pub fn reset_topic_progress(&mut self, topic_id: &str) {
        if self.progress.remove(topic_id).is_some() {
            self.journal.push(StoreWrite::DeleteTopic(topic_id.to_string()));
        }
    }

    pub fn reset_all_progress(&mut self) {
        if !self.progress.is_empty() {
            self.progress.clear();
            self.journal.push(StoreWrite::ClearTopics);
        }
    }

    pub(crate) fn take_writes(&mut self) -> Vec<StoreWrite> {
        std::mem::take(&mut self.journal)
    }

    pub(crate) fn has_writes(&self) -> bool {
        !self.journal.is_empty()
    }
}
