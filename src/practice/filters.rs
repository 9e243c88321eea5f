// src/practice/filters.rs

//! Pure selection and ordering over a snapshot of mistake records.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::{
    config::{MAX_SPRINT_WEIGHT, SITUATION_TOPIC_ID},
    models::progress::MistakeRecord,
    utils::random::{RandomSource, shuffled},
};

/// Which family a question belongs to, decided by its topic tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuestionKind {
    Choice,
    Situation,
}

/// Kind filter: one family, or both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum KindFilter {
    #[default]
    All,
    Choice,
    Situation,
}

impl KindFilter {
    pub fn matches(self, kind: QuestionKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Choice => kind == QuestionKind::Choice,
            KindFilter::Situation => kind == QuestionKind::Situation,
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "all" => Some(KindFilter::All),
            "choice" => Some(KindFilter::Choice),
            "situation" => Some(KindFilter::Situation),
            _ => None,
        }
    }
}

/// How a practice queue is ordered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PracticeMode {
    /// Every record once, shuffled.
    #[default]
    Review,
    /// Records repeated by how often they were missed, then shuffled.
    Sprint,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MistakeFilterOptions {
    pub kind: KindFilter,
    /// `None` keeps every topic.
    pub topic_id: Option<String>,
    pub min_wrong_count: u32,
}

impl Default for MistakeFilterOptions {
    fn default() -> Self {
        Self {
            kind: KindFilter::All,
            topic_id: None,
            min_wrong_count: 1,
        }
    }
}

impl MistakeFilterOptions {
    /// Drops a topic filter that the kind filter would exclude anyway.
    pub fn normalized(mut self) -> Self {
        if let Some(topic) = &self.topic_id {
            if !is_topic_allowed_in_kind(topic, self.kind) {
                self.topic_id = None;
            }
        }
        self
    }
}

pub fn is_situation_topic(topic_id: &str) -> bool {
    topic_id == SITUATION_TOPIC_ID
}

pub fn get_question_kind(topic_id: &str) -> QuestionKind {
    if is_situation_topic(topic_id) {
        QuestionKind::Situation
    } else {
        QuestionKind::Choice
    }
}

pub fn is_topic_allowed_in_kind(topic_id: &str, kind: KindFilter) -> bool {
    kind.matches(get_question_kind(topic_id))
}

/// Keeps the records passing every criterion, in input order.
pub fn filter_mistakes(records: &[MistakeRecord], options: &MistakeFilterOptions) -> Vec<MistakeRecord> {
    records
        .iter()
        .filter(|record| record.count >= options.min_wrong_count)
        .filter(|record| options.kind.matches(get_question_kind(&record.topic_id)))
        .filter(|record| {
            options
                .topic_id
                .as_deref()
                .is_none_or(|topic| record.topic_id == topic)
        })
        .cloned()
        .collect()
}

/// Distinct topic ids of the given records that pass `kind`, first-seen order.
pub fn topic_options(records: &[MistakeRecord], kind: KindFilter) -> Vec<String> {
    let mut seen = HashSet::new();
    records
        .iter()
        .map(|record| record.topic_id.as_str())
        .filter(|topic| is_topic_allowed_in_kind(topic, kind))
        .filter(|topic| seen.insert(*topic))
        .map(str::to_string)
        .collect()
}

/// Distinct subject-matter topics among the records. Never contains the situation tag.
pub fn get_available_choice_topics(records: &[MistakeRecord]) -> Vec<String> {
    topic_options(records, KindFilter::Choice)
}

/// How many copies of a record a sprint queue holds.
pub fn sprint_weight(count: u32) -> usize {
    count.clamp(1, MAX_SPRINT_WEIGHT) as usize
}

pub fn build_practice_queue<R>(records: &[MistakeRecord], mode: PracticeMode, rng: &mut R) -> Vec<MistakeRecord>
where
    R: RandomSource + ?Sized,
{
    match mode {
        PracticeMode::Review => shuffled(records, rng),
        PracticeMode::Sprint => {
            let weighted: Vec<MistakeRecord> = records
                .iter()
                .flat_map(|record| std::iter::repeat_n(record, sprint_weight(record.count)))
                .cloned()
                .collect();
            shuffled(&weighted, rng)
        }
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use chrono::{TimeZone, Utc};

    use crate::models::{progress::MistakeRecord, question::fixtures::question};

    pub fn record(id: &str, topic_id: &str, count: u32) -> MistakeRecord {
        MistakeRecord {
            question_id: id.to_string(),
            question: question(id),
            topic_id: topic_id.to_string(),
            count,
            last_wrong_at: Utc.timestamp_opt(100, 0).unwrap(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::fixtures::record;
    use super::*;

    fn ids(records: &[MistakeRecord]) -> Vec<&str> {
        records.iter().map(|r| r.question_id.as_str()).collect()
    }

    fn occurrences(records: &[MistakeRecord]) -> HashMap<String, usize> {
        let mut counts = HashMap::new();
        for r in records {
            *counts.entry(r.question_id.clone()).or_insert(0) += 1;
        }
        counts
    }

    #[test]
    fn test_question_kind_by_topic() {
        assert_eq!(get_question_kind("situation"), QuestionKind::Situation);
        assert_eq!(get_question_kind("history"), QuestionKind::Choice);
    }

    #[test]
    fn test_filter_by_kind_and_min_count() {
        let records = vec![
            record("q1", "history", 3),
            record("q2", "situation", 2),
            record("q3", "values", 1),
        ];
        let options = MistakeFilterOptions {
            kind: KindFilter::Choice,
            min_wrong_count: 2,
            ..Default::default()
        };
        assert_eq!(ids(&filter_mistakes(&records, &options)), vec!["q1"]);
    }

    #[test]
    fn test_filter_min_count_holds_for_every_threshold() {
        let records: Vec<MistakeRecord> = (1..=7)
            .map(|n| record(&format!("q{}", n), "history", n))
            .collect();
        for n in 0..=8 {
            let options = MistakeFilterOptions {
                min_wrong_count: n,
                ..Default::default()
            };
            let kept = filter_mistakes(&records, &options);
            assert!(kept.iter().all(|r| r.count >= n));
            assert_eq!(kept.len(), records.iter().filter(|r| r.count >= n).count());
        }
    }

    #[test]
    fn test_filter_by_topic_preserves_order() {
        let records = vec![
            record("q1", "history", 1),
            record("q2", "values", 1),
            record("q3", "history", 4),
        ];
        let options = MistakeFilterOptions {
            topic_id: Some("history".to_string()),
            ..Default::default()
        };
        assert_eq!(ids(&filter_mistakes(&records, &options)), vec!["q1", "q3"]);
        assert_eq!(
            filter_mistakes(&records, &MistakeFilterOptions::default()),
            records
        );
    }

    #[test]
    fn test_choice_topics_are_distinct_and_exclude_situation() {
        let records = vec![
            record("q1", "history", 1),
            record("q2", "history", 1),
            record("q3", "situation", 1),
            record("q4", "values", 1),
        ];
        assert_eq!(get_available_choice_topics(&records), vec!["history", "values"]);
        assert_eq!(topic_options(&records, KindFilter::Situation), vec!["situation"]);
        assert_eq!(
            topic_options(&records, KindFilter::All),
            vec!["history", "situation", "values"]
        );
    }

    #[test]
    fn test_normalized_drops_incompatible_topic() {
        let options = MistakeFilterOptions {
            kind: KindFilter::Situation,
            topic_id: Some("history".to_string()),
            min_wrong_count: 2,
        }
        .normalized();
        assert_eq!(options.topic_id, None);
        assert_eq!(options.min_wrong_count, 2);
    }

    #[test]
    fn test_review_queue_is_a_permutation() {
        let records = vec![
            record("q1", "history", 2),
            record("q2", "values", 4),
            record("q3", "situation", 2),
        ];
        let queue = build_practice_queue(&records, PracticeMode::Review, &mut || 0.3);
        assert_eq!(queue.len(), 3);
        let counts = occurrences(&queue);
        assert!(counts.values().all(|&n| n == 1));
        assert_eq!(counts.len(), 3);
    }

    #[test]
    fn test_sprint_queue_weights_by_count() {
        let records = vec![
            record("q1", "history", 1),
            record("q2", "values", 3),
            record("q3", "rights", 10),
        ];
        let queue = build_practice_queue(&records, PracticeMode::Sprint, &mut || 0.5);
        let counts = occurrences(&queue);

        assert_eq!(queue.len(), 1 + 3 + 5);
        assert_eq!(counts["q1"], 1);
        assert_eq!(counts["q2"], 3);
        assert_eq!(counts["q3"], 5);
    }

    #[test]
    fn test_queue_is_deterministic_for_fixed_source() {
        let records = vec![
            record("q1", "history", 2),
            record("q2", "values", 1),
            record("q3", "rights", 3),
        ];
        let a = build_practice_queue(&records, PracticeMode::Sprint, &mut || 0.25);
        let b = build_practice_queue(&records, PracticeMode::Sprint, &mut || 0.25);
        assert_eq!(ids(&a), ids(&b));
    }

    #[test]
    fn test_sprint_weight_clamps() {
        assert_eq!(sprint_weight(0), 1);
        assert_eq!(sprint_weight(1), 1);
        assert_eq!(sprint_weight(5), 5);
        assert_eq!(sprint_weight(42), 5);
    }
}
