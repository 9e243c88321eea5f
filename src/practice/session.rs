// src/practice/session.rs

use crate::{
    models::progress::MistakeRecord,
    practice::filters::{MistakeFilterOptions, PracticeMode, build_practice_queue, filter_mistakes},
    store::MistakeBook,
    utils::{percentage, random::RandomSource},
};

/// A drill over the learner's mistakes.
///
/// The queue is the shuffled base built from the filtered records, followed by a
/// replay tail: in sprint mode every wrong answer sends the card to the back again.
/// Moving past the end wraps around to the start.
#[derive(Debug, Clone)]
pub struct PracticeSession {
    options: MistakeFilterOptions,
    mode: PracticeMode,
    records: Vec<MistakeRecord>,
    base: Vec<MistakeRecord>,
    replay: Vec<String>,
    index: usize,
    selected: Option<String>,
    answered: u32,
    correct: u32,
}

impl PracticeSession {
    /// `records` is expected in display order (see `MistakeBook::mistakes_sorted`).
    pub fn new<R>(
        records: &[MistakeRecord],
        options: MistakeFilterOptions,
        mode: PracticeMode,
        rng: &mut R,
    ) -> Self
    where
        R: RandomSource + ?Sized,
    {
        let options = options.normalized();
        let records = filter_mistakes(records, &options);
        let base = build_practice_queue(&records, mode, rng);
        Self {
            options,
            mode,
            records,
            base,
            replay: Vec::new(),
            index: 0,
            selected: None,
            answered: 0,
            correct: 0,
        }
    }

    pub fn options(&self) -> &MistakeFilterOptions {
        &self.options
    }

    pub fn mode(&self) -> PracticeMode {
        self.mode
    }

    /// Records that passed the filters.
    pub fn records(&self) -> &[MistakeRecord] {
        &self.records
    }

    pub fn queue(&self) -> Vec<&MistakeRecord> {
        self.base
            .iter()
            .chain(
                self.replay
                    .iter()
                    .filter_map(|id| self.records.iter().find(|r| &r.question_id == id)),
            )
            .collect()
    }

    pub fn queue_len(&self) -> usize {
        self.queue().len()
    }

    /// Position inside the queue, already wrapped.
    pub fn position(&self) -> usize {
        match self.queue_len() {
            0 => 0,
            len => self.index % len,
        }
    }

    pub fn current(&self) -> Option<&MistakeRecord> {
        if self.records.is_empty() {
            return None;
        }
        self.queue().get(self.position()).copied()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    /// Answers the current card. Returns whether the choice was correct, or
    /// `None` when there is no card or it was already answered.
    pub fn select_choice(&mut self, choice_id: &str) -> Option<bool> {
        if self.selected.is_some() {
            return None;
        }
        let record = self.current()?;
        let is_correct = record.question.is_correct(choice_id);
        let question_id = record.question_id.clone();

        self.selected = Some(choice_id.to_string());
        self.answered += 1;
        if is_correct {
            self.correct += 1;
        } else if self.mode == PracticeMode::Sprint {
            self.replay.push(question_id);
        }
        Some(is_correct)
    }

    pub fn next(&mut self) {
        let len = self.queue_len();
        if len == 0 {
            return;
        }
        self.index = (self.position() + 1) % len;
        self.selected = None;
    }

    /// Re-reads the learner's mistakes (in display order).
    ///
    /// When the filtered records changed, the base queue is rebuilt and any
    /// selection is dropped; replayed cards whose record is gone are skipped.
    /// Returns whether anything changed.
    pub fn sync<R>(&mut self, live: &[MistakeRecord], rng: &mut R) -> bool
    where
        R: RandomSource + ?Sized,
    {
        let records = filter_mistakes(live, &self.options);
        if records == self.records {
            return false;
        }
        self.records = records;
        self.base = build_practice_queue(&self.records, self.mode, rng);
        self.selected = None;
        true
    }

    /// Removes the current card's mistake from `book`, then re-syncs against it.
    /// Returns the removed question id.
    pub fn mark_mastered<R>(&mut self, book: &mut MistakeBook, rng: &mut R) -> Option<String>
    where
        R: RandomSource + ?Sized,
    {
        let question_id = self.current()?.question_id.clone();
        book.remove_mistake(&question_id);

        self.replay.retain(|id| id != &question_id);
        self.sync(&book.mistakes_sorted(), rng);
        self.index = 0;
        self.selected = None;
        Some(question_id)
    }

    /// Draws a new order for the base queue and goes back to its first card.
    /// The replay tail and the session counters carry over.
    pub fn reshuffle<R>(&mut self, rng: &mut R)
    where
        R: RandomSource + ?Sized,
    {
        self.base = build_practice_queue(&self.records, self.mode, rng);
        self.index = 0;
        self.selected = None;
    }

    pub fn answered(&self) -> u32 {
        self.answered
    }

    pub fn correct(&self) -> u32 {
        self.correct
    }

    pub fn accuracy(&self) -> u32 {
        percentage(self.correct, self.answered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::question::fixtures::question;
    use crate::practice::filters::{KindFilter, fixtures::record};

    // 0.999 keeps the Fisher–Yates order unchanged, so queues read in input order.
    fn identity() -> impl FnMut() -> f64 {
        || 0.999
    }

    fn session(records: &[MistakeRecord], mode: PracticeMode) -> PracticeSession {
        PracticeSession::new(records, MistakeFilterOptions::default(), mode, &mut identity())
    }

    fn current_id(session: &PracticeSession) -> Option<&str> {
        session.current().map(|r| r.question_id.as_str())
    }

    #[test]
    fn test_empty_session_has_no_card() {
        let mut s = session(&[], PracticeMode::Review);
        assert!(s.current().is_none());
        assert_eq!(s.select_choice("c1"), None);
        s.next();
        assert_eq!(s.position(), 0);
    }

    #[test]
    fn test_answer_once_per_card_and_wrap() {
        let records = vec![record("q1", "history", 1), record("q2", "values", 1)];
        let mut s = session(&records, PracticeMode::Review);

        assert_eq!(current_id(&s), Some("q1"));
        assert_eq!(s.select_choice("c1"), Some(true));
        assert_eq!(s.select_choice("c2"), None);

        s.next();
        assert_eq!(current_id(&s), Some("q2"));
        assert_eq!(s.select_choice("c2"), Some(false));

        s.next();
        assert_eq!(current_id(&s), Some("q1"));
        assert_eq!(s.answered(), 2);
        assert_eq!(s.accuracy(), 50);
    }

    #[test]
    fn test_sprint_wrong_answer_replays_card() {
        let records = vec![record("q1", "history", 1), record("q2", "values", 1)];
        let mut s = session(&records, PracticeMode::Sprint);
        assert_eq!(s.queue_len(), 2);

        s.select_choice("c2");
        assert_eq!(s.queue_len(), 3);
        assert_eq!(s.queue().last().map(|r| r.question_id.as_str()), Some("q1"));
    }

    #[test]
    fn test_review_wrong_answer_does_not_replay() {
        let records = vec![record("q1", "history", 1)];
        let mut s = session(&records, PracticeMode::Review);
        s.select_choice("c2");
        assert_eq!(s.queue_len(), 1);
    }

    #[test]
    fn test_mark_mastered_removes_everywhere() {
        let mut book = MistakeBook::default();
        for id in ["q1", "q2"] {
            book.add_mistake(&question(id), "history");
        }
        let mut s = session(&book.mistakes_sorted(), PracticeMode::Sprint);
        let first = current_id(&s).map(str::to_string);
        s.select_choice("c2");
        assert_eq!(s.queue_len(), 3);

        let removed = s.mark_mastered(&mut book, &mut identity());
        assert_eq!(removed, first);
        let removed = removed.unwrap();
        assert!(!book.is_mistake(&removed));
        assert_eq!(book.mistake_count(), 1);
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.queue_len(), 1);
        assert_ne!(current_id(&s), Some(removed.as_str()));
        assert_eq!(s.selected(), None);
    }

    #[test]
    fn test_reshuffle_keeps_replay_and_counters() {
        let records = vec![record("q1", "history", 2)];
        let mut s = session(&records, PracticeMode::Sprint);
        s.select_choice("c2");
        s.next();
        s.select_choice("c1");
        assert_eq!(s.queue_len(), 3);

        s.reshuffle(&mut identity());
        assert_eq!(s.queue_len(), 3);
        assert_eq!(s.position(), 0);
        assert_eq!(s.selected(), None);
        assert_eq!(s.answered(), 2);
        assert_eq!(s.accuracy(), 50);
    }

    #[test]
    fn test_sync_follows_live_mistakes() {
        let records = vec![record("q1", "history", 1), record("q2", "values", 1)];
        let mut s = session(&records, PracticeMode::Review);
        s.select_choice("c2");

        // unchanged records keep the queue and the selection
        assert!(!s.sync(&records, &mut identity()));
        assert_eq!(s.selected(), Some("c2"));

        // a mistake deleted elsewhere leaves the drill
        let remaining = vec![record("q2", "values", 1)];
        assert!(s.sync(&remaining, &mut identity()));
        assert_eq!(s.records().len(), 1);
        assert_eq!(s.queue_len(), 1);
        assert_eq!(current_id(&s), Some("q2"));
        assert_eq!(s.selected(), None);

        // a new mistake joins it
        let grown = vec![record("q3", "rights", 2), record("q2", "values", 1)];
        assert!(s.sync(&grown, &mut identity()));
        assert_eq!(s.queue_len(), 2);
    }

    #[test]
    fn test_sync_drops_replay_of_removed_record() {
        let records = vec![record("q1", "history", 1), record("q2", "values", 1)];
        let mut s = session(&records, PracticeMode::Sprint);
        s.select_choice("c2");
        assert_eq!(s.queue_len(), 3);

        s.sync(&[record("q2", "values", 1)], &mut identity());
        assert_eq!(s.queue_len(), 1);
    }

    #[test]
    fn test_filters_apply_to_session() {
        let records = vec![
            record("q1", "history", 1),
            record("q2", "situation", 3),
        ];
        let options = MistakeFilterOptions {
            kind: KindFilter::Situation,
            ..Default::default()
        };
        let s = PracticeSession::new(&records, options, PracticeMode::Review, &mut identity());
        assert_eq!(s.records().len(), 1);
        assert_eq!(current_id(&s), Some("q2"));
    }
}
