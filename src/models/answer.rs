// src/models/answer.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::question::OptionKey;

/// The student's selections, keyed by 0-based question index.
///
/// At most one entry per question; unanswered questions are absent.
/// Serializes as a JSON object keyed by the decimal index: `{"0": "a"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnswerSet(BTreeMap<usize, OptionKey>);

impl AnswerSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a selection, replacing any earlier one for the same question.
    /// Returns the replaced key.
    pub fn select(&mut self, index: usize, key: OptionKey) -> Option<OptionKey> {
        self.0.insert(index, key)
    }

    pub fn get(&self, index: usize) -> Option<OptionKey> {
        self.0.get(&index).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, OptionKey)> + '_ {
        self.0.iter().map(|(i, k)| (*i, *k))
    }
}

/// Body of `POST /api/tests/{id}/submit`.
#[derive(Debug, Serialize)]
pub struct SubmitRequest<'a> {
    pub answers: &'a AnswerSet,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_last_write_wins() {
        let mut answers = AnswerSet::new();
        assert_eq!(answers.select(1, OptionKey::B), None);
        assert_eq!(answers.select(1, OptionKey::C), Some(OptionKey::B));

        assert_eq!(answers.get(1), Some(OptionKey::C));
        assert_eq!(answers.len(), 1);
    }

    #[test]
    fn test_submit_body_shape() {
        let mut answers = AnswerSet::new();
        answers.select(0, OptionKey::A);
        answers.select(2, OptionKey::D);

        let body = serde_json::to_value(SubmitRequest { answers: &answers }).unwrap();
        assert_eq!(body, json!({ "answers": { "0": "a", "2": "d" } }));
    }

    #[test]
    fn test_empty_submit_body() {
        let answers = AnswerSet::new();
        let body = serde_json::to_value(SubmitRequest { answers: &answers }).unwrap();
        assert_eq!(body, json!({ "answers": {} }));
    }

    #[test]
    fn test_echoed_answers_parse() {
        let answers: AnswerSet = serde_json::from_value(json!({ "1": "b", "0": "a" })).unwrap();
        assert_eq!(answers.iter().collect::<Vec<_>>(), vec![(0, OptionKey::A), (1, OptionKey::B)]);
    }
}
