// src/models/submission.rs

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{
    answer::AnswerSet,
    question::{GradedQuestion, OptionKey},
};

pub const DEFAULT_SUBMIT_MESSAGE: &str = "Test Submitted!";

/// Response of `POST /api/tests/{id}/submit`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmitReceipt {
    #[serde(default)]
    pub message: Option<String>,
}

impl SubmitReceipt {
    pub fn message_or_default(&self) -> &str {
        match self.message.as_deref() {
            Some(msg) if !msg.trim().is_empty() => msg,
            _ => DEFAULT_SUBMIT_MESSAGE,
        }
    }
}

/// Test definition embedded in a graded result.
#[derive(Debug, Clone, Deserialize)]
pub struct GradedTest {
    #[serde(default)]
    pub title: String,
    pub questions: Vec<GradedQuestion>,
}

/// Response of `GET /api/tests/{id}/result`. Computed entirely by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub test: GradedTest,
    pub score: f64,
    pub total_marks: f64,
    #[serde(default)]
    pub answers: AnswerSet,
    #[serde(default)]
    pub submitted_at: Option<DateTime<Utc>>,
}

/// One row of the detailed review shown under the score.
#[derive(Debug, Clone, PartialEq)]
pub struct QuestionReview {
    pub index: usize,
    pub selected: Option<OptionKey>,
    pub correct: Option<OptionKey>,
    pub is_correct: bool,
}

impl SubmissionResult {
    /// Pairs every question with the echoed answer.
    /// Unanswered questions are never correct.
    pub fn review(&self) -> Vec<QuestionReview> {
        self.test
            .questions
            .iter()
            .enumerate()
            .map(|(index, q)| {
                let selected = self.answers.get(index);
                QuestionReview {
                    index,
                    selected,
                    correct: q.correct_option,
                    is_correct: selected.is_some() && selected == q.correct_option,
                }
            })
            .collect()
    }

    pub fn correct_count(&self) -> usize {
        self.review().iter().filter(|r| r.is_correct).count()
    }
}
