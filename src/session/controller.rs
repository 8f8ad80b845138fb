// src/session/controller.rs

use crate::{
    error::{ApiError, SessionError},
    models::{
        answer::AnswerSet,
        question::OptionKey,
        submission::SubmitReceipt,
        test::{Test, TestId, TestPayload},
    },
    session::clock::{SessionClock, TickResult},
};

/// Why a submission was started.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitTrigger {
    Manual,
    Expired,
}

/// Lifecycle of a loaded session. `Loading` happens before an
/// `ExamSession` exists, see [`ExamSession::from_load`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Phase {
    Active,
    Submitting(SubmitTrigger),
    /// The submit request failed. The clock stays stopped and the answers
    /// are kept; only an explicit submit leaves this phase.
    SubmitFailed { reason: String },
    Submitted,
}

/// Terminal result of a session. The caller decides how to navigate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// No token, or the backend rejected it. Go to login.
    Unauthenticated,
    /// The student already took this test. Show its results.
    AlreadyCompleted(TestId),
    /// The test definition cannot start a countdown.
    MalformedData(String),
    /// Transport failure, or an unexpected status while loading.
    NetworkError(String),
    Submitted { test_id: TestId, message: String },
    /// The student left before the session ended.
    Abandoned,
}

impl Outcome {
    /// Classifies a failed `GET /api/tests/{id}`.
    pub fn from_load_error(test_id: &TestId, err: ApiError) -> Self {
        match err {
            ApiError::Unauthorized => Outcome::Unauthenticated,
            ApiError::Forbidden => Outcome::AlreadyCompleted(test_id.clone()),
            ApiError::Decode(msg) => Outcome::MalformedData(msg),
            ApiError::InvalidTestId(e) => Outcome::MalformedData(e.to_string()),
            ApiError::Network(e) => Outcome::NetworkError(e.to_string()),
            ApiError::Status { status, .. } => {
                Outcome::NetworkError(format!("Failed to load test ({})", status))
            }
        }
    }
}

/// State machine for one timed attempt at a test.
///
/// Owns the test snapshot, the answers and the clock. Performs no I/O;
/// the runner feeds it events and executes the submissions it asks for.
#[derive(Debug)]
pub struct ExamSession {
    test: Test,
    answers: AnswerSet,
    clock: SessionClock,
    phase: Phase,
}

impl ExamSession {
    /// Starts an active session with a full clock and no answers.
    pub fn start(test: Test) -> Self {
        let clock = SessionClock::new(test.duration_secs());
        Self {
            test,
            answers: AnswerSet::new(),
            clock,
            phase: Phase::Active,
        }
    }

    /// Resolves the load step. Anything other than a usable test ends the
    /// session before a clock exists.
    pub fn from_load(
        requested: &TestId,
        loaded: Result<TestPayload, ApiError>,
    ) -> Result<Self, Outcome> {
        let payload = loaded.map_err(|e| Outcome::from_load_error(requested, e))?;
        let test = payload
            .into_test(requested)
            .map_err(|e| Outcome::MalformedData(e.to_string()))?;
        Ok(Self::start(test))
    }

    pub fn test(&self) -> &Test {
        &self.test
    }

    pub fn answers(&self) -> &AnswerSet {
        &self.answers
    }

    pub fn remaining_secs(&self) -> u64 {
        self.clock.remaining()
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase == Phase::Active
    }

    /// Records an answer. Returns the answer it replaced, if any.
    pub fn select_option(
        &mut self,
        index: usize,
        key: OptionKey,
    ) -> Result<Option<OptionKey>, SessionError> {
        if !self.is_active() {
            return Err(SessionError::NotActive);
        }

        let question = self
            .test
            .questions
            .get(index)
            .ok_or(SessionError::UnknownQuestion {
                index,
                count: self.test.question_count(),
            })?;

        if !question.has_option(key) {
            return Err(SessionError::UnknownOption {
                index,
                key: key.as_char(),
            });
        }

        Ok(self.answers.select(index, key))
    }

    /// Advances the clock by one second. Returns `Some(Expired)` exactly
    /// once, on the tick that reaches zero.
    pub fn tick(&mut self) -> Option<SubmitTrigger> {
        if !self.is_active() {
            return None;
        }

        match self.clock.tick() {
            TickResult::Running(_) => None,
            TickResult::Expired | TickResult::Idle => {
                self.phase = Phase::Submitting(SubmitTrigger::Expired);
                Some(SubmitTrigger::Expired)
            }
        }
    }

    /// User-requested submit. Valid while active or after a failed attempt.
    pub fn submit(&mut self) -> Option<SubmitTrigger> {
        match self.phase {
            Phase::Active | Phase::SubmitFailed { .. } => {
                self.phase = Phase::Submitting(SubmitTrigger::Manual);
                Some(SubmitTrigger::Manual)
            }
            Phase::Submitting(_) | Phase::Submitted => None,
        }
    }

    /// Applies the response of the submit request.
    ///
    /// Returns the terminal outcome, or `None` when the failure leaves the
    /// session waiting for the user to retry.
    pub fn finish_submission(&mut self, result: Result<SubmitReceipt, ApiError>) -> Option<Outcome> {
        if !matches!(self.phase, Phase::Submitting(_)) {
            return None;
        }

        match result {
            Ok(receipt) => {
                self.phase = Phase::Submitted;
                Some(Outcome::Submitted {
                    test_id: self.test.id.clone(),
                    message: receipt.message_or_default().to_string(),
                })
            }
            // The backend refuses a second submission with 403.
            Err(ApiError::Forbidden) => {
                self.phase = Phase::Submitted;
                Some(Outcome::AlreadyCompleted(self.test.id.clone()))
            }
            // Retrying with the same rejected token can never succeed.
            Err(ApiError::Unauthorized) => {
                self.phase = Phase::Submitted;
                Some(Outcome::Unauthenticated)
            }
            Err(e) => {
                self.phase = Phase::SubmitFailed {
                    reason: e.to_string(),
                };
                None
            }
        }
    }
}
