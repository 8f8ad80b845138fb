// src/session/runner.rs

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;

use crate::{
    api::AssessmentApi,
    error::SessionError,
    models::{
        answer::AnswerSet,
        question::OptionKey,
        test::{Test, TestId},
    },
    session::{
        controller::{ExamSession, Outcome, Phase, SubmitTrigger},
        timer::Ticker,
    },
    state::SessionContext,
};

/// Input from the student.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    Select { index: usize, key: OptionKey },
    Submit,
    /// Navigate away. Ends the session without submitting.
    Leave,
}

/// What the shell should render as the session progresses.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionUpdate {
    Started { test: Test, remaining_secs: u64 },
    ClockChanged { remaining_secs: u64 },
    AnswerRecorded { index: usize, key: OptionKey },
    SelectionRejected(SessionError),
    Submitting { trigger: SubmitTrigger, answers: AnswerSet },
    /// The submission did not go through. The answers are kept and a new
    /// `Submit` command retries.
    SubmitFailed { reason: String },
}

/// Drives one `ExamSession` against the backend.
///
/// Load, countdown and submission all happen on the task that awaits
/// `run`; the only other task is the `Ticker`, which lives exactly as long
/// as the session is active.
pub struct SessionRunner<A: AssessmentApi + ?Sized> {
    api: Arc<A>,
    context: SessionContext,
    tick_interval: Duration,
}

impl<A: AssessmentApi + ?Sized> SessionRunner<A> {
    pub fn new(api: Arc<A>, context: SessionContext, tick_interval: Duration) -> Self {
        Self {
            api,
            context,
            tick_interval,
        }
    }

    pub async fn run(
        &self,
        test_id: &TestId,
        mut commands: mpsc::Receiver<SessionCommand>,
        updates: mpsc::UnboundedSender<SessionUpdate>,
    ) -> Outcome {
        let Some(token) = self.context.token() else {
            tracing::info!("No session token, test {} not loaded", test_id);
            return Outcome::Unauthenticated;
        };

        tracing::info!("Loading test {}", test_id);
        let loaded = self.api.fetch_test(token, test_id).await;

        // The load is fully resolved before any timer exists.
        let mut session = match ExamSession::from_load(test_id, loaded) {
            Ok(session) => session,
            Err(outcome) => {
                log_load_outcome(test_id, &outcome);
                return outcome;
            }
        };

        tracing::info!(
            questions = session.test().question_count(),
            seconds = session.remaining_secs(),
            "Test {} started",
            test_id
        );
        notify(
            &updates,
            SessionUpdate::Started {
                test: session.test().clone(),
                remaining_secs: session.remaining_secs(),
            },
        );

        let (ticker, mut ticks) = Ticker::start(self.tick_interval);
        let mut ticker = Some(ticker);

        loop {
            let trigger = tokio::select! {
                // Ticks first: queued commands must not delay the deadline.
                biased;

                Some(()) = ticks.recv(), if ticker.is_some() => {
                    let trigger = session.tick();
                    notify(
                        &updates,
                        SessionUpdate::ClockChanged { remaining_secs: session.remaining_secs() },
                    );
                    trigger
                }

                command = commands.recv() => match command {
                    Some(SessionCommand::Select { index, key }) => {
                        match session.select_option(index, key) {
                            Ok(_) => notify(&updates, SessionUpdate::AnswerRecorded { index, key }),
                            Err(e) => {
                                tracing::debug!("Selection rejected: {}", e);
                                notify(&updates, SessionUpdate::SelectionRejected(e));
                            }
                        }
                        None
                    }
                    Some(SessionCommand::Submit) => session.submit(),
                    Some(SessionCommand::Leave) | None => {
                        tracing::info!("Left test {} without submitting", test_id);
                        return Outcome::Abandoned;
                    }
                },
            };

            let Some(trigger) = trigger else {
                continue;
            };

            // Submitting stops the clock for the rest of the session.
            ticker.take();

            tracing::info!(
                ?trigger,
                answered = session.answers().len(),
                remaining = session.remaining_secs(),
                "Submitting test {}",
                test_id
            );
            notify(
                &updates,
                SessionUpdate::Submitting {
                    trigger,
                    answers: session.answers().clone(),
                },
            );

            let result = self
                .api
                .submit_answers(token, &session.test().id, session.answers())
                .await;

            if let Some(outcome) = session.finish_submission(result) {
                tracing::info!("Test {} finished: {:?}", test_id, outcome);
                return outcome;
            }

            if let Phase::SubmitFailed { reason } = session.phase() {
                tracing::warn!("Submission of test {} failed: {}", test_id, reason);
                notify(
                    &updates,
                    SessionUpdate::SubmitFailed {
                        reason: reason.clone(),
                    },
                );
            }
        }
    }
}

fn notify(updates: &mpsc::UnboundedSender<SessionUpdate>, update: SessionUpdate) {
    // A closed channel only means nobody is rendering.
    let _ = updates.send(update);
}

fn log_load_outcome(test_id: &TestId, outcome: &Outcome) {
    match outcome {
        Outcome::AlreadyCompleted(_) => {
            tracing::info!("Test {} already completed, redirecting to results", test_id)
        }
        Outcome::Unauthenticated => tracing::warn!("Token rejected while loading test {}", test_id),
        other => tracing::error!("Failed to load test {}: {:?}", test_id, other),
    }
}
