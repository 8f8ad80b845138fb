// tests/session_tests.rs

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use exam_client::{
    AssessmentApi, Outcome, SessionCommand, SessionRunner, SessionUpdate,
    error::{ApiError, SessionError},
    models::{
        answer::AnswerSet,
        question::OptionKey,
        submission::{SubmissionResult, SubmitReceipt},
        test::{TestId, TestPayload},
    },
    session::SubmitTrigger,
    state::SessionContext,
    utils::token::SessionToken,
};
use reqwest::StatusCode;
use serde_json::json;
use tokio::{sync::mpsc, task::JoinHandle, time::Instant};

/// In-memory backend: serves one 1-minute, 2-question test and records
/// every submission. The first `failing_submits` submissions fail; with
/// `token_revoked` every submission is answered with 401.
struct FakeApi {
    submissions: Mutex<Vec<AnswerSet>>,
    failing_submits: Mutex<usize>,
    token_revoked: bool,
}

impl FakeApi {
    fn new(failing_submits: usize) -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            failing_submits: Mutex::new(failing_submits),
            token_revoked: false,
        })
    }

    fn revoking_on_submit() -> Arc<Self> {
        Arc::new(Self {
            submissions: Mutex::new(Vec::new()),
            failing_submits: Mutex::new(0),
            token_revoked: true,
        })
    }

    fn submissions(&self) -> Vec<AnswerSet> {
        self.submissions.lock().unwrap().clone()
    }
}

#[async_trait]
impl AssessmentApi for FakeApi {
    async fn fetch_test(
        &self,
        _token: &SessionToken,
        test_id: &TestId,
    ) -> Result<TestPayload, ApiError> {
        Ok(serde_json::from_value(json!({
            "_id": test_id.as_str(),
            "title": "Two Questions",
            "duration": 1,
            "questions": [
                { "questionText": "Q1", "options": { "a": "1", "b": "2", "c": "3", "d": "4" } },
                { "questionText": "Q2", "options": { "a": "1", "b": "2", "c": "3", "d": "4" } }
            ]
        }))?)
    }

    async fn submit_answers(
        &self,
        _token: &SessionToken,
        _test_id: &TestId,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ApiError> {
        self.submissions.lock().unwrap().push(answers.clone());

        if self.token_revoked {
            return Err(ApiError::Unauthorized);
        }

        let mut failing = self.failing_submits.lock().unwrap();
        if *failing > 0 {
            *failing -= 1;
            return Err(ApiError::Status {
                status: StatusCode::BAD_GATEWAY,
                body: "upstream unavailable".to_string(),
            });
        }
        Ok(SubmitReceipt {
            message: Some("Test submitted successfully".to_string()),
        })
    }

    async fn fetch_result(
        &self,
        _token: &SessionToken,
        _test_id: &TestId,
    ) -> Result<SubmissionResult, ApiError> {
        Err(ApiError::Decode("not served by the fake".to_string()))
    }
}

struct Harness {
    commands: mpsc::Sender<SessionCommand>,
    updates: mpsc::UnboundedReceiver<SessionUpdate>,
    session: JoinHandle<Outcome>,
}

fn start(api: Arc<FakeApi>) -> Harness {
    start_ticking(api, Duration::from_secs(1))
}

fn start_ticking(api: Arc<FakeApi>, tick_interval: Duration) -> Harness {
    let (commands, command_rx) = mpsc::channel(8);
    let (update_tx, updates) = mpsc::unbounded_channel();
    let runner = SessionRunner::new(
        api,
        SessionContext::new(SessionToken::new("token")),
        tick_interval,
    );

    let session = tokio::spawn(async move {
        runner
            .run(&TestId::new("t-1"), command_rx, update_tx)
            .await
    });

    Harness {
        commands,
        updates,
        session,
    }
}

fn drain_now(updates: &mut mpsc::UnboundedReceiver<SessionUpdate>) -> Vec<SessionUpdate> {
    let mut seen = Vec::new();
    while let Ok(update) = updates.try_recv() {
        seen.push(update);
    }
    seen
}

fn submitted() -> Outcome {
    Outcome::Submitted {
        test_id: TestId::new("t-1"),
        message: "Test submitted successfully".to_string(),
    }
}

#[tokio::test(start_paused = true)]
async fn expiry_submits_empty_answers_once() {
    let api = FakeApi::new(0);
    let started = Instant::now();
    let Harness {
        commands: _commands,
        mut updates,
        session,
    } = start(api.clone());

    let outcome = session.await.unwrap();

    assert_eq!(outcome, submitted());
    assert_eq!(api.submissions(), vec![AnswerSet::new()]);
    assert!(started.elapsed() >= Duration::from_secs(60));

    let updates = drain_now(&mut updates);
    let clock: Vec<u64> = updates
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::ClockChanged { remaining_secs } => Some(*remaining_secs),
            _ => None,
        })
        .collect();
    assert_eq!(clock.len(), 60);
    assert_eq!(clock.first(), Some(&59));
    assert_eq!(clock.last(), Some(&0));

    let triggers: Vec<SubmitTrigger> = updates
        .iter()
        .filter_map(|u| match u {
            SessionUpdate::Submitting { trigger, .. } => Some(*trigger),
            _ => None,
        })
        .collect();
    assert_eq!(triggers, vec![SubmitTrigger::Expired]);
}

#[tokio::test(start_paused = true)]
async fn manual_submit_at_two_seconds_left() {
    let api = FakeApi::new(0);
    let mut h = start(api.clone());

    h.commands
        .send(SessionCommand::Select {
            index: 0,
            key: OptionKey::A,
        })
        .await
        .unwrap();

    // 58 ticks elapse, clock 60 -> 2.
    tokio::time::sleep(Duration::from_millis(58_500)).await;
    h.commands.send(SessionCommand::Submit).await.unwrap();

    let outcome = h.session.await.unwrap();
    assert_eq!(outcome, submitted());

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0].get(0), Some(OptionKey::A));
    assert_eq!(submissions[0].get(1), None);

    let updates = drain_now(&mut h.updates);
    let last_clock = updates.iter().rev().find_map(|u| match u {
        SessionUpdate::ClockChanged { remaining_secs } => Some(*remaining_secs),
        _ => None,
    });
    assert_eq!(last_clock, Some(2));
    assert!(updates.iter().any(|u| matches!(
        u,
        SessionUpdate::Submitting {
            trigger: SubmitTrigger::Manual,
            ..
        }
    )));

    // Long after the deadline nothing else is submitted.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn failed_submit_keeps_answers_until_retry() {
    let api = FakeApi::new(1);
    let mut h = start(api.clone());

    h.commands
        .send(SessionCommand::Select {
            index: 1,
            key: OptionKey::D,
        })
        .await
        .unwrap();
    h.commands.send(SessionCommand::Submit).await.unwrap();

    // Wait for the failure to be reported.
    loop {
        match h.updates.recv().await {
            Some(SessionUpdate::SubmitFailed { reason }) => {
                assert!(reason.contains("502"));
                break;
            }
            Some(_) => continue,
            None => panic!("session ended before reporting the failure"),
        }
    }

    // No automatic retry and no clock while waiting.
    tokio::time::sleep(Duration::from_secs(90)).await;
    assert_eq!(api.submissions().len(), 1);
    assert!(
        drain_now(&mut h.updates)
            .iter()
            .all(|u| !matches!(u, SessionUpdate::ClockChanged { .. }))
    );

    // Answers are frozen.
    h.commands
        .send(SessionCommand::Select {
            index: 0,
            key: OptionKey::A,
        })
        .await
        .unwrap();
    match h.updates.recv().await {
        Some(SessionUpdate::SelectionRejected(err)) => assert_eq!(err, SessionError::NotActive),
        other => panic!("unexpected update: {:?}", other),
    }

    h.commands.send(SessionCommand::Submit).await.unwrap();
    assert_eq!(h.session.await.unwrap(), submitted());

    let submissions = api.submissions();
    assert_eq!(submissions.len(), 2);
    assert_eq!(submissions[0], submissions[1]);
    assert_eq!(submissions[1].get(1), Some(OptionKey::D));
    assert_eq!(submissions[1].len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_selection_does_not_touch_answers() {
    let api = FakeApi::new(0);
    let mut h = start(api.clone());

    h.commands
        .send(SessionCommand::Select {
            index: 5,
            key: OptionKey::A,
        })
        .await
        .unwrap();
    h.commands.send(SessionCommand::Submit).await.unwrap();

    assert_eq!(h.session.await.unwrap(), submitted());
    assert_eq!(api.submissions(), vec![AnswerSet::new()]);
    assert!(drain_now(&mut h.updates).iter().any(|u| matches!(
        u,
        SessionUpdate::SelectionRejected(SessionError::UnknownQuestion { index: 5, count: 2 })
    )));
}

#[tokio::test(start_paused = true)]
async fn leaving_abandons_without_submitting() {
    let api = FakeApi::new(0);
    let h = start(api.clone());

    tokio::time::sleep(Duration::from_secs(10)).await;
    h.commands.send(SessionCommand::Leave).await.unwrap();

    assert_eq!(h.session.await.unwrap(), Outcome::Abandoned);

    tokio::time::sleep(Duration::from_secs(120)).await;
    assert!(api.submissions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn dropping_the_command_channel_abandons() {
    let api = FakeApi::new(0);
    let h = start(api.clone());

    drop(h.commands);

    assert_eq!(h.session.await.unwrap(), Outcome::Abandoned);
    assert!(api.submissions().is_empty());
}

#[tokio::test(start_paused = true)]
async fn rejected_token_on_submit_goes_to_login() {
    let api = FakeApi::revoking_on_submit();
    let mut h = start(api.clone());

    h.commands
        .send(SessionCommand::Select {
            index: 0,
            key: OptionKey::B,
        })
        .await
        .unwrap();
    h.commands.send(SessionCommand::Submit).await.unwrap();

    assert_eq!(h.session.await.unwrap(), Outcome::Unauthenticated);
    assert_eq!(api.submissions().len(), 1);

    let updates = drain_now(&mut h.updates);
    assert!(
        updates
            .iter()
            .all(|u| !matches!(u, SessionUpdate::SubmitFailed { .. }))
    );
    assert!(matches!(
        updates.last(),
        Some(SessionUpdate::Submitting {
            trigger: SubmitTrigger::Manual,
            ..
        })
    ));

    // Nothing is retried after the session ended.
    tokio::time::sleep(Duration::from_secs(120)).await;
    assert_eq!(api.submissions().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn rejected_token_on_expiry_submit_goes_to_login() {
    let api = FakeApi::revoking_on_submit();
    let h = start(api.clone());

    assert_eq!(h.session.await.unwrap(), Outcome::Unauthenticated);
    assert_eq!(api.submissions(), vec![AnswerSet::new()]);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn constant_input_does_not_hold_back_expiry() {
    let api = FakeApi::new(0);
    let h = start_ticking(api.clone(), Duration::from_millis(2));

    let flood = {
        let commands = h.commands.clone();
        tokio::spawn(async move {
            let mut key = OptionKey::A;
            loop {
                key = if key == OptionKey::A { OptionKey::B } else { OptionKey::A };
                let select = SessionCommand::Select { index: 0, key };
                if commands.send(select).await.is_err() {
                    break;
                }
            }
        })
    };

    let outcome = tokio::time::timeout(Duration::from_secs(10), h.session)
        .await
        .expect("session should expire while commands keep arriving")
        .unwrap();
    assert_eq!(outcome, submitted());
    assert_eq!(api.submissions().len(), 1);

    // The runner dropped its receiver, so the sender stops on its own.
    flood.await.unwrap();
}
