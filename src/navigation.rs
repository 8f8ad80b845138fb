// src/navigation.rs

use crate::{models::test::TestId, session::Outcome};

/// Where the shell goes once a session is over.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Route {
    /// Ask the student to authenticate again.
    Login,
    /// Show the graded result of a test, with an optional notice first.
    Results {
        test_id: TestId,
        notice: Option<String>,
    },
    /// Replace the exam view with a blocking message.
    Error(String),
    Exit,
}

/// Maps a terminal session outcome to a navigation target.
///
/// This is the only place outcomes turn into navigation; the controller
/// itself never redirects.
pub fn route_for(outcome: Outcome) -> Route {
    match outcome {
        Outcome::Unauthenticated => Route::Login,
        Outcome::AlreadyCompleted(test_id) => Route::Results {
            test_id,
            notice: Some("You have already completed this test.".to_string()),
        },
        Outcome::Submitted { test_id, message } => Route::Results {
            test_id,
            notice: Some(message),
        },
        Outcome::MalformedData(detail) => {
            tracing::debug!("Malformed test data: {}", detail);
            Route::Error(
                "Failed to load test data. The test may not exist or is improperly configured."
                    .to_string(),
            )
        }
        Outcome::NetworkError(detail) => Route::Error(format!("Network error: {}", detail)),
        Outcome::Abandoned => Route::Exit,
    }
}
