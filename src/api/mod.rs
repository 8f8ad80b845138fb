// src/api/mod.rs

pub mod client;

use async_trait::async_trait;

use crate::{
    error::ApiError,
    models::{
        answer::AnswerSet,
        submission::{SubmissionResult, SubmitReceipt},
        test::{TestId, TestPayload},
    },
    utils::token::SessionToken,
};

pub use client::HttpAssessmentApi;

/// Calls the exam session makes against the Assessment Backend.
///
/// Every call is authenticated with the student's bearer token.
#[async_trait]
pub trait AssessmentApi: Send + Sync {
    /// `GET /api/tests/{id}`. A 403 means the test was already taken.
    async fn fetch_test(&self, token: &SessionToken, test_id: &TestId)
    -> Result<TestPayload, ApiError>;

    /// `POST /api/tests/{id}/submit` with `{"answers": {...}}`.
    async fn submit_answers(
        &self,
        token: &SessionToken,
        test_id: &TestId,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ApiError>;

    /// `GET /api/tests/{id}/result`.
    async fn fetch_result(
        &self,
        token: &SessionToken,
        test_id: &TestId,
    ) -> Result<SubmissionResult, ApiError>;
}
