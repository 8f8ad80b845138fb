// src/api/client.rs

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use url::Url;

use crate::{
    api::AssessmentApi,
    config::Config,
    error::ApiError,
    models::{
        answer::{AnswerSet, SubmitRequest},
        submission::{SubmissionResult, SubmitReceipt},
        test::{InvalidTestId, TestId, TestPayload},
    },
    utils::token::SessionToken,
};

/// `AssessmentApi` over HTTP.
#[derive(Debug, Clone)]
pub struct HttpAssessmentApi {
    http: Client,
    base_url: Url,
}

impl HttpAssessmentApi {
    pub fn new(config: &Config) -> Result<Self, ApiError> {
        if config.api_base_url.cannot_be_a_base() {
            return Err(ApiError::Decode(format!(
                "API base URL cannot hold a path: {}",
                config.api_base_url
            )));
        }

        let http = Client::builder().timeout(config.http_timeout).build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.clone(),
        })
    }

    /// `{base}/api/tests/{id}[/{action}]`, with the id encoded as one segment.
    ///
    /// Empty and dot ids are refused; they do not name a test.
    fn test_url(&self, test_id: &TestId, action: Option<&str>) -> Result<Url, ApiError> {
        if !test_id.is_addressable() {
            return Err(InvalidTestId(test_id.to_string()).into());
        }

        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().extend(["api", "tests", test_id.as_str()]);
            if let Some(action) = action {
                segments.push(action);
            }
        }
        Ok(url)
    }
}

/// Decodes a success body, or maps the status into an `ApiError`.
async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ApiError::from_status(status, body));
    }

    let bytes = response.bytes().await?;
    Ok(serde_json::from_slice(&bytes)?)
}

#[async_trait]
impl AssessmentApi for HttpAssessmentApi {
    async fn fetch_test(
        &self,
        token: &SessionToken,
        test_id: &TestId,
    ) -> Result<TestPayload, ApiError> {
        let url = self.test_url(test_id, None)?;
        tracing::debug!(%url, "fetching test");

        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch test {}: {:?}", test_id, e);
                ApiError::from(e)
            })?;

        read_json(response).await
    }

    async fn submit_answers(
        &self,
        token: &SessionToken,
        test_id: &TestId,
        answers: &AnswerSet,
    ) -> Result<SubmitReceipt, ApiError> {
        let url = self.test_url(test_id, Some("submit"))?;
        tracing::debug!(%url, answered = answers.len(), "submitting answers");

        let response = self
            .http
            .post(url)
            .bearer_auth(token.expose())
            .json(&SubmitRequest { answers })
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to submit test {}: {:?}", test_id, e);
                ApiError::from(e)
            })?;

        // Any 2xx is a recorded submission. The body only carries a message.
        let status = response.status();
        if status.is_success() {
            let bytes = response.bytes().await.unwrap_or_default();
            return Ok(serde_json::from_slice(&bytes).unwrap_or_else(|e| {
                tracing::warn!("Unreadable submit response for {}: {}", test_id, e);
                SubmitReceipt::default()
            }));
        }

        read_json(response).await
    }

    async fn fetch_result(
        &self,
        token: &SessionToken,
        test_id: &TestId,
    ) -> Result<SubmissionResult, ApiError> {
        let url = self.test_url(test_id, Some("result"))?;
        tracing::debug!(%url, "fetching result");

        let response = self
            .http
            .get(url)
            .bearer_auth(token.expose())
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to fetch result for {}: {:?}", test_id, e);
                ApiError::from(e)
            })?;

        read_json(response).await
    }
}
