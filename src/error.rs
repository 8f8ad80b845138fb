// src/error.rs

use reqwest::StatusCode;
use thiserror::Error;

use crate::models::test::InvalidTestId;

/// Errors produced by the Assessment Backend client.
///
/// Status codes the session logic branches on get their own variant,
/// everything else is kept as `Status` with the raw body for logging.
#[derive(Debug, Error)]
pub enum ApiError {
    // 401 Unauthorized
    #[error("session token rejected by backend")]
    Unauthorized,

    // 403 Forbidden (e.g., test already completed)
    #[error("access forbidden")]
    Forbidden,

    #[error("backend responded with {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("unexpected response payload: {0}")]
    Decode(String),

    #[error("{0}")]
    InvalidTestId(#[from] InvalidTestId),
}

impl ApiError {
    /// Maps a non-success HTTP status into the matching variant.
    pub fn from_status(status: StatusCode, body: String) -> Self {
        match status {
            StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
            StatusCode::FORBIDDEN => ApiError::Forbidden,
            _ => ApiError::Status { status, body },
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Decode(err.to_string())
    }
}

/// A controller command that was refused. The session keeps running.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("question {index} does not exist (test has {count} questions)")]
    UnknownQuestion { index: usize, count: usize },

    #[error("question {index} has no option '{key}'")]
    UnknownOption { index: usize, key: char },

    #[error("the exam is no longer accepting answers")]
    NotActive,
}

/// Failures reading or writing the persisted session token.
#[derive(Debug, Error)]
pub enum TokenStoreError {
    #[error("token file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("token must not be empty")]
    Empty,
}

/// Invalid values in the environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{name} is not a valid URL: {source}")]
    InvalidUrl {
        name: &'static str,
        #[source]
        source: url::ParseError,
    },

    #[error("{name} must be a positive integer, got '{value}'")]
    InvalidNumber { name: &'static str, value: String },
}
