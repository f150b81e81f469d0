use std::time::Duration;
use thiserror::Error;

/// Failures reported by a session results provider.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// The provider answered with an error payload.
    #[error("{message}")]
    Rejected { message: String },
    #[error("failed to read session results: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed session results: {0}")]
    Json(#[from] serde_json::Error),
}

impl ProviderError {
    /// Human-readable text suitable for a status toast.
    pub fn message(&self) -> String {
        match self {
            ProviderError::Rejected { message } => message.clone(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum AnalyticsError {
    #[error("failed to fetch session results: {0}")]
    FetchFailure(#[from] ProviderError),
    #[error("session results timed out after {0:?}")]
    Timeout(Duration),
    /// The result set has no block for the requested question. Not a failure
    /// by itself; callers decide whether to surface it.
    #[error("question {question_id} is not part of the session results")]
    QuestionNotFound { question_id: String },
}

impl AnalyticsError {
    /// Text passed to the status boundary.
    pub fn user_message(&self) -> String {
        match self {
            AnalyticsError::FetchFailure(err) => err.message(),
            other => other.to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
