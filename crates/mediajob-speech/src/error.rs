//! Speech recognizer error types.

use std::path::PathBuf;
use thiserror::Error;

pub type SpeechResult<T> = Result<T, SpeechError>;

#[derive(Debug, Error)]
pub enum SpeechError {
    #[error("Speech engine not found: {0}")]
    EngineNotFound(String),

    #[error("Speech engine failed (exit code {exit_code:?})")]
    EngineFailed {
        stderr: String,
        exit_code: Option<i32>,
    },

    #[error("Speech engine produced no output at {0}")]
    MissingOutput(PathBuf),

    #[error("Speech service unavailable: {0}")]
    ServiceUnavailable(String),

    #[error("Request failed: {0}")]
    RequestFailed(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Timeout after {0} seconds")]
    Timeout(u64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl SpeechError {
    /// Transport-level failures worth another HTTP attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            SpeechError::ServiceUnavailable(_) | SpeechError::Network(_)
        )
    }

    /// Text the engine itself reported, when there is any.
    pub fn diagnostic(&self) -> Option<&str> {
        match self {
            SpeechError::EngineFailed { stderr, .. } => Some(stderr),
            SpeechError::RequestFailed(body) | SpeechError::ServiceUnavailable(body) => Some(body),
            _ => None,
        }
    }
}
