//! Job error taxonomy.

use mediajob_media::MediaError;
use mediajob_speech::SpeechError;
use mediajob_storage::{FetchError, StorageError};
use thiserror::Error;

pub type JobResult<T> = Result<T, JobError>;

/// Why a job failed. Nothing on the job path is retried.
#[derive(Debug, Error)]
pub enum JobError {
    /// The request was rejected before any work started
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Fetch failed: {0}")]
    Fetch(FetchError),

    /// An external engine failed; `diagnostic` is its own report
    #[error("{engine} failed: {diagnostic}")]
    Tool { engine: String, diagnostic: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

impl JobError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn tool(engine: impl Into<String>, diagnostic: impl Into<String>) -> Self {
        Self::Tool {
            engine: engine.into(),
            diagnostic: diagnostic.into(),
        }
    }

    /// Wrap a recognizer failure, keeping the engine's own text when it has any.
    pub fn speech(engine: &str, err: SpeechError) -> Self {
        let diagnostic = err
            .diagnostic()
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        Self::tool(engine, diagnostic)
    }

    /// Short machine-readable kind for metrics labels.
    pub fn kind(&self) -> &'static str {
        match self {
            JobError::Validation(_) => "validation",
            JobError::Fetch(_) => "fetch",
            JobError::Tool { .. } => "tool",
            JobError::Io(_) => "io",
            JobError::Storage(_) => "storage",
        }
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, JobError::Validation(_))
    }

    /// Text returned to the caller: engine diagnostics verbatim, otherwise the message.
    pub fn report_body(&self) -> String {
        match self {
            JobError::Tool { diagnostic, .. } => diagnostic.clone(),
            other => other.to_string(),
        }
    }
}

impl From<FetchError> for JobError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::InvalidUri(e) => JobError::Validation(e.to_string()),
            other => JobError::Fetch(other),
        }
    }
}

impl From<MediaError> for JobError {
    fn from(err: MediaError) -> Self {
        let diagnostic = err
            .diagnostic()
            .filter(|d| !d.trim().is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| err.to_string());
        JobError::tool("ffmpeg", diagnostic)
    }
}
