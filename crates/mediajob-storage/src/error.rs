//! Storage and fetch error types.

use mediajob_models::AssetUriError;
use thiserror::Error;

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

/// Result type for asset downloads.
pub type FetchResult<T> = Result<T, FetchError>;

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("Failed to configure storage client: {0}")]
    ConfigError(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Storage SDK error: {0}")]
    AwsSdk(String),
}

impl StorageError {
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::ConfigError(msg.into())
    }

    pub fn upload_failed(msg: impl Into<String>) -> Self {
        Self::UploadFailed(msg.into())
    }
}

/// Errors that can occur while downloading a remote asset.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("Invalid asset URL: {0}")]
    InvalidUri(#[from] AssetUriError),

    #[error("Download of {uri} failed with status {status}")]
    Status { uri: String, status: u16 },

    #[error("Download of {uri} was interrupted: {source}")]
    Interrupted {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("Download of {uri} timed out after {secs} seconds")]
    TimedOut { uri: String, secs: u64 },

    #[error("Download of {uri} is incomplete: {received} of {expected} bytes")]
    Incomplete {
        uri: String,
        expected: u64,
        received: u64,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl FetchError {
    pub fn interrupted(uri: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Interrupted {
            uri: uri.into(),
            source,
        }
    }

    /// Whether the URI itself was rejected, before any network traffic.
    pub fn is_invalid_uri(&self) -> bool {
        matches!(self, FetchError::InvalidUri(_))
    }
}
