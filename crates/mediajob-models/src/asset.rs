//! Remote asset URIs.
//!
//! Jobs only accept media that lives in public object storage, addressed as
//! `<prefix><bucket>/<object-path>`. Anything else is rejected here, before
//! any network call is made.

use std::fmt;
use std::path::Path;

use thiserror::Error;

/// Public object-storage prefix accepted when nothing else is configured.
pub const DEFAULT_ASSET_PREFIX: &str = "https://storage.googleapis.com/";

/// Longest file extension carried over to a scratch file name.
const MAX_EXTENSION_LEN: usize = 5;

/// Errors produced while validating a remote asset URI.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AssetUriError {
    #[error("URL must start with {prefix}")]
    PrefixMismatch { prefix: String },

    #[error("URL is missing the bucket name")]
    MissingBucket,

    #[error("URL is missing the object path")]
    MissingObject,

    #[error("URL is malformed: {0}")]
    Malformed(String),
}

/// A validated `<prefix><bucket>/<object-path>` reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectUri {
    uri: String,
    bucket: String,
    object: String,
}

impl ObjectUri {
    /// Validate `uri` against `accepted_prefix` and split it into bucket and object.
    ///
    /// ```
    /// use mediajob_models::asset::{ObjectUri, DEFAULT_ASSET_PREFIX};
    /// let uri = ObjectUri::parse(
    ///     "https://storage.googleapis.com/media/in/clip.mp4",
    ///     DEFAULT_ASSET_PREFIX,
    /// )
    /// .unwrap();
    /// assert_eq!(uri.bucket(), "media");
    /// assert_eq!(uri.object(), "in/clip.mp4");
    /// ```
    pub fn parse(uri: &str, accepted_prefix: &str) -> Result<Self, AssetUriError> {
        let uri = uri.trim();

        let remainder = uri
            .strip_prefix(accepted_prefix)
            .ok_or_else(|| AssetUriError::PrefixMismatch {
                prefix: accepted_prefix.to_string(),
            })?;

        url::Url::parse(uri).map_err(|e| AssetUriError::Malformed(e.to_string()))?;

        let (bucket, object) = match remainder.split_once('/') {
            Some((bucket, object)) => (bucket, object),
            None => (remainder, ""),
        };

        if bucket.is_empty() {
            return Err(AssetUriError::MissingBucket);
        }
        if object.is_empty() {
            return Err(AssetUriError::MissingObject);
        }

        Ok(Self {
            uri: uri.to_string(),
            bucket: bucket.to_string(),
            object: object.to_string(),
        })
    }

    /// Full URI as given (trimmed).
    pub fn as_str(&self) -> &str {
        &self.uri
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object(&self) -> &str {
        &self.object
    }

    /// Short alphanumeric extension of the object name, if it has one.
    pub fn extension(&self) -> Option<&str> {
        let name = self.object.split(['?', '#']).next().unwrap_or_default();
        Path::new(name)
            .extension()
            .and_then(|ext| ext.to_str())
            .filter(|ext| {
                !ext.is_empty()
                    && ext.len() <= MAX_EXTENSION_LEN
                    && ext.chars().all(|c| c.is_ascii_alphanumeric())
            })
    }
}

impl fmt::Display for ObjectUri {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri)
    }
}

/// Logical role of a downloaded asset inside a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetRole {
    Video,
    Audio,
    Input,
}

impl AssetRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            AssetRole::Video => "video",
            AssetRole::Audio => "audio",
            AssetRole::Input => "input",
        }
    }

    /// Scratch file name for this role: `<job_id>_<role>[.<ext>]`.
    pub fn file_name(&self, job_id: &str, extension: Option<&str>) -> String {
        match extension {
            Some(ext) => format!("{}_{}.{}", job_id, self.as_str(), ext),
            None => format!("{}_{}", job_id, self.as_str()),
        }
    }
}

impl fmt::Display for AssetRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_valid_uri() {
        let uri = ObjectUri::parse(
            "https://storage.googleapis.com/my-bucket/videos/2024/intro.mp4",
            DEFAULT_ASSET_PREFIX,
        )
        .unwrap();

        assert_eq!(uri.bucket(), "my-bucket");
        assert_eq!(uri.object(), "videos/2024/intro.mp4");
        assert_eq!(uri.extension(), Some("mp4"));
    }

    #[test]
    fn test_parse_rejects_foreign_prefix() {
        let result = ObjectUri::parse("https://example.com/bucket/a.mp3", DEFAULT_ASSET_PREFIX);
        assert!(matches!(result, Err(AssetUriError::PrefixMismatch { .. })));

        let result = ObjectUri::parse("http://storage.googleapis.com/b/a.mp3", DEFAULT_ASSET_PREFIX);
        assert!(matches!(result, Err(AssetUriError::PrefixMismatch { .. })));
    }

    #[test]
    fn test_parse_rejects_missing_parts() {
        assert_eq!(
            ObjectUri::parse("https://storage.googleapis.com/", DEFAULT_ASSET_PREFIX),
            Err(AssetUriError::MissingBucket)
        );
        assert_eq!(
            ObjectUri::parse("https://storage.googleapis.com/bucket", DEFAULT_ASSET_PREFIX),
            Err(AssetUriError::MissingObject)
        );
        assert_eq!(
            ObjectUri::parse("https://storage.googleapis.com/bucket/", DEFAULT_ASSET_PREFIX),
            Err(AssetUriError::MissingObject)
        );
    }

    #[test]
    fn test_parse_custom_prefix() {
        let uri = ObjectUri::parse("http://127.0.0.1:9000/media/a/track", "http://127.0.0.1:9000/")
            .unwrap();
        assert_eq!(uri.bucket(), "media");
        assert_eq!(uri.object(), "a/track");
        assert_eq!(uri.extension(), None);
    }

    #[test]
    fn test_extension_ignores_query_and_odd_suffixes() {
        let uri = ObjectUri::parse(
            "https://storage.googleapis.com/b/audio.wav?generation=3",
            DEFAULT_ASSET_PREFIX,
        )
        .unwrap();
        assert_eq!(uri.extension(), Some("wav"));

        let uri = ObjectUri::parse(
            "https://storage.googleapis.com/b/archive.backup-copy",
            DEFAULT_ASSET_PREFIX,
        )
        .unwrap();
        assert_eq!(uri.extension(), None);
    }

    #[test]
    fn test_role_file_names() {
        assert_eq!(AssetRole::Video.file_name("job-1", Some("mp4")), "job-1_video.mp4");
        assert_eq!(AssetRole::Audio.file_name("job-1", None), "job-1_audio");
        assert_eq!(AssetRole::Input.file_name("abc", Some("m4a")), "abc_input.m4a");
    }
}
