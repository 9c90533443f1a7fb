//! Job results before and after materialization.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::segment::RecognitionSegment;
use crate::subtitle::SubtitleTrack;

/// Computed transcription outputs; each is present only if requested.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TranscriptionResult {
    pub full_text: Option<String>,
    pub track: Option<SubtitleTrack>,
    pub segments: Option<Vec<RecognitionSegment>>,
}

/// Merged file sitting in scratch storage, not yet published.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedArtifact {
    pub local_path: PathBuf,
}

/// In-memory transcription payload returned for `direct` responses.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TranscriptionPayload {
    pub text: Option<String>,
    pub srt: Option<String>,
    pub segments: Option<Vec<RecognitionSegment>>,
}

/// Files written for a `cloud` response, one per requested output.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedFiles {
    pub text_file: Option<PathBuf>,
    pub srt_file: Option<PathBuf>,
    pub segments_file: Option<PathBuf>,
}

impl PersistedFiles {
    /// All written paths, in text/srt/segments order.
    pub fn paths(&self) -> Vec<&PathBuf> {
        [&self.text_file, &self.srt_file, &self.segments_file]
            .into_iter()
            .flatten()
            .collect()
    }
}

/// Durable reference to job output.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PersistedRef {
    /// Publicly readable object URI (merge jobs)
    PublicUri(String),
    /// Local files awaiting upload by another component
    Files(PersistedFiles),
}

/// What a finished job hands back to its caller.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum JobOutcome {
    Direct(TranscriptionPayload),
    Persisted(PersistedRef),
}

impl JobOutcome {
    pub fn public_uri(&self) -> Option<&str> {
        match self {
            JobOutcome::Persisted(PersistedRef::PublicUri(uri)) => Some(uri),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_uri_serializes_as_plain_string() {
        let outcome = JobOutcome::Persisted(PersistedRef::PublicUri(
            "https://storage.googleapis.com/out/merged/x.mp4".to_string(),
        ));
        assert_eq!(
            serde_json::to_value(&outcome).unwrap(),
            serde_json::json!("https://storage.googleapis.com/out/merged/x.mp4")
        );
        assert_eq!(
            outcome.public_uri(),
            Some("https://storage.googleapis.com/out/merged/x.mp4")
        );
    }

    #[test]
    fn test_persisted_paths_skip_missing() {
        let files = PersistedFiles {
            text_file: Some(PathBuf::from("/out/j.txt")),
            srt_file: None,
            segments_file: Some(PathBuf::from("/out/j.json")),
        };
        assert_eq!(
            files.paths(),
            vec![&PathBuf::from("/out/j.txt"), &PathBuf::from("/out/j.json")]
        );
    }

    #[test]
    fn test_direct_payload_shape() {
        let outcome = JobOutcome::Direct(TranscriptionPayload {
            text: Some(" hi".to_string()),
            srt: None,
            segments: None,
        });
        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["text"], " hi");
        assert!(value["srt"].is_null());
    }
}
