//! Job requests accepted by the pipeline.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;
use validator::Validate;

/// Unique identifier for a job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// What the speech engine should produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum SpeechTask {
    /// Text in the source language
    #[default]
    Transcribe,
    /// Text in the engine's pivot language (English for Whisper)
    Translate,
}

impl SpeechTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpeechTask::Transcribe => "transcribe",
            SpeechTask::Translate => "translate",
        }
    }
}

impl fmt::Display for SpeechTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How transcription results are handed back.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Values returned in the response body
    #[default]
    Direct,
    /// Values written to `<job_id>.*` files under the output root
    Cloud,
}

/// Kind of work a job performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobTask {
    Merge,
    Transcribe,
    Translate,
}

impl JobTask {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobTask::Merge => "merge",
            JobTask::Transcribe => "transcribe",
            JobTask::Translate => "translate",
        }
    }
}

impl fmt::Display for JobTask {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Merge an audio track into a video container.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct MergeRequest {
    /// Source video (first video stream is kept as-is)
    #[validate(url)]
    pub video_url: String,

    /// Source audio (first audio stream is re-encoded)
    #[validate(url)]
    pub audio_url: String,

    /// Where to POST the result when the job runs in the background
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub webhook_url: Option<String>,

    /// Caller-supplied correlation id, echoed back
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

/// Transcribe or translate the speech in a media file.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema, Validate)]
#[serde(deny_unknown_fields)]
pub struct TranscribeRequest {
    #[validate(url)]
    pub media_url: String,

    #[serde(default)]
    pub task: SpeechTask,

    #[serde(default = "default_true")]
    pub include_text: bool,

    #[serde(default = "default_true")]
    pub include_srt: bool,

    #[serde(default)]
    pub include_segments: bool,

    #[serde(default)]
    pub word_timestamps: bool,

    /// ISO-639-1 code; absent means autodetect
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 2, max = 8))]
    pub language: Option<String>,

    /// Decoder context used to bias vocabulary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial_prompt: Option<String>,

    #[serde(default)]
    pub response_type: ResponseType,

    /// Fixed words per subtitle cue; absent or 0 means one cue per segment
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words_per_line: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(url)]
    pub webhook_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
}

fn default_true() -> bool {
    true
}

impl TranscribeRequest {
    /// Minimal request with default output selection.
    pub fn new(media_url: impl Into<String>, task: SpeechTask) -> Self {
        Self {
            media_url: media_url.into(),
            task,
            include_text: true,
            include_srt: true,
            include_segments: false,
            word_timestamps: false,
            language: None,
            initial_prompt: None,
            response_type: ResponseType::Direct,
            words_per_line: None,
            webhook_url: None,
            id: None,
        }
    }

    /// Words per cue for the synthesizer (0 selects per-segment mode).
    pub fn words_per_line(&self) -> usize {
        self.words_per_line.unwrap_or(0) as usize
    }
}

/// A validated job handed to the pipeline. Immutable once accepted.
#[derive(Debug, Clone, Serialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobRequest {
    Merge(MergeRequest),
    Transcribe(TranscribeRequest),
}

impl JobRequest {
    /// Source URIs in the order the pipeline fetches them.
    pub fn inputs(&self) -> Vec<&str> {
        match self {
            JobRequest::Merge(r) => vec![r.video_url.as_str(), r.audio_url.as_str()],
            JobRequest::Transcribe(r) => vec![r.media_url.as_str()],
        }
    }

    pub fn task(&self) -> JobTask {
        match self {
            JobRequest::Merge(_) => JobTask::Merge,
            JobRequest::Transcribe(r) => match r.task {
                SpeechTask::Transcribe => JobTask::Transcribe,
                SpeechTask::Translate => JobTask::Translate,
            },
        }
    }

    pub fn webhook_url(&self) -> Option<&str> {
        match self {
            JobRequest::Merge(r) => r.webhook_url.as_deref(),
            JobRequest::Transcribe(r) => r.webhook_url.as_deref(),
        }
    }

    /// Caller-supplied correlation id.
    pub fn client_id(&self) -> Option<&str> {
        match self {
            JobRequest::Merge(r) => r.id.as_deref(),
            JobRequest::Transcribe(r) => r.id.as_deref(),
        }
    }
}
