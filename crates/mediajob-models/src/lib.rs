//! Shared data models for the media job backend.
//!
//! This crate provides:
//! - Job requests (merge, transcribe/translate) and job ids
//! - Remote asset URI validation
//! - Recognizer segments and subtitle synthesis
//! - SRT timestamp formatting
//! - Job outcomes (direct payloads, persisted references)

pub mod asset;
pub mod job;
pub mod outcome;
pub mod segment;
pub mod subtitle;
pub mod timestamp;

// Re-export common types
pub use asset::{AssetRole, AssetUriError, ObjectUri, DEFAULT_ASSET_PREFIX};
pub use job::{JobId, JobRequest, JobTask, MergeRequest, ResponseType, SpeechTask, TranscribeRequest};
pub use outcome::{
    JobOutcome, MergedArtifact, PersistedFiles, PersistedRef, TranscriptionPayload,
    TranscriptionResult,
};
pub use segment::{attach_words, RawTranscription, RecognitionSegment, RecognizedWord};
pub use subtitle::{synthesize, SubtitleCue, SubtitleTrack};
pub use timestamp::format_srt_timestamp;
