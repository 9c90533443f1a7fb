//! FFmpeg CLI wrapper for the media job backend.
//!
//! This crate provides:
//! - Type-safe FFmpeg command building with multiple inputs
//! - Progress parsing from `-progress pipe:1`, with stderr kept for diagnostics
//! - FFprobe stream summaries
//! - [`AudioVideoMerger`], which muxes a separate audio track into a video

pub mod command;
pub mod error;
pub mod merge;
pub mod probe;
pub mod progress;

pub use command::{check_ffmpeg, check_ffprobe, FfmpegCommand, FfmpegRunner};
pub use error::{MediaError, MediaResult};
pub use merge::{AudioVideoMerger, DEFAULT_AUDIO_CODEC};
pub use probe::{get_duration, probe_media, MediaInfo};
pub use progress::FfmpegProgress;
