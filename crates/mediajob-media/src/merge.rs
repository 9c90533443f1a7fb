//! Audio/video muxing.

use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::command::{FfmpegCommand, FfmpegRunner};
use crate::error::{MediaError, MediaResult};
use crate::probe::probe_media;

/// Audio codec used when the caller does not pick one.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";

/// Replaces a video's audio with a separate track.
///
/// The first video stream of the video input is stream-copied, the first
/// audio stream of the audio input is re-encoded, and the output ends with
/// whichever of the two is shorter.
#[derive(Debug, Clone)]
pub struct AudioVideoMerger {
    runner: FfmpegRunner,
    audio_codec: String,
}

impl Default for AudioVideoMerger {
    fn default() -> Self {
        Self::new()
    }
}

impl AudioVideoMerger {
    pub fn new() -> Self {
        Self {
            runner: FfmpegRunner::new(),
            audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }

    /// Kill FFmpeg if a merge runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.runner = self.runner.with_timeout(secs);
        self
    }

    pub fn with_audio_codec(mut self, codec: impl Into<String>) -> Self {
        self.audio_codec = codec.into();
        self
    }

    pub fn audio_codec(&self) -> &str {
        &self.audio_codec
    }

    /// Build the FFmpeg invocation for one merge.
    pub fn command(&self, video: &Path, audio: &Path, output: &Path) -> FfmpegCommand {
        FfmpegCommand::new(video, output)
            .input(audio)
            .map("0:v:0")
            .map("1:a:0")
            .video_codec("copy")
            .audio_codec(self.audio_codec.clone())
            .shortest()
    }

    /// Merge `audio` into `video`, writing `output`.
    ///
    /// A non-zero FFmpeg exit yields [`MediaError::FfmpegFailed`] with the
    /// engine's stderr unmodified.
    pub async fn merge(
        &self,
        video: impl AsRef<Path>,
        audio: impl AsRef<Path>,
        output: impl AsRef<Path>,
    ) -> MediaResult<PathBuf> {
        let video = video.as_ref();
        let audio = audio.as_ref();
        let output = output.as_ref();

        for input in [video, audio] {
            if !input.exists() {
                return Err(MediaError::FileNotFound(input.to_path_buf()));
            }
        }

        info!(
            video = %video.display(),
            audio = %audio.display(),
            output = %output.display(),
            "Merging audio into video"
        );

        let cmd = self.command(video, audio, output);
        self.runner
            .run_with_progress(&cmd, |progress| {
                debug!(
                    out_time_ms = progress.out_time_ms,
                    speed = progress.speed,
                    complete = progress.is_complete,
                    "Merge progress"
                );
            })
            .await?;

        // Best effort: a probe failure does not fail the merge
        match probe_media(output).await {
            Ok(info) => info!(
                output = %output.display(),
                duration_secs = info.duration,
                size = info.size,
                "Merge complete"
            ),
            Err(e) => warn!(output = %output.display(), "Merged file could not be probed: {}", e),
        }

        Ok(output.to_path_buf())
    }
}
