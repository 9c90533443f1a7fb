//! Worker configuration.

use std::path::PathBuf;
use std::time::Duration;

use mediajob_media::DEFAULT_AUDIO_CODEC;
use mediajob_models::DEFAULT_ASSET_PREFIX;

/// Worker configuration.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Root for per-job scratch directories
    pub work_dir: PathBuf,
    /// Where `cloud` transcription results are written
    pub output_dir: PathBuf,
    /// Deadline for a single engine invocation
    pub engine_timeout: Duration,
    /// Only input URLs starting with this prefix are fetched
    pub asset_prefix: String,
    /// Audio codec for merged videos
    pub merge_audio_codec: String,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        Self {
            work_dir: PathBuf::from("/tmp/mediajob"),
            output_dir: PathBuf::from("/tmp/mediajob/output"),
            engine_timeout: Duration::from_secs(3600), // 1 hour
            asset_prefix: DEFAULT_ASSET_PREFIX.to_string(),
            merge_audio_codec: DEFAULT_AUDIO_CODEC.to_string(),
        }
    }
}

impl WorkerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            work_dir: std::env::var("WORKER_WORK_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.work_dir),
            output_dir: std::env::var("WORKER_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            engine_timeout: Duration::from_secs(
                std::env::var("WORKER_ENGINE_TIMEOUT_SECS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(3600),
            ),
            asset_prefix: std::env::var("ASSET_URL_PREFIX").unwrap_or(defaults.asset_prefix),
            merge_audio_codec: std::env::var("MERGE_AUDIO_CODEC")
                .ok()
                .filter(|c| !c.trim().is_empty())
                .unwrap_or(defaults.merge_audio_codec),
        }
    }

    /// Engine deadline in whole seconds (at least one).
    pub fn engine_timeout_secs(&self) -> u64 {
        self.engine_timeout.as_secs().max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = WorkerConfig::default();
        assert_eq!(config.engine_timeout_secs(), 3600);
        assert_eq!(config.asset_prefix, "https://storage.googleapis.com/");
        assert_eq!(config.merge_audio_codec, "aac");
    }

    #[test]
    fn test_sub_second_timeout_rounds_up() {
        let config = WorkerConfig {
            engine_timeout: Duration::from_millis(200),
            ..Default::default()
        };
        assert_eq!(config.engine_timeout_secs(), 1);
    }
}
