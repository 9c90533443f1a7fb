//! Recognizer selection.

use std::str::FromStr;
use std::sync::Arc;

use tracing::info;

use crate::cli::{WhisperCliConfig, WhisperCliRecognizer};
use crate::error::{SpeechError, SpeechResult};
use crate::http::{HttpRecognizerConfig, WhisperHttpRecognizer};
use crate::recognizer::SpeechRecognizer;

/// Which engine backs transcription jobs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SpeechEngine {
    /// Local `whisper` executable
    #[default]
    Cli,
    /// OpenAI-compatible HTTP service
    Http,
}

impl FromStr for SpeechEngine {
    type Err = SpeechError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "cli" | "whisper" => Ok(Self::Cli),
            "http" | "openai" => Ok(Self::Http),
            other => Err(SpeechError::EngineNotFound(other.to_string())),
        }
    }
}

/// Recognizer configuration.
#[derive(Debug, Clone, Default)]
pub struct RecognizerConfig {
    pub engine: SpeechEngine,
    pub cli: WhisperCliConfig,
    pub http: HttpRecognizerConfig,
}

impl RecognizerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> SpeechResult<Self> {
        let engine = match std::env::var("SPEECH_ENGINE") {
            Ok(value) => value.parse()?,
            Err(_) => SpeechEngine::default(),
        };

        Ok(Self {
            engine,
            cli: WhisperCliConfig::from_env(),
            http: HttpRecognizerConfig::from_env(),
        })
    }
}

/// Build the configured recognizer.
///
/// `deadline_secs` bounds each CLI run; the HTTP engine uses its own request timeout.
pub fn build_recognizer(
    config: &RecognizerConfig,
    deadline_secs: Option<u64>,
) -> SpeechResult<Arc<dyn SpeechRecognizer>> {
    let recognizer: Arc<dyn SpeechRecognizer> = match config.engine {
        SpeechEngine::Cli => {
            let mut cli = WhisperCliRecognizer::new(config.cli.clone());
            if let Some(secs) = deadline_secs {
                cli = cli.with_timeout(secs);
            }
            Arc::new(cli)
        }
        SpeechEngine::Http => Arc::new(WhisperHttpRecognizer::new(config.http.clone())?),
    };

    info!(engine = recognizer.name(), "Speech recognizer ready");
    Ok(recognizer)
}
