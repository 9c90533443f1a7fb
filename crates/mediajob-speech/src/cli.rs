//! Whisper command-line recognizer.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, info, warn};

use mediajob_models::RawTranscription;

use crate::error::{SpeechError, SpeechResult};
use crate::options::RecognitionOptions;
use crate::recognizer::SpeechRecognizer;

/// Configuration for the Whisper CLI.
#[derive(Debug, Clone)]
pub struct WhisperCliConfig {
    /// Executable name or path
    pub binary: String,
    /// Model size or checkpoint name
    pub model: String,
    /// Where model weights are cached
    pub model_dir: Option<PathBuf>,
}

impl Default for WhisperCliConfig {
    fn default() -> Self {
        Self {
            binary: "whisper".to_string(),
            model: "base".to_string(),
            model_dir: None,
        }
    }
}

impl WhisperCliConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            binary: std::env::var("WHISPER_BINARY").unwrap_or(defaults.binary),
            model: std::env::var("WHISPER_MODEL").unwrap_or(defaults.model),
            model_dir: std::env::var("WHISPER_MODEL_DIR").ok().map(PathBuf::from),
        }
    }
}

/// Runs the `whisper` executable once per file and reads its JSON output.
#[derive(Debug, Clone)]
pub struct WhisperCliRecognizer {
    config: WhisperCliConfig,
    timeout_secs: Option<u64>,
}

impl WhisperCliRecognizer {
    pub fn new(config: WhisperCliConfig) -> Self {
        Self {
            config,
            timeout_secs: None,
        }
    }

    /// Kill the engine if it runs longer than `secs`.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    /// Command-line arguments for one run.
    pub fn build_args(&self, input: &Path, output_dir: &Path, options: &RecognitionOptions) -> Vec<String> {
        let mut args = vec![
            input.to_string_lossy().to_string(),
            "--model".to_string(),
            self.config.model.clone(),
            "--task".to_string(),
            options.task.as_str().to_string(),
            "--output_format".to_string(),
            "json".to_string(),
            "--output_dir".to_string(),
            output_dir.to_string_lossy().to_string(),
            "--verbose".to_string(),
            "False".to_string(),
        ];

        if let Some(dir) = &self.config.model_dir {
            args.push("--model_dir".to_string());
            args.push(dir.to_string_lossy().to_string());
        }
        if let Some(language) = options.language() {
            args.push("--language".to_string());
            args.push(language.to_string());
        }
        if options.word_timestamps {
            args.push("--word_timestamps".to_string());
            args.push("True".to_string());
        }
        if let Some(prompt) = options.initial_prompt() {
            args.push("--initial_prompt".to_string());
            args.push(prompt.to_string());
        }

        args
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperCliRecognizer {
    fn name(&self) -> &'static str {
        "whisper"
    }

    async fn recognize(
        &self,
        input: &Path,
        options: &RecognitionOptions,
    ) -> SpeechResult<RawTranscription> {
        which::which(&self.config.binary)
            .map_err(|_| SpeechError::EngineNotFound(self.config.binary.clone()))?;

        let parent = input.parent().unwrap_or_else(|| Path::new("."));
        let output_dir = tempfile::Builder::new()
            .prefix("whisper-")
            .tempdir_in(parent)?;

        if let Some(prompt) = options.initial_prompt() {
            info!(chars = prompt.chars().count(), "Using initial prompt");
        }
        info!(
            model = %self.config.model,
            task = %options.task,
            language = options.language().unwrap_or("auto"),
            "Running Whisper on {}",
            input.display()
        );

        let args = self.build_args(input, output_dir.path(), options);
        debug!("Running: {} {}", self.config.binary, args.join(" "));

        let run = Command::new(&self.config.binary)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output();

        let output = match self.timeout_secs {
            Some(secs) => match tokio::time::timeout(Duration::from_secs(secs), run).await {
                Ok(output) => output?,
                Err(_) => {
                    warn!("Whisper timed out after {} seconds, killing process", secs);
                    return Err(SpeechError::Timeout(secs));
                }
            },
            None => run.await?,
        };

        if !output.status.success() {
            return Err(SpeechError::EngineFailed {
                stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
                exit_code: output.status.code(),
            });
        }

        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        let json_path = output_dir.path().join(format!("{}.json", stem));
        if !json_path.exists() {
            return Err(SpeechError::MissingOutput(json_path));
        }

        let raw = tokio::fs::read(&json_path).await?;
        let transcription: RawTranscription = serde_json::from_slice(&raw)?;

        info!(
            segments = transcription.segments.len(),
            language = transcription.language.as_deref().unwrap_or("unknown"),
            "Whisper finished"
        );

        Ok(transcription)
    }
}
