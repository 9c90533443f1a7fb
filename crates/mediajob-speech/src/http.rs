//! OpenAI-compatible speech service client.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::Deserialize;
use tracing::{debug, info, warn};

use mediajob_models::{attach_words, RawTranscription, RecognitionSegment, RecognizedWord, SpeechTask};

use crate::error::{SpeechError, SpeechResult};
use crate::options::RecognitionOptions;
use crate::recognizer::SpeechRecognizer;

/// Configuration for the HTTP recognizer.
#[derive(Debug, Clone)]
pub struct HttpRecognizerConfig {
    /// Base URL of the speech service
    pub base_url: String,
    /// Bearer token, if the service wants one
    pub api_key: Option<String>,
    /// Model name sent with every request
    pub model: String,
    /// Request timeout
    pub timeout: Duration,
    /// Max retries
    pub max_retries: u32,
}

impl Default for HttpRecognizerConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            model: "whisper-1".to_string(),
            timeout: Duration::from_secs(600),
            max_retries: 2,
        }
    }
}

impl HttpRecognizerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("SPEECH_SERVICE_URL").unwrap_or(defaults.base_url),
            api_key: std::env::var("SPEECH_SERVICE_API_KEY")
                .ok()
                .filter(|k| !k.is_empty()),
            model: std::env::var("SPEECH_SERVICE_MODEL").unwrap_or(defaults.model),
            timeout: std::env::var("SPEECH_SERVICE_TIMEOUT")
                .ok()
                .and_then(|s| s.parse().ok())
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
            max_retries: std::env::var("SPEECH_SERVICE_RETRIES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(defaults.max_retries),
        }
    }
}

/// `verbose_json` response body.
#[derive(Debug, Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    segments: Vec<RecognitionSegment>,
    #[serde(default)]
    words: Vec<RecognizedWord>,
}

/// Recognizer backed by a `/v1/audio/{transcriptions,translations}` service.
pub struct WhisperHttpRecognizer {
    http: Client,
    config: HttpRecognizerConfig,
}

impl WhisperHttpRecognizer {
    /// Create a new HTTP recognizer.
    pub fn new(config: HttpRecognizerConfig) -> SpeechResult<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(SpeechError::Network)?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> SpeechResult<Self> {
        Self::new(HttpRecognizerConfig::from_env())
    }

    fn endpoint(&self, task: SpeechTask) -> String {
        let path = match task {
            SpeechTask::Transcribe => "transcriptions",
            SpeechTask::Translate => "translations",
        };
        format!("{}/v1/audio/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn form(&self, file_name: &str, bytes: Vec<u8>, options: &RecognitionOptions) -> Form {
        let mut form = Form::new()
            .part("file", Part::bytes(bytes).file_name(file_name.to_string()))
            .text("model", self.config.model.clone())
            .text("response_format", "verbose_json")
            .text("timestamp_granularities[]", "segment");

        if options.word_timestamps {
            form = form.text("timestamp_granularities[]", "word");
        }
        // Translation always targets the service's pivot language
        if let (SpeechTask::Transcribe, Some(language)) = (options.task, options.language()) {
            form = form.text("language", language.to_string());
        }
        if let Some(prompt) = options.initial_prompt() {
            form = form.text("prompt", prompt.to_string());
        }

        form
    }

    async fn send(&self, url: &str, file_name: &str, bytes: &[u8], options: &RecognitionOptions) -> SpeechResult<Response> {
        let mut request = self
            .http
            .post(url)
            .multipart(self.form(file_name, bytes.to_vec(), options));
        if let Some(key) = &self.config.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await.map_err(SpeechError::Network)?;
        let status = response.status();
        if status.is_server_error() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::ServiceUnavailable(format!("{}: {}", status, body)));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpeechError::RequestFailed(format!(
                "Speech service returned {}: {}",
                status, body
            )));
        }

        Ok(response)
    }

    /// Execute with retry logic.
    async fn with_retry<F, Fut, T>(&self, operation: F) -> SpeechResult<T>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = SpeechResult<T>>,
    {
        let mut last_error = None;

        for attempt in 0..=self.config.max_retries {
            match operation().await {
                Ok(result) => return Ok(result),
                Err(e) if e.is_retryable() && attempt < self.config.max_retries => {
                    let delay = Duration::from_millis(500 * 2u64.pow(attempt));
                    warn!(
                        "Speech request failed (attempt {}), retrying in {:?}: {}",
                        attempt + 1,
                        delay,
                        e
                    );
                    tokio::time::sleep(delay).await;
                    last_error = Some(e);
                }
                Err(e) => return Err(e),
            }
        }

        Err(last_error.unwrap_or(SpeechError::RequestFailed("Unknown error".to_string())))
    }
}

#[async_trait]
impl SpeechRecognizer for WhisperHttpRecognizer {
    fn name(&self) -> &'static str {
        "whisper-http"
    }

    async fn recognize(
        &self,
        input: &Path,
        options: &RecognitionOptions,
    ) -> SpeechResult<RawTranscription> {
        let bytes = tokio::fs::read(input).await?;
        let file_name = input
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "input".to_string());
        let url = self.endpoint(options.task);

        if let Some(prompt) = options.initial_prompt() {
            info!(chars = prompt.chars().count(), "Using initial prompt");
        }
        debug!(bytes = bytes.len(), "Sending speech request to {}", url);

        let response = self
            .with_retry(|| self.send(&url, &file_name, &bytes, options))
            .await?;

        let body = response.text().await?;
        let parsed: VerboseTranscription = serde_json::from_str(&body)
            .map_err(|e| SpeechError::InvalidResponse(format!("{}: {}", e, body)))?;

        let mut segments = parsed.segments;
        attach_words(&mut segments, parsed.words);

        info!(segments = segments.len(), "Speech service finished");

        Ok(RawTranscription {
            text: parsed.text,
            segments,
            language: parsed.language,
        })
    }
}
