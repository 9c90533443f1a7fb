//! Recognizer abstraction.

use std::path::Path;

use async_trait::async_trait;
use mediajob_models::RawTranscription;

use crate::error::SpeechResult;
use crate::options::RecognitionOptions;

/// Turns speech in a local media file into text and timed segments.
///
/// Implementations invoke the engine once per call; callers decide whether a
/// failure is retried.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    /// Engine name for logs and error reports.
    fn name(&self) -> &'static str;

    async fn recognize(
        &self,
        input: &Path,
        options: &RecognitionOptions,
    ) -> SpeechResult<RawTranscription>;
}
