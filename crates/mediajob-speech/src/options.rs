//! Per-call recognizer options.

use mediajob_models::{SpeechTask, TranscribeRequest};

/// Options passed to a [`SpeechRecognizer`](crate::SpeechRecognizer).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecognitionOptions {
    pub task: SpeechTask,
    /// Source language code; `None` lets the engine detect it
    pub language: Option<String>,
    pub word_timestamps: bool,
    /// Decoder context. Engines truncate long prompts on their side.
    pub initial_prompt: Option<String>,
}

impl RecognitionOptions {
    pub fn new(task: SpeechTask) -> Self {
        Self {
            task,
            ..Default::default()
        }
    }

    /// Empty strings are treated as absent.
    pub fn language(&self) -> Option<&str> {
        self.language.as_deref().filter(|l| !l.trim().is_empty())
    }

    /// Empty strings are treated as absent.
    pub fn initial_prompt(&self) -> Option<&str> {
        self.initial_prompt.as_deref().filter(|p| !p.is_empty())
    }
}

impl From<&TranscribeRequest> for RecognitionOptions {
    fn from(request: &TranscribeRequest) -> Self {
        Self {
            task: request.task,
            language: request.language.clone(),
            word_timestamps: request.word_timestamps,
            initial_prompt: request.initial_prompt.clone(),
        }
    }
}
