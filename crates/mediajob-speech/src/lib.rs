//! Speech recognition engines for transcription jobs.
//!
//! Two interchangeable [`SpeechRecognizer`] implementations are provided:
//! [`WhisperCliRecognizer`] runs the `whisper` executable locally and
//! [`WhisperHttpRecognizer`] talks to an OpenAI-compatible service.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod options;
pub mod recognizer;

pub use cli::{WhisperCliConfig, WhisperCliRecognizer};
pub use config::{build_recognizer, RecognizerConfig, SpeechEngine};
pub use error::{SpeechError, SpeechResult};
pub use http::{HttpRecognizerConfig, WhisperHttpRecognizer};
pub use options::RecognitionOptions;
pub use recognizer::SpeechRecognizer;
