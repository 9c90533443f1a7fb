//! Speech recognizer output.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single word with engine-provided timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognizedWord {
    pub word: String,
    pub start: f64,
    pub end: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub probability: Option<f64>,
}

/// A contiguous span of recognized speech.
///
/// Engines attach extra per-segment fields (token ids, log probabilities, ...).
/// Those are kept in `extra` so the segment list can be handed back verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecognitionSegment {
    /// Start time in seconds
    pub start: f64,
    /// End time in seconds
    pub end: f64,
    /// Transcribed text, usually with a leading space
    pub text: String,
    /// Per-word timing hints, when the engine was asked for them
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<RecognizedWord>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl RecognitionSegment {
    pub fn new(start: f64, end: f64, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
            words: None,
            extra: Map::new(),
        }
    }

    pub fn duration(&self) -> f64 {
        self.end - self.start
    }
}

/// Raw engine result: full text plus ordered segments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawTranscription {
    pub text: String,
    #[serde(default)]
    pub segments: Vec<RecognitionSegment>,
    /// Detected or forced language, if the engine reports it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// Distribute a flat word list onto the segments whose time span contains each word's start.
///
/// Words that fall outside every segment are dropped. Segments that receive no
/// words keep `words == None`.
pub fn attach_words(segments: &mut [RecognitionSegment], words: Vec<RecognizedWord>) {
    let mut idx = 0;
    for word in words {
        while idx < segments.len() && word.start >= segments[idx].end {
            idx += 1;
        }
        let Some(segment) = segments.get_mut(idx) else {
            break;
        };
        if word.start < segment.start {
            continue;
        }
        segment.words.get_or_insert_with(Vec::new).push(word);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str, start: f64, end: f64) -> RecognizedWord {
        RecognizedWord {
            word: w.to_string(),
            start,
            end,
            probability: None,
        }
    }

    #[test]
    fn test_segment_keeps_engine_fields() {
        let json = r#"{
            "id": 0, "seek": 0, "start": 0.0, "end": 2.5,
            "text": " Hello there.", "tokens": [50364, 2425],
            "avg_logprob": -0.25, "no_speech_prob": 0.01
        }"#;

        let segment: RecognitionSegment = serde_json::from_str(json).unwrap();
        assert_eq!(segment.text, " Hello there.");
        assert!((segment.duration() - 2.5).abs() < 1e-9);
        assert_eq!(segment.extra.get("seek"), Some(&Value::from(0)));

        let back = serde_json::to_value(&segment).unwrap();
        assert_eq!(back["avg_logprob"], Value::from(-0.25));
        assert!(back.get("words").is_none());
    }

    #[test]
    fn test_attach_words_by_start_time() {
        let mut segments = vec![
            RecognitionSegment::new(0.0, 2.0, " a b"),
            RecognitionSegment::new(2.0, 3.0, " c"),
            RecognitionSegment::new(5.0, 6.0, " d"),
        ];
        let words = vec![
            word("a", 0.0, 0.9),
            word("b", 1.0, 1.9),
            word("c", 2.0, 2.8),
            word("gap", 3.5, 4.0),
            word("d", 5.1, 5.9),
            word("tail", 7.0, 7.5),
        ];

        attach_words(&mut segments, words);

        let names = |s: &RecognitionSegment| -> Vec<String> {
            s.words
                .as_ref()
                .map(|w| w.iter().map(|w| w.word.clone()).collect())
                .unwrap_or_default()
        };
        assert_eq!(names(&segments[0]), vec!["a", "b"]);
        assert_eq!(names(&segments[1]), vec!["c"]);
        assert_eq!(names(&segments[2]), vec!["d"]);
    }
}
