//! Subtitle synthesis from recognizer segments.
//!
//! Two modes, selected by `words_per_line`:
//!
//! - `0`: one cue per segment, timings copied from the segment.
//! - `n > 0`: every segment's words are flattened into one list, each word gets
//!   a uniform share of its segment's duration, and the list is cut into cues
//!   of exactly `n` words (the last cue may be shorter). Cues may straddle
//!   segment boundaries.

use serde::{Deserialize, Serialize};

use crate::segment::RecognitionSegment;
use crate::timestamp::format_srt_timestamp;

/// One timed caption entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtitleCue {
    /// 1-based, contiguous position in the track
    pub index: usize,
    pub start: f64,
    pub end: f64,
    pub text: String,
}

impl SubtitleCue {
    /// Render this cue as an SRT block numbered `index`, including the
    /// trailing blank line.
    pub fn to_srt_block(&self, index: usize) -> String {
        format!(
            "{}\n{} --> {}\n{}\n\n",
            index,
            format_srt_timestamp(self.start),
            format_srt_timestamp(self.end),
            self.text
        )
    }

    /// A cue an SRT reader can show: some text and a positive duration.
    pub fn is_displayable(&self) -> bool {
        !self.text.trim().is_empty() && self.start < self.end
    }
}

/// Ordered sequence of cues.
///
/// Starts never decrease from one cue to the next and every cue has
/// `start <= end` as long as the input segments do.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SubtitleTrack {
    cues: Vec<SubtitleCue>,
}

impl SubtitleTrack {
    pub fn cues(&self) -> &[SubtitleCue] {
        &self.cues
    }

    pub fn len(&self) -> usize {
        self.cues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubtitleCue> {
        self.cues.iter()
    }

    /// Append a cue, numbering it after the current last cue.
    fn push(&mut self, start: f64, end: f64, text: String) {
        let index = self.cues.len() + 1;
        self.cues.push(SubtitleCue {
            index,
            start,
            end,
            text,
        });
    }

    /// Compose the whole track in SRT format (blank line between cues).
    ///
    /// Cues without text or with `start >= end` are left out and the rest
    /// are renumbered from 1. The track itself keeps every cue.
    pub fn to_srt(&self) -> String {
        self.cues
            .iter()
            .filter(|cue| cue.is_displayable())
            .enumerate()
            .map(|(i, cue)| cue.to_srt_block(i + 1))
            .collect()
    }
}

impl IntoIterator for SubtitleTrack {
    type Item = SubtitleCue;
    type IntoIter = std::vec::IntoIter<SubtitleCue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.into_iter()
    }
}

impl<'a> IntoIterator for &'a SubtitleTrack {
    type Item = &'a SubtitleCue;
    type IntoIter = std::slice::Iter<'a, SubtitleCue>;

    fn into_iter(self) -> Self::IntoIter {
        self.cues.iter()
    }
}

/// Build a subtitle track from ordered recognizer segments.
pub fn synthesize(segments: &[RecognitionSegment], words_per_line: usize) -> SubtitleTrack {
    if words_per_line == 0 {
        per_segment(segments)
    } else {
        fixed_word_count(segments, words_per_line)
    }
}

fn per_segment(segments: &[RecognitionSegment]) -> SubtitleTrack {
    let mut track = SubtitleTrack::default();
    for segment in segments {
        track.push(segment.start, segment.end, segment.text.trim().to_string());
    }
    track
}

fn fixed_word_count(segments: &[RecognitionSegment], words_per_line: usize) -> SubtitleTrack {
    let (words, timings) = interpolate_words(segments);
    let mut track = SubtitleTrack::default();

    let Some(last_timing) = timings.len().checked_sub(1) else {
        return track;
    };

    for (chunk_idx, chunk) in words.chunks(words_per_line).enumerate() {
        let first = chunk_idx * words_per_line;
        let last = (first + chunk.len() - 1).min(last_timing);

        track.push(timings[first].0, timings[last].1, chunk.join(" "));
    }

    track
}

/// Flatten segment words and give each a uniform slice of its segment.
///
/// Word `i` of a segment with `k` words spans
/// `[start + i*D/k, start + (i+1)*D/k)` where `D` is the segment duration.
/// Segments without words contribute nothing.
fn interpolate_words(segments: &[RecognitionSegment]) -> (Vec<&str>, Vec<(f64, f64)>) {
    let mut words = Vec::new();
    let mut timings = Vec::new();

    for segment in segments {
        let segment_words: Vec<&str> = segment.text.split_whitespace().collect();
        if segment_words.is_empty() {
            continue;
        }

        let step = segment.duration() / segment_words.len() as f64;
        for (i, word) in segment_words.into_iter().enumerate() {
            let start = segment.start + i as f64 * step;
            let end = segment.start + (i + 1) as f64 * step;
            timings.push((start, end));
            words.push(word);
        }
    }

    (words, timings)
}
