//! Transcript analysis results and how they seed AI cuts.
//!
//! The analyzer itself runs elsewhere; this module only understands its
//! output (word timings, filler flags, silence spans) and maps it onto the
//! cut list.

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::cut::CutKind;
use crate::cut_list::CutListModel;
use crate::interval::Interval;

/// Words treated as fillers when the analyzer does not flag them itself.
const FILLER_WORDS: &[&str] = &[
    "um", "umm", "uh", "uhh", "er", "erm", "ah", "hmm", "mm", "like", "basically", "actually",
    "literally", "you know", "i mean", "sort of", "kind of",
];

/// A transcribed word with timing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TranscriptWord {
    pub word: String,
    /// Start time in seconds.
    pub start: f64,
    /// End time in seconds.
    pub end: f64,
    /// Analyzer filler classification; `None` falls back to the built-in
    /// filler lexicon.
    #[serde(default, rename = "isFiller", alias = "is_filler")]
    pub is_filler: Option<bool>,
}

impl TranscriptWord {
    pub fn is_filler(&self) -> bool {
        self.is_filler.unwrap_or_else(|| is_filler_word(&self.word))
    }
}

/// A pause reported by the analyzer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SilenceSpan {
    pub start: f64,
    pub end: f64,
    /// Reported duration; recomputed from `end - start` when missing.
    #[serde(default)]
    pub duration: Option<f64>,
}

impl SilenceSpan {
    pub fn duration(&self) -> f64 {
        self.duration.unwrap_or(self.end - self.start).max(0.0)
    }
}

/// Output of one analysis pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Transcript {
    #[serde(default)]
    pub words: Vec<TranscriptWord>,
    #[serde(default)]
    pub silences: Vec<SilenceSpan>,
}

impl Transcript {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty() && self.silences.is_empty()
    }

    /// Filler words as AI cut spans.
    pub fn filler_spans(&self) -> impl Iterator<Item = (CutKind, Interval, String)> + '_ {
        self.words.iter().filter(|w| w.is_filler()).map(|w| {
            (
                CutKind::Filler,
                Interval::new(w.start, w.end),
                w.word.trim().to_string(),
            )
        })
    }

    /// Silences as AI cut spans.
    pub fn silence_spans(&self) -> impl Iterator<Item = (CutKind, Interval, String)> + '_ {
        self.silences.iter().map(|s| {
            (
                CutKind::Silence,
                Interval::new(s.start, s.end),
                format!("{:.1}s silence", s.duration()),
            )
        })
    }
}

/// Whether `word` is a common spoken filler.
pub fn is_filler_word(word: &str) -> bool {
    let normalized: String = word
        .trim()
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .to_lowercase();
    FILLER_WORDS.contains(&normalized.as_str())
}

/// Derive silences from the gaps between words.
///
/// Gaps shorter than `min_gap` are ignored. `padding` seconds of each gap
/// are left on either side so speech onsets are not clipped; the leading gap
/// keeps padding only before the first word and the trailing gap only after
/// the last word.
pub fn detect_word_gap_silences(
    words: &[TranscriptWord],
    duration: f64,
    min_gap: f64,
    padding: f64,
) -> Vec<SilenceSpan> {
    let mut ordered: Vec<&TranscriptWord> = words.iter().collect();
    ordered.sort_by(|a, b| a.start.total_cmp(&b.start));

    let (Some(first), Some(last)) = (ordered.first(), ordered.last()) else {
        return Vec::new();
    };

    let mut silences = Vec::new();
    let mut push = |start: f64, end: f64| {
        if end > start {
            silences.push(SilenceSpan {
                start,
                end,
                duration: Some(end - start),
            });
        }
    };

    if first.start >= min_gap + padding {
        push(0.0, first.start - padding);
    }

    for pair in ordered.windows(2) {
        let gap_start = pair[0].end;
        let gap_end = pair[1].start;
        if gap_end - gap_start >= min_gap {
            push(gap_start + padding, gap_end - padding);
        }
    }

    let tail_start = ordered.iter().map(|w| w.end).fold(last.end, f64::max);
    if duration - tail_start >= min_gap + padding {
        push(tail_start + padding, duration);
    }

    silences
}

impl CutListModel {
    /// Seed AI cuts from an analysis pass.
    ///
    /// A failed or empty analysis leaves the model with zero AI cuts; manual
    /// editing is unaffected. Returns the number of AI cuts created.
    pub fn seed_from_analysis<E: Display>(&mut self, analysis: Result<Transcript, E>) -> usize {
        let transcript = match analysis {
            Ok(t) if !t.is_empty() => t,
            Ok(_) => {
                tracing::warn!("Transcript analysis returned nothing; continuing without AI cuts");
                self.replace_ai_cuts(std::iter::empty());
                return 0;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Transcript analysis unavailable; continuing without AI cuts");
                self.replace_ai_cuts(std::iter::empty());
                return 0;
            }
        };

        let created =
            self.replace_ai_cuts(transcript.filler_spans().chain(transcript.silence_spans()));
        tracing::info!(
            words = transcript.words.len(),
            silences = transcript.silences.len(),
            ai_cuts = created,
            "Seeded AI cuts from transcript"
        );
        created
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, start: f64, end: f64) -> TranscriptWord {
        TranscriptWord {
            word: text.to_string(),
            start,
            end,
            is_filler: None,
        }
    }

    #[test]
    fn test_parse_analyzer_json() {
        let json = r#"{
            "words": [
                {"word": "So", "start": 0.0, "end": 0.3, "isFiller": false},
                {"word": "um", "start": 0.4, "end": 0.7, "isFiller": true}
            ],
            "silences": [{"start": 1.0, "end": 2.5, "duration": 1.5}]
        }"#;
        let transcript = Transcript::from_json(json).unwrap();
        assert_eq!(transcript.words.len(), 2);
        assert!(transcript.words[1].is_filler());
        assert!((transcript.silences[0].duration() - 1.5).abs() < 1e-9);
    }

    #[test]
    fn test_filler_lexicon() {
        assert!(is_filler_word("Um,"));
        assert!(is_filler_word("  uh "));
        assert!(!is_filler_word("umbrella"));
        assert!(word("like", 0.0, 0.2).is_filler());
    }

    #[test]
    fn test_explicit_flag_overrides_lexicon() {
        let mut w = word("like", 0.0, 0.2);
        w.is_filler = Some(false);
        assert!(!w.is_filler());
    }

    #[test]
    fn test_seed_maps_fillers_and_silences() {
        let transcript = Transcript {
            words: vec![word("Hello", 0.0, 0.5), word("um", 0.6, 0.9)],
            silences: vec![SilenceSpan {
                start: 2.0,
                end: 3.2,
                duration: None,
            }],
        };
        let mut model = CutListModel::new(10.0).unwrap();
        let created = model.seed_from_analysis(Ok::<_, String>(transcript));

        assert_eq!(created, 2);
        let kinds: Vec<CutKind> = model.cuts().iter().map(|c| c.kind).collect();
        assert_eq!(kinds, vec![CutKind::Filler, CutKind::Silence]);
        assert!(model.cuts().iter().all(|c| c.enabled));
        assert_eq!(model.cuts()[0].label, "um");
        assert_eq!(model.cuts()[1].label, "1.2s silence");
    }

    #[test]
    fn test_failed_analysis_degrades_to_manual_only() {
        let mut model = CutListModel::new(10.0).unwrap();
        model.add_manual_cut(1.0, 2.0).unwrap();

        let created = model.seed_from_analysis(Err::<Transcript, _>("service down"));
        assert_eq!(created, 0);
        assert_eq!(model.ai_cuts().count(), 0);
        assert_eq!(model.manual_cuts().count(), 1);
        assert!(model.add_manual_cut(4.0, 5.0).is_ok());
    }

    #[test]
    fn test_reanalysis_replaces_previous_ai_cuts() {
        let mut model = CutListModel::new(10.0).unwrap();
        let first = Transcript {
            words: vec![word("uh", 1.0, 1.2)],
            silences: vec![],
        };
        model.seed_from_analysis(Ok::<_, String>(first));
        model.seed_from_analysis(Ok::<_, String>(Transcript::default()));
        assert_eq!(model.ai_cuts().count(), 0);
    }

    #[test]
    fn test_detect_word_gap_silences() {
        let words = vec![
            word("one", 2.0, 2.5),
            word("two", 2.6, 3.0),
            word("three", 5.0, 5.4),
        ];
        let silences = detect_word_gap_silences(&words, 10.0, 1.0, 0.1);

        let spans: Vec<(f64, f64)> = silences.iter().map(|s| (s.start, s.end)).collect();
        assert_eq!(spans.len(), 3);
        assert!((spans[0].0 - 0.0).abs() < 1e-9 && (spans[0].1 - 1.9).abs() < 1e-9);
        assert!((spans[1].0 - 3.1).abs() < 1e-9 && (spans[1].1 - 4.9).abs() < 1e-9);
        assert!((spans[2].0 - 5.5).abs() < 1e-9 && (spans[2].1 - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_detect_word_gap_silences_empty() {
        assert!(detect_word_gap_silences(&[], 10.0, 1.0, 0.1).is_empty());
    }
}
