// wordshield/src/detection.rs
//! Core data structures for reporting detection results.
//!
//! License: MIT OR APACHE 2.0

use serde::{Deserialize, Serialize};

use crate::config::Level;

/// A single occurrence of a dictionary pattern in the searched text.
///
/// `word` is the pattern's *normalized* text. `start` and `end` are
/// code-point offsets into the normalized (and, when whitespace skipping
/// is enabled, collapsed) input; `end` is exclusive and
/// `end - start == word.chars().count()`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Match {
    pub word: String,
    pub start: usize,
    pub end: usize,
    pub level: Level,
}

/// The outcome of a [`detect`](crate::Detector::detect) call.
///
/// When nothing matched (or the index is not yet built), `filtered_text`
/// is the original input verbatim. When matches exist, it is the rewrite
/// of the normalized input under the configured
/// [`FilterStrategy`](crate::config::FilterStrategy).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DetectionResult {
    pub has_match: bool,
    pub matches: Vec<Match>,
    pub filtered_text: String,
}

impl DetectionResult {
    /// A result carrying no matches, echoing `text` unchanged.
    pub(crate) fn clean(text: &str) -> Self {
        Self {
            has_match: false,
            matches: Vec::new(),
            filtered_text: text.to_string(),
        }
    }
}

/// Diagnostic counters for a built detector.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct DetectorStats {
    /// Number of distinct normalized patterns in the index.
    pub total_words: usize,
    /// High-water mark of the packed double-array (highest used slot + 1).
    pub dat_size: usize,
    /// Approximate resident size of the packed arrays, in bytes.
    pub memory_bytes: u64,
}
