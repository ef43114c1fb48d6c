//! Configuration types for `wordshield`.
//!
//! This module defines the severity levels attached to dictionary patterns,
//! the rewrite strategies applied to matched spans, and the frozen
//! `DetectorOptions` record a detector observes at construction time.
//!
//! License: MIT OR Apache-2.0

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::WordshieldError;

/// Severity label attached to every dictionary pattern.
///
/// Levels are ordered (`Low < Medium < High`) and map to the integers
/// 1..=3; any other integer is rejected by `TryFrom<i64>`. The
/// matching algorithm itself never looks at the level — it is carried
/// through to [`Match`](crate::detection::Match) so callers can
/// differentiate policy actions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Level {
    Low = 1,
    Medium = 2,
    High = 3,
}

impl Level {
    /// Returns the numeric form of the level (1..=3).
    pub fn as_i64(self) -> i64 {
        self as i64
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Level::Low => "Low",
            Level::Medium => "Medium",
            Level::High => "High",
        };
        f.write_str(s)
    }
}

impl TryFrom<i64> for Level {
    type Error = WordshieldError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Low),
            2 => Ok(Level::Medium),
            3 => Ok(Level::High),
            other => Err(WordshieldError::InvalidLevel(other)),
        }
    }
}

/// What the rewrite pass emits for code points covered by a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum FilterStrategy {
    /// Replace every matched code point with `'*'`.
    #[default]
    Mask,
    /// Drop matched code points entirely.
    Remove,
    /// Replace every matched code point with the configured replacement.
    Replace,
}

/// Frozen configuration observed by a [`Detector`](crate::Detector) at
/// construction. Mutating a copy after the detector exists has no effect
/// on that detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DetectorOptions {
    /// Rewrite strategy for [`detect`](crate::Detector::detect) and
    /// [`filter`](crate::Detector::filter).
    pub strategy: FilterStrategy,
    /// Replacement code point used by [`FilterStrategy::Replace`].
    /// Ignored by `Mask`, which always emits `'*'`.
    pub replace_char: char,
    /// When enabled, runs of Unicode whitespace in the *query* text are
    /// collapsed to a single space (`U+0020`) after normalization and
    /// before search. Match offsets and the rewritten text then refer to
    /// the collapsed text. Insertion normalization is never affected, so
    /// a pattern containing a whitespace run of length two or more cannot
    /// match while this flag is on.
    pub skip_whitespace: bool,
    /// Fold code points through the process-global variant table (e.g.
    /// traditional → simplified Han) before case and width folding.
    pub enable_variant: bool,
    /// When `true`, no case folding is applied; patterns and text must
    /// match case-exactly.
    pub case_sensitive: bool,
}

impl Default for DetectorOptions {
    fn default() -> Self {
        Self {
            strategy: FilterStrategy::Mask,
            replace_char: '*',
            skip_whitespace: true,
            enable_variant: false,
            case_sensitive: false,
        }
    }
}

impl DetectorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(mut self, strategy: FilterStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    pub fn with_replace_char(mut self, replace_char: char) -> Self {
        self.replace_char = replace_char;
        self
    }

    pub fn with_skip_whitespace(mut self, skip: bool) -> Self {
        self.skip_whitespace = skip;
        self
    }

    pub fn with_variant(mut self, enable: bool) -> Self {
        self.enable_variant = enable;
        self
    }

    pub fn with_case_sensitive(mut self, sensitive: bool) -> Self {
        self.case_sensitive = sensitive;
        self
    }
}
