// wordshield/src/errors.rs
//! Custom error types for the `wordshield` library.
//!
//! This module defines a structured error enum for the library, providing
//! specific, actionable error types that can be handled programmatically.
//!
//! License: MIT OR APACHE 2.0

use thiserror::Error;

/// This enum represents all possible error types in the `wordshield` library.
///
/// By using `#[non_exhaustive]`, we signal to consumers of this library that
/// new variants may be added in future versions. This prevents them from
/// matching all variants exhaustively, thus avoiding breaking changes.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum WordshieldError {
    #[error("word is empty")]
    EmptyWord,

    #[error("word '{0}' normalizes to an empty string")]
    NormalizedEmpty(String),

    #[error("invalid severity level: {0} (expected 1..=3)")]
    InvalidLevel(i64),

    #[error("failed to fetch dictionary from '{url}': HTTP status {status}")]
    DictFetch { url: String, status: u16 },

    #[error("failed to build detector:\n{0}")]
    Build(String),

    #[error("An unexpected I/O error occurred: {0}")]
    IoError(#[from] std::io::Error),

    #[error("A critical system error occurred: {0}")]
    AnyhowWrapper(#[from] anyhow::Error),
}
