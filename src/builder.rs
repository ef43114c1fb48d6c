// wordshield/src/builder.rs
//! Fluent, error-accumulating construction of a [`Detector`].
//!
//! The builder records option mutations and dictionary operations without
//! executing them; `build()` constructs the detector with the final
//! options and replays the operations in order, so an option set after a
//! `load_dict` call still applies to every pattern. Errors do not abort
//! the chain — they accumulate and surface at `build()`, joined into a
//! single [`WordshieldError::Build`].
//!
//! License: MIT OR APACHE 2.0

use std::collections::HashMap;
use std::path::PathBuf;

use crate::config::{DetectorOptions, FilterStrategy, Level};
use crate::detector::Detector;
use crate::errors::WordshieldError;
use crate::normalizer;

enum PendingOp {
    AddWord(String, Level),
    AddWords(HashMap<String, Level>),
    LoadDict(PathBuf),
    LoadDictWithLevel(PathBuf, Level),
    LoadDictFromUrl(String),
    LoadDictFromUrlWithLevel(String, Level),
    LoadVariantMap(PathBuf),
}

/// Accumulates options and dictionary sources, then builds a ready
/// detector in one shot.
///
/// ```rust
/// use wordshield::{DetectorBuilder, FilterStrategy, Level};
///
/// let detector = DetectorBuilder::new()
///     .with_filter_strategy(FilterStrategy::Replace)
///     .with_replace_char('#')
///     .add_word("bad", Level::High)
///     .must_build();
/// assert_eq!(detector.filter("this is bad"), "this is ###");
/// ```
pub struct DetectorBuilder {
    opts: DetectorOptions,
    ops: Vec<PendingOp>,
}

impl DetectorBuilder {
    pub fn new() -> Self {
        Self::with_options(DetectorOptions::default())
    }

    pub fn with_options(opts: DetectorOptions) -> Self {
        Self {
            opts,
            ops: Vec::new(),
        }
    }

    pub fn add_word(mut self, word: &str, level: Level) -> Self {
        self.ops.push(PendingOp::AddWord(word.to_string(), level));
        self
    }

    pub fn add_words(mut self, words: HashMap<String, Level>) -> Self {
        self.ops.push(PendingOp::AddWords(words));
        self
    }

    pub fn load_dict<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ops.push(PendingOp::LoadDict(path.into()));
        self
    }

    pub fn load_dict_with_level<P: Into<PathBuf>>(mut self, path: P, level: Level) -> Self {
        self.ops.push(PendingOp::LoadDictWithLevel(path.into(), level));
        self
    }

    pub fn load_dict_from_url(mut self, url: &str) -> Self {
        self.ops.push(PendingOp::LoadDictFromUrl(url.to_string()));
        self
    }

    pub fn load_dict_from_url_with_level(mut self, url: &str, level: Level) -> Self {
        self.ops
            .push(PendingOp::LoadDictFromUrlWithLevel(url.to_string(), level));
        self
    }

    pub fn load_dict_from_urls(mut self, urls: &[&str]) -> Self {
        for url in urls {
            self.ops.push(PendingOp::LoadDictFromUrl(url.to_string()));
        }
        self
    }

    pub fn load_variant_map<P: Into<PathBuf>>(mut self, path: P) -> Self {
        self.ops.push(PendingOp::LoadVariantMap(path.into()));
        self
    }

    pub fn with_filter_strategy(mut self, strategy: FilterStrategy) -> Self {
        self.opts.strategy = strategy;
        self
    }

    pub fn with_replace_char(mut self, replace_char: char) -> Self {
        self.opts.replace_char = replace_char;
        self
    }

    pub fn with_skip_whitespace(mut self, skip: bool) -> Self {
        self.opts.skip_whitespace = skip;
        self
    }

    pub fn with_variant(mut self, enable: bool) -> Self {
        self.opts.enable_variant = enable;
        self
    }

    pub fn with_case_sensitive(mut self, sensitive: bool) -> Self {
        self.opts.case_sensitive = sensitive;
        self
    }

    /// Constructs the detector, replays every recorded operation, and
    /// packs the index. If any operation failed, the detector is not
    /// returned; all failures are joined into one error.
    pub fn build(self) -> Result<Detector, WordshieldError> {
        let detector = Detector::with_options(self.opts);
        let mut errors: Vec<String> = Vec::new();

        for op in self.ops {
            let result = match op {
                PendingOp::AddWord(word, level) => {
                    detector.add_word(&word, level).map_err(anyhow::Error::from)
                }
                PendingOp::AddWords(words) => {
                    detector.add_words(&words).map_err(anyhow::Error::from)
                }
                PendingOp::LoadDict(path) => detector.load_dict(&path),
                PendingOp::LoadDictWithLevel(path, level) => {
                    detector.load_dict_with_level(&path, level)
                }
                PendingOp::LoadDictFromUrl(url) => detector.load_dict_from_url(&url),
                PendingOp::LoadDictFromUrlWithLevel(url, level) => {
                    detector.load_dict_from_url_with_level(&url, level)
                }
                PendingOp::LoadVariantMap(path) => {
                    normalizer::load_variant_map(&path).map_err(anyhow::Error::from)
                }
            };
            if let Err(e) = result {
                errors.push(format!("{e:#}"));
            }
        }

        if !errors.is_empty() {
            return Err(WordshieldError::Build(format!(
                "{} operation(s) failed:\n{}",
                errors.len(),
                errors.join("\n")
            )));
        }

        detector.build()?;
        Ok(detector)
    }

    /// Like [`build`](Self::build), but panics on error. Convenient for
    /// static dictionaries known to be valid.
    pub fn must_build(self) -> Detector {
        match self.build() {
            Ok(detector) => detector,
            Err(e) => panic!("wordshield builder failed: {e}"),
        }
    }
}

impl Default for DetectorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
