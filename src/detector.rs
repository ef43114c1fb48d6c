// wordshield/src/detector.rs
//! The detector facade: configuration, index lifecycle, and the public
//! query operations.
//!
//! A detector moves between two states: *open* (accepting patterns) and
//! *built* (searchable). `build()` packs the accumulated patterns into the
//! double-array automaton; adding a pattern afterwards reopens the
//! detector until the next `build()`. Queries against an unbuilt detector
//! return an empty, non-sensitive result instead of erroring, so
//! guard-rails can short-circuit cleanly.
//!
//! One reader-writer lock protects the mutable state; the built flag is
//! mirrored in an atomic so readers can bail out without touching the
//! lock when there is nothing to search. Scratch buffers for the hot path
//! come from bounded per-detector pools.
//!
//! License: MIT OR APACHE 2.0

use anyhow::{Context, Result};
use log::{debug, info};
use std::collections::{HashMap, HashSet};
use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use crate::config::{DetectorOptions, FilterStrategy, Level};
use crate::detection::{DetectionResult, DetectorStats, Match};
use crate::errors::WordshieldError;
use crate::loader;
use crate::normalizer::{self, collapse_whitespace, Normalizer};
use crate::pool::BufferPool;
use crate::trie::{DatAutomaton, StagingTrie};

/// Mutable state guarded by the detector's reader-writer lock.
#[derive(Debug)]
struct DetectorInner {
    /// Authoritative pattern set: normalized word → severity. Survives
    /// builds so a later `add_word` + `build` sees every pattern.
    words: HashMap<String, Level>,
    /// The packed index; `None` until the first successful `build`.
    dat: Option<DatAutomaton>,
    /// Authoritative built flag; `built_hint` mirrors it outside the lock.
    built: bool,
}

/// Thread-safe multi-pattern detector.
///
/// Writers (`add_word`, `add_words`, `build`, the `load_dict*` helpers)
/// take the lock exclusively; queries (`detect`, `contains`,
/// `find_first`, `find_all`, `validate`, `filter`, `stats`) share it.
///
/// All offsets in reported matches are code-point offsets into the
/// normalized (and, with `skip_whitespace`, collapsed) input; the
/// rewritten text is produced over that same sequence. Callers that need
/// the original casing or width outside matched spans must overlay it
/// themselves.
#[derive(Debug)]
pub struct Detector {
    opts: DetectorOptions,
    normalizer: Normalizer,
    inner: RwLock<DetectorInner>,
    /// Lock-free fast path for "not built yet"; the flag under the lock
    /// remains authoritative.
    built_hint: AtomicBool,
    char_pool: BufferPool<char>,
    mask_pool: BufferPool<bool>,
}

impl Detector {
    /// Creates a detector with default options (mask strategy, whitespace
    /// skipping on, case-insensitive, no variant folding).
    pub fn new() -> Self {
        Self::with_options(DetectorOptions::default())
    }

    /// Creates a detector with the given options. The options are frozen
    /// here; later mutation of the passed record has no effect.
    pub fn with_options(opts: DetectorOptions) -> Self {
        let normalizer = Normalizer::new(opts.enable_variant, opts.case_sensitive);
        Self {
            opts,
            normalizer,
            inner: RwLock::new(DetectorInner {
                words: HashMap::new(),
                dat: None,
                built: false,
            }),
            built_hint: AtomicBool::new(false),
            char_pool: BufferPool::new(),
            mask_pool: BufferPool::new(),
        }
    }

    /// The options this detector was constructed with.
    pub fn options(&self) -> &DetectorOptions {
        &self.opts
    }

    /// Adds one pattern. The word is normalized under the detector's
    /// profile before insertion; a duplicate normalized word overwrites
    /// the previous severity. The detector reopens until the next
    /// [`build`](Self::build).
    pub fn add_word(&self, word: &str, level: Level) -> Result<(), WordshieldError> {
        if word.is_empty() {
            return Err(WordshieldError::EmptyWord);
        }
        let normalized = self.normalizer.normalize(word);
        if normalized.is_empty() {
            return Err(WordshieldError::NormalizedEmpty(word.to_string()));
        }

        let mut inner = self.inner.write().unwrap();
        inner.words.insert(normalized, level);
        inner.built = false;
        self.built_hint.store(false, Ordering::Release);
        Ok(())
    }

    /// Adds every entry of `words`, stopping at the first invalid one.
    pub fn add_words(&self, words: &HashMap<String, Level>) -> Result<(), WordshieldError> {
        for (word, &level) in words {
            self.add_word(word, level)?;
        }
        Ok(())
    }

    /// Packs the accumulated patterns into the double-array automaton and
    /// marks the detector built. Idempotent: rebuilding without new
    /// patterns is a no-op. Partial builds are never observable — the old
    /// index stays live until the new one replaces it under the lock.
    pub fn build(&self) -> Result<(), WordshieldError> {
        let mut inner = self.inner.write().unwrap();
        if inner.built {
            return Ok(());
        }

        let mut staging = StagingTrie::new();
        for (word, &level) in &inner.words {
            staging.insert(word, level);
        }
        debug!(
            "Packing {} pattern(s) ({} staging nodes) into the double-array index",
            inner.words.len(),
            staging.node_count()
        );
        let dat = DatAutomaton::build(&staging);
        debug!("Packed index high-water mark: {} slots", dat.size());

        // The staging trie is dropped here; the packed automaton is the
        // only surviving index.
        inner.dat = Some(dat);
        inner.built = true;
        self.built_hint.store(true, Ordering::Release);
        Ok(())
    }

    /// Runs the full detection pipeline: normalize, search, and rewrite.
    ///
    /// Empty input yields an empty result. An unbuilt detector echoes the
    /// input back with no matches. When nothing matches, `filtered_text`
    /// is the original input verbatim; when matches exist, it is the
    /// rewrite of the normalized code-point sequence under the configured
    /// strategy.
    pub fn detect(&self, text: &str) -> DetectionResult {
        if text.is_empty() {
            return DetectionResult::default();
        }
        if !self.built_hint.load(Ordering::Acquire) {
            return DetectionResult::clean(text);
        }

        let mut buf = self.char_pool.acquire(text.len());
        self.normalizer.normalize_into(text, &mut buf);
        if self.opts.skip_whitespace {
            collapse_whitespace(&mut buf);
        }

        let matches = {
            let inner = self.inner.read().unwrap();
            if inner.built {
                inner.dat.as_ref().map(|dat| dat.search(&buf))
            } else {
                None
            }
        };
        let Some(matches) = matches else {
            // Lost the race with a writer: the hint said built, the lock
            // says otherwise. The authoritative answer wins.
            self.char_pool.release(buf);
            return DetectionResult::clean(text);
        };

        if matches.is_empty() {
            self.char_pool.release(buf);
            return DetectionResult::clean(text);
        }

        let filtered_text = self.rewrite(&buf, &matches);
        self.char_pool.release(buf);

        DetectionResult {
            has_match: true,
            matches,
            filtered_text,
        }
    }

    /// Applies the configured strategy over the matched spans: a bitmap
    /// marks every covered code point, then a single streaming pass emits
    /// the replacement (or nothing, for `Remove`) inside spans and the
    /// original code point outside them.
    fn rewrite(&self, text: &[char], matches: &[Match]) -> String {
        let n = text.len();
        let mut mask = self.mask_pool.acquire(n);
        mask.resize(n, false);
        for m in matches {
            for flag in &mut mask[m.start..m.end.min(n)] {
                *flag = true;
            }
        }

        let replace_char = match self.opts.strategy {
            FilterStrategy::Mask => '*',
            _ => self.opts.replace_char,
        };

        let mut out = self.char_pool.acquire(n);
        for (i, &c) in text.iter().enumerate() {
            if mask[i] {
                if self.opts.strategy != FilterStrategy::Remove {
                    out.push(replace_char);
                }
            } else {
                out.push(c);
            }
        }
        let filtered: String = out.iter().collect();

        self.char_pool.release(out);
        self.mask_pool.release(mask);
        filtered
    }

    /// Returns `true` as soon as any pattern occurs in `text`, without
    /// materializing matches. Allocation-free apart from the pooled
    /// normalization buffer.
    pub fn contains(&self, text: &str) -> bool {
        if text.is_empty() || !self.built_hint.load(Ordering::Acquire) {
            return false;
        }

        let mut buf = self.char_pool.acquire(text.len());
        self.normalizer.normalize_into(text, &mut buf);
        if self.opts.skip_whitespace {
            collapse_whitespace(&mut buf);
        }

        let found = {
            let inner = self.inner.read().unwrap();
            match (&inner.dat, inner.built) {
                (Some(dat), true) => dat.contains(&buf),
                _ => false,
            }
        };
        self.char_pool.release(buf);
        found
    }

    /// The earliest match by end position, or `None`.
    pub fn find_first(&self, text: &str) -> Option<Match> {
        if text.is_empty() || !self.built_hint.load(Ordering::Acquire) {
            return None;
        }

        let mut buf = self.char_pool.acquire(text.len());
        self.normalizer.normalize_into(text, &mut buf);
        if self.opts.skip_whitespace {
            collapse_whitespace(&mut buf);
        }

        let first = {
            let inner = self.inner.read().unwrap();
            match (&inner.dat, inner.built) {
                (Some(dat), true) => dat.find_first(&buf),
                _ => None,
            }
        };
        self.char_pool.release(buf);
        first
    }

    /// The distinct matched words, in first-seen order.
    pub fn find_all(&self, text: &str) -> Vec<String> {
        let result = self.detect(text);
        if !result.has_match {
            return Vec::new();
        }

        let mut seen: HashSet<&str> = HashSet::with_capacity(result.matches.len());
        let mut words = Vec::new();
        for m in &result.matches {
            if seen.insert(m.word.as_str()) {
                words.push(m.word.clone());
            }
        }
        words
    }

    /// Whether `text` contains any pattern; equivalent to
    /// `detect(text).has_match`.
    pub fn validate(&self, text: &str) -> bool {
        self.detect(text).has_match
    }

    /// The rewritten text alone; equivalent to
    /// `detect(text).filtered_text`.
    pub fn filter(&self, text: &str) -> String {
        self.detect(text).filtered_text
    }

    /// Diagnostic counters. `dat_size` and `memory_bytes` are zero until
    /// the first build.
    pub fn stats(&self) -> DetectorStats {
        let inner = self.inner.read().unwrap();
        DetectorStats {
            total_words: inner.words.len(),
            dat_size: inner.dat.as_ref().map_or(0, DatAutomaton::size),
            memory_bytes: inner.dat.as_ref().map_or(0, DatAutomaton::memory_bytes),
        }
    }

    /// Whether variant folding is both enabled on this detector and backed
    /// by a loaded table.
    pub fn is_variant_enabled(&self) -> bool {
        self.opts.enable_variant && normalizer::is_variant_loaded()
    }

    /// Loads a dictionary file, inferring the severity from the file name
    /// (`high_*` → High, `low_*` → Low, otherwise Medium).
    pub fn load_dict<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let level = loader::infer_level(path.as_ref());
        self.load_dict_with_level(path, level)
    }

    /// Loads a dictionary file with an explicit severity.
    pub fn load_dict_with_level<P: AsRef<Path>>(&self, path: P, level: Level) -> Result<()> {
        let path = path.as_ref();
        let words = loader::load_dict_file(path)?;
        info!(
            "Loaded {} word(s) from {} at level {}",
            words.len(),
            path.display(),
            level
        );
        for word in &words {
            self.add_word(word, level)
                .with_context(|| format!("failed to add word from {}", path.display()))?;
        }
        Ok(())
    }

    /// Fetches a dictionary over HTTP, inferring the severity from the
    /// final path component of the URL.
    pub fn load_dict_from_url(&self, url: &str) -> Result<()> {
        let level = loader::infer_level(Path::new(url));
        self.load_dict_from_url_with_level(url, level)
    }

    /// Fetches a dictionary over HTTP with an explicit severity.
    pub fn load_dict_from_url_with_level(&self, url: &str, level: Level) -> Result<()> {
        let words = loader::load_dict_url(url)?;
        info!("Loaded {} word(s) from {} at level {}", words.len(), url, level);
        for word in &words {
            self.add_word(word, level)
                .with_context(|| format!("failed to add word from {url}"))?;
        }
        Ok(())
    }

    /// Fetches several dictionaries, stopping at the first failure.
    pub fn load_dict_from_urls(&self, urls: &[&str]) -> Result<()> {
        for url in urls {
            self.load_dict_from_url(url)?;
        }
        Ok(())
    }

    /// Replaces the process-global variant folding table. Affects every
    /// detector with variant folding enabled.
    pub fn load_variant_map<P: AsRef<Path>>(&self, path: P) -> Result<(), WordshieldError> {
        normalizer::load_variant_map(path)
    }
}

impl Default for Detector {
    fn default() -> Self {
        Self::new()
    }
}
