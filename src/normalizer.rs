// wordshield/src/normalizer.rs
//! Text normalization shared by pattern insertion and search.
//!
//! The normalizer maps a raw string to a canonical code-point sequence.
//! The same profile must be applied when a pattern is inserted and when
//! text is searched; a pattern indexed under one profile only matches text
//! normalized under that profile. Three per-code-point transforms run in
//! order:
//!
//! 1. Variant folding (optional): substitute through the process-global
//!    variant table (e.g. traditional → simplified Han).
//! 2. Case folding (optional): the code point's single lowercase form.
//! 3. Width folding (always): full-width ASCII `U+FF01..=U+FF5E` shifts to
//!    its half-width equivalent, ideographic space `U+3000` becomes `U+0020`.
//!
//! The variant table is process-global and write-once per load: readers
//! take an `Arc` snapshot, and [`load_variant_map`] swaps the whole table
//! atomically.
//!
//! License: MIT OR APACHE 2.0

use lazy_static::lazy_static;
use log::{info, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::{Arc, RwLock};

use crate::errors::WordshieldError;

lazy_static! {
    /// Process-global variant folding table. `None` until a map is loaded.
    /// Readers clone the `Arc` so an in-flight normalization always sees a
    /// consistent snapshot even while a new table is being installed.
    static ref VARIANT_TABLE: RwLock<Option<Arc<HashMap<char, char>>>> = RwLock::new(None);
}

/// Loads a variant folding table, replacing the current one atomically.
///
/// The file is UTF-8, one pair per line, `source<TAB>target`, each side
/// exactly one code point after trimming. Blank lines and `#` comments are
/// skipped; malformed lines are skipped with a warning.
pub fn load_variant_map<P: AsRef<Path>>(path: P) -> Result<(), WordshieldError> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut table: HashMap<char, char> = HashMap::new();
    let mut skipped = 0usize;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_variant_line(line) {
            Some((source, target)) => {
                table.insert(source, target);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        warn!(
            "Skipped {} malformed line(s) in variant map {}",
            skipped,
            path.display()
        );
    }
    info!(
        "Loaded {} variant pair(s) from {}",
        table.len(),
        path.display()
    );

    *VARIANT_TABLE.write().unwrap() = Some(Arc::new(table));
    Ok(())
}

/// Returns `true` once a non-empty variant table has been loaded.
pub fn is_variant_loaded() -> bool {
    VARIANT_TABLE
        .read()
        .unwrap()
        .as_ref()
        .is_some_and(|t| !t.is_empty())
}

fn variant_snapshot() -> Option<Arc<HashMap<char, char>>> {
    VARIANT_TABLE.read().unwrap().clone()
}

/// Parses one `source<TAB>target` pair; both sides must trim to exactly
/// one code point.
fn parse_variant_line(line: &str) -> Option<(char, char)> {
    let mut parts = line.split('\t');
    let source = parts.next()?.trim();
    let target = parts.next()?.trim();
    if parts.next().is_some() {
        return None;
    }
    let source = single_char(source)?;
    let target = single_char(target)?;
    Some((source, target))
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// Canonicalizes raw strings into the code-point form used by the index.
///
/// A normalizer is cheap to construct and copy; it carries only the two
/// profile flags. The variant table is consulted through a per-call
/// snapshot of the process-global table.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    enable_variant: bool,
    case_sensitive: bool,
}

impl Normalizer {
    pub fn new(enable_variant: bool, case_sensitive: bool) -> Self {
        Self {
            enable_variant,
            case_sensitive,
        }
    }

    /// Produces a new normalized string.
    pub fn normalize(&self, text: &str) -> String {
        let table = self.table();
        text.chars()
            .map(|c| self.fold(c, table.as_deref()))
            .collect()
    }

    /// Writes the normalized code points of `text` into `buf` (cleared
    /// first) and returns them as a slice. This is the allocation-free
    /// entry point for hot paths reusing pooled buffers.
    pub fn normalize_into<'a>(&self, text: &str, buf: &'a mut Vec<char>) -> &'a [char] {
        buf.clear();
        let table = self.table();
        for c in text.chars() {
            buf.push(self.fold(c, table.as_deref()));
        }
        buf.as_slice()
    }

    fn table(&self) -> Option<Arc<HashMap<char, char>>> {
        if self.enable_variant {
            variant_snapshot()
        } else {
            None
        }
    }

    fn fold(&self, c: char, table: Option<&HashMap<char, char>>) -> char {
        let mut c = c;
        if let Some(table) = table {
            if let Some(&target) = table.get(&c) {
                c = target;
            }
        }
        if !self.case_sensitive {
            c = fold_case(c);
        }
        fold_width(c)
    }
}

/// Single-code-point lowercase mapping. ASCII takes the fast path;
/// multi-scalar expansions (e.g. `İ`) pass through unchanged so the
/// pipeline stays one code point to one code point.
fn fold_case(c: char) -> char {
    if c.is_ascii() {
        return c.to_ascii_lowercase();
    }
    let mut lower = c.to_lowercase();
    match (lower.next(), lower.next()) {
        (Some(l), None) => l,
        _ => c,
    }
}

/// Full-width ASCII block to half-width; ideographic space to space.
fn fold_width(c: char) -> char {
    match c {
        '\u{FF01}'..='\u{FF5E}' => char::from_u32(c as u32 - 0xFEE0).unwrap_or(c),
        '\u{3000}' => ' ',
        _ => c,
    }
}

/// Collapses every run of Unicode whitespace in `buf` to a single space,
/// in place. Applied to query text when whitespace skipping is enabled.
pub(crate) fn collapse_whitespace(buf: &mut Vec<char>) {
    let mut write = 0usize;
    let mut in_run = false;
    for read in 0..buf.len() {
        let c = buf[read];
        if c.is_whitespace() {
            if !in_run {
                buf[write] = ' ';
                write += 1;
                in_run = true;
            }
        } else {
            buf[write] = c;
            write += 1;
            in_run = false;
        }
    }
    buf.truncate(write);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_folding() {
        let n = Normalizer::new(false, true);
        // Width folding applies even when case folding is off.
        assert_eq!(n.normalize("ＡＢＣ！"), "ABC!");
        // Full-width digits and punctuation shift into the ASCII range.
        assert_eq!(n.normalize("１２３"), "123");
        // Ideographic space becomes an ordinary space.
        assert_eq!(n.normalize("a\u{3000}b"), "a b");
    }

    #[test]
    fn test_case_folding_flag() {
        let insensitive = Normalizer::new(false, false);
        assert_eq!(insensitive.normalize("TeSt"), "test");
        let sensitive = Normalizer::new(false, true);
        assert_eq!(sensitive.normalize("TeSt"), "TeSt");
    }

    #[test]
    fn test_case_folding_non_ascii() {
        let n = Normalizer::new(false, false);
        assert_eq!(n.normalize("ÄÖÜ"), "äöü");
        // Multi-scalar lowercase expansions pass through unchanged.
        assert_eq!(n.normalize("\u{130}"), "\u{130}");
    }

    #[test]
    fn test_idempotence() {
        let n = Normalizer::new(false, false);
        for s in ["Hello World", "ＴＥＳＴ！", "混合 Text１２３", ""] {
            let once = n.normalize(s);
            assert_eq!(n.normalize(&once), once);
        }
    }

    #[test]
    fn test_normalize_into_matches_normalize() {
        let n = Normalizer::new(false, false);
        let mut buf = Vec::new();
        let view = n.normalize_into("ＡbＣ", &mut buf);
        assert_eq!(view.iter().collect::<String>(), n.normalize("ＡbＣ"));
    }

    #[test]
    fn test_parse_variant_line() {
        assert_eq!(parse_variant_line("體\t体"), Some(('體', '体')));
        assert_eq!(parse_variant_line(" 國 \t 国 "), Some(('國', '国')));
        assert_eq!(parse_variant_line("ab\t体"), None);
        assert_eq!(parse_variant_line("體"), None);
        assert_eq!(parse_variant_line("體\t体\t extra"), None);
        assert_eq!(parse_variant_line("體\t"), None);
    }

    #[test]
    fn test_collapse_whitespace() {
        let mut buf: Vec<char> = "a \t\n b".chars().collect();
        collapse_whitespace(&mut buf);
        assert_eq!(buf.iter().collect::<String>(), "a b");

        let mut buf: Vec<char> = "  lead and trail  ".chars().collect();
        collapse_whitespace(&mut buf);
        assert_eq!(buf.iter().collect::<String>(), " lead and trail ");

        let mut buf: Vec<char> = "none".chars().collect();
        collapse_whitespace(&mut buf);
        assert_eq!(buf.iter().collect::<String>(), "none");
    }
}
