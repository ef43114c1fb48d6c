// wordshield/src/loader.rs
//! Dictionary loading: local files, directories, and HTTP sources.
//!
//! The dictionary format is UTF-8 text, one pattern per line. Lines are
//! stripped of surrounding whitespace and of a single trailing `,`; empty
//! lines and `#` comments are ignored. Severity can be inferred from a
//! file name prefix (`high_`, `low_`, anything else → Medium).
//!
//! License: MIT OR Apache-2.0

use anyhow::{Context, Result};
use log::{debug, warn};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::config::Level;
use crate::errors::WordshieldError;

/// Infers a severity from the final path component, case-insensitively:
/// `high_*` → High, `low_*` → Low, everything else → Medium.
pub fn infer_level(path: &Path) -> Level {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default();

    if name.starts_with("low_") {
        Level::Low
    } else if name.starts_with("high_") {
        Level::High
    } else {
        Level::Medium
    }
}

/// Reads one dictionary file into a list of patterns.
pub fn load_dict_file<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let file =
        File::open(path).with_context(|| format!("failed to open dictionary {}", path.display()))?;
    let words = parse_dict_lines(BufReader::new(file))
        .with_context(|| format!("failed to read dictionary {}", path.display()))?;
    debug!("Parsed {} word(s) from {}", words.len(), path.display());
    Ok(words)
}

/// Scans `dir` for `*.txt` dictionaries (skipping `*.example.txt`) and
/// returns the union of their words, each tagged with the level inferred
/// from its file name.
pub fn load_dict_dir<P: AsRef<Path>>(dir: P) -> Result<HashMap<String, Level>> {
    let dir = dir.as_ref();
    let mut paths: Vec<_> = std::fs::read_dir(dir)
        .with_context(|| format!("failed to read dictionary directory {}", dir.display()))?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|p| p.extension().is_some_and(|ext| ext == "txt"))
        .filter(|p| {
            !p.file_name()
                .map(|n| n.to_string_lossy().ends_with(".example.txt"))
                .unwrap_or(false)
        })
        .collect();
    paths.sort();

    let mut words = HashMap::new();
    for path in &paths {
        let level = infer_level(path);
        for word in load_dict_file(path)? {
            words.insert(word, level);
        }
    }
    debug!(
        "Collected {} word(s) from {} dictionary file(s) in {}",
        words.len(),
        paths.len(),
        dir.display()
    );
    Ok(words)
}

/// Fetches a dictionary over HTTP. Non-success statuses are errors; the
/// body uses the same line discipline as local files.
pub fn load_dict_url(url: &str) -> Result<Vec<String>> {
    let response = reqwest::blocking::get(url)
        .with_context(|| format!("failed to fetch dictionary from {url}"))?;

    let status = response.status();
    if !status.is_success() {
        return Err(WordshieldError::DictFetch {
            url: url.to_string(),
            status: status.as_u16(),
        }
        .into());
    }

    let body = response
        .text()
        .with_context(|| format!("failed to read dictionary body from {url}"))?;
    let words = parse_dict_lines(body.as_bytes())?;
    debug!("Parsed {} word(s) from {}", words.len(), url);
    Ok(words)
}

/// Applies the line discipline shared by file and HTTP sources: trim,
/// skip blanks and `#` comments, strip a single trailing `,`, re-trim.
fn parse_dict_lines<R: BufRead>(reader: R) -> Result<Vec<String>> {
    let mut words = Vec::with_capacity(512);
    for (number, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed reading dictionary line {}", number + 1))?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let line = line.strip_suffix(',').unwrap_or(line).trim();
        if line.is_empty() {
            warn!("Dictionary line {} is empty after stripping", number + 1);
            continue;
        }
        words.push(line.to_string());
    }
    Ok(words)
}
