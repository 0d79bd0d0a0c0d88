//! Prefix-frequency dictionary.
//!
//! Maps every word to its corpus frequency, and every proper prefix of every
//! word to frequency 0 (unless the prefix is itself a word). The zero-freq
//! prefixes let the DAG builder detect "no longer word can start here" with a
//! single failed lookup instead of a trie walk.
//!
//! Two invariants hold at all times:
//! - every proper prefix of a positive-frequency entry is present;
//! - `total` equals the sum of all positive frequencies.

use std::io::BufRead;

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::errors::{Error, Result};

/// In-memory word -> frequency table with zero-frequency prefix markers,
/// plus the word -> POS tag table read from the same source.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PrefixDict {
    freq: AHashMap<String, u64>,
    tags: AHashMap<String, String>,
    total: u64,
}

impl PrefixDict {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a dictionary from a line-based UTF-8 source.
    ///
    /// Each non-empty line is `word freq [tag]`. A BOM on the first line is
    /// tolerated, blank lines are skipped, anything else malformed fails the
    /// whole load with the file name and 1-based line number.
    pub fn load<R: BufRead>(reader: R, name: &str) -> Result<Self> {
        let mut dict = Self::new();
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = if lineno == 0 {
                line.trim_start_matches('\u{feff}')
            } else {
                line.as_str()
            };
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let malformed = || Error::DictEntry {
                path: name.to_string(),
                line: lineno + 1,
                text: line.to_string(),
            };
            let mut parts = line.split(' ');
            let word = parts.next().ok_or_else(malformed)?;
            let freq: u64 = parts
                .next()
                .and_then(|f| f.parse().ok())
                .ok_or_else(malformed)?;
            let tag = parts.next();
            if parts.next().is_some() {
                return Err(malformed());
            }
            dict.insert(word, freq, tag);
        }
        Ok(dict)
    }

    /// Install `word` with the given frequency, keeping the prefix and total
    /// invariants. An existing entry is replaced, not accumulated.
    pub fn insert(&mut self, word: &str, freq: u64, tag: Option<&str>) {
        let prev = self.freq.insert(word.to_string(), freq).unwrap_or(0);
        self.total = self.total - prev + freq;
        let char_ends: Vec<usize> = word.char_indices().map(|(i, c)| i + c.len_utf8()).collect();
        for &end in &char_ends[..char_ends.len().saturating_sub(1)] {
            let frag = &word[..end];
            if !self.freq.contains_key(frag) {
                self.freq.insert(frag.to_string(), 0);
            }
        }
        if let Some(tag) = tag {
            self.tags.insert(word.to_string(), tag.to_string());
        }
    }

    /// Frequency of `word`, `None` when not even a prefix of anything known.
    pub fn freq(&self, word: &str) -> Option<u64> {
        self.freq.get(word).copied()
    }

    /// True when `word` is a key (a word or a prefix of one). The DAG walk
    /// stops as soon as this turns false.
    pub fn contains(&self, word: &str) -> bool {
        self.freq.contains_key(word)
    }

    /// True when `word` is a real dictionary word (positive frequency).
    pub fn is_word(&self, word: &str) -> bool {
        self.freq.get(word).is_some_and(|&f| f > 0)
    }

    pub fn tag(&self, word: &str) -> Option<&str> {
        self.tags.get(word).map(String::as_str)
    }

    /// Sum of all positive frequencies.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn log_total(&self) -> f64 {
        (self.total as f64).ln()
    }

    /// Number of keys, prefix markers included.
    pub fn len(&self) -> usize {
        self.freq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.freq.is_empty()
    }
}
