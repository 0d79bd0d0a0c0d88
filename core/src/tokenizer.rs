//! The segmentation orchestrator.
//!
//! A `Tokenizer` owns one prefix dictionary, the user tag overrides and the
//! force-split set. Sentences are split into blocks by character class:
//! blocks of Han text (plus a few connector characters in accurate mode) go
//! through the DAG/route machinery, everything else passes through in
//! skip-regex units. Three cutters cover the three modes:
//!
//! - full: every overlapping dictionary word in the DAG;
//! - accurate: the max-probability route;
//! - accurate + HMM (default): the route, with runs of leftover single
//!   characters handed to the BMES decoder for OOV recovery.
//!
//! The dictionary is built lazily on first use and shared with outstanding
//! iterators through an `Arc`, so mutators copy-on-write instead of pulling
//! the table out from under a running cut.

use std::fmt;
use std::fs::{self, File};
use std::hash::BuildHasher;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Instant;
use std::vec;

use ahash::AHashSet;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::cache;
use crate::dag;
use crate::dict::PrefixDict;
use crate::errors::{Error, Result};
use crate::hmm;
use crate::split::{Span, SplitSpans};

static EMBEDDED_DICT: &str = include_str!("../data/dict.txt");

static RE_HAN_DEFAULT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}a-zA-Z0-9+#&\._%\-]+").unwrap());
static RE_SKIP_DEFAULT: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\s").unwrap());
static RE_HAN_CUT_ALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}]+").unwrap());
static RE_SKIP_CUT_ALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-zA-Z0-9+#\n]").unwrap());
// word, optional freq, optional tag; freq may be omitted while tag is given
static RE_USERDICT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)( [0-9]+)?( [a-z]+)?$").unwrap());

#[derive(Debug, Clone)]
enum DictSource {
    Embedded,
    File(PathBuf),
}

/// A word with its code-point offsets; `end - start` is always the
/// code-point length of `word`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub word: String,
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenizeMode {
    Default,
    /// Additionally emit in-dictionary 2- and 3-gram subwords before each
    /// word, for search-engine indexing.
    Search,
}

#[derive(Debug, Clone, Copy)]
enum CutMode {
    All,
    Hmm,
    NoHmm,
}

pub struct Tokenizer {
    source: DictSource,
    cache_file: Option<PathBuf>,
    // None until the first query; File sources are loaded eagerly when
    // attached, so only the embedded dictionary is ever built lazily here.
    dict: RwLock<Option<Arc<PrefixDict>>>,
    user_tags: ahash::AHashMap<String, String>,
    force_split: AHashSet<String>,
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dictionary = match &self.source {
            DictSource::Embedded => "<embedded>".to_string(),
            DictSource::File(path) => path.display().to_string(),
        };
        f.debug_struct("Tokenizer")
            .field("dictionary", &dictionary)
            .field("initialized", &self.initialized())
            .finish()
    }
}

impl Tokenizer {
    /// A tokenizer over the embedded default dictionary. The dictionary is
    /// not built until the first query.
    pub fn new() -> Self {
        Self {
            source: DictSource::Embedded,
            cache_file: None,
            dict: RwLock::new(None),
            user_tags: ahash::AHashMap::new(),
            force_split: AHashSet::new(),
        }
    }

    /// A tokenizer over a dictionary file; loads (or restores from cache)
    /// immediately.
    pub fn with_dict_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut tok = Self::new();
        tok.set_dictionary(path)?;
        Ok(tok)
    }

    /// Replace the dictionary. Fails without touching current state when the
    /// path does not exist or the file does not parse.
    pub fn set_dictionary<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(Error::DictNotFound(path.to_path_buf()));
        }
        let dict = Self::load_path(path, self.cache_file.as_deref())?;
        self.source = DictSource::File(path.to_path_buf());
        *self.dict_slot_mut() = Some(Arc::new(dict));
        Ok(())
    }

    /// Override the cache file location for file-backed dictionaries. Takes
    /// effect on the next `set_dictionary`.
    pub fn set_cache_file<P: Into<PathBuf>>(&mut self, path: P) {
        self.cache_file = Some(path.into());
    }

    /// Force the lazy dictionary build now. A no-op once loaded.
    pub fn initialize(&self) {
        let _ = self.dict_handle();
    }

    pub fn initialized(&self) -> bool {
        self.dict
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn embedded_dict() -> PrefixDict {
        PrefixDict::load(EMBEDDED_DICT.as_bytes(), "<embedded>")
            .expect("embedded dictionary is well-formed")
    }

    fn load_path(path: &Path, cache_file: Option<&Path>) -> Result<PrefixDict> {
        let cache_path = match cache_file {
            Some(p) => p.to_path_buf(),
            None => default_cache_path(path),
        };
        if let Ok(mtime) = fs::metadata(path).and_then(|m| m.modified()) {
            if let Some(dict) = cache::load(&cache_path, mtime) {
                return Ok(dict);
            }
        }
        let started = Instant::now();
        let reader = BufReader::new(File::open(path)?);
        let dict = PrefixDict::load(reader, &path.display().to_string())?;
        tracing::debug!(
            dict = %path.display(),
            entries = dict.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built prefix dictionary"
        );
        if let Err(e) = cache::store(&cache_path, &dict) {
            tracing::warn!(cache = %cache_path.display(), error = %e, "failed to write dictionary cache");
        }
        Ok(dict)
    }

    /// Shared handle to the loaded dictionary, building it first if needed.
    /// Concurrent first queries serialize on the write lock; losers observe
    /// the winner's build.
    pub(crate) fn dict_handle(&self) -> Arc<PrefixDict> {
        if let Some(dict) = self
            .dict
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
        {
            return dict.clone();
        }
        let mut slot = self.dict.write().unwrap_or_else(PoisonError::into_inner);
        if let Some(dict) = slot.as_ref() {
            return dict.clone();
        }
        let started = Instant::now();
        let dict = Arc::new(Self::embedded_dict());
        tracing::debug!(
            entries = dict.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "built default prefix dictionary"
        );
        *slot = Some(dict.clone());
        dict
    }

    fn dict_slot_mut(&mut self) -> &mut Option<Arc<PrefixDict>> {
        self.dict.get_mut().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_loaded_mut(&mut self) -> &mut Arc<PrefixDict> {
        self.dict_slot_mut()
            .get_or_insert_with(|| Arc::new(Self::embedded_dict()))
    }

    pub(crate) fn user_tag(&self, word: &str) -> Option<&str> {
        self.user_tags.get(word).map(String::as_str)
    }

    /// Add `word` to the dictionary. Without an explicit frequency, a
    /// frequency high enough to make the word cut out is computed. A tag is
    /// kept as a user override for the POS pipeline. Frequency 0 deletes the
    /// word and force-splits it even when the HMM would recover it.
    pub fn add_word(&mut self, word: &str, freq: Option<u64>, tag: Option<&str>) {
        let freq = freq.unwrap_or_else(|| self.suggest_freq(word));
        let dict = self.ensure_loaded_mut();
        Arc::make_mut(dict).insert(word, freq, None);
        if let Some(tag) = tag {
            self.user_tags.insert(word.to_string(), tag.to_string());
        }
        if freq == 0 {
            self.force_split.insert(word.to_string());
        }
    }

    /// Convenience for `add_word(word, Some(0), None)`.
    pub fn del_word(&mut self, word: &str) {
        self.add_word(word, Some(0), None);
    }

    /// Frequency that would make `word` win against its current
    /// segmentation in the route solver.
    pub fn suggest_freq(&self, word: &str) -> u64 {
        let dict = self.dict_handle();
        let total = dict.total() as f64;
        let mut p = 1.0f64;
        for seg in self.cut(word, false, false) {
            p *= dict.freq(&seg).unwrap_or(1) as f64 / total;
        }
        let computed = (p * total) as u64 + 1;
        computed.max(dict.freq(word).unwrap_or(1))
    }

    /// Frequency (for the joined word) that would keep the route solver
    /// cutting at the given boundaries instead of joining them.
    pub fn suggest_split_freq(&self, segs: &[&str]) -> u64 {
        let dict = self.dict_handle();
        let total = dict.total() as f64;
        let mut p = 1.0f64;
        for seg in segs {
            p *= dict.freq(seg).unwrap_or(1) as f64 / total;
        }
        let word: String = segs.concat();
        let computed = (p * total) as u64;
        computed.min(dict.freq(&word).unwrap_or(0))
    }

    /// Merge a user dictionary: `word [freq] [tag]` per line, both fields
    /// independently optional. Words without a frequency go through
    /// `suggest_freq`.
    pub fn load_userdict<R: BufRead>(&mut self, reader: R, name: &str) -> Result<()> {
        for (lineno, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim().trim_start_matches('\u{feff}');
            if line.is_empty() {
                continue;
            }
            let malformed = || Error::DictEntry {
                path: name.to_string(),
                line: lineno + 1,
                text: line.to_string(),
            };
            let caps = RE_USERDICT.captures(line).ok_or_else(malformed)?;
            let word = caps.get(1).ok_or_else(malformed)?.as_str();
            let freq: Option<u64> = match caps.get(2) {
                Some(m) => Some(m.as_str().trim().parse().map_err(|_| malformed())?),
                None => None,
            };
            let tag = caps.get(3).map(|m| m.as_str().trim());
            self.add_word(word, freq, tag);
        }
        Ok(())
    }

    pub fn load_userdict_path<P: AsRef<Path>>(&mut self, path: P) -> Result<()> {
        let path = path.as_ref();
        let reader = BufReader::new(File::open(path)?);
        self.load_userdict(reader, &path.display().to_string())
    }

    /// Cut a sentence into words.
    ///
    /// `cut_all` selects full mode (every overlapping dictionary word);
    /// otherwise `hmm` picks between plain accurate mode and accurate mode
    /// with OOV recovery. The returned iterator is lazy; it borrows the
    /// tokenizer, so mutation waits until it is dropped.
    pub fn cut<'a>(&'a self, sentence: &'a str, cut_all: bool, hmm: bool) -> Cut<'a> {
        let (re_han, re_skip): (&'static Regex, &'static Regex) = if cut_all {
            (&RE_HAN_CUT_ALL, &RE_SKIP_CUT_ALL)
        } else {
            (&RE_HAN_DEFAULT, &RE_SKIP_DEFAULT)
        };
        let mode = if cut_all {
            CutMode::All
        } else if hmm {
            CutMode::Hmm
        } else {
            CutMode::NoHmm
        };
        Cut {
            dict: self.dict_handle(),
            force_split: &self.force_split,
            spans: SplitSpans::new(re_han, sentence),
            re_skip,
            mode,
            pending: Vec::new().into_iter(),
        }
    }

    pub fn lcut(&self, sentence: &str, cut_all: bool, hmm: bool) -> Vec<String> {
        self.cut(sentence, cut_all, hmm).collect()
    }

    /// Finer-grained cut for search indexing: accurate-mode words, each
    /// preceded by its in-dictionary 2- and 3-gram subwords.
    pub fn cut_for_search<'a>(&'a self, sentence: &'a str, hmm: bool) -> CutForSearch<'a> {
        CutForSearch {
            dict: self.dict_handle(),
            inner: self.cut(sentence, false, hmm),
            pending: Vec::new().into_iter(),
        }
    }

    pub fn lcut_for_search(&self, sentence: &str, hmm: bool) -> Vec<String> {
        self.cut_for_search(sentence, hmm).collect()
    }

    /// Cut into (word, start, end) tokens; offsets count code points.
    pub fn tokenize<'a>(
        &'a self,
        sentence: &'a str,
        mode: TokenizeMode,
        hmm: bool,
    ) -> TokenStream<'a> {
        TokenStream {
            dict: self.dict_handle(),
            inner: self.cut(sentence, false, hmm),
            mode,
            offset: 0,
            pending: Vec::new().into_iter(),
        }
    }
}

fn default_cache_path(dict_path: &Path) -> PathBuf {
    // Seeded hasher: the cache name must be stable across processes.
    let state = ahash::RandomState::with_seeds(
        0x243f_6a88_85a3_08d3,
        0x1319_8a2e_0370_7344,
        0xa409_3822_299f_31d0,
        0x082e_fa98_ec4e_6c89,
    );
    let digest = state.hash_one(dict_path.to_string_lossy().as_bytes());
    std::env::temp_dir().join(format!("hanseg.u{digest:016x}.cache"))
}

fn word_at<'s>(block: &'s str, char_indices: &[(usize, char)], x: usize, y: usize) -> &'s str {
    let byte_start = char_indices[x].0;
    let byte_end = match char_indices.get(y) {
        Some(&(b, _)) => b,
        None => block.len(),
    };
    &block[byte_start..byte_end]
}

fn cut_block_all(dict: &PrefixDict, block: &str) -> Vec<String> {
    let char_indices: Vec<(usize, char)> = block.char_indices().collect();
    let graph = dag::build(block, &char_indices, dict);
    dag::all_words(block, &char_indices, &graph)
}

fn cut_block_no_hmm(dict: &PrefixDict, block: &str) -> Vec<String> {
    let char_indices: Vec<(usize, char)> = block.char_indices().collect();
    let graph = dag::build(block, &char_indices, dict);
    let route = dag::max_route(block, &char_indices, &graph, dict);

    let mut words = Vec::new();
    let mut buf = String::new();
    let mut x = 0;
    while x < char_indices.len() {
        let y = route[x].1 + 1;
        let word = word_at(block, &char_indices, x, y);
        // Glue runs of single ASCII alphanumerics back together; the DP
        // chopped them up because they are not dictionary words.
        if y - x == 1 && word.chars().all(|c| c.is_ascii_alphanumeric()) {
            buf.push_str(word);
        } else {
            if !buf.is_empty() {
                words.push(std::mem::take(&mut buf));
            }
            words.push(word.to_string());
        }
        x = y;
    }
    if !buf.is_empty() {
        words.push(buf);
    }
    words
}

fn cut_block_hmm(dict: &PrefixDict, force_split: &AHashSet<String>, block: &str) -> Vec<String> {
    let char_indices: Vec<(usize, char)> = block.char_indices().collect();
    let graph = dag::build(block, &char_indices, dict);
    let route = dag::max_route(block, &char_indices, &graph, dict);

    let mut words = Vec::new();
    let mut buf = String::new();
    let mut flush = |buf: &mut String, words: &mut Vec<String>| {
        if buf.is_empty() {
            return;
        }
        if buf.chars().count() == 1 {
            words.push(std::mem::take(buf));
            return;
        }
        if !dict.is_word(buf) {
            // An unseen multi-char run: let the BMES decoder join what it
            // can. Force-split words still come apart.
            for word in hmm::cut(buf) {
                if force_split.contains(&word) {
                    words.extend(word.chars().map(|c| c.to_string()));
                } else {
                    words.push(word);
                }
            }
        } else {
            words.extend(buf.chars().map(|c| c.to_string()));
        }
        buf.clear();
    };

    let mut x = 0;
    while x < char_indices.len() {
        let y = route[x].1 + 1;
        let word = word_at(block, &char_indices, x, y);
        if y - x == 1 {
            buf.push_str(word);
        } else {
            flush(&mut buf, &mut words);
            words.push(word.to_string());
        }
        x = y;
    }
    flush(&mut buf, &mut words);
    words
}

/// Lazy word producer returned by [`Tokenizer::cut`].
pub struct Cut<'a> {
    dict: Arc<PrefixDict>,
    force_split: &'a AHashSet<String>,
    spans: SplitSpans<'static, 'a>,
    re_skip: &'static Regex,
    mode: CutMode,
    pending: vec::IntoIter<String>,
}

impl Iterator for Cut<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        loop {
            if let Some(word) = self.pending.next() {
                return Some(word);
            }
            let span = self.spans.next()?;
            if span.text.is_empty() {
                continue;
            }
            let words = if span.matched {
                match self.mode {
                    CutMode::All => cut_block_all(&self.dict, span.text),
                    CutMode::Hmm => cut_block_hmm(&self.dict, self.force_split, span.text),
                    CutMode::NoHmm => cut_block_no_hmm(&self.dict, span.text),
                }
            } else {
                self.passthrough(span)
            };
            self.pending = words.into_iter();
        }
    }
}

impl Cut<'_> {
    fn passthrough(&self, span: Span<'_>) -> Vec<String> {
        match self.mode {
            // Full mode: the skip regex has no groups upstream, so its
            // matches are dropped and the remaining fragments kept whole.
            CutMode::All => self
                .re_skip
                .split(span.text)
                .filter(|frag| !frag.is_empty())
                .map(str::to_string)
                .collect(),
            // Accurate modes: separators pass through as-is, anything else
            // is emitted per character.
            _ => {
                let mut words = Vec::new();
                for piece in SplitSpans::new(self.re_skip, span.text) {
                    if piece.matched {
                        words.push(piece.text.to_string());
                    } else {
                        words.extend(piece.text.chars().map(|c| c.to_string()));
                    }
                }
                words
            }
        }
    }
}

/// Lazy producer returned by [`Tokenizer::cut_for_search`].
pub struct CutForSearch<'a> {
    dict: Arc<PrefixDict>,
    inner: Cut<'a>,
    pending: vec::IntoIter<String>,
}

impl Iterator for CutForSearch<'_> {
    type Item = String;

    fn next(&mut self) -> Option<String> {
        if let Some(word) = self.pending.next() {
            return Some(word);
        }
        let word = self.inner.next()?;
        let chars: Vec<char> = word.chars().collect();
        let mut out = Vec::new();
        push_grams(&self.dict, &chars, &mut |gram, _| out.push(gram));
        out.push(word);
        self.pending = out.into_iter();
        self.pending.next()
    }
}

/// Feed every in-dictionary 2- and 3-gram of `chars` (with its start offset)
/// to `sink`, 2-grams first.
fn push_grams(dict: &PrefixDict, chars: &[char], sink: &mut dyn FnMut(String, usize)) {
    if chars.len() > 2 {
        for i in 0..chars.len() - 1 {
            let gram: String = chars[i..i + 2].iter().collect();
            if dict.is_word(&gram) {
                sink(gram, i);
            }
        }
    }
    if chars.len() > 3 {
        for i in 0..chars.len() - 2 {
            let gram: String = chars[i..i + 3].iter().collect();
            if dict.is_word(&gram) {
                sink(gram, i);
            }
        }
    }
}

/// Lazy (word, start, end) producer returned by [`Tokenizer::tokenize`].
pub struct TokenStream<'a> {
    dict: Arc<PrefixDict>,
    inner: Cut<'a>,
    mode: TokenizeMode,
    offset: usize,
    pending: vec::IntoIter<Token>,
}

impl Iterator for TokenStream<'_> {
    type Item = Token;

    fn next(&mut self) -> Option<Token> {
        if let Some(token) = self.pending.next() {
            return Some(token);
        }
        let word = self.inner.next()?;
        let chars: Vec<char> = word.chars().collect();
        let start = self.offset;
        let mut out = Vec::new();
        if self.mode == TokenizeMode::Search {
            push_grams(&self.dict, &chars, &mut |gram, i| {
                let len = gram.chars().count();
                out.push(Token {
                    word: gram,
                    start: start + i,
                    end: start + i + len,
                });
            });
        }
        out.push(Token {
            start,
            end: start + chars.len(),
            word,
        });
        self.offset = start + chars.len();
        self.pending = out.into_iter();
        self.pending.next()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn lazy_initialization_is_idempotent() {
        let tok = Tokenizer::new();
        assert!(!tok.initialized());
        tok.initialize();
        assert!(tok.initialized());
        let first = tok.lcut("我来到北京清华大学", false, true);
        tok.initialize();
        let second = tok.lcut("我来到北京清华大学", false, true);
        assert_eq!(first, second);
    }

    #[test]
    fn add_word_makes_word_cut_out() {
        let mut tok = Tokenizer::new();
        assert_ne!(tok.lcut("石墨烯", false, false), ["石墨烯"]);
        tok.add_word("石墨烯", None, None);
        assert_eq!(tok.lcut("石墨烯", false, false), ["石墨烯"]);
    }

    #[test]
    fn del_word_splits_it_again() {
        let mut tok = Tokenizer::new();
        tok.add_word("网球拍", Some(500_000), None);
        assert_eq!(tok.lcut("网球拍卖会", false, false), ["网球拍", "卖", "会"]);
        tok.del_word("网球拍");
        assert_eq!(tok.lcut("网球拍卖会", false, false), ["网球", "拍卖会"]);
    }

    #[test]
    fn suggest_freq_beats_current_route() {
        let tok = Tokenizer::new();
        let suggested = tok.suggest_freq("拍卖会");
        // already a dictionary word: keeps at least its own frequency
        assert!(suggested >= 265);
        // unseen word built from unseen chars: floor of 1
        assert_eq!(tok.suggest_freq("圆周"), 1);
    }

    #[test]
    fn suggest_split_freq_is_bounded_by_current_freq() {
        let tok = Tokenizer::new();
        let f = tok.suggest_split_freq(&["拍卖", "会"]);
        assert!(f <= 265, "split suggestion must not exceed the word freq");
        // installing the suggestion makes the split win
        let mut tok2 = Tokenizer::new();
        tok2.add_word("拍卖会", Some(f), None);
        assert_eq!(tok2.lcut("拍卖会", false, false), ["拍卖", "会"]);
    }

    #[test]
    fn userdict_lines_with_optional_fields() {
        let mut tok = Tokenizer::new();
        let userdict = "石墨烯 1000 n\n云计算 500\n创新办 j\n";
        tok.load_userdict(userdict.as_bytes(), "user.dict").unwrap();
        assert_eq!(tok.lcut("石墨烯", false, false), ["石墨烯"]);
        assert_eq!(tok.lcut("云计算", false, false), ["云计算"]);
        // no freq given: suggest_freq still makes it cut out
        assert_eq!(tok.lcut("创新办", false, false), ["创新办"]);
        assert_eq!(tok.user_tag("创新办"), Some("j"));
        assert_eq!(tok.user_tag("云计算"), None);
    }

    #[test]
    fn userdict_bad_line_reports_position() {
        let mut tok = Tokenizer::new();
        let bad = "好词 10\n坏词 99999999999999999999999\n";
        let err = tok.load_userdict(bad.as_bytes(), "user.dict").unwrap_err();
        match err {
            Error::DictEntry { path, line, .. } => {
                assert_eq!(path, "user.dict");
                assert_eq!(line, 2);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn set_dictionary_missing_path_fails_cleanly() {
        let mut tok = Tokenizer::new();
        tok.add_word("石墨烯", Some(100), None);
        let err = tok.set_dictionary("/no/such/dict.txt").unwrap_err();
        assert!(matches!(err, Error::DictNotFound(_)));
        // prior state untouched
        assert_eq!(tok.lcut("石墨烯", false, false), ["石墨烯"]);
    }

    #[test]
    fn set_dictionary_loads_and_caches() {
        let dir = tempfile::tempdir().unwrap();
        let dict_path = dir.path().join("small.dict");
        let cache_path = dir.path().join("small.cache");
        let mut f = File::create(&dict_path).unwrap();
        writeln!(f, "你好 5 l").unwrap();
        writeln!(f, "世界 10 n").unwrap();
        drop(f);

        let mut tok = Tokenizer::new();
        tok.set_cache_file(&cache_path);
        tok.set_dictionary(&dict_path).unwrap();
        assert_eq!(tok.lcut("你好世界", false, false), ["你好", "世界"]);
        assert!(cache_path.is_file());

        // second tokenizer picks the cache up
        let mut tok2 = Tokenizer::new();
        tok2.set_cache_file(&cache_path);
        tok2.set_dictionary(&dict_path).unwrap();
        assert_eq!(tok2.lcut("你好世界", false, false), ["你好", "世界"]);
    }

    #[test]
    fn set_dictionary_parse_error_names_file_and_line() {
        let dir = tempfile::tempdir().unwrap();
        let dict_path = dir.path().join("broken.dict");
        std::fs::write(&dict_path, "你好 5 l\n断了\n").unwrap();

        let mut tok = Tokenizer::new();
        let err = tok.set_dictionary(&dict_path).unwrap_err();
        match err {
            Error::DictEntry { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other:?}"),
        }
        // still on the embedded dictionary
        assert_eq!(tok.lcut("网球拍卖会", false, false), ["网球", "拍卖会"]);
    }

    #[test]
    fn cut_borrows_a_snapshot() {
        let mut tok = Tokenizer::new();
        let words: Vec<String> = tok.cut("网球拍卖会", false, false).collect();
        assert_eq!(words, ["网球", "拍卖会"]);
        // mutation after the iterator is consumed is fine
        tok.add_word("网球拍", Some(500_000), None);
        assert_eq!(tok.lcut("网球拍卖会", false, false), ["网球拍", "卖", "会"]);
    }
}
