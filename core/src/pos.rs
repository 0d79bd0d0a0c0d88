//! Joint BMES×POS tagging.
//!
//! The part-of-speech pipeline reuses the dictionary route solver for known
//! words (their tag comes from the dictionary's tag column) and falls back to
//! a joint hidden-state decoder for out-of-vocabulary runs. A joint state is
//! a (BMES, POS) pair such as `B-ns` or `S-v`, so one Viterbi pass yields
//! both the word boundaries and the tag of each recovered word.
//!
//! Unlike the 4-state decoder, the terminal state is unrestricted: the state
//! space is ~two orders of magnitude larger and restricting E/S per POS buys
//! nothing.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use ahash::{AHashMap, AHashSet};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::dict::PrefixDict;
use crate::hmm::{Bmes, MIN_FLOAT};
use crate::split::SplitSpans;
use crate::tokenizer::Tokenizer;
use crate::{dag, split::Span};

/// Transition floor when a joint state has no edge to another.
pub const MIN_INF: f64 = f64::NEG_INFINITY;

/// A segmented word together with its POS tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct WordTag {
    pub word: String,
    pub tag: String,
}

impl WordTag {
    pub fn new<W: Into<String>, T: Into<String>>(word: W, tag: T) -> Self {
        Self {
            word: word.into(),
            tag: tag.into(),
        }
    }
}

impl fmt::Display for WordTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.word, self.tag)
    }
}

/// Hidden state of the joint tagger.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JointState {
    pub bmes: Bmes,
    pub pos: String,
}

impl JointState {
    fn key(&self) -> (char, &str) {
        (self.bmes.as_char(), self.pos.as_str())
    }

    fn parse(text: &str) -> Option<JointState> {
        let (head, pos) = text.split_once('-')?;
        let bmes = match head {
            "B" => Bmes::Begin,
            "M" => Bmes::Middle,
            "E" => Bmes::End,
            "S" => Bmes::Single,
            _ => return None,
        };
        Some(JointState {
            bmes,
            pos: pos.to_string(),
        })
    }
}

impl Ord for JointState {
    fn cmp(&self, other: &Self) -> Ordering {
        self.key().cmp(&other.key())
    }
}

impl PartialOrd for JointState {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Model tables of the joint tagger, all log-space.
pub struct PosModel {
    start: AHashMap<JointState, f64>,
    trans: AHashMap<JointState, AHashMap<JointState, f64>>,
    emit: AHashMap<JointState, AHashMap<char, f64>>,
    /// Plausible emitters per character; characters absent here may be in
    /// any state.
    char_states: AHashMap<char, Vec<JointState>>,
    /// Every state with outgoing transitions, in stable order.
    all_states: Vec<JointState>,
}

impl PosModel {
    fn emit_prob(&self, state: &JointState, ch: char) -> f64 {
        self.emit
            .get(state)
            .and_then(|m| m.get(&ch))
            .copied()
            .unwrap_or(MIN_FLOAT)
    }
}

static START_DATA: &str = include_str!("../data/pos_start.txt");
static TRANS_DATA: &str = include_str!("../data/pos_trans.txt");
static EMIT_DATA: &str = include_str!("../data/pos_emit.txt");
static CHAR_STATES_DATA: &str = include_str!("../data/char_state_tab.txt");

static MODEL: Lazy<PosModel> = Lazy::new(|| {
    let mut start = AHashMap::new();
    for line in non_empty_lines(START_DATA) {
        let mut parts = line.split_whitespace();
        let state = parse_state(parts.next());
        let logp = parse_logp(parts.next());
        start.insert(state, logp);
    }

    let mut trans: AHashMap<JointState, AHashMap<JointState, f64>> = AHashMap::new();
    for line in non_empty_lines(TRANS_DATA) {
        let mut parts = line.split_whitespace();
        let from = parse_state(parts.next());
        let to = parse_state(parts.next());
        let logp = parse_logp(parts.next());
        trans.entry(from).or_default().insert(to, logp);
    }

    let mut emit: AHashMap<JointState, AHashMap<char, f64>> = AHashMap::new();
    for line in non_empty_lines(EMIT_DATA) {
        let mut parts = line.split_whitespace();
        let state = parse_state(parts.next());
        let ch = parts
            .next()
            .and_then(|s| s.chars().next())
            .expect("joint emission char");
        let logp = parse_logp(parts.next());
        emit.entry(state).or_default().insert(ch, logp);
    }

    let mut char_states: AHashMap<char, Vec<JointState>> = AHashMap::new();
    for line in non_empty_lines(CHAR_STATES_DATA) {
        let mut parts = line.split_whitespace();
        let ch = parts
            .next()
            .and_then(|s| s.chars().next())
            .expect("char-state table char");
        let states: Vec<JointState> = parts.map(|p| parse_state(Some(p))).collect();
        char_states.insert(ch, states);
    }

    let mut all_states: Vec<JointState> = trans.keys().cloned().collect();
    all_states.sort();

    PosModel {
        start,
        trans,
        emit,
        char_states,
        all_states,
    }
});

fn non_empty_lines(data: &str) -> impl Iterator<Item = &str> {
    data.lines().map(str::trim).filter(|l| !l.is_empty())
}

fn parse_state(part: Option<&str>) -> JointState {
    part.and_then(JointState::parse)
        .expect("joint model state tag")
}

fn parse_logp(part: Option<&str>) -> f64 {
    part.and_then(|p| p.parse().ok())
        .expect("joint model log probability")
}

/// Pruned Viterbi over the joint state space.
///
/// At each step the candidate set is the character's plausible states
/// intersected with the states reachable from the previous frontier; an
/// empty intersection falls back to the reachable set, then to all states.
/// Backpointers are kept per step and the path is recovered by walking them
/// from the best final state (no BMES restriction at the end).
pub fn viterbi<'m>(obs: &[char], model: &'m PosModel) -> (f64, Vec<&'m JointState>) {
    let n = obs.len();
    if n == 0 {
        return (0.0, Vec::new());
    }
    let mut v: Vec<AHashMap<&'m JointState, f64>> = Vec::with_capacity(n);
    let mut mem_path: Vec<AHashMap<&'m JointState, Option<&'m JointState>>> =
        Vec::with_capacity(n);

    v.push(AHashMap::new());
    mem_path.push(AHashMap::new());
    let first: &[JointState] = match model.char_states.get(&obs[0]) {
        Some(states) => states,
        None => &model.all_states,
    };
    for y in first {
        let p = model.start.get(y).copied().unwrap_or(MIN_FLOAT) + model.emit_prob(y, obs[0]);
        v[0].insert(y, p);
        mem_path[0].insert(y, None);
    }

    for t in 1..n {
        let mut prev_states: Vec<&JointState> = mem_path[t - 1]
            .keys()
            .copied()
            .filter(|x| model.trans.get(*x).is_some_and(|m| !m.is_empty()))
            .collect();
        if prev_states.is_empty() {
            // Dead frontier: every state at t-1 was terminal-only. Keep the
            // chain alive; transitions below floor to MIN_INF.
            prev_states = mem_path[t - 1].keys().copied().collect();
        }
        prev_states.sort();

        let expect_next: AHashSet<&JointState> = prev_states
            .iter()
            .filter_map(|x| model.trans.get(*x))
            .flat_map(|m| m.keys())
            .collect();

        let base: &[JointState] = match model.char_states.get(&obs[t]) {
            Some(states) => states,
            None => &model.all_states,
        };
        let mut cands: Vec<&JointState> = base.iter().filter(|y| expect_next.contains(y)).collect();
        if cands.is_empty() {
            cands = if !expect_next.is_empty() {
                expect_next.iter().copied().collect()
            } else {
                model.all_states.iter().collect()
            };
        }
        cands.sort();

        v.push(AHashMap::new());
        mem_path.push(AHashMap::new());
        for y in cands {
            let em = model.emit_prob(y, obs[t]);
            let mut best: Option<(f64, &JointState)> = None;
            for &y0 in &prev_states {
                let trans_p = model
                    .trans
                    .get(y0)
                    .and_then(|m| m.get(y))
                    .copied()
                    .unwrap_or(MIN_INF);
                let prev_prob = v[t - 1].get(y0).copied().unwrap_or(MIN_INF);
                let prob = prev_prob + trans_p + em;
                // >= over states in ascending order: ties go to the largest
                // predecessor, keeping the decode deterministic.
                if best.map_or(true, |(bp, _)| prob >= bp) {
                    best = Some((prob, y0));
                }
            }
            if let Some((prob, y0)) = best {
                v[t].insert(y, prob);
                mem_path[t].insert(y, Some(y0));
            }
        }
    }

    let mut finals: Vec<&JointState> = mem_path[n - 1].keys().copied().collect();
    finals.sort();
    let mut best: Option<(f64, &JointState)> = None;
    for y in finals {
        let prob = v[n - 1].get(y).copied().unwrap_or(MIN_INF);
        if best.map_or(true, |(bp, _)| prob >= bp) {
            best = Some((prob, y));
        }
    }
    let (prob, mut state) = best.expect("joint viterbi frontier is never empty");

    let mut route: Vec<&JointState> = vec![state; n];
    for t in (0..n).rev() {
        route[t] = state;
        if let Some(Some(prev)) = mem_path[t].get(state).copied() {
            state = prev;
        }
    }
    (prob, route)
}

/// Read (word, tag) pairs off a decoded joint path. The tag of a B..E span
/// is the POS of its end state; a trailing open word takes the POS at its
/// first character.
fn pairs_from_path(obs: &[char], path: &[&JointState]) -> Vec<WordTag> {
    let mut pairs = Vec::new();
    let mut begin = 0;
    let mut next = 0;
    for (i, state) in path.iter().enumerate() {
        match state.bmes {
            Bmes::Begin => begin = i,
            Bmes::End => {
                let word: String = obs[begin..=i].iter().collect();
                pairs.push(WordTag::new(word, state.pos.clone()));
                next = i + 1;
            }
            Bmes::Single => {
                pairs.push(WordTag::new(obs[i].to_string(), state.pos.clone()));
                next = i + 1;
            }
            Bmes::Middle => {}
        }
    }
    if next < obs.len() {
        let word: String = obs[next..].iter().collect();
        pairs.push(WordTag::new(word, path[next].pos.clone()));
    }
    pairs
}

static RE_HAN_DETAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}]+").unwrap());
static RE_SKIP_DETAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\.0-9]+|[a-zA-Z0-9]+").unwrap());
static RE_HAN_INTERNAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}a-zA-Z0-9+#&\._]+").unwrap());
static RE_SKIP_INTERNAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r\n|\s").unwrap());

fn is_numeric_char(ch: char) -> bool {
    ch.is_ascii_digit() || ch == '.'
}

/// Tag an OOV buffer: Han runs through the joint decoder, the rest by
/// character class (m for numeric, eng for alphanumeric, x otherwise).
fn cut_detail(buf: &str) -> Vec<WordTag> {
    let mut pairs = Vec::new();
    for span in SplitSpans::new(&RE_HAN_DETAIL, buf) {
        if span.matched {
            let chars: Vec<char> = span.text.chars().collect();
            let (_, path) = viterbi(&chars, &MODEL);
            pairs.extend(pairs_from_path(&chars, &path));
        } else {
            for piece in SplitSpans::new(&RE_SKIP_DETAIL, span.text) {
                if piece.text.is_empty() {
                    continue;
                }
                let first = piece.text.chars().next();
                let tag = match first {
                    Some(c) if is_numeric_char(c) => "m",
                    Some(c) if c.is_ascii_alphanumeric() => "eng",
                    _ => "x",
                };
                pairs.push(WordTag::new(piece.text, tag));
            }
        }
    }
    pairs
}

/// Lazy (word, tag) producer over a sentence.
pub struct PosCut<'a> {
    tok: &'a Tokenizer,
    dict: Arc<PrefixDict>,
    spans: SplitSpans<'static, 'a>,
    hmm: bool,
    pending: std::vec::IntoIter<WordTag>,
}

impl Iterator for PosCut<'_> {
    type Item = WordTag;

    fn next(&mut self) -> Option<WordTag> {
        loop {
            if let Some(pair) = self.pending.next() {
                return Some(pair);
            }
            let span = self.spans.next()?;
            if span.text.is_empty() {
                continue;
            }
            let block = self.tag_block(span);
            self.pending = block.into_iter();
        }
    }
}

impl<'a> PosCut<'a> {
    fn tag_block(&self, span: Span<'a>) -> Vec<WordTag> {
        if span.matched {
            if self.hmm {
                self.tok.pos_block_hmm(&self.dict, span.text)
            } else {
                self.tok.pos_block_no_hmm(&self.dict, span.text)
            }
        } else {
            let mut pairs = Vec::new();
            for piece in SplitSpans::new(&RE_SKIP_INTERNAL, span.text) {
                if piece.matched {
                    pairs.push(WordTag::new(piece.text, "x"));
                } else {
                    // Per-character fallback; the eng class is decided by the
                    // fragment as a whole.
                    let fragment_is_eng = piece
                        .text
                        .chars()
                        .next()
                        .is_some_and(|c| c.is_ascii_alphanumeric());
                    for ch in piece.text.chars() {
                        let tag = if is_numeric_char(ch) {
                            "m"
                        } else if fragment_is_eng {
                            "eng"
                        } else {
                            "x"
                        };
                        pairs.push(WordTag::new(ch.to_string(), tag));
                    }
                }
            }
            pairs
        }
    }
}

impl Tokenizer {
    /// Cut `sentence` into (word, tag) pairs.
    ///
    /// Known words take their tag from the dictionary (user-added tags
    /// override); with `hmm` enabled, out-of-vocabulary runs go through the
    /// joint decoder, otherwise they tag per character.
    pub fn pos_cut<'a>(&'a self, sentence: &'a str, hmm: bool) -> PosCut<'a> {
        PosCut {
            tok: self,
            dict: self.dict_handle(),
            spans: SplitSpans::new(&RE_HAN_INTERNAL, sentence),
            hmm,
            pending: Vec::new().into_iter(),
        }
    }

    /// Eager variant of [`Self::pos_cut`].
    pub fn pos_lcut(&self, sentence: &str, hmm: bool) -> Vec<WordTag> {
        self.pos_cut(sentence, hmm).collect()
    }

    fn tag_of(&self, dict: &PrefixDict, word: &str) -> String {
        if let Some(tag) = self.user_tag(word) {
            return tag.to_string();
        }
        dict.tag(word).unwrap_or("x").to_string()
    }

    fn pos_block_hmm(&self, dict: &PrefixDict, block: &str) -> Vec<WordTag> {
        let char_indices: Vec<(usize, char)> = block.char_indices().collect();
        let graph = dag::build(block, &char_indices, dict);
        let route = dag::max_route(block, &char_indices, &graph, dict);

        let mut pairs = Vec::new();
        let mut buf = String::new();
        let mut flush = |buf: &mut String, pairs: &mut Vec<WordTag>| {
            if buf.is_empty() {
                return;
            }
            if buf.chars().count() == 1 {
                pairs.push(WordTag::new(buf.clone(), self.tag_of(dict, buf)));
            } else if !dict.is_word(buf) {
                pairs.extend(cut_detail(buf));
            } else {
                for ch in buf.chars() {
                    let s = ch.to_string();
                    let tag = self.tag_of(dict, &s);
                    pairs.push(WordTag::new(s, tag));
                }
            }
            buf.clear();
        };

        let mut x = 0;
        while x < char_indices.len() {
            let y = route[x].1 + 1;
            let byte_start = char_indices[x].0;
            let byte_end = match char_indices.get(y) {
                Some(&(b, _)) => b,
                None => block.len(),
            };
            let word = &block[byte_start..byte_end];
            if y - x == 1 {
                buf.push_str(word);
            } else {
                flush(&mut buf, &mut pairs);
                pairs.push(WordTag::new(word, self.tag_of(dict, word)));
            }
            x = y;
        }
        flush(&mut buf, &mut pairs);
        pairs
    }

    fn pos_block_no_hmm(&self, dict: &PrefixDict, block: &str) -> Vec<WordTag> {
        let char_indices: Vec<(usize, char)> = block.char_indices().collect();
        let graph = dag::build(block, &char_indices, dict);
        let route = dag::max_route(block, &char_indices, &graph, dict);

        let mut pairs = Vec::new();
        let mut buf = String::new();
        let mut x = 0;
        while x < char_indices.len() {
            let y = route[x].1 + 1;
            let byte_start = char_indices[x].0;
            let byte_end = match char_indices.get(y) {
                Some(&(b, _)) => b,
                None => block.len(),
            };
            let word = &block[byte_start..byte_end];
            if y - x == 1 && word.chars().all(|c| c.is_ascii_alphanumeric()) {
                buf.push_str(word);
            } else {
                if !buf.is_empty() {
                    pairs.push(WordTag::new(buf.clone(), "eng"));
                    buf.clear();
                }
                pairs.push(WordTag::new(word, self.tag_of(dict, word)));
            }
            x = y;
        }
        if !buf.is_empty() {
            pairs.push(WordTag::new(buf, "eng"));
        }
        pairs
    }
}
