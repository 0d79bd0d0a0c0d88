//! Four-state BMES Viterbi decoder for out-of-vocabulary recovery.
//!
//! Runs of single characters that the route solver could not join into
//! dictionary words are handed here. The hidden states tag each character as
//! Begin / Middle / End / Single of a word; decoding the most likely tag
//! sequence under the pretrained model recovers unseen words (names, new
//! compounds) from their character statistics.
//!
//! All probabilities are natural logs. Unseen emissions score `MIN_FLOAT`
//! rather than erroring, so decoding never fails.

use ahash::AHashMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::split::SplitSpans;

/// Emission floor for characters absent from a state's table.
pub const MIN_FLOAT: f64 = -3.14e100;

/// Character tag in the BMES scheme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Bmes {
    Begin,
    Middle,
    End,
    Single,
}

use Bmes::{Begin, End, Middle, Single};

pub const STATES: [Bmes; 4] = [Begin, Middle, End, Single];

/// Admissible predecessors of each state; this is what enforces the BMES
/// grammar (a Middle can only follow a Begin or another Middle, and so on).
const PREV_STATUS: [[Bmes; 2]; 4] = [
    [End, Single],    // Begin
    [Middle, Begin],  // Middle
    [Begin, Middle],  // End
    [Single, End],    // Single
];

impl Bmes {
    #[inline]
    fn idx(self) -> usize {
        match self {
            Begin => 0,
            Middle => 1,
            End => 2,
            Single => 3,
        }
    }

    pub fn as_char(self) -> char {
        match self {
            Begin => 'B',
            Middle => 'M',
            End => 'E',
            Single => 'S',
        }
    }

    fn from_char(c: char) -> Option<Bmes> {
        match c {
            'B' => Some(Begin),
            'M' => Some(Middle),
            'E' => Some(End),
            'S' => Some(Single),
            _ => None,
        }
    }
}

/// Model parameters: start, transition and per-state emission tables.
pub struct HmmModel {
    start: [f64; 4],
    trans: [[f64; 4]; 4],
    emit: [AHashMap<char, f64>; 4],
}

impl HmmModel {
    fn emit_prob(&self, state: Bmes, ch: char) -> f64 {
        self.emit[state.idx()].get(&ch).copied().unwrap_or(MIN_FLOAT)
    }
}

static EMIT_DATA: &str = include_str!("../data/hmm_emit.txt");

static MODEL: Lazy<HmmModel> = Lazy::new(|| {
    let mut start = [MIN_FLOAT; 4];
    start[Begin.idx()] = -0.262_686_608_092_500_16;
    start[Single.idx()] = -1.465_263_339_853_767_8;

    let mut trans = [[MIN_FLOAT; 4]; 4];
    trans[Begin.idx()][End.idx()] = -0.510_825_623_765_990;
    trans[Begin.idx()][Middle.idx()] = -0.916_290_731_874_155;
    trans[End.idx()][Begin.idx()] = -0.589_714_973_685_451_3;
    trans[End.idx()][Single.idx()] = -0.808_525_047_466_993_7;
    trans[Middle.idx()][End.idx()] = -0.333_448_568_119_485_14;
    trans[Middle.idx()][Middle.idx()] = -1.260_362_382_026_822_6;
    trans[Single.idx()][Begin.idx()] = -0.721_196_565_466_984_1;
    trans[Single.idx()][Single.idx()] = -0.665_863_144_879_821_2;

    let mut emit: [AHashMap<char, f64>; 4] = Default::default();
    for line in EMIT_DATA.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let mut parts = line.split_whitespace();
        let state = parts
            .next()
            .and_then(|s| s.chars().next())
            .and_then(Bmes::from_char)
            .expect("emission table state");
        let ch = parts
            .next()
            .and_then(|s| s.chars().next())
            .expect("emission table char");
        let logp: f64 = parts
            .next()
            .and_then(|p| p.parse().ok())
            .expect("emission table logp");
        emit[state.idx()].insert(ch, logp);
    }

    HmmModel { start, trans, emit }
});

/// Decode the most likely BMES sequence for a run of Han characters.
///
/// The terminal state is restricted to End or Single: a word cannot be left
/// hanging open at the end of the observation.
pub fn viterbi(obs: &[char], model: &HmmModel) -> (f64, Vec<Bmes>) {
    if obs.is_empty() {
        return (0.0, Vec::new());
    }
    let mut v = [0.0f64; 4];
    let mut paths: [Vec<Bmes>; 4] = Default::default();
    for s in STATES {
        v[s.idx()] = model.start[s.idx()] + model.emit_prob(s, obs[0]);
        paths[s.idx()] = vec![s];
    }

    for &ch in &obs[1..] {
        let mut next_v = [0.0f64; 4];
        let mut next_paths: [Vec<Bmes>; 4] = Default::default();
        for s in STATES {
            let em = model.emit_prob(s, ch);
            let mut best_prob = f64::NEG_INFINITY;
            let mut best_prev = PREV_STATUS[s.idx()][0];
            for prev in PREV_STATUS[s.idx()] {
                let prob = v[prev.idx()] + model.trans[prev.idx()][s.idx()] + em;
                // Exact score ties happen for unseen characters (the floor
                // swallows the small log terms); they go to the larger state
                // so the decode is deterministic.
                if prob > best_prob
                    || (prob == best_prob && prev.as_char() > best_prev.as_char())
                {
                    best_prob = prob;
                    best_prev = prev;
                }
            }
            next_v[s.idx()] = best_prob;
            let mut path = paths[best_prev.idx()].clone();
            path.push(s);
            next_paths[s.idx()] = path;
        }
        v = next_v;
        paths = next_paths;
    }

    let last = if v[Single.idx()] >= v[End.idx()] {
        Single
    } else {
        End
    };
    (v[last.idx()], paths[last.idx()].clone())
}

/// Read words off a decoded tag sequence. A trailing Begin/Middle (possible
/// only for callers that lift the terminal restriction) still flushes the
/// remainder as one word.
fn words_from_tags(obs: &[char], tags: &[Bmes]) -> Vec<String> {
    let mut words = Vec::new();
    let mut begin = 0;
    let mut next = 0;
    for (i, &tag) in tags.iter().enumerate() {
        match tag {
            Begin => begin = i,
            End => {
                words.push(obs[begin..=i].iter().collect());
                next = i + 1;
            }
            Single => {
                words.push(obs[i].to_string());
                next = i + 1;
            }
            Middle => {}
        }
    }
    if next < obs.len() {
        words.push(obs[next..].iter().collect());
    }
    words
}

fn cut_han(block: &str) -> Vec<String> {
    let chars: Vec<char> = block.chars().collect();
    let (_, tags) = viterbi(&chars, &MODEL);
    words_from_tags(&chars, &tags)
}

static RE_HAN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\u{4E00}-\u{9FD5}]+").unwrap());
static RE_SKIP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[a-zA-Z0-9]+(?:\.\d+)?%?").unwrap());

/// Segment an OOV buffer. Han runs go through the decoder; anything else
/// (ASCII runs, numbers) passes through in skip-regex units.
pub fn cut(buf: &str) -> Vec<String> {
    let mut words = Vec::new();
    for span in SplitSpans::new(&RE_HAN, buf) {
        if span.matched {
            words.extend(cut_han(span.text));
        } else {
            for piece in SplitSpans::new(&RE_SKIP, span.text) {
                if !piece.text.is_empty() {
                    words.push(piece.text.to_string());
                }
            }
        }
    }
    words
}
