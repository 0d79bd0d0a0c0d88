//! Sentence DAG construction and the max-probability route over it.
//!
//! For a sentence of N characters, `build` produces for each character
//! position the end positions of every dictionary word starting there, and
//! `max_route` runs a right-to-left dynamic program that picks the
//! segmentation with the highest total log-probability.

use std::cmp::Ordering;

use smallvec::SmallVec;

use crate::dict::PrefixDict;

/// Adjacency rows: `dag[k]` holds every `e >= k` such that chars `k..=e`
/// form a positive-frequency word, or just `[k]` when none does.
pub type Dag = Vec<SmallVec<[usize; 5]>>;

/// Best-suffix table: `route[idx]` is `(score, end)` where `score` is the
/// log-probability of the best segmentation of the suffix starting at `idx`
/// and `end` is the end index of its first word. `route[N]` is the `(0, 0)`
/// sentinel.
pub type Route = Vec<(f64, usize)>;

/// Byte-slice the word covering char positions `k..=end`.
fn word_of<'s>(sentence: &'s str, char_indices: &[(usize, char)], k: usize, end: usize) -> &'s str {
    let byte_start = char_indices[k].0;
    let byte_end = match char_indices.get(end + 1) {
        Some(&(b, _)) => b,
        None => sentence.len(),
    };
    &sentence[byte_start..byte_end]
}

pub fn build(sentence: &str, char_indices: &[(usize, char)], dict: &PrefixDict) -> Dag {
    let n = char_indices.len();
    let mut dag = Vec::with_capacity(n);
    for k in 0..n {
        let mut row: SmallVec<[usize; 5]> = SmallVec::new();
        let mut i = k;
        // Walk while the fragment is still a known key; prefix markers keep
        // the walk alive through non-word prefixes of longer words.
        while i < n {
            let frag = word_of(sentence, char_indices, k, i);
            match dict.freq(frag) {
                Some(freq) => {
                    if freq > 0 {
                        row.push(i);
                    }
                    i += 1;
                }
                None => break,
            }
        }
        if row.is_empty() {
            row.push(k);
        }
        dag.push(row);
    }
    dag
}

pub fn max_route(
    sentence: &str,
    char_indices: &[(usize, char)],
    dag: &Dag,
    dict: &PrefixDict,
) -> Route {
    let n = char_indices.len();
    let mut route: Route = vec![(0.0, 0); n + 1];
    let log_total = dict.log_total();
    for idx in (0..n).rev() {
        // Unknown fragments (and zero-freq prefix markers) score as freq 1.
        // On equal scores the tuple comparison prefers the larger end index.
        let best = dag[idx]
            .iter()
            .map(|&end| {
                let word = word_of(sentence, char_indices, idx, end);
                let freq = dict.freq(word).filter(|&f| f > 0).unwrap_or(1);
                let score = (freq as f64).ln() - log_total + route[end + 1].0;
                (score, end)
            })
            .max_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
        if let Some(best) = best {
            route[idx] = best;
        }
    }
    route
}

/// Full-mode walk: emit every overlapping dictionary word in the DAG, plus
/// the single characters not covered by any.
pub fn all_words(sentence: &str, char_indices: &[(usize, char)], dag: &Dag) -> Vec<String> {
    let mut words = Vec::new();
    let mut old_j: isize = -1;
    for (k, row) in dag.iter().enumerate() {
        if row.len() == 1 && k as isize > old_j {
            words.push(word_of(sentence, char_indices, k, row[0]).to_string());
            old_j = row[0] as isize;
        } else {
            for &j in row.iter() {
                if j > k {
                    words.push(word_of(sentence, char_indices, k, j).to_string());
                    old_j = j as isize;
                }
            }
        }
    }
    words
}
