//! hanseg-core
//!
//! Dictionary-driven Chinese word segmentation with HMM out-of-vocabulary
//! recovery and joint BMES×POS tagging.
//!
//! The pipeline: a sentence is split into blocks by character class, each
//! Han block gets a DAG of dictionary words, a right-to-left dynamic program
//! picks the max-probability route through it, and (by default) runs of
//! leftover single characters are re-joined by a 4-state BMES Viterbi
//! decoder. The POS pipeline shares the skeleton and swaps the decoder for a
//! joint (BMES, POS) state space.
//!
//! Public API:
//! - `Tokenizer` - owns the dictionary and all segmentation entry points
//!   (`cut`, `cut_for_search`, `tokenize`, `pos_cut`, `add_word`, ...)
//! - `api` - process-wide default tokenizer with optional parallel mode
//! - `PrefixDict` - the word -> frequency table with prefix markers
//! - `WordTag` / `Token` - tagged and offset-carrying outputs
pub mod api;
pub mod cache;
pub mod dag;
pub mod dict;
pub mod errors;
pub mod hmm;
pub mod pos;
mod split;
pub mod tokenizer;

pub use dict::PrefixDict;
pub use errors::{Error, Result};
pub use pos::WordTag;
pub use tokenizer::{Token, TokenizeMode, Tokenizer};

/// Input decoding and character-class helpers.
pub mod utils {
    use std::borrow::Cow;

    /// True for characters the engine treats as Han (`U+4E00..=U+9FD5`).
    pub fn is_han(ch: char) -> bool {
        ('\u{4E00}'..='\u{9FD5}').contains(&ch)
    }

    /// Decode raw input bytes: strict UTF-8 first, then GBK with
    /// replacement. Already-valid UTF-8 is borrowed, never copied.
    pub fn decode(bytes: &[u8]) -> Cow<'_, str> {
        match std::str::from_utf8(bytes) {
            Ok(s) => Cow::Borrowed(s),
            Err(_) => {
                let (text, _, _) = encoding_rs::GBK.decode(bytes);
                text
            }
        }
    }

}
