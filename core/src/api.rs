//! Process-wide default tokenizer.
//!
//! One shared `Tokenizer` behind a lock, plus module-level functions bound
//! to it, so callers that do not care about owning a tokenizer can just
//! `api::cut(...)`. These functions return eager `Vec`s (the lock guard
//! cannot escape into a lazy iterator); the lazy producers live on
//! `Tokenizer` itself.
//!
//! `enable_parallel` installs a thread pool; while one is installed, the
//! cutting functions split their input by line and fan the lines out over
//! the pool, preserving order.

use std::io::BufRead;
use std::path::Path;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use once_cell::sync::Lazy;
use rayon::prelude::*;

use crate::errors::Result;
use crate::pos::WordTag;
use crate::tokenizer::{Token, TokenizeMode, Tokenizer};

static DEFAULT: Lazy<RwLock<Tokenizer>> = Lazy::new(|| RwLock::new(Tokenizer::new()));
static POOL: RwLock<Option<rayon::ThreadPool>> = RwLock::new(None);

fn read_default() -> RwLockReadGuard<'static, Tokenizer> {
    DEFAULT.read().unwrap_or_else(PoisonError::into_inner)
}

fn write_default() -> RwLockWriteGuard<'static, Tokenizer> {
    DEFAULT.write().unwrap_or_else(PoisonError::into_inner)
}

/// Run `per_line` over the whole input, or line-by-line over the installed
/// pool. Line splitting keeps the separators, so concatenation invariants
/// are unaffected.
fn run<T, F>(sentence: &str, per_line: F) -> Vec<T>
where
    T: Send,
    F: Fn(&Tokenizer, &str) -> Vec<T> + Sync,
{
    let tok = read_default();
    let pool = POOL.read().unwrap_or_else(PoisonError::into_inner);
    match &*pool {
        Some(pool) => {
            let lines: Vec<&str> = sentence.split_inclusive('\n').collect();
            pool.install(|| {
                lines
                    .par_iter()
                    .flat_map_iter(|line| per_line(&tok, line))
                    .collect()
            })
        }
        None => per_line(&tok, sentence),
    }
}

pub fn initialize() {
    read_default().initialize();
}

pub fn cut(sentence: &str, cut_all: bool, hmm: bool) -> Vec<String> {
    run(sentence, |tok, line| tok.lcut(line, cut_all, hmm))
}

pub fn cut_for_search(sentence: &str, hmm: bool) -> Vec<String> {
    run(sentence, |tok, line| tok.lcut_for_search(line, hmm))
}

pub fn pos_cut(sentence: &str, hmm: bool) -> Vec<WordTag> {
    run(sentence, |tok, line| tok.pos_lcut(line, hmm))
}

pub fn tokenize(sentence: &str, mode: TokenizeMode, hmm: bool) -> Vec<Token> {
    read_default().tokenize(sentence, mode, hmm).collect()
}

pub fn add_word(word: &str, freq: Option<u64>, tag: Option<&str>) {
    write_default().add_word(word, freq, tag);
}

pub fn del_word(word: &str) {
    write_default().del_word(word);
}

pub fn suggest_freq(word: &str) -> u64 {
    read_default().suggest_freq(word)
}

pub fn suggest_split_freq(segs: &[&str]) -> u64 {
    read_default().suggest_split_freq(segs)
}

pub fn load_userdict<R: BufRead>(reader: R, name: &str) -> Result<()> {
    write_default().load_userdict(reader, name)
}

pub fn load_userdict_path<P: AsRef<Path>>(path: P) -> Result<()> {
    write_default().load_userdict_path(path)
}

pub fn set_dictionary<P: AsRef<Path>>(path: P) -> Result<()> {
    write_default().set_dictionary(path)
}

/// Fan the module-level cutting functions out over a thread pool.
/// `num_threads = None` sizes the pool to the machine.
pub fn enable_parallel(num_threads: Option<usize>) -> Result<()> {
    read_default().initialize();
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads.unwrap_or(0))
        .build()?;
    *POOL.write().unwrap_or_else(PoisonError::into_inner) = Some(pool);
    Ok(())
}

pub fn disable_parallel() {
    *POOL.write().unwrap_or_else(PoisonError::into_inner) = None;
}
