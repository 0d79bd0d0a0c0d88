//! Error types for hanseg-core.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Error)]
pub enum Error {
    /// A dictionary or user-dictionary line that does not parse.
    ///
    /// `line` is 1-based. The load that produced this error leaves any
    /// previously loaded state untouched.
    #[error("invalid dictionary entry in {path} at line {line}: {text}")]
    DictEntry {
        path: String,
        line: usize,
        text: String,
    },

    /// `set_dictionary` was pointed at a path that does not exist.
    #[error("dictionary file does not exist: {}", .0.display())]
    DictNotFound(PathBuf),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("failed to start parallel pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
