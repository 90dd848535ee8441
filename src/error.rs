// Builder error types
//
// Everything in here is fatal: returning one of these stops the current
// file and the whole run. Non-fatal problems go through `Diagnostics`.

use std::path::PathBuf;

use crate::writer::bin::WriterError;

/// Failure of a single keyed read.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReadError {
    #[error("section [{section}] is missing")]
    MissingSection { section: String },

    #[error("[{section}] {key}: mandatory key is missing")]
    MissingKey { section: String, key: String },

    #[error("[{section}] {key}: expected {expected}, found `{found}` (line {line})")]
    Malformed {
        section: String,
        key: String,
        expected: &'static str,
        found: String,
        line: usize,
    },
}

/// A source document that could not be tokenised or assembled.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("line {line}: {message}")]
pub struct ParseError {
    pub line: usize,
    pub message: String,
}

#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("{}: {source}", file.display())]
    Parse { file: PathBuf, source: ParseError },

    #[error("[{section}] {key}: `{name}` is not a registered {category}")]
    UnknownCode {
        section: String,
        key: String,
        category: String,
        name: String,
    },

    #[error("[{section}] {key}: {value} is outside [{min}, {max}]")]
    OutOfRange {
        section: String,
        key: String,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("[{section}]: unrecognized wall orientation")]
    Orientation { section: String },

    #[error("[{section}]: {first} and {second} cannot both be set")]
    ConflictingFlags {
        section: String,
        first: String,
        second: String,
    },

    #[error("rules catalogue: {0}")]
    Rules(String),

    #[error("manifest: {0}")]
    Manifest(String),

    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error(transparent)]
    Writer(#[from] WriterError),
}

impl BuildError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        BuildError::Io {
            path: path.into(),
            source,
        }
    }
}

pub type BuildResult<T> = Result<T, BuildError>;
