//! Error types for Sensebound.
//!
//! Library crates use [`SenseboundError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.
//!
//! Per-candidate outcomes (an example failing to attach to a sense) are
//! *not* errors — they are [`crate::types::UnmatchedReason`] values carried
//! in the unmatched report, because dropping them silently would be
//! indistinguishable from a correct empty result during regression analysis.

use std::path::PathBuf;

/// Top-level error type for all Sensebound operations.
#[derive(Debug, thiserror::Error)]
pub enum SenseboundError {
    /// The document contains no recognizable part-of-speech or sense
    /// markers at all. Fatal for that document; a multi-document run logs
    /// it and moves on.
    #[error("malformed document for '{word}': no part-of-speech or sense markers found")]
    MalformedDocument { word: String },

    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// A JSONL line that could not be decoded (report tooling).
    #[error("bad JSONL at {path:?} line {line}: {message}")]
    Jsonl {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, SenseboundError>;

impl SenseboundError {
    /// Create a malformed-document error for the given headword.
    pub fn malformed(word: impl Into<String>) -> Self {
        Self::MalformedDocument { word: word.into() }
    }

    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a JSONL decode error with position context.
    pub fn jsonl(path: impl Into<PathBuf>, line: usize, msg: impl Into<String>) -> Self {
        Self::Jsonl {
            path: path.into(),
            line,
            message: msg.into(),
        }
    }
}
