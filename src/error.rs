//! Error types for msgreader

use std::io;
use thiserror::Error;

/// Reasons a title change is refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InvalidTitle {
    #[error("title cannot be blank")]
    Blank,

    #[error("title is {len} characters, the limit is {max}")]
    TooLong { len: usize, max: usize },
}

/// Main error type for msgreader
#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Speech synthesis error: {0}")]
    Speech(String),

    /// No speech engine could be started on this system
    #[error("Speech synthesis not supported on this system: {0}")]
    CapabilityUnavailable(String),

    #[error("Invalid title: {0}")]
    InvalidTitle(#[from] InvalidTitle),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("INI parse error: {0}")]
    IniParse(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

/// Result type alias for msgreader operations
pub type Result<T> = std::result::Result<T, ReaderError>;

impl From<String> for ReaderError {
    fn from(s: String) -> Self {
        ReaderError::Other(s)
    }
}

impl From<&str> for ReaderError {
    fn from(s: &str) -> Self {
        ReaderError::Other(s.to_string())
    }
}
