//! Unified error type for the colorchanger-lib crate.
//!
//! Each [`ColorChangerError`] variant is one failure category of a run.
//! None of them is recoverable: the caller reports the error and stops
//! without writing the target file.
//!
//! String payloads follow the convention **"context: details"** where
//! *context* is usually the file path involved.

use std::fmt;

/// Unified error type for colorchanger-lib operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ColorChangerError {
    /// Configuration file missing, unreadable, or not valid TOML.
    Config(String),
    /// Color string absent, malformed, or out of range.
    Color(String),
    /// Source document unreadable or not well-formed XML.
    SourceParse(String),
    /// A node handle could not be resolved against the document tree.
    Query(String),
    /// Target document could not be written.
    Serialization(String),
}

impl fmt::Display for ColorChangerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ColorChangerError::Config(e) => write!(f, "Config error: {e}"),
            ColorChangerError::Color(e) => write!(f, "Color error: {e}"),
            ColorChangerError::SourceParse(e) => write!(f, "Source parse error: {e}"),
            ColorChangerError::Query(e) => write!(f, "Query error: {e}"),
            ColorChangerError::Serialization(e) => write!(f, "Serialization error: {e}"),
        }
    }
}

impl std::error::Error for ColorChangerError {}

/// Crate-level Result alias using [`ColorChangerError`].
pub type Result<T> = std::result::Result<T, ColorChangerError>;
