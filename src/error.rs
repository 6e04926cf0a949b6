//! Error types for debug-info type extraction.
//!
//! Two layers: `ExtractError` aborts a whole run (container or section level
//! failures), while `Anomaly` describes a single bad entry that extraction
//! recovers from and keeps going.

use crate::dwarf::entry::Offset;
use serde::Serialize;
use thiserror::Error;

/// Fatal error for an extraction run.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// The input is not a parseable binary container
    #[error("Failed to open {path}: {message}")]
    OpenFailure { path: String, message: String },

    /// A debug-info section is truncated or its compressed payload is corrupt
    #[error("Failed to decode section {section}: {message}")]
    SectionDecodeFailure { section: String, message: String },

    /// The entry stream could not produce its next element
    #[error("Entry stream failure: {0}")]
    Stream(String),

    /// Invalid configuration file or value
    #[error("Configuration error: {0}")]
    Config(String),

    /// File I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ExtractError {
    pub(crate) fn open_failure(path: impl Into<String>, message: impl ToString) -> Self {
        Self::OpenFailure {
            path: path.into(),
            message: message.to_string(),
        }
    }

    pub(crate) fn section(section: impl Into<String>, message: impl ToString) -> Self {
        Self::SectionDecodeFailure {
            section: section.into(),
            message: message.to_string(),
        }
    }
}

/// Result type alias for extraction operations
pub type Result<T> = std::result::Result<T, ExtractError>;

/// Entry-level problem that degrades output but never aborts a run.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Anomaly {
    /// A type reference points at an offset missing from the offset index
    #[error("unresolved type reference {target:#x} from entry {from:#x}")]
    UnresolvedTypeReference { from: Offset, target: Offset },

    /// An expected attribute is absent or carries the wrong form
    #[error("malformed entry at {offset:#x}: {detail}")]
    MalformedEntry { offset: Offset, detail: String },

    /// A type chain exceeded the resolver's depth guard
    #[error("type reference chain too deep or cyclic at {offset:#x}")]
    ReferenceCycle { offset: Offset },
}

impl Anomaly {
    pub(crate) fn malformed(offset: Offset, detail: impl Into<String>) -> Self {
        Self::MalformedEntry {
            offset,
            detail: detail.into(),
        }
    }
}
