//! Errors surfaced by snapshot dump and load.
//!
//! Looking up or erasing an absent key is not an error; those operations
//! report absence through `Option` or `bool`.

use std::fmt;

use thiserror::Error;

/// Result alias for snapshot operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug)]
/// Errors that can occur while dumping or loading a snapshot.
#[non_exhaustive]
pub enum Error {
    /// The snapshot destination or source could not be opened, read or
    /// written.
    #[error("snapshot I/O failed: {0}")]
    Io(#[from] std::io::Error),
    /// The snapshot is not a JSON array of records.
    #[error("snapshot is not an array of records: {0}")]
    MalformedSnapshot(#[source] serde_json::Error),
    /// A record is missing a field, has a field of the wrong type, or has a
    /// height outside `[1, max_height]`.
    #[error("record {index} is malformed: {reason}")]
    MalformedRecord {
        /// Position of the record within the snapshot.
        index: usize,
        /// What was wrong with it.
        reason: String,
    },
    /// The stored key or value text could not be decoded.
    #[error("record {index} could not be decoded: {source}")]
    Codec {
        /// Position of the record within the snapshot.
        index: usize,
        /// The underlying codec failure.
        #[source]
        source: CodecError,
    },
}

/// Which half of a record a [`CodecError`] refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Field {
    /// The record's key.
    Key,
    /// The record's value.
    Value,
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Field::Key => f.write_str("key"),
            Field::Value => f.write_str("value"),
        }
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// A [`Codec`](crate::Codec) failed to parse stored text.
#[error("cannot decode {field} from {text:?}: {reason}")]
pub struct CodecError {
    /// Whether the key or the value failed.
    pub field: Field,
    /// The text that could not be parsed.
    pub text: String,
    /// Why parsing failed.
    pub reason: String,
}

impl CodecError {
    /// Create a new codec error for `field`.
    #[must_use]
    pub fn new(field: Field, text: impl Into<String>, reason: impl fmt::Display) -> Self {
        CodecError {
            field,
            text: text.into(),
            reason: reason.to_string(),
        }
    }
}
