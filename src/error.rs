//! Error types for data loading
//!
//! None of these reach the host page. A failed resource degrades to its
//! cached copy or to an empty list; a malformed record is skipped.

use thiserror::Error;

/// A JSON resource could not be used at all
#[derive(Debug, Error)]
pub enum LoadError {
    /// The host reported that the fetch failed
    #[error("{resource} was not fetched")]
    Unavailable { resource: &'static str },

    /// The payload is not valid JSON
    #[error("invalid JSON in {resource}: {source}")]
    InvalidJson {
        resource: &'static str,
        #[source]
        source: serde_json::Error,
    },

    /// The payload is valid JSON but not an array of records
    #[error("{resource} is not a JSON array")]
    NotAnArray { resource: &'static str },
}

/// A single record could not be decoded
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("{kind} record #{position} is missing an id")]
    MissingId { kind: &'static str, position: usize },

    #[error("{kind} record #{position} is malformed: {source}")]
    Malformed {
        kind: &'static str,
        position: usize,
        #[source]
        source: serde_json::Error,
    },
}
