//! Error types for caseplay operations.

use thiserror::Error;

/// Errors that can occur when loading reference data or requesting a run.
///
/// A run that is superseded by a newer request is not an error; it ends with
/// a normal outcome and never surfaces here.
#[derive(Debug, Error)]
pub enum ReplayError {
    /// The requested subject is not in the reference table
    #[error("unknown subject: {subject}")]
    UnknownSubject {
        /// The subject identifier that was requested
        subject: String,
    },

    /// A subject references a zone that is not in the zone table
    #[error("subject {subject} references unknown zone {zone}")]
    UnknownZone {
        /// The subject carrying the dangling reference
        subject: String,
        /// The missing zone identifier
        zone: String,
    },

    /// Reference data violates one of its invariants
    #[error("invalid reference data for {entry}: {reason}")]
    InvalidReferenceData {
        /// The offending table entry
        entry: String,
        /// What is wrong with it
        reason: String,
    },

    /// Failed to read a reference data file
    #[error("failed to read reference data at {path}: {source}")]
    ReadError {
        /// Path to the file that could not be read
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Failed to parse reference data TOML
    #[error("failed to parse reference data at {path}: {source}")]
    ParseError {
        /// Path (or `<builtin>`) of the document that failed to parse
        path: String,
        /// Underlying TOML error
        #[source]
        source: toml::de::Error,
    },

    /// An engine setting is out of range
    #[error("invalid engine configuration for {field}: {reason}")]
    InvalidConfig {
        /// The offending setting
        field: String,
        /// What is wrong with it
        reason: String,
    },

    /// The engine's control channel is closed
    #[error("replay engine has stopped")]
    EngineStopped,
}

/// Result type for caseplay operations.
pub type ReplayResult<T> = Result<T, ReplayError>;

impl ReplayError {
    /// Build an [`ReplayError::UnknownSubject`] for the given identifier.
    pub fn unknown_subject(subject: impl Into<String>) -> Self {
        Self::UnknownSubject {
            subject: subject.into(),
        }
    }
}
