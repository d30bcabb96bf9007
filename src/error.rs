//! Error types for sbsearch-rs
//!
//! This module provides error handling for all sbsearch operations, covering
//! ephemeris retrieval, interpolation, spatial indexing, and storage.

use thiserror::Error;

/// Main error type for sbsearch operations
#[derive(Error, Debug)]
pub enum SbSearchError {
    /// Remote ephemeris fetch failed; surfaced to the caller, never retried here
    #[error("Ephemeris provider error: {0}")]
    Provider(String),

    /// Malformed cadence specification (e.g. not `1d`, `12h`, `30m`)
    #[error("Invalid step: {0}")]
    InvalidStep(String),

    /// Epoch could not be parsed as a Julian date or calendar date
    #[error("Invalid epoch: {0}")]
    InvalidEpoch(String),

    /// Interpolation requested outside the bracketed stored range
    #[error("Insufficient ephemeris data: {0}")]
    InsufficientData(String),

    /// Search requested for an object with no stored trajectory in range
    #[error("No ephemeris stored for object {0} in the requested range")]
    NoEphemeris(i64),

    /// Designation or id does not resolve to a registered object
    #[error("Unknown object: {0}")]
    UnknownObject(String),

    /// Verification found partial schema structure it could not repair
    #[error("Schema inconsistency: {0}")]
    SchemaInconsistency(String),

    /// Database/storage errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// SQLite database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type alias for sbsearch operations
pub type Result<T> = std::result::Result<T, SbSearchError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = SbSearchError::UnknownObject("2P".to_string());
        assert_eq!(error.to_string(), "Unknown object: 2P");

        let error = SbSearchError::NoEphemeris(42);
        assert!(error.to_string().contains("object 42"));
    }

    #[test]
    fn test_error_chain() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = SbSearchError::from(io_error);

        match error {
            SbSearchError::Io(_) => (),
            _ => panic!("Expected Io error"),
        }
    }
}
