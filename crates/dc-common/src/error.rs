//! Error types for Driftcheck.

use thiserror::Error;

/// Result type alias for Driftcheck operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Unified error type for Driftcheck.
///
/// Fatal errors exist only at session boundaries and on persistence paths;
/// everything that can go wrong inside a running session is a warn-level
/// diagnostic, never an error.
#[derive(Error, Debug)]
pub enum Error {
    // Session errors (10-19)
    #[error("a {phase} session is already active")]
    SessionActive { phase: String },

    #[error("verification requires a populated output store; nothing was collected or loaded")]
    EmptyStore,

    // Value errors (20-29)
    #[error("array shape {shape:?} implies {expected} elements, buffer holds {actual}")]
    ShapeMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },

    // Persistence errors (30-39)
    #[error("store schema version {found} is not compatible (expected {expected})")]
    IncompatibleSchema { found: String, expected: String },

    // I/O errors (60-69)
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Returns the error code for this error type.
    /// Used for detailed error reporting in structured output.
    pub fn code(&self) -> u32 {
        match self {
            Error::SessionActive { .. } => 10,
            Error::EmptyStore => 11,
            Error::ShapeMismatch { .. } => 20,
            Error::IncompatibleSchema { .. } => 30,
            Error::Io(_) => 60,
            Error::Json(_) => 61,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_are_stable() {
        assert_eq!(
            Error::SessionActive {
                phase: "collect".into()
            }
            .code(),
            10
        );
        assert_eq!(Error::EmptyStore.code(), 11);
        assert_eq!(
            Error::IncompatibleSchema {
                found: "2.0.0".into(),
                expected: "1.0.0".into()
            }
            .code(),
            30
        );
    }

    #[test]
    fn display_mentions_phase() {
        let err = Error::SessionActive {
            phase: "verify".into(),
        };
        assert!(err.to_string().contains("verify"));
    }
}
