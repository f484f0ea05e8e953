//! Error types for sketch and detector operations

use std::fmt;

/// Errors that can occur during sketch or detector operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SketchError {
    /// Invalid parameter provided to a constructor
    InvalidParameter {
        /// Parameter name
        param: String,
        /// Invalid value provided
        value: String,
        /// Constraint that was violated
        constraint: String,
    },

    /// Invalid input provided to an update operation (not a construction-time
    /// parameter): an out-of-range bit, a negative count, a deserialized blob
    /// too short to contain its own header.
    InvalidInput {
        /// What was wrong with the input
        reason: String,
    },

    /// Attempted to merge two sketches built with different parameters
    IncompatibleSketches {
        /// Reason for incompatibility
        reason: String,
    },

    /// Error while decoding a serialized sketch
    DeserializationError(String),
}

impl fmt::Display for SketchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SketchError::InvalidParameter {
                param,
                value,
                constraint,
            } => {
                write!(
                    f,
                    "invalid parameter '{param}': value '{value}' {constraint}"
                )
            }
            SketchError::InvalidInput { reason } => write!(f, "invalid input: {reason}"),
            SketchError::IncompatibleSketches { reason } => {
                write!(f, "incompatible sketches: {reason}")
            }
            SketchError::DeserializationError(msg) => write!(f, "deserialization error: {msg}"),
        }
    }
}

impl std::error::Error for SketchError {}

/// Result type alias for sketch and detector operations
pub type Result<T> = std::result::Result<T, SketchError>;
