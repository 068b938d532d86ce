//! Error types for the voxpop application.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A shared error type for the entire voxpop application.
///
/// This provides typed, structured error variants so that the transport
/// adapter can map each failure to a distinct, stable error kind instead
/// of an opaque message.
#[derive(Error, Debug, Clone, Serialize, Deserialize)]
pub enum VoxError {
    /// The provider kept reporting a transient condition and the retry
    /// budget is exhausted. The caller may try again later.
    #[error("Service unavailable: {message}")]
    ServiceUnavailable { message: String },

    /// Non-retryable upstream provider failure.
    #[error("Provider error: {message}")]
    Provider { message: String },

    /// Persona generation exhausted retries or produced unusable text.
    #[error("Persona generation failed: {0}")]
    GenerationFailed(String),

    /// Persona selection did not name exactly 3 distinct valid indices.
    #[error("Invalid selection: {0}")]
    InvalidSelection(String),

    /// An operation required selected personas but none are selected.
    #[error("No personas are selected for this session")]
    NoActiveSelection,

    /// Uploaded question data contained no usable rows.
    #[error("No valid questions found in the uploaded data")]
    NoValidQuestions,

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// A single interview turn failed. Localized to one follow-up
    /// iteration; the surrounding interview continues.
    #[error("Interview turn failed: {0}")]
    InterviewTurnFailed(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl VoxError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ServiceUnavailable error
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::ServiceUnavailable {
            message: message.into(),
        }
    }

    /// Creates a Provider error
    pub fn provider(message: impl Into<String>) -> Self {
        Self::Provider {
            message: message.into(),
        }
    }

    /// Creates a GenerationFailed error
    pub fn generation_failed(message: impl Into<String>) -> Self {
        Self::GenerationFailed(message.into())
    }

    /// Creates an InvalidSelection error
    pub fn invalid_selection(message: impl Into<String>) -> Self {
        Self::InvalidSelection(message.into())
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an InterviewTurnFailed error
    pub fn interview_turn_failed(message: impl Into<String>) -> Self {
        Self::InterviewTurnFailed(message.into())
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Check if this is a ServiceUnavailable error
    pub fn is_service_unavailable(&self) -> bool {
        matches!(self, Self::ServiceUnavailable { .. })
    }

    /// Check if this error was caused by invalid caller input.
    ///
    /// Returns true for the validation failures a transport adapter would
    /// surface as a 4xx-equivalent:
    /// - `InvalidSelection`
    /// - `NoActiveSelection`
    /// - `NoValidQuestions`
    /// - `NotFound`
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidSelection(_)
                | Self::NoActiveSelection
                | Self::NoValidQuestions
                | Self::NotFound { .. }
        )
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for VoxError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

/// A type alias for `Result<T, VoxError>`.
pub type Result<T> = std::result::Result<T, VoxError>;
