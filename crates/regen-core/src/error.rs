//! Error types for the ReGen application.

use serde::Serialize;
use thiserror::Error;

/// A shared error type for the entire ReGen application.
///
/// This provides typed, structured error variants with automatic conversion
/// from common error types via the `From` trait.
#[derive(Error, Debug, Clone, Serialize)]
pub enum RegenError {
    /// A store mutation that requires an authenticated principal found none.
    #[error("No active session")]
    NoActiveSession,

    /// A single model candidate failed (network, non-2xx, or format violation).
    ///
    /// Recovered internally by advancing to the next candidate; callers of
    /// the inference client never see this variant directly.
    #[error("Model '{model}' unavailable: {message}")]
    ModelUnavailable { model: String, message: String },

    /// Every model candidate was exhausted without a valid analysis.
    ///
    /// Carries the last candidate's underlying cause for diagnostics.
    #[error("Analysis unavailable: {message}")]
    AnalysisUnavailable { message: String },

    /// The connectivity probe failed across all model candidates.
    #[error("Connectivity check failed: {0}")]
    Connectivity(String),

    /// A remote profile or history write failed.
    #[error("Remote write to {resource} failed: {message}")]
    RemoteWrite {
        resource: &'static str,
        message: String,
    },

    /// Entity not found error with type information
    #[error("Entity not found: {entity_type} '{id}'")]
    NotFound {
        entity_type: &'static str,
        id: String,
    },

    /// IO error (file system operations)
    #[error("IO error: {message}")]
    Io { message: String },

    /// Serialization/deserialization error
    #[error("Serialization error: {format} - {message}")]
    Serialization {
        format: String, // "TOML", "JSON", etc.
        message: String,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Internal error (should not happen in normal operation)
    #[error("Internal error: {0}")]
    Internal(String),
}

impl RegenError {
    // ============================================================================
    // Constructor helpers
    // ============================================================================

    /// Creates a ModelUnavailable error
    pub fn model_unavailable(model: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
            message: message.into(),
        }
    }

    /// Creates an AnalysisUnavailable error
    pub fn analysis_unavailable(message: impl Into<String>) -> Self {
        Self::AnalysisUnavailable {
            message: message.into(),
        }
    }

    /// Creates a Connectivity error
    pub fn connectivity(message: impl Into<String>) -> Self {
        Self::Connectivity(message.into())
    }

    /// Creates a RemoteWrite error
    pub fn remote_write(resource: &'static str, message: impl Into<String>) -> Self {
        Self::RemoteWrite {
            resource,
            message: message.into(),
        }
    }

    /// Creates a NotFound error
    pub fn not_found(entity_type: &'static str, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type,
            id: id.into(),
        }
    }

    /// Creates an IO error
    pub fn io(message: impl Into<String>) -> Self {
        Self::Io {
            message: message.into(),
        }
    }

    /// Creates a Config error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Creates an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal(message.into())
    }

    // ============================================================================
    // Type checking methods
    // ============================================================================

    /// Check if this is a NoActiveSession error
    pub fn is_no_active_session(&self) -> bool {
        matches!(self, Self::NoActiveSession)
    }

    /// Check if this is an AnalysisUnavailable error
    pub fn is_analysis_unavailable(&self) -> bool {
        matches!(self, Self::AnalysisUnavailable { .. })
    }

    /// Check if this is a RemoteWrite error
    pub fn is_remote_write(&self) -> bool {
        matches!(self, Self::RemoteWrite { .. })
    }

    /// Check if this is a NotFound error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

// ============================================================================
// From implementations for automatic conversion
// ============================================================================

impl From<std::io::Error> for RegenError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: format!("{} (kind: {:?})", err, err.kind()),
        }
    }
}

impl From<serde_json::Error> for RegenError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization {
            format: "JSON".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::de::Error> for RegenError {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<toml::ser::Error> for RegenError {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization {
            format: "TOML".to_string(),
            message: err.to_string(),
        }
    }
}

/// A type alias for `Result<T, RegenError>`.
pub type Result<T> = std::result::Result<T, RegenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_unavailable_display() {
        let err = RegenError::model_unavailable("gemini-2.5-flash", "quota exceeded");
        assert_eq!(
            err.to_string(),
            "Model 'gemini-2.5-flash' unavailable: quota exceeded"
        );
    }

    #[test]
    fn test_predicates() {
        assert!(RegenError::NoActiveSession.is_no_active_session());
        assert!(RegenError::analysis_unavailable("boom").is_analysis_unavailable());
        assert!(RegenError::remote_write("profiles", "500").is_remote_write());
        assert!(!RegenError::connectivity("x").is_not_found());
    }

    #[test]
    fn test_from_io_error() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: RegenError = io.into();
        assert!(matches!(err, RegenError::Io { .. }));
    }
}
