//! Unified error type for the station engine
//!
//! Reads are resilient-by-default (callers fall back to cached data on
//! `RemoteUnavailable`); writes are fail-closed (nothing is assumed
//! persisted until confirmed). No variant here should ever escalate to a
//! panic in non-test code.

use thiserror::Error;

/// Unified error type for the engine
#[derive(Debug, Error)]
pub enum AppError {
    /// Remote service unreachable (network/transport failure)
    #[error("Remote service unavailable: {message}")]
    RemoteUnavailable { message: String },

    /// Remote service answered with a non-success response on a write
    #[error("Remote service rejected request: {message}")]
    RemoteRejected { message: String },

    /// Promotion activation attempted outside the designated day
    #[error("Promotion not available: {message}")]
    InvalidEligibility { message: String },

    /// Operation referenced a cart key that is not present
    #[error("Unknown cart key: {key}")]
    InconsistentKey { key: String },

    /// Validation error
    #[error("{message}")]
    Validation { message: String },

    /// Resource not found
    #[error("{resource} not found")]
    NotFound { resource: String },

    /// Durable storage error
    #[error("Storage error: {message}")]
    Storage { message: String },

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Internal error
    #[error("Internal error: {message}")]
    Internal { message: String },
}

impl AppError {
    // ========== Convenient constructors ==========

    /// Create a RemoteUnavailable error
    pub fn remote_unavailable(message: impl Into<String>) -> Self {
        Self::RemoteUnavailable {
            message: message.into(),
        }
    }

    /// Create a RemoteRejected error
    pub fn remote_rejected(message: impl Into<String>) -> Self {
        Self::RemoteRejected {
            message: message.into(),
        }
    }

    /// Create an InvalidEligibility error
    pub fn invalid_eligibility(message: impl Into<String>) -> Self {
        Self::InvalidEligibility {
            message: message.into(),
        }
    }

    /// Create an InconsistentKey error
    pub fn inconsistent_key(key: impl Into<String>) -> Self {
        Self::InconsistentKey { key: key.into() }
    }

    /// Create a Validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a NotFound error
    pub fn not_found(resource: impl Into<String>) -> Self {
        Self::NotFound {
            resource: resource.into(),
        }
    }

    /// Create a Storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create an Internal error
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Whether this error came from the remote boundary (read paths treat
    /// these as a signal to keep serving cached data)
    pub fn is_remote(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable { .. } | Self::RemoteRejected { .. }
        )
    }
}

/// Result type for engine operations
pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_remote_classification() {
        assert!(AppError::remote_unavailable("down").is_remote());
        assert!(AppError::remote_rejected("409").is_remote());
        assert!(!AppError::validation("bad").is_remote());
        assert!(!AppError::inconsistent_key("x").is_remote());
    }

    #[test]
    fn test_display_messages() {
        let err = AppError::inconsistent_key("Cheese pizza@300");
        assert_eq!(err.to_string(), "Unknown cart key: Cheese pizza@300");

        let err = AppError::not_found("Ticket 42");
        assert_eq!(err.to_string(), "Ticket 42 not found");
    }
}
