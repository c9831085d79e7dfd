//! Error types for the swap marketplace
//!
//! A single flat taxonomy shared by the stores, the negotiation engine
//! and the transport layer.

use thiserror::Error;

/// Result alias used across the marketplace crates
pub type SwapResult<T> = Result<T, SwapError>;

/// Every failure the core can report
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SwapError {
    /// Malformed input (title, timestamps, ids, actions)
    #[error("Invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    /// Operation illegal for the entity's current state
    #[error("Invalid state: {0}")]
    State(String),

    /// Caller is not the authorized actor
    #[error("Forbidden: {0}")]
    Forbidden(String),

    /// Referenced entity is absent
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Request makes no sense regardless of state (e.g. swapping with yourself)
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),

    /// Concurrent or duplicate condition
    #[error("Conflict: {0}")]
    Conflict(String),

    /// Storage fault
    #[error("Internal error: {0}")]
    Internal(String),
}

impl SwapError {
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        SwapError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn slot_not_found(id: impl ToString) -> Self {
        SwapError::NotFound {
            entity: "Slot",
            id: id.to_string(),
        }
    }

    pub fn request_not_found(id: impl ToString) -> Self {
        SwapError::NotFound {
            entity: "Swap request",
            id: id.to_string(),
        }
    }

    /// Stable machine-readable code for transport layers
    pub fn code(&self) -> &'static str {
        match self {
            SwapError::Validation { .. } => "VALIDATION_ERROR",
            SwapError::State(_) => "STATE_ERROR",
            SwapError::Forbidden(_) => "FORBIDDEN",
            SwapError::NotFound { .. } => "NOT_FOUND",
            SwapError::InvalidOperation(_) => "INVALID_OPERATION",
            SwapError::Conflict(_) => "CONFLICT",
            SwapError::Internal(_) => "INTERNAL_ERROR",
        }
    }
}
