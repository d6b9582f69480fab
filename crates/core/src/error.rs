//! Domain error model.

use thiserror::Error;

pub type DomainResult<T> = Result<T, DomainError>;

/// Why a cart or checkout operation was refused.
///
/// Every variant is raised before any state changes, so a caller that sees
/// one can keep using the cart as it was.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Malformed input from a trigger (price text, empty cart checkout).
    #[error("validation failed: {0}")]
    Validation(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A checkout is already in flight.
    #[error("conflict: {0}")]
    Conflict(String),

    /// A quantity, total or deadline would leave its representable range.
    #[error("out of range: {0}")]
    Overflow(String),

    #[error("invariant violated: {0}")]
    InvariantViolation(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::Conflict(msg.into())
    }

    pub fn overflow(msg: impl Into<String>) -> Self {
        Self::Overflow(msg.into())
    }

    pub fn invariant(msg: impl Into<String>) -> Self {
        Self::InvariantViolation(msg.into())
    }
}
