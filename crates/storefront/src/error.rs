use thiserror::Error;

use cafecart_core::DomainError;

use crate::config::ConfigError;

pub type StorefrontResult<T> = Result<T, StorefrontError>;

/// Errors surfaced by the interaction surface.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorefrontError {
    /// Rejected domain input (e.g. malformed add-trigger attributes).
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
