//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic business failures (validation,
/// capacity, missing entities). Infrastructure failures are mapped in at
/// the ledger boundary via `Storage`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// The named location does not exist in the catalog.
    ///
    /// Non-fatal during batch seeding: the batch logs and moves on.
    #[error("location not found: {0}")]
    LocationNotFound(String),

    /// The referenced resource does not exist.
    #[error("resource not found")]
    ResourceNotFound,

    /// A reservation quantity of zero (or otherwise unusable) was given.
    #[error("invalid quantity: must be at least 1")]
    InvalidQuantity,

    /// The reservation would push usage past the resource's total capacity.
    #[error("capacity exceeded: requested {requested}, remaining {remaining}")]
    CapacityExceeded { requested: u32, remaining: u32 },

    /// A concurrent writer won the race every time; the caller may retry.
    #[error("concurrent update conflict after {attempts} attempts")]
    ConcurrentUpdateConflict { attempts: u32 },

    /// A value failed validation (e.g. empty name, rating out of range).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A backing-store failure surfaced through a domain operation.
    #[error("storage failure: {0}")]
    Storage(String),
}

impl DomainError {
    pub fn location_not_found(name: impl Into<String>) -> Self {
        Self::LocationNotFound(name.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn storage(msg: impl Into<String>) -> Self {
        Self::Storage(msg.into())
    }

    /// True for failures the caller can meaningfully retry.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrentUpdateConflict { .. })
    }
}
