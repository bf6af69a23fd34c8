//! # DomainError
//!
//! Centralized error handling for the launchpad backend.
//! Every port returns this type so adapters can signal uniqueness
//! violations without leaking driver-specific errors.

use thiserror::Error;

/// The primary error type for all domain operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Referenced entity absent (e.g., Product, Comment, User)
    #[error("{0} not found with id {1}")]
    NotFound(String, String),

    /// Bad or missing input (e.g., empty comment, invalid category)
    #[error("{0}")]
    Validation(String),

    /// Missing, malformed, or expired credential
    #[error("{0}")]
    Unauthenticated(String),

    /// Valid principal, insufficient rights
    #[error("{0}")]
    Forbidden(String),

    /// Uniqueness violation (duplicate vote, duplicate email)
    #[error("{0}")]
    Conflict(String),

    /// Infrastructure failure (e.g., store unreachable)
    #[error("internal service error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_found(entity: &str, id: impl ToString) -> Self {
        Self::NotFound(entity.to_string(), id.to_string())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

/// A specialized Result type for domain logic.
pub type Result<T> = std::result::Result<T, DomainError>;
