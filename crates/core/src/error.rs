//! Domain error model.

use thiserror::Error;

/// Coarse failure class, used by outer layers to pick a response category.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Malformed input. Never retried.
    Validation,
    /// Operation not allowed in the current lifecycle state. Never retried automatically.
    StateConflict,
    /// The aggregate does not exist.
    NotFound,
    /// Store or serialization failure. Opaque to the caller.
    Internal,
}

impl ErrorClass {
    /// Status name a transport would map this class to.
    pub fn status_hint(self) -> &'static str {
        match self {
            ErrorClass::Validation => "bad_request",
            ErrorClass::StateConflict => "precondition_failed",
            ErrorClass::NotFound => "not_found",
            ErrorClass::Internal => "internal",
        }
    }
}

/// Domain-level error.
///
/// Keep this focused on deterministic, business/domain failures (validation,
/// lifecycle conflicts). Infrastructure concerns belong elsewhere.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. malformed input).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The operation conflicts with the aggregate's current state.
    #[error("state conflict: {0}")]
    StateConflict(String),

    /// An identifier was invalid (e.g. parse failure).
    #[error("invalid identifier: {0}")]
    InvalidId(String),

    /// A requested resource was not found (domain-level).
    #[error("not found")]
    NotFound,
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn conflict(msg: impl Into<String>) -> Self {
        Self::StateConflict(msg.into())
    }

    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Self::InvalidId(msg.into())
    }

    pub fn not_found() -> Self {
        Self::NotFound
    }

    pub fn class(&self) -> ErrorClass {
        match self {
            DomainError::Validation(_) | DomainError::InvalidId(_) => ErrorClass::Validation,
            DomainError::StateConflict(_) => ErrorClass::StateConflict,
            DomainError::NotFound => ErrorClass::NotFound,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classes_map_to_transport_hints() {
        assert_eq!(DomainError::validation("x").class().status_hint(), "bad_request");
        assert_eq!(DomainError::invalid_id("x").class(), ErrorClass::Validation);
        assert_eq!(DomainError::conflict("x").class().status_hint(), "precondition_failed");
        assert_eq!(DomainError::not_found().class().status_hint(), "not_found");
        assert_eq!(ErrorClass::Internal.status_hint(), "internal");
    }
}
