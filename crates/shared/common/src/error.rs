//! Unified error handling for store operations.
//!
//! Callers tell failures apart by [`ErrorKind`], never by message text:
//! - `Validation`: a required argument is missing or empty
//! - `NotFound`: no matching record
//! - `Store`: anything unexpected from the backing store

use domain::DomainError;
use thiserror::Error;

/// Store error types.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("{0}")]
    Validation(String),

    #[error("{0} not found")]
    NotFound(String),

    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Store(#[from] sea_orm::DbErr),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Store,
}

impl StoreError {
    /// Classify the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Validation(_) => ErrorKind::Validation,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            #[cfg(feature = "database")]
            StoreError::Store(_) => ErrorKind::Store,
            StoreError::Internal(_) => ErrorKind::Store,
        }
    }

    /// Get error code for callers
    pub fn code(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Store => "STORE_ERROR",
        }
    }

    pub fn is_validation(&self) -> bool {
        self.kind() == ErrorKind::Validation
    }

    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }

    pub fn is_store(&self) -> bool {
        self.kind() == ErrorKind::Store
    }
}

// =============================================================================
// Domain Error Conversion
// =============================================================================

impl From<DomainError> for StoreError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation(msg) => StoreError::Validation(msg),
            DomainError::Password(msg) => StoreError::Internal(msg),
        }
    }
}

/// Result type alias
pub type StoreResult<T> = Result<T, StoreError>;

/// Extension trait for Option -> StoreError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self, entity: &str) -> StoreResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self, entity: &str) -> StoreResult<T> {
        self.ok_or_else(|| StoreError::not_found(entity))
    }
}

/// Convenience constructors
impl StoreError {
    pub fn validation(msg: impl Into<String>) -> Self {
        StoreError::Validation(msg.into())
    }

    pub fn not_found(entity: impl Into<String>) -> Self {
        StoreError::NotFound(entity.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        StoreError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kinds_and_codes() {
        let err = StoreError::validation("id is empty");
        assert_eq!(err.kind(), ErrorKind::Validation);
        assert_eq!(err.code(), "VALIDATION_ERROR");
        assert_eq!(err.to_string(), "id is empty");

        let err = StoreError::not_found("Group");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Group not found");

        let err = StoreError::internal("boom");
        assert!(err.is_store());
        assert_eq!(err.code(), "STORE_ERROR");
    }

    #[test]
    fn test_from_domain_error() {
        let err: StoreError = DomainError::validation("password is empty").into();
        assert!(err.is_validation());

        assert_eq!(err.to_string(), "password is empty");

        let err: StoreError = DomainError::password("hash failed").into();
        assert!(err.is_store());
    }

    #[test]
    fn test_option_ext() {
        let missing: Option<u8> = None;
        let err = missing.ok_or_not_found("User").unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(Some(3).ok_or_not_found("User").unwrap(), 3);
    }
}
