//! Storage error types for the persistence abstraction layer.

use std::fmt;

/// Errors that can occur during persistence operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// The requested row was not found.
    #[error("Entity not found: {entity}/{id}")]
    NotFound {
        /// The kind of entity that was not found.
        entity: String,
        /// The id of the entity that was not found.
        id: String,
    },

    /// The write was rejected because of the current row state.
    #[error("Invalid operation: {message}")]
    InvalidOperation {
        /// Description of why the operation was rejected.
        message: String,
    },

    /// Failed to connect to the database or the connection pool is exhausted.
    #[error("Connection error: {message}")]
    ConnectionError {
        /// Description of the connection error.
        message: String,
    },

    /// An internal storage error occurred.
    #[error("Internal error: {message}")]
    Internal {
        /// Description of the internal error.
        message: String,
    },
}

impl StorageError {
    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(entity: impl Into<String>, id: impl ToString) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a new `InvalidOperation` error.
    #[must_use]
    pub fn invalid_operation(message: impl Into<String>) -> Self {
        Self::InvalidOperation {
            message: message.into(),
        }
    }

    /// Creates a new `ConnectionError` error.
    #[must_use]
    pub fn connection_error(message: impl Into<String>) -> Self {
        Self::ConnectionError {
            message: message.into(),
        }
    }

    /// Creates a new `Internal` error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Returns `true` if this is a not found error.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }

    /// Returns `true` if retrying the same call later may succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::ConnectionError { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::InvalidOperation { .. } => ErrorCategory::Validation,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    NotFound,
    Validation,
    Infrastructure,
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Validation => write!(f, "validation"),
            Self::Infrastructure => write!(f, "infrastructure"),
            Self::Internal => write!(f, "internal"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = StorageError::not_found("User", 123);
        assert_eq!(err.to_string(), "Entity not found: User/123");

        let err = StorageError::connection_error("pool timed out");
        assert_eq!(err.to_string(), "Connection error: pool timed out");
    }

    #[test]
    fn test_error_predicates() {
        assert!(StorageError::not_found("User", 1).is_not_found());
        assert!(!StorageError::internal("boom").is_not_found());
        assert!(StorageError::connection_error("down").is_transient());
        assert!(!StorageError::invalid_operation("no").is_transient());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::not_found("User", 1).category(),
            ErrorCategory::NotFound
        );
        assert_eq!(
            StorageError::invalid_operation("role not assigned").category(),
            ErrorCategory::Validation
        );
        assert_eq!(ErrorCategory::Infrastructure.to_string(), "infrastructure");
    }
}
