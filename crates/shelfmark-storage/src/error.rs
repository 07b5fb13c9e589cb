//! Storage error types for the storage abstraction layer.

use std::fmt;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Attempted to insert a book whose ISBN already exists.
    #[error("Book already exists: {isbn}")]
    AlreadyExists {
        /// The duplicate unique key.
        isbn: String,
    },

    /// The requested book was not found.
    #[error("Book not found: {isbn}")]
    NotFound {
        /// The ISBN that was looked up.
        isbn: String,
    },

    /// An error occurred during a transaction.
    #[error("Transaction error: {message}")]
    TransactionError {
        /// Description of the transaction error.
        message: String,
    },

    /// Failed to connect to the storage backend.
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
    /// Creates a new `AlreadyExists` error.
    #[must_use]
    pub fn already_exists(isbn: impl Into<String>) -> Self {
        Self::AlreadyExists { isbn: isbn.into() }
    }

    /// Creates a new `NotFound` error.
    #[must_use]
    pub fn not_found(isbn: impl Into<String>) -> Self {
        Self::NotFound { isbn: isbn.into() }
    }

    /// Creates a new `TransactionError` error.
    #[must_use]
    pub fn transaction_error(message: impl Into<String>) -> Self {
        Self::TransactionError {
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

    /// Returns `true` if this is an already exists error.
    #[must_use]
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Returns `true` if this is a transaction error.
    #[must_use]
    pub fn is_transaction_error(&self) -> bool {
        matches!(self, Self::TransactionError { .. })
    }

    /// Returns the error category for logging/monitoring purposes.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AlreadyExists { .. } => ErrorCategory::Conflict,
            Self::NotFound { .. } => ErrorCategory::NotFound,
            Self::TransactionError { .. } => ErrorCategory::Transaction,
            Self::ConnectionError { .. } => ErrorCategory::Infrastructure,
            Self::Internal { .. } => ErrorCategory::Internal,
        }
    }
}

/// Categories of storage errors for logging and monitoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCategory {
    /// Book not found.
    NotFound,
    /// Duplicate unique key.
    Conflict,
    /// Transaction-related error.
    Transaction,
    /// Infrastructure/connection error.
    Infrastructure,
    /// Internal error.
    Internal,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::Conflict => write!(f, "conflict"),
            Self::Transaction => write!(f, "transaction"),
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
        let err = StorageError::already_exists("9780132350884");
        assert_eq!(err.to_string(), "Book already exists: 9780132350884");

        let err = StorageError::transaction_error("commit refused");
        assert_eq!(err.to_string(), "Transaction error: commit refused");
    }

    #[test]
    fn test_error_predicates() {
        let err = StorageError::already_exists("9780132350884");
        assert!(err.is_already_exists());
        assert!(!err.is_transaction_error());

        let err = StorageError::transaction_error("rollback");
        assert!(err.is_transaction_error());
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            StorageError::already_exists("x").category(),
            ErrorCategory::Conflict
        );
        assert_eq!(
            StorageError::transaction_error("x").category(),
            ErrorCategory::Transaction
        );
        assert_eq!(
            StorageError::connection_error("x").category(),
            ErrorCategory::Infrastructure
        );
    }
}
