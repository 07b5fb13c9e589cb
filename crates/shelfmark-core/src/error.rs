use thiserror::Error;

/// Core error types for Shelfmark operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Unknown category: {0}")]
    InvalidCategory(String),

    #[error("Invalid ISBN: {0}")]
    InvalidIsbn(String),

    #[error("JSON serialization error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    /// Create a new InvalidCategory error
    pub fn invalid_category(category: impl Into<String>) -> Self {
        Self::InvalidCategory(category.into())
    }

    /// Create a new InvalidIsbn error
    pub fn invalid_isbn(isbn: impl Into<String>) -> Self {
        Self::InvalidIsbn(isbn.into())
    }

    /// Create a new Configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    /// Check if this error is caused by bad caller input
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidCategory(_) | Self::InvalidIsbn(_) | Self::JsonError(_)
        )
    }

    /// Get error category for logging/monitoring
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::InvalidCategory(_) | Self::InvalidIsbn(_) => ErrorCategory::Validation,
            Self::JsonError(_) => ErrorCategory::Serialization,
            Self::Configuration(_) => ErrorCategory::Configuration,
        }
    }
}

/// Error categories for monitoring and classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Validation,
    Serialization,
    Configuration,
}

/// Result type alias using CoreError
pub type Result<T> = std::result::Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CoreError::invalid_category("Cooking");
        assert_eq!(err.to_string(), "Unknown category: Cooking");

        let err = CoreError::invalid_isbn("not-an-isbn");
        assert_eq!(err.to_string(), "Invalid ISBN: not-an-isbn");
    }

    #[test]
    fn test_error_category() {
        assert_eq!(
            CoreError::invalid_category("Cooking").category(),
            ErrorCategory::Validation
        );
        assert_eq!(
            CoreError::configuration("bad ttl").category(),
            ErrorCategory::Configuration
        );
    }

    #[test]
    fn test_client_error_classification() {
        assert!(CoreError::invalid_isbn("x").is_client_error());
        assert!(!CoreError::configuration("x").is_client_error());
    }
}
