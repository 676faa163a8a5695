//! Unified error hierarchy for Aura
//!
//! The readiness, recovery and curve computations are total and never fail;
//! these errors come from the boundaries around them: payload validation,
//! persistence, the warehouse mirror, configuration and export.

use crate::database::DatabaseError;
use crate::export::ExportError;
use crate::warehouse::WarehouseError;
use thiserror::Error;

/// Top-level error type for all Aura operations
#[derive(Debug, Error)]
pub enum AuraError {
    /// Rejected check-in or profile payload
    #[error("Validation error: {0}")]
    Validation(String),

    /// Database operation errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Requested record does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Warehouse mirror errors
    #[error("Warehouse error: {0}")]
    Warehouse(#[from] WarehouseError),

    /// Export errors
    #[error("Export error: {0}")]
    Export(#[from] ExportError),

    /// JSON (de)serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Generic internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias for Aura operations
pub type Result<T> = std::result::Result<T, AuraError>;

impl AuraError {
    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AuraError::Database(DatabaseError::SqliteError(_)) | AuraError::Io(_)
        )
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            AuraError::Validation(_) => ErrorSeverity::Warning,
            AuraError::NotFound(_) => ErrorSeverity::Warning,
            AuraError::Warehouse(_) => ErrorSeverity::Warning,
            AuraError::Database(_) => ErrorSeverity::Error,
            AuraError::Internal(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::Error,
        }
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            AuraError::Validation(reason) => format!("Check-in rejected: {}", reason),
            AuraError::NotFound(what) => {
                format!("Could not find {}. Run `aura register` first.", what)
            }
            AuraError::Database(_) => {
                "Unable to access the check-in database. Please check your configuration."
                    .to_string()
            }
            _ => self.to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    /// Critical system error requiring immediate attention
    Critical,
    /// Error that prevents operation but system can continue
    Error,
    /// Warning that doesn't prevent operation
    Warning,
    /// Informational message
    Info,
}

impl ErrorSeverity {
    /// Convert to tracing level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            ErrorSeverity::Critical => tracing::Level::ERROR,
            ErrorSeverity::Error => tracing::Level::ERROR,
            ErrorSeverity::Warning => tracing::Level::WARN,
            ErrorSeverity::Info => tracing::Level::INFO,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_severity() {
        let err = AuraError::Validation("stress out of range".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Warning);
        assert_eq!(err.severity().to_tracing_level(), tracing::Level::WARN);

        let err = AuraError::Internal("test".to_string());
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_retryable() {
        let err = AuraError::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk"));
        assert!(err.is_retryable());

        let err = AuraError::Validation("test".to_string());
        assert!(!err.is_retryable());
    }

    #[test]
    fn test_user_messages() {
        let err = AuraError::NotFound("profile user-1".to_string());
        assert!(err.user_message().contains("aura register"));

        let err = AuraError::Validation("invalid wake time".to_string());
        assert!(err.user_message().starts_with("Check-in rejected"));
    }
}
