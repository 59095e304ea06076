//! Unified application error types for the ERP data layer.
//!
//! All crates map their internal errors into [`AppError`] for consistent
//! propagation through the ? operator.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// The requested row was not found.
    NotFound,
    /// Input validation failed (bad sort order, unknown field, empty name...).
    Validation,
    /// A uniqueness constraint was violated.
    Conflict,
    /// A database error occurred.
    Database,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// An internal error occurred.
    Internal,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Database => write!(f, "DATABASE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::Internal => write!(f, "INTERNAL"),
        }
    }
}

/// The unified application error used throughout the ERP data layer.
///
/// Multi-step operations (insert followed by a failed rollback) keep every
/// failure: the first one is the error itself, later ones are attached with
/// [`AppError::suppress`] and remain reachable through
/// [`AppError::suppressed`].
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
    /// Secondary errors raised while handling this one.
    pub suppressed: Vec<AppError>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
            suppressed: Vec::new(),
        }
    }

    /// Create a new application error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
            suppressed: Vec::new(),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Attach a secondary error and return `self`.
    pub fn suppress(mut self, other: AppError) -> Self {
        self.suppressed.push(other);
        self
    }

    /// Secondary errors attached to this one.
    pub fn suppressed(&self) -> &[AppError] {
        &self.suppressed
    }

    /// Whether this error is a not-found error.
    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
            suppressed: self.suppressed.clone(),
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(feature = "sqlx")]
impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::with_source(ErrorKind::NotFound, "Row not found", err),
            _ => Self::with_source(ErrorKind::Database, format!("Database error: {err}"), err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::not_found("Sequence 7 not found");
        assert_eq!(err.to_string(), "NOT_FOUND: Sequence 7 not found");
    }

    #[test]
    fn test_suppress_keeps_every_error() {
        let err = AppError::database("insert failed")
            .suppress(AppError::database("rollback failed"));
        assert_eq!(err.kind, ErrorKind::Database);
        assert_eq!(err.suppressed().len(), 1);
        assert_eq!(err.suppressed()[0].message, "rollback failed");
    }

    #[test]
    fn test_clone_drops_source_keeps_suppressed() {
        let io = std::io::Error::other("boom");
        let err = AppError::with_source(ErrorKind::Internal, "wrapped", io)
            .suppress(AppError::internal("second"));
        let cloned = err.clone();
        assert!(cloned.source.is_none());
        assert_eq!(cloned.suppressed().len(), 1);
    }
}
