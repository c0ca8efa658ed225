//! Unified application error types for Seatbook.
//!
//! Every crate maps its internal failures into [`AppError`] so that the
//! booking path can propagate them with `?`. Business outcomes (sold out,
//! not reserved, not permitted, lost race) travel through the same type
//! but are flagged by [`AppError::is_expected`] and never logged as faults.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the entire application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// No seat of the requested rank remains for the event.
    SoldOut,
    /// The requested event, seat, or active reservation does not exist.
    NotFound,
    /// The caller does not own the reservation it is acting on.
    Authorization,
    /// Input validation failed.
    Validation,
    /// An optimistic write lost its race; the caller should retry from scratch.
    Conflict,
    /// An internal error occurred.
    Internal,
    /// A database error occurred.
    Database,
    /// A cache error occurred.
    Cache,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
    /// The durable store is unreachable or rejected the write.
    ServiceUnavailable,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SoldOut => write!(f, "SOLD_OUT"),
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::Authorization => write!(f, "AUTHORIZATION"),
            Self::Validation => write!(f, "VALIDATION"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Internal => write!(f, "INTERNAL"),
            Self::Database => write!(f, "DATABASE"),
            Self::Cache => write!(f, "CACHE"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
            Self::ServiceUnavailable => write!(f, "SERVICE_UNAVAILABLE"),
        }
    }
}

/// The unified application error used throughout Seatbook.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct AppError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Stable caller-facing code overriding the kind's default.
    pub code: Option<&'static str>,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl AppError {
    /// Create a new application error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            code: None,
            source: None,
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
            code: None,
            source: Some(Box::new(source)),
        }
    }

    /// Attach a specific caller-facing code (e.g. `"invalid_seat"`).
    pub fn with_code(mut self, code: &'static str) -> Self {
        self.code = Some(code);
        self
    }

    /// Create a sold-out outcome.
    pub fn sold_out(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SoldOut, message)
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an authorization error.
    pub fn authorization(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Authorization, message)
    }

    /// Create a validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Validation, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create an internal error.
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    /// Create a database error.
    pub fn database(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Database, message)
    }

    /// Create a cache error.
    pub fn cache(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Cache, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }

    /// Create a service-unavailable error.
    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServiceUnavailable, message)
    }

    /// Whether this error is a routine business outcome rather than a fault.
    pub fn is_expected(&self) -> bool {
        matches!(
            self.kind,
            ErrorKind::SoldOut
                | ErrorKind::NotFound
                | ErrorKind::Authorization
                | ErrorKind::Conflict
                | ErrorKind::Validation
        )
    }

    /// Stable error code surfaced to callers.
    ///
    /// Infrastructure failures all collapse to `"internal"`.
    pub fn code(&self) -> &'static str {
        if let Some(code) = self.code {
            return code;
        }
        match self.kind {
            ErrorKind::SoldOut => "sold_out",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Authorization => "not_permitted",
            ErrorKind::Validation => "invalid_request",
            ErrorKind::Conflict => "conflict",
            ErrorKind::Internal
            | ErrorKind::Database
            | ErrorKind::Cache
            | ErrorKind::Configuration
            | ErrorKind::Serialization
            | ErrorKind::ServiceUnavailable => "internal",
        }
    }
}

impl Clone for AppError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            code: self.code,
            source: None,
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

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        Self::with_source(ErrorKind::Internal, format!("I/O error: {err}"), err)
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_business_outcomes_are_expected() {
        assert!(AppError::sold_out("rank S").is_expected());
        assert!(AppError::not_found("no reservation").is_expected());
        assert!(AppError::authorization("not yours").is_expected());
        assert!(AppError::conflict("lost race").is_expected());
        assert!(!AppError::service_unavailable("db down").is_expected());
        assert!(!AppError::database("constraint").is_expected());
    }

    #[test]
    fn test_codes_are_stable() {
        assert_eq!(AppError::sold_out("x").code(), "sold_out");
        assert_eq!(AppError::authorization("x").code(), "not_permitted");
        assert_eq!(AppError::conflict("x").code(), "conflict");
        assert_eq!(AppError::service_unavailable("x").code(), "internal");
        assert_eq!(AppError::cache("x").code(), "internal");
    }

    #[test]
    fn test_explicit_code_overrides_kind() {
        let err = AppError::not_found("seat 9 not reserved").with_code("not_reserved");
        assert_eq!(err.code(), "not_reserved");
        assert_eq!(err.clone().code(), "not_reserved");
    }

    #[test]
    fn test_display_includes_kind() {
        let err = AppError::sold_out("event 1 rank S");
        assert_eq!(err.to_string(), "SOLD_OUT: event 1 rank S");
    }
}
