//! Error handling for quotesync.
//!
//! This module provides:
//! - [`QsError`]: The main error enum for all qs operations
//! - [`ErrorCode`]: Standardized error codes for machine parsing
//! - [`StructuredError`]: Rich error type with suggestions and context

mod codes;
mod suggestions;

use std::io;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

pub use codes::ErrorCode;
pub use suggestions::suggest_for_error;

/// Main error type for quotesync operations.
#[derive(Error, Debug)]
pub enum QsError {
    #[error("Quote validation failed: {0}")]
    Validation(String),

    #[error("Invalid import format: {0}")]
    InvalidImportFormat(String),

    #[error("Remote unavailable: {0}")]
    RemoteUnavailable(String),

    #[error("Malformed remote data: {0}")]
    MalformedRemoteData(String),

    #[error("No pending conflict to resolve")]
    NoPendingConflict,

    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Missing required config: {0}")]
    MissingConfig(String),
}

impl QsError {
    /// Get the error code for this error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::QuoteInvalid,
            Self::InvalidImportFormat(_) => ErrorCode::ImportInvalid,
            Self::RemoteUnavailable(_) => ErrorCode::RemoteUnavailable,
            Self::MalformedRemoteData(_) => ErrorCode::RemoteMalformed,
            Self::NoPendingConflict => ErrorCode::NoPendingConflict,
            Self::Database(_) => ErrorCode::DatabaseError,
            Self::Io(_) => ErrorCode::IoError,
            Self::Json(_) => ErrorCode::SerializationError,
            Self::Config(_) => ErrorCode::ConfigInvalid,
            Self::MissingConfig(_) => ErrorCode::ConfigMissingRequired,
        }
    }

    /// Get context information for this error as JSON.
    #[must_use]
    pub fn context(&self) -> Option<Value> {
        match self {
            Self::Validation(reason) | Self::InvalidImportFormat(reason) => {
                Some(serde_json::json!({ "reason": reason }))
            }
            Self::RemoteUnavailable(detail) | Self::MalformedRemoteData(detail) => {
                Some(serde_json::json!({ "detail": detail }))
            }
            Self::MissingConfig(key) => Some(serde_json::json!({ "config_key": key })),
            _ => None,
        }
    }

    /// True for failures a later sync cycle may recover from on its own.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(
            self,
            Self::RemoteUnavailable(_) | Self::MalformedRemoteData(_)
        )
    }

    /// Convert this error to a structured error.
    #[must_use]
    pub fn to_structured(&self) -> StructuredError {
        StructuredError::from_qs_error(self)
    }
}

/// A structured error with machine-readable code, suggestion, and context.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StructuredError {
    /// The error code (e.g., "NO_PENDING_CONFLICT")
    pub code: ErrorCode,

    /// The numeric error code (e.g., 701)
    pub numeric_code: u16,

    /// Human-readable error message
    pub message: String,

    /// Actionable suggestion for recovery
    pub suggestion: String,

    /// Additional context for debugging
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Value>,

    /// Whether this error is potentially recoverable by the user
    pub recoverable: bool,

    /// Error category (e.g., "quote", "network", "sync")
    pub category: String,
}

impl StructuredError {
    #[must_use]
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            numeric_code: code.numeric(),
            suggestion: code.suggestion().to_string(),
            context: None,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn from_qs_error(err: &QsError) -> Self {
        let code = err.code();
        let context = err.context();
        let suggestion = suggest_for_error(code, context.as_ref());

        Self {
            code,
            numeric_code: code.numeric(),
            message: err.to_string(),
            suggestion,
            context,
            recoverable: code.is_recoverable(),
            category: code.category().to_string(),
        }
    }
}

impl std::fmt::Display for StructuredError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl From<&QsError> for StructuredError {
    fn from(err: &QsError) -> Self {
        Self::from_qs_error(err)
    }
}

/// Result type alias using QsError.
pub type Result<T> = std::result::Result<T, QsError>;
