//! Standardized error codes for machine-parseable output.
//!
//! Error codes follow a numeric taxonomy:
//! - 1xx: Quote errors
//! - 3xx: Config errors
//! - 5xx: Network errors
//! - 6xx: Storage errors
//! - 7xx: Sync errors

use serde::{Deserialize, Serialize};

/// Standardized error codes for robot mode output.
///
/// Each variant maps to a numeric code (e.g., `QuoteInvalid` -> E101).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================
    // Quote errors (1xx)
    // ========================================
    /// E101: Quote text or category is empty
    QuoteInvalid,
    /// E102: Import payload is not a JSON array of quotes
    ImportInvalid,

    // ========================================
    // Config errors (3xx)
    // ========================================
    /// E302: Config file has invalid syntax or values
    ConfigInvalid,
    /// E304: Required config value is missing
    ConfigMissingRequired,

    // ========================================
    // Network errors (5xx)
    // ========================================
    /// E501: Remote endpoint unreachable or timed out
    RemoteUnavailable,
    /// E502: Remote snapshot failed shape validation
    RemoteMalformed,

    // ========================================
    // Storage errors (6xx)
    // ========================================
    /// E604: Database operation failed
    DatabaseError,
    /// E605: Serialization/deserialization failed
    SerializationError,
    /// E606: IO operation failed
    IoError,

    // ========================================
    // Sync errors (7xx)
    // ========================================
    /// E701: Resolve requested but no conflict is outstanding
    NoPendingConflict,
}

impl ErrorCode {
    /// Get the numeric error code (e.g., `QuoteInvalid` -> 101).
    #[must_use]
    pub const fn numeric(&self) -> u16 {
        match self {
            Self::QuoteInvalid => 101,
            Self::ImportInvalid => 102,

            Self::ConfigInvalid => 302,
            Self::ConfigMissingRequired => 304,

            Self::RemoteUnavailable => 501,
            Self::RemoteMalformed => 502,

            Self::DatabaseError => 604,
            Self::SerializationError => 605,
            Self::IoError => 606,

            Self::NoPendingConflict => 701,
        }
    }

    /// Get the error code as a formatted string (e.g., "E101").
    #[must_use]
    pub fn code_string(&self) -> String {
        format!("E{}", self.numeric())
    }

    /// Get the default suggestion for this error code.
    #[must_use]
    pub const fn suggestion(&self) -> &'static str {
        match self {
            Self::QuoteInvalid => "Provide both a quote text and a category, e.g. `qs add \"Stay curious\" --category Life`",
            Self::ImportInvalid => "Import files must contain a JSON array of {\"text\", \"category\"} objects, as written by `qs export`",

            Self::ConfigInvalid => "Check TOML syntax in the config file and the QS_* environment variables",
            Self::ConfigMissingRequired => "Set the missing value in config.toml or through its QS_* environment variable",

            Self::RemoteUnavailable => "Check the [remote] url and your network connection. The next scheduled sync retries automatically",
            Self::RemoteMalformed => "The remote returned an unexpected payload. Check the [remote] format setting",

            Self::DatabaseError => "The quote database may be locked or corrupted. Check the --root directory",
            Self::SerializationError => "Stored data could not be decoded. Check input data for validity",
            Self::IoError => "File operation failed. Check path exists and permissions are correct",

            Self::NoPendingConflict => "There is nothing to resolve. Run `qs status` to see the sync state",
        }
    }

    /// Check if this error is potentially recoverable by the user.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        match self {
            Self::QuoteInvalid
            | Self::ImportInvalid
            | Self::ConfigInvalid
            | Self::ConfigMissingRequired
            | Self::RemoteUnavailable
            | Self::RemoteMalformed
            | Self::IoError
            | Self::NoPendingConflict => true,

            Self::DatabaseError | Self::SerializationError => false,
        }
    }

    /// Get the error category name.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self.numeric() / 100 {
            1 => "quote",
            3 => "config",
            5 => "network",
            6 => "storage",
            7 => "sync",
            _ => "unknown",
        }
    }

    /// Iterate over all error codes.
    pub fn all() -> impl Iterator<Item = Self> {
        [
            Self::QuoteInvalid,
            Self::ImportInvalid,
            Self::ConfigInvalid,
            Self::ConfigMissingRequired,
            Self::RemoteUnavailable,
            Self::RemoteMalformed,
            Self::DatabaseError,
            Self::SerializationError,
            Self::IoError,
            Self::NoPendingConflict,
        ]
        .into_iter()
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code_string())
    }
}
