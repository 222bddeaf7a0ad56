//! Error types and handling for rtfm-core operations.
//!
//! Every fallible operation in the crate returns [`Result<T>`]. Errors are
//! grouped by what went wrong while building or querying a lookup table:
//!
//! - **Format errors**: the inventory header is not one we understand
//! - **Decompression errors**: the zlib body is corrupt
//! - **Source errors**: the inventory could not be fetched, or the source key is unknown
//! - **Configuration errors**: invalid settings or unreadable config files
//!
//! ## Recovery Hints
//!
//! ```rust
//! use rtfm_core::Error;
//!
//! let err = Error::SourceUnavailable {
//!     url: "https://docs.python.org/3/objects.inv".to_string(),
//!     reason: "HTTP 503".to_string(),
//! };
//! assert!(err.is_recoverable());
//! assert_eq!(err.category(), "source_unavailable");
//! ```
//!
//! All payloads are owned strings, so [`Error`] is `Clone`. The source cache
//! relies on this to hand the outcome of one failed build to every caller that
//! was waiting on it.

use thiserror::Error;

/// The main error type for rtfm-core operations.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The inventory header is malformed.
    ///
    /// Raised when the version line is not the single supported literal, the
    /// compression marker does not name zlib, a header line is truncated, or a
    /// decoded line is not valid UTF-8.
    #[error("Invalid inventory: {0}")]
    Format(String),

    /// The compressed inventory body could not be inflated.
    #[error("Corrupt inventory stream: {0}")]
    Decompression(String),

    /// The inventory could not be fetched.
    ///
    /// Covers non-success HTTP statuses as well as transport failures and
    /// timeouts. Retrying later may succeed.
    #[error("Source unavailable at '{url}': {reason}")]
    SourceUnavailable {
        /// URL that was requested.
        url: String,
        /// Status line or transport error description.
        reason: String,
    },

    /// No documentation source is configured under this key.
    #[error("Unknown documentation source: {0}")]
    UnknownSource(String),

    /// Configuration is invalid or inaccessible.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Serialization or deserialization failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic error for uncategorized failures.
    #[error("{0}")]
    Other(String),
}

impl From<toml::ser::Error> for Error {
    fn from(err: toml::ser::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl From<toml::de::Error> for Error {
    fn from(err: toml::de::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

impl Error {
    /// Check if the error might be recoverable through retry logic.
    ///
    /// Only fetch failures are transient. A bad header or a corrupt stream
    /// will fail the same way on every attempt until upstream republishes.
    #[must_use]
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::SourceUnavailable { .. })
    }

    /// Whether the error came from decoding a fetched inventory.
    ///
    /// Front ends render these as "cannot build lookup table, try again later".
    #[must_use]
    pub const fn is_build_failure(&self) -> bool {
        matches!(self, Self::Format(_) | Self::Decompression(_))
    }

    /// Get the error category as a string identifier for logging.
    #[must_use]
    pub const fn category(&self) -> &'static str {
        match self {
            Self::Format(_) => "format",
            Self::Decompression(_) => "decompression",
            Self::SourceUnavailable { .. } => "source_unavailable",
            Self::UnknownSource(_) => "unknown_source",
            Self::Config(_) => "config",
            Self::Serialization(_) => "serialization",
            Self::Other(_) => "other",
        }
    }
}

/// Convenience type alias for `std::result::Result<T, Error>`.
pub type Result<T, E = Error> = std::result::Result<T, E>;
