//! Error types for management API operations.
//!
//! Every failure is tagged with a category so callers can special-case
//! "not found" and "validation" without string matching. Nothing here is
//! retried: errors are handed back to the caller verbatim.

use std::fmt;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of API errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Connection-level failure, no HTTP status received.
    Network,
    /// Resource absent remotely (HTTP 404).
    NotFound,
    /// Remote rejected the payload (HTTP 422).
    Validation,
    /// Any other non-200 status.
    Remote,
    /// Request or response body could not be (de)serialized.
    Format,
    /// Client misconfigured (credentials, host, tenant).
    Configuration,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Network => "Network connectivity issue",
            Self::NotFound => "Resource not found",
            Self::Validation => "Payload rejected by the API",
            Self::Remote => "Unexpected API response",
            Self::Format => "Malformed request or response body",
            Self::Configuration => "Invalid client configuration",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Network => "Check the host address and your network connection",
            Self::NotFound => "Verify the node id, or re-create the resource",
            Self::Validation => "Fix the declared values reported in the response body",
            Self::Remote => "Inspect the status and response body for details",
            Self::Format => "The API may have changed shape; check client and server versions",
            Self::Configuration => "Check host, credentials and organization id",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while talking to the management API.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// HTTP 404.
    #[error("not found: {path}")]
    NotFound {
        /// Request path.
        path: String,
    },

    /// HTTP 422.
    #[error("validation failed for {path}: {response_body}")]
    Validation {
        /// Request path.
        path: String,
        /// Server's explanation.
        response_body: String,
    },

    /// Any other non-200 status.
    #[error("unexpected HTTP {status} from {path}: {response_body}")]
    Transport {
        /// Request path.
        path: String,
        /// HTTP status code.
        status: u16,
        /// Payload that was sent, for diagnosis.
        request_body: String,
        /// Body the server answered with.
        response_body: String,
    },

    /// Response body did not decode into the expected shape.
    #[error("failed to decode response from {path}: {message}")]
    Decoding {
        /// Request path.
        path: String,
        /// Decoder message.
        message: String,
    },

    /// Payload could not be serialized.
    #[error("failed to encode request for {path}: {message}")]
    Encoding {
        /// Request path.
        path: String,
        /// Encoder message.
        message: String,
    },

    /// Connection-level failure.
    #[error("HTTP request to {url} failed: {message}")]
    Http {
        /// Full request URL.
        url: String,
        /// Underlying error message.
        message: String,
    },

    /// Client configuration is invalid.
    #[error("invalid client configuration: {0}")]
    Config(String),

    /// Credentials resolve to a different organization than configured.
    #[error("organization mismatch: configured {expected}, credentials belong to {actual}")]
    OrganizationMismatch {
        /// Organization id from configuration.
        expected: String,
        /// Organization id reported by the API.
        actual: String,
    },
}

impl Error {
    /// Get the category of this error.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::NotFound { .. } => ErrorCategory::NotFound,
            Error::Validation { .. } => ErrorCategory::Validation,
            Error::Transport { .. } => ErrorCategory::Remote,
            Error::Decoding { .. } | Error::Encoding { .. } => ErrorCategory::Format,
            Error::Http { .. } => ErrorCategory::Network,
            Error::Config(_) | Error::OrganizationMismatch { .. } => ErrorCategory::Configuration,
        }
    }

    /// Whether the remote resource is absent.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound { .. })
    }

    /// HTTP status carried by the error, if one was received.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound { .. } => Some(404),
            Error::Validation { .. } => Some(422),
            Error::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }
}
