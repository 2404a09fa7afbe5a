//! Error type for lifecycle operations
//!
//! Wraps the transport and mapping errors unchanged so the host sees exactly
//! what failed, tagged by [`ErrorKind`].

use thiserror::Error;

/// Result type alias for lifecycle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Coarse classification handed to hosts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Remote resource absent
    NotFound,
    /// Remote rejected the payload semantics
    Validation,
    /// Unclassified non-200 response
    Transport,
    /// Malformed request or response body
    Decoding,
    /// Declared value does not fit the record
    TypeMismatch,
    /// Connection-level failure
    Network,
    /// Wrong credentials, tenant, kind or identity
    Configuration,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] nodeapi::Error),

    #[error(transparent)]
    Mapping(#[from] statemap::Error),

    #[error("unknown resource kind: {0}")]
    UnknownKind(String),

    #[error("invalid identity '{id}' for {kind}")]
    InvalidIdentity { kind: &'static str, id: String },

    #[error("{kind} requires '{field}' to be set")]
    MissingKey {
        kind: &'static str,
        field: &'static str,
    },

    #[error("{kind} '{field}' must be a single URL path segment, got '{key}'")]
    InvalidKey {
        kind: &'static str,
        field: &'static str,
        key: String,
    },

    #[error("failed to create worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl Error {
    /// Classify the error for the host
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Api(api) => match api {
                nodeapi::Error::NotFound { .. } => ErrorKind::NotFound,
                nodeapi::Error::Validation { .. } => ErrorKind::Validation,
                nodeapi::Error::Transport { .. } => ErrorKind::Transport,
                nodeapi::Error::Decoding { .. } | nodeapi::Error::Encoding { .. } => {
                    ErrorKind::Decoding
                }
                nodeapi::Error::Http { .. } => ErrorKind::Network,
                nodeapi::Error::Config(_) | nodeapi::Error::OrganizationMismatch { .. } => {
                    ErrorKind::Configuration
                }
            },
            Error::Mapping(_) => ErrorKind::TypeMismatch,
            Error::UnknownKind(_)
            | Error::InvalidIdentity { .. }
            | Error::MissingKey { .. }
            | Error::InvalidKey { .. }
            | Error::ThreadPool(_) => ErrorKind::Configuration,
        }
    }

    /// Whether the remote resource is absent
    pub fn is_not_found(&self) -> bool {
        self.kind() == ErrorKind::NotFound
    }
}
