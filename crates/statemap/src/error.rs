//! Error types for field mapping

use thiserror::Error;

/// Result type alias for mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while moving values between declared state and records.
///
/// These are schema/programming errors: the declared value has a shape the
/// record cannot hold. They are never retried.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The stored value's dynamic type does not fit the field's static type
    #[error("type mismatch at '{key}': expected {expected}, found {found}")]
    TypeMismatch {
        /// Declared-state key (nested keys are dotted, e.g. `trap_target.0.port`)
        key: String,
        /// Type the record field expects
        expected: &'static str,
        /// Type actually stored
        found: &'static str,
    },
}

impl Error {
    /// Create a type mismatch error
    pub fn type_mismatch(key: impl Into<String>, expected: &'static str, found: &'static str) -> Self {
        Self::TypeMismatch {
            key: key.into(),
            expected,
            found,
        }
    }

    /// The declared-state key the error refers to
    pub fn key(&self) -> &str {
        match self {
            Self::TypeMismatch { key, .. } => key,
        }
    }
}
