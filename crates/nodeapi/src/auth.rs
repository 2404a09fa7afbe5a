//! Credential resolution and the `Authorization` header.

use crate::error::{Error, Result};
use std::fmt;

/// Scheme name used for key/secret authentication.
pub const API_KEY_SCHEME: &str = "ApiKey";

/// How a client authenticates. Chosen once, at construction.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Session token, sent as `Bearer <token>`.
    Token(String),
    /// API key and secret, sent as `ApiKey <key>:<secret>`.
    ApiKey {
        /// Public key id.
        key: String,
        /// Secret paired with the key.
        secret: String,
    },
}

impl Credentials {
    /// Pick credentials from optional sources.
    ///
    /// A non-empty token wins. Otherwise both key and secret are required.
    /// Empty strings count as absent, so unset environment variables are
    /// harmless.
    pub fn resolve(token: Option<&str>, key: Option<&str>, secret: Option<&str>) -> Result<Self> {
        let present = |v: Option<&str>| v.filter(|s| !s.is_empty()).map(ToString::to_string);

        if let Some(token) = present(token) {
            return Ok(Self::Token(token));
        }

        match (present(key), present(secret)) {
            (Some(key), Some(secret)) => Ok(Self::ApiKey { key, secret }),
            (Some(_), None) => Err(Error::Config("api key given without api secret".into())),
            (None, Some(_)) => Err(Error::Config("api secret given without api key".into())),
            (None, None) => Err(Error::Config(
                "no credentials: set a session token or an api key and secret".into(),
            )),
        }
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        match self {
            Self::Token(token) => format!("Bearer {token}"),
            Self::ApiKey { key, secret } => format!("{API_KEY_SCHEME} {key}:{secret}"),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Token(_) => f.write_str("Token(<redacted>)"),
            Self::ApiKey { key, .. } => f
                .debug_struct("ApiKey")
                .field("key", key)
                .field("secret", &"<redacted>")
                .finish(),
        }
    }
}
