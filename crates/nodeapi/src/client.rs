//! Authenticated API client.
//!
//! One [`Client`] per target API. Writes (PUT, POST, DELETE) go through a
//! single lock owned by the client, so at most one mutating exchange is in
//! flight across every caller sharing it. Reads never take the lock.

use crate::auth::Credentials;
use crate::error::{Error, Result};
use crate::transport::{HttpRequest, HttpResponse, Method, Transport, UreqTransport};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Endpoint resolving the organization the credentials belong to.
pub const ORGANIZATION_PATH: &str = "/v2/organization";

const JSON: &str = "application/json";

/// Everything needed to build a [`Client`].
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// API host, with or without scheme (`https://` is assumed).
    pub host: String,
    /// Session token; wins over key/secret when set.
    pub token: Option<String>,
    pub api_key: Option<String>,
    pub api_secret: Option<String>,
    /// Expected organization; checked against the API at construction.
    pub organization_id: Option<String>,
    /// Overall per-request timeout. `None` keeps the transport default.
    pub timeout: Option<Duration>,
}

impl ClientConfig {
    /// Config for `host` with no credentials yet.
    pub fn new(host: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            ..Self::default()
        }
    }

    /// Authenticate with a session token.
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Authenticate with an API key and secret.
    pub fn api_key(mut self, key: impl Into<String>, secret: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self.api_secret = Some(secret.into());
        self
    }

    /// Require the credentials to belong to `id`.
    pub fn organization(mut self, id: impl Into<String>) -> Self {
        self.organization_id = Some(id.into());
        self
    }

    /// Bound each request to `timeout`.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    fn base_url(&self) -> Result<String> {
        let host = self.host.trim().trim_end_matches('/');
        if host.is_empty() {
            return Err(Error::Config("host is required".into()));
        }
        if host.contains("://") {
            Ok(host.to_string())
        } else {
            Ok(format!("https://{host}"))
        }
    }
}

/// Organization the client operates against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Organization {
    pub id: String,
    #[serde(default)]
    pub name: String,
}

/// Map a status code to success or a typed error.
///
/// 200 is the only success. 404 and 422 get their own kinds; anything else
/// carries the status plus both bodies for diagnosis.
pub(crate) fn classify(path: &str, status: u16, request_body: &str, response: &HttpResponse) -> Result<()> {
    match status {
        200 => Ok(()),
        404 => Err(Error::NotFound {
            path: path.to_string(),
        }),
        422 => Err(Error::Validation {
            path: path.to_string(),
            response_body: response.body_text(),
        }),
        _ => Err(Error::Transport {
            path: path.to_string(),
            status,
            request_body: request_body.to_string(),
            response_body: response.body_text(),
        }),
    }
}

/// Blocking client for the management API.
///
/// Share one instance (by reference or `Arc`) between every caller that
/// must be serialized against each other.
pub struct Client {
    transport: Arc<dyn Transport>,
    base_url: String,
    credentials: Credentials,
    organization: Organization,
    write_lock: Mutex<()>,
}

impl Client {
    /// Connect over HTTPS and verify the organization.
    pub fn connect(config: &ClientConfig) -> Result<Self> {
        let transport = Arc::new(UreqTransport::with_timeout(config.timeout));
        Self::connect_with(config, transport)
    }

    /// Connect over a custom transport and verify the organization.
    ///
    /// Performs one authenticated `GET /v2/organization`. If the config
    /// names an organization and the API reports a different one, fails
    /// with [`Error::OrganizationMismatch`].
    pub fn connect_with(config: &ClientConfig, transport: Arc<dyn Transport>) -> Result<Self> {
        let credentials = Credentials::resolve(
            config.token.as_deref(),
            config.api_key.as_deref(),
            config.api_secret.as_deref(),
        )?;

        let mut client = Self {
            transport,
            base_url: config.base_url()?,
            credentials,
            organization: Organization::default(),
            write_lock: Mutex::new(()),
        };

        let organization: Organization = client.get(ORGANIZATION_PATH)?;
        if let Some(expected) = config.organization_id.as_deref().filter(|s| !s.is_empty())
            && expected != organization.id
        {
            return Err(Error::OrganizationMismatch {
                expected: expected.to_string(),
                actual: organization.id,
            });
        }

        log::debug!(
            "Connected to {} as organization {} ({})",
            client.base_url,
            organization.id,
            organization.name
        );
        client.organization = organization;
        Ok(client)
    }

    /// Organization resolved at construction.
    pub fn organization(&self) -> &Organization {
        &self.organization
    }

    /// Base URL every path is joined to.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Read `path` and decode the body into `T`.
    pub fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self.exchange(Method::Get, path, None)?;
        decode(path, &response)
    }

    /// Replace the document at `path` with `payload`.
    pub fn put<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<()> {
        self.write(Method::Put, path, Some(payload)).map(|_| ())
    }

    /// Post `payload` to `path` and decode the response into `T`.
    pub fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, payload: &B) -> Result<T> {
        let response = self.write(Method::Post, path, Some(payload))?;
        decode(path, &response)
    }

    /// Delete the resource at `path`.
    pub fn delete(&self, path: &str) -> Result<()> {
        self.write::<()>(Method::Delete, path, None).map(|_| ())
    }

    /// Delete the resource at `path`, sending `payload` as the body.
    pub fn delete_with<B: Serialize + ?Sized>(&self, path: &str, payload: &B) -> Result<()> {
        self.write(Method::Delete, path, Some(payload)).map(|_| ())
    }

    /// Serialized write: the lock is held from encoding to the last byte of
    /// the response.
    fn write<B: Serialize + ?Sized>(&self, method: Method, path: &str, payload: Option<&B>) -> Result<HttpResponse> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(PoisonError::into_inner);

        let body = payload
            .map(|p| {
                serde_json::to_vec_pretty(p).map_err(|e| Error::Encoding {
                    path: path.to_string(),
                    message: e.to_string(),
                })
            })
            .transpose()?;

        self.exchange(method, path, body)
    }

    fn exchange(&self, method: Method, path: &str, body: Option<Vec<u8>>) -> Result<HttpResponse> {
        let mut headers = vec![
            ("Authorization".to_string(), self.credentials.authorization()),
            ("Accept".to_string(), JSON.to_string()),
        ];
        if body.is_some() {
            headers.push(("Content-Type".to_string(), JSON.to_string()));
        }

        let request = HttpRequest {
            method,
            url: format!("{}{}", self.base_url, path),
            headers,
            body,
        };

        log::debug!(
            "{} {} ({} byte body)",
            method,
            request.url,
            request.body.as_ref().map_or(0, Vec::len)
        );
        let response = self.transport.execute(&request)?;
        log::debug!("{} {} -> {}", method, request.url, response.status);

        classify(path, response.status, &request.body_text(), &response)?;
        Ok(response)
    }
}

fn decode<T: DeserializeOwned>(path: &str, response: &HttpResponse) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|e| Error::Decoding {
        path: path.to_string(),
        message: e.to_string(),
    })
}
