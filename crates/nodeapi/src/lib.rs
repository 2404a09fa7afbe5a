//! # nodeapi
//!
//! Blocking client for the node management API.
//!
//! This crate provides:
//! - Credential resolution (session token, or API key + secret)
//! - A [`Client`] that verifies its organization on construction and
//!   serializes every mutating request behind one lock
//! - Status classification into typed errors (404 → [`Error::NotFound`],
//!   422 → [`Error::Validation`], other non-200 → [`Error::Transport`])
//! - A [`Transport`] seam with a `ureq` implementation and a scripted
//!   [`MockTransport`]
//!
//! ## Example
//!
//! ```
//! use nodeapi::{Client, ClientConfig, MockTransport};
//! use std::sync::Arc;
//!
//! let mock = MockTransport::with_organization("org-1");
//! let config = ClientConfig::new("api.example.com").token("secret-token");
//! let client = Client::connect_with(&config, Arc::new(mock.clone())).unwrap();
//!
//! client
//!     .put("/node/abc123/config/snmp", &serde_json::json!({ "enabled": true }))
//!     .unwrap();
//! assert_eq!(mock.writes().len(), 1);
//! ```
//!
//! ## Testing
//!
//! Use [`MockTransport`] for testing without network access. It stores
//! documents on PUT, serves them on GET, and counts overlapping writes.

pub mod auth;
pub mod client;
pub mod error;
pub mod mock;
pub mod transport;

pub use auth::Credentials;
pub use client::{Client, ClientConfig, Organization, ORGANIZATION_PATH};
pub use error::{Error, ErrorCategory, Result};
pub use mock::MockTransport;
pub use transport::{HttpRequest, HttpResponse, Method, Transport, UreqTransport};
