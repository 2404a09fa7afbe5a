//! # nodecfg
//!
//! Reconciles declared node configuration against the node management API.
//!
//! - [`resource`]: the lifecycle (create, read, update, delete, import) of
//!   each resource kind, and the kind registry
//! - [`engine`]: batch execution of many declared resources on a worker pool
//! - [`identity`]: deterministic `<kind>_<natural key>` identities
//!
//! Field mapping lives in [`statemap`] and HTTP in [`nodeapi`]; both are
//! re-exported.
//!
//! ## Example
//!
//! ```
//! use nodecfg::resource::{self, CpuLimits};
//! use nodecfg::nodeapi::{Client, ClientConfig, MockTransport};
//! use nodecfg::statemap::{ApplyResult, DeclaredState, StateStore};
//! use std::sync::Arc;
//!
//! let mock = MockTransport::with_organization("org-1");
//! let config = ClientConfig::new("api.example.com").token("t");
//! let client = Client::connect_with(&config, Arc::new(mock.clone())).unwrap();
//!
//! let mut state = DeclaredState::new()
//!     .with("node_id", "abc123")
//!     .with("max_percent", 50u32);
//! let result = resource::create::<CpuLimits>(&client, &mut state).unwrap();
//!
//! assert_eq!(result, ApplyResult::Created);
//! assert_eq!(state.id(), Some("cpu_limits_abc123"));
//! ```

pub mod engine;
pub mod error;
pub mod identity;
pub mod resource;

pub use error::{Error, ErrorKind, Result};
pub use identity::{identity, parse_identity};
pub use nodeapi;
pub use statemap;
