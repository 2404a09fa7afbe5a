//! Remote resource kinds and their lifecycle
//!
//! Every kind implements [`RemoteResource`]: its tag, URL, natural key and
//! how its record translates to and from the remote document. The lifecycle
//! functions in this module ([`create`], [`read`], [`update`], [`delete`],
//! [`import`]) are written once against that trait.
//!
//! Hosts that only know a kind by name go through the registry:
//! [`handler`] returns a [`ResourceHandler`] for a kind tag.

mod cpu_limits;
mod io_limits;
mod license;
mod node;
mod snmp;

pub use cpu_limits::{CpuLimits, CpuLimitsDocument, CpuSection};
pub use io_limits::{IoLimits, IoLimitsDocument, IoSection};
pub use license::{License, LicenseDocument};
pub use node::{Node, NodeDocument};
pub use snmp::{Snmp, SnmpDocument, SnmpV3Document, TrapDocument, TrapTarget};

use crate::error::{Error, Result};
use crate::identity::{identity, parse_identity};
use nodeapi::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;
use statemap::{ApplyResult, Record, ResourceState, StateStore, Value};
use std::fmt;
use std::marker::PhantomData;

/// How a kind is removed remotely
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeletePolicy {
    /// `DELETE` the resource URL
    Remote,
    /// The API has no delete; `PUT` the kind's reset document instead
    Reset,
}

impl fmt::Display for DeletePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DeletePolicy::Remote => write!(f, "remote delete"),
            DeletePolicy::Reset => write!(f, "reset to defaults"),
        }
    }
}

/// A resource kind managed through the node API
pub trait RemoteResource: Record {
    /// Kind tag, also the identity prefix
    const KIND: &'static str;

    /// Declared-state key holding the natural key
    const NATURAL_KEY: &'static str = "node_id";

    const DELETE_POLICY: DeletePolicy;

    /// Declared-state keys the API never echoes back
    const SECRET_KEYS: &'static [&'static str] = &[];

    /// Wire representation
    type Document: Serialize + DeserializeOwned + Default;

    fn natural_key(&self) -> &str;

    /// Canonical URL path for `natural_key`
    fn path(natural_key: &str) -> String;

    fn to_document(&self) -> Self::Document;

    /// Build the record the server describes
    fn from_document(natural_key: &str, document: Self::Document) -> Self;

    /// Payload that returns the resource to its defaults
    ///
    /// Only sent for [`DeletePolicy::Reset`] kinds.
    fn reset_document() -> Self::Document {
        Self::Document::default()
    }

    /// Cross-field checks run before any write
    fn validate(&self) -> Result<()> {
        Ok(())
    }
}

fn materialize_keyed<R: RemoteResource>(state: &dyn StateStore) -> Result<R> {
    let record = R::materialize(state)?;
    let key = record.natural_key();
    if key.is_empty() {
        return Err(Error::MissingKey {
            kind: R::KIND,
            field: R::NATURAL_KEY,
        });
    }
    if !is_path_segment(key) {
        return Err(Error::InvalidKey {
            kind: R::KIND,
            field: R::NATURAL_KEY,
            key: key.to_string(),
        });
    }
    Ok(record)
}

/// Whether `key` can stand alone as one URL path segment
///
/// Only RFC 3986 unreserved characters pass, and the dot segments are refused.
fn is_path_segment(key: &str) -> bool {
    key != "."
        && key != ".."
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '~'))
}

fn write_document<R: RemoteResource>(client: &Client, state: &mut dyn StateStore, outcome: ApplyResult) -> Result<ApplyResult> {
    let record = materialize_keyed::<R>(state)?;
    record.validate()?;
    let key = record.natural_key();
    let path = R::path(key);

    log::info!("Writing {} {key} ({outcome:?})", R::KIND);
    client.put(&path, &record.to_document())?;

    state.set_id(&identity(R::KIND, key));
    Ok(outcome)
}

/// Create the resource from declared state
///
/// The API only offers full-document `PUT`, so creating an existing
/// resource overwrites it.
pub fn create<R: RemoteResource>(client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
    write_document::<R>(client, state, ApplyResult::Created)
}

/// Push declared state over the existing resource
pub fn update<R: RemoteResource>(client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
    write_document::<R>(client, state, ApplyResult::Modified)
}

/// Refresh declared state from the remote document
///
/// A missing resource is not an error: the identity is cleared and
/// [`ResourceState::Absent`] returned so the host can drop it.
pub fn read<R: RemoteResource>(client: &Client, state: &mut dyn StateStore) -> Result<ResourceState> {
    let record = materialize_keyed::<R>(state)?;
    let key = record.natural_key().to_string();
    let path = R::path(&key);

    let document: R::Document = match client.get(&path) {
        Ok(document) => document,
        Err(err) if err.is_not_found() => {
            log::warn!("{} {key} no longer exists remotely", R::KIND);
            state.clear_id();
            return Ok(ResourceState::Absent);
        }
        Err(err) => return Err(err.into()),
    };

    let secrets = snapshot_secrets(state, R::SECRET_KEYS);
    R::from_document(&key, document).project(state);
    restore_secrets(state, secrets);

    state.set_id(&identity(R::KIND, &key));
    Ok(ResourceState::Present)
}

/// Remove the resource according to its [`DeletePolicy`]
///
/// Deleting something already gone yields [`ApplyResult::NoChange`]. The
/// identity is cleared either way.
pub fn delete<R: RemoteResource>(client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
    let record = materialize_keyed::<R>(state)?;
    let key = record.natural_key();
    let path = R::path(key);

    log::info!("Removing {} {key} ({})", R::KIND, R::DELETE_POLICY);
    let outcome = match R::DELETE_POLICY {
        DeletePolicy::Remote => client.delete(&path),
        DeletePolicy::Reset => client.put(&path, &R::reset_document()),
    };

    let result = match outcome {
        Ok(()) => ApplyResult::Removed,
        Err(err) if err.is_not_found() => {
            log::warn!("{} {key} was already gone", R::KIND);
            ApplyResult::NoChange
        }
        Err(err) => return Err(err.into()),
    };

    state.clear_id();
    Ok(result)
}

/// Adopt an existing remote resource by identity
pub fn import<R: RemoteResource>(client: &Client, state: &mut dyn StateStore, id: &str) -> Result<ResourceState> {
    let key = parse_identity(R::KIND, id).ok_or_else(|| Error::InvalidIdentity {
        kind: R::KIND,
        id: id.to_string(),
    })?;

    state.set(R::NATURAL_KEY, Value::from(key));
    read::<R>(client, state)
}

fn snapshot_secrets(state: &dyn StateStore, keys: &[&'static str]) -> Vec<(&'static str, Value)> {
    keys.iter()
        .filter_map(|&key| {
            state
                .get(key)
                .filter(|value| !value.is_empty())
                .map(|value| (key, value.clone()))
        })
        .collect()
}

fn restore_secrets(state: &mut dyn StateStore, secrets: Vec<(&'static str, Value)>) {
    for (key, value) in secrets {
        if state.get(key).is_none_or(Value::is_empty) {
            log::debug!("Keeping local value for secret '{key}'");
            state.set(key, value);
        }
    }
}

/// Lifecycle operations for one kind, callable without knowing its type
pub trait ResourceHandler: Send + Sync {
    fn kind(&self) -> &'static str;
    fn delete_policy(&self) -> DeletePolicy;
    fn create(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult>;
    fn read(&self, client: &Client, state: &mut dyn StateStore) -> Result<ResourceState>;
    fn update(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult>;
    fn delete(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult>;
    fn import(&self, client: &Client, state: &mut dyn StateStore, id: &str) -> Result<ResourceState>;
}

struct Handler<R>(PhantomData<fn() -> R>);

impl<R: RemoteResource> ResourceHandler for Handler<R> {
    fn kind(&self) -> &'static str {
        R::KIND
    }

    fn delete_policy(&self) -> DeletePolicy {
        R::DELETE_POLICY
    }

    fn create(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
        create::<R>(client, state)
    }

    fn read(&self, client: &Client, state: &mut dyn StateStore) -> Result<ResourceState> {
        read::<R>(client, state)
    }

    fn update(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
        update::<R>(client, state)
    }

    fn delete(&self, client: &Client, state: &mut dyn StateStore) -> Result<ApplyResult> {
        delete::<R>(client, state)
    }

    fn import(&self, client: &Client, state: &mut dyn StateStore, id: &str) -> Result<ResourceState> {
        import::<R>(client, state, id)
    }
}

static NODE: Handler<Node> = Handler(PhantomData);
static SNMP: Handler<Snmp> = Handler(PhantomData);
static CPU_LIMITS: Handler<CpuLimits> = Handler(PhantomData);
static IO_LIMITS: Handler<IoLimits> = Handler(PhantomData);
static LICENSE: Handler<License> = Handler(PhantomData);

static HANDLERS: [&dyn ResourceHandler; 5] = [&NODE, &SNMP, &CPU_LIMITS, &IO_LIMITS, &LICENSE];

/// Handler for the kind tagged `kind`
pub fn handler(kind: &str) -> Result<&'static dyn ResourceHandler> {
    HANDLERS
        .iter()
        .copied()
        .find(|h| h.kind() == kind)
        .ok_or_else(|| Error::UnknownKind(kind.to_string()))
}

/// All registered kinds
pub fn kinds() -> impl Iterator<Item = &'static dyn ResourceHandler> {
    HANDLERS.iter().copied()
}

#[cfg(test)]
pub(crate) fn mock_client() -> (Client, nodeapi::MockTransport) {
    let mock = nodeapi::MockTransport::with_organization("org-1");
    let config = nodeapi::ClientConfig::new("api.example.com").token("test-token");
    let client = Client::connect_with(&config, std::sync::Arc::new(mock.clone())).unwrap();
    (client, mock)
}
