//! Declared state store
//!
//! The declared state is owned by the schema collaborator. The reconciler
//! only ever touches it through [`StateStore`]: read a key, write a key,
//! and assign or drop the external identifier.

use crate::value::Value;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Collaborator surface for a single resource instance's declared state
pub trait StateStore {
    /// Declared value at `key`, if any
    fn get(&self, key: &str) -> Option<&Value>;

    /// Overwrite the value at `key`
    fn set(&mut self, key: &str, value: Value);

    /// External identifier, if assigned
    fn id(&self) -> Option<&str>;

    /// Assign the external identifier
    fn set_id(&mut self, id: &str);

    /// Drop the external identifier, marking the instance as gone
    fn clear_id(&mut self);
}

/// In-memory declared state
///
/// Persisted by hosts as `{"id": ..., "values": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeclaredState {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    #[serde(default)]
    values: BTreeMap<String, Value>,
}

impl DeclaredState {
    /// Create an empty state with no identifier
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style setter, handy for seeding state
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.values.insert(key.to_string(), value.into());
        self
    }

    /// All declared values, ordered by key
    pub fn values(&self) -> &BTreeMap<String, Value> {
        &self.values
    }

    /// Whether an identifier is assigned
    pub fn has_id(&self) -> bool {
        self.id.is_some()
    }
}

impl StateStore for DeclaredState {
    fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    fn set_id(&mut self, id: &str) {
        self.id = Some(id.to_string());
    }

    fn clear_id(&mut self) {
        self.id = None;
    }
}
