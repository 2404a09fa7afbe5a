//! Batch execution over many declared resources
//!
//! The engine runs one [`Operation`] over a list of [`Entry`] values on a
//! bounded worker pool, sharing a single [`nodeapi::Client`] so remote
//! writes stay serialized while reads overlap.

pub mod executor;

pub use executor::{EntryOutcome, ExecuteOptions, ExecuteReport, Operation, execute};

use serde::{Deserialize, Serialize};
use statemap::DeclaredState;

/// One declared resource instance
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    pub kind: String,
    #[serde(default)]
    pub state: DeclaredState,
}

impl Entry {
    pub fn new(kind: impl Into<String>, state: DeclaredState) -> Self {
        Self {
            kind: kind.into(),
            state,
        }
    }
}
