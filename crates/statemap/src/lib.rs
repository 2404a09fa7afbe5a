//! # statemap
//!
//! Declared state and explicit record mapping for resource reconciliation.
//!
//! ## Core Concepts
//!
//! - **[`StateStore`]**: the collaborator-owned key/value store for one
//!   resource instance, plus its external identifier
//! - **[`Value`]**: what a key holds (scalar, string, or sequence)
//! - **[`Record`]**: a typed struct with a hand-written, exhaustive mapping
//!   to and from declared state
//! - **[`FieldReader`] / [`FieldWriter`]**: typed accessors used by those
//!   mappings; a reader reports [`Error::TypeMismatch`] when a stored value
//!   does not fit the field
//!
//! Mapping is pure and stateless: no I/O, no locking, no resource semantics.

pub mod error;
pub mod record;
pub mod state;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use record::{FieldReader, FieldWriter, Record};
pub use state::{DeclaredState, StateStore};
pub use types::{ApplyResult, ApplySummary, ResourceState};
pub use value::{Block, FromValue, Value};
