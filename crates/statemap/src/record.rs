//! Explicit record mapping
//!
//! Each resource kind's record implements [`Record`] by hand: one line per
//! declared-state key in `materialize`, one line per key in `project`.
//! Fields that only exist on the wire or only in memory are simply not
//! mentioned, so they never round-trip through declared state.
//!
//! # Example
//!
//! ```
//! use statemap::{DeclaredState, FieldReader, FieldWriter, Record, Result, StateStore};
//!
//! #[derive(Debug, Default, PartialEq)]
//! struct Limits {
//!     node_id: String,
//!     max_percent: u32,
//!     // internal only, never mapped
//!     url: String,
//! }
//!
//! impl Record for Limits {
//!     fn materialize(state: &dyn StateStore) -> Result<Self> {
//!         let r = FieldReader::new(state);
//!         Ok(Self {
//!             node_id: r.get("node_id")?,
//!             max_percent: r.get("max_percent")?,
//!             url: String::new(),
//!         })
//!     }
//!
//!     fn project(&self, state: &mut dyn StateStore) {
//!         let mut w = FieldWriter::new(state);
//!         w.set("node_id", &self.node_id);
//!         w.set("max_percent", self.max_percent);
//!     }
//! }
//!
//! let state = DeclaredState::new().with("node_id", "abc123").with("max_percent", 50u32);
//! let limits = Limits::materialize(&state).unwrap();
//! assert_eq!(limits.max_percent, 50);
//! ```

use crate::error::{Error, Result};
use crate::state::StateStore;
use crate::value::{Block, FromValue, Value};

/// A typed record with an explicit mapping to declared state
pub trait Record: Sized {
    /// Build the record from declared state
    ///
    /// Absent keys yield zero values; incompatible values fail with
    /// [`Error::TypeMismatch`].
    fn materialize(state: &dyn StateStore) -> Result<Self>;

    /// Write every mapped field into declared state
    ///
    /// Keys the record does not model are left untouched.
    fn project(&self, state: &mut dyn StateStore);
}

enum Source<'a> {
    Store(&'a dyn StateStore),
    Block { block: &'a Block, prefix: String },
}

/// Typed reads from declared state or from a nested block
pub struct FieldReader<'a> {
    source: Source<'a>,
}

impl<'a> FieldReader<'a> {
    /// Reader over a resource's declared state
    pub fn new(state: &'a dyn StateStore) -> Self {
        Self {
            source: Source::Store(state),
        }
    }

    /// Reader over a nested block; `prefix` is used in error keys
    pub fn nested(block: &'a Block, prefix: impl Into<String>) -> Self {
        Self {
            source: Source::Block {
                block,
                prefix: prefix.into(),
            },
        }
    }

    fn lookup(&self, key: &str) -> Option<&'a Value> {
        match self.source {
            Source::Store(state) => state.get(key),
            Source::Block { block, .. } => block.get(key),
        }
    }

    fn qualified(&self, key: &str) -> String {
        match &self.source {
            Source::Store(_) => key.to_string(),
            Source::Block { prefix, .. } => format!("{prefix}.{key}"),
        }
    }

    /// Read `key` as `T`, or `T::default()` when absent
    pub fn get<T: FromValue>(&self, key: &str) -> Result<T> {
        match self.lookup(key) {
            None => Ok(T::default()),
            Some(value) => T::from_value(value)
                .ok_or_else(|| Error::type_mismatch(self.qualified(key), T::TYPE_NAME, value.type_name())),
        }
    }

    /// Read a sequence of nested blocks and map each with `f`
    ///
    /// `f` receives a reader scoped to `key.<index>`.
    pub fn blocks<T, F>(&self, key: &str, mut f: F) -> Result<Vec<T>>
    where
        F: FnMut(&FieldReader<'_>) -> Result<T>,
    {
        let Some(value) = self.lookup(key) else {
            return Ok(Vec::new());
        };
        let Value::List(items) = value else {
            return Err(Error::type_mismatch(self.qualified(key), "list", value.type_name()));
        };

        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let prefix = format!("{}.{index}", self.qualified(key));
            let Value::Map(block) = item else {
                return Err(Error::type_mismatch(prefix, "map", item.type_name()));
            };
            out.push(f(&FieldReader::nested(block, prefix))?);
        }
        Ok(out)
    }
}

/// Writes into declared state
pub struct FieldWriter<'a> {
    state: &'a mut dyn StateStore,
}

impl<'a> FieldWriter<'a> {
    pub fn new(state: &'a mut dyn StateStore) -> Self {
        Self { state }
    }

    /// Overwrite `key`
    pub fn set(&mut self, key: &str, value: impl Into<Value>) {
        self.state.set(key, value.into());
    }

    /// Overwrite `key` with a sequence of nested blocks
    pub fn set_blocks(&mut self, key: &str, blocks: Vec<Block>) {
        self.state.set(key, Value::from(blocks));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::DeclaredState;

    #[derive(Debug, Clone, Default, PartialEq)]
    struct Sample {
        name: String,
        port: u32,
        enabled: bool,
        tags: Vec<String>,
        cores: Vec<u32>,
        derived_url: String,
    }

    impl Record for Sample {
        fn materialize(state: &dyn StateStore) -> Result<Self> {
            let r = FieldReader::new(state);
            Ok(Self {
                name: r.get("name")?,
                port: r.get("port")?,
                enabled: r.get("enabled")?,
                tags: r.get("tags")?,
                cores: r.get("cores")?,
                derived_url: String::new(),
            })
        }

        fn project(&self, state: &mut dyn StateStore) {
            let mut w = FieldWriter::new(state);
            w.set("name", &self.name);
            w.set("port", self.port);
            w.set("enabled", self.enabled);
            w.set("tags", self.tags.clone());
            w.set("cores", self.cores.clone());
        }
    }

    fn sample() -> Sample {
        Sample {
            name: "edge-1".to_string(),
            port: 161,
            enabled: true,
            tags: vec!["a".to_string(), "b".to_string()],
            cores: vec![0, 2],
            derived_url: String::new(),
        }
    }

    #[test]
    fn test_round_trip_through_empty_state() {
        let record = sample();
        let mut state = DeclaredState::new();
        record.project(&mut state);

        let back = Sample::materialize(&state).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn test_unmapped_field_not_projected() {
        let mut record = sample();
        record.derived_url = "/v2/node/x".to_string();
        let mut state = DeclaredState::new();
        record.project(&mut state);

        assert!(state.get("derived_url").is_none());
        assert_eq!(Sample::materialize(&state).unwrap().derived_url, "");
    }

    #[test]
    fn test_projection_is_non_destructive() {
        let mut state = DeclaredState::new()
            .with("unrelated", "keep me")
            .with("other_list", vec![1i64, 2]);

        sample().project(&mut state);

        assert_eq!(state.get("unrelated"), Some(&Value::from("keep me")));
        assert_eq!(state.get("other_list"), Some(&Value::from(vec![1i64, 2])));
        assert_eq!(state.get("name"), Some(&Value::from("edge-1")));
    }

    #[test]
    fn test_projection_overwrites_prior_values() {
        let mut state = DeclaredState::new().with("name", "old").with("port", 1u32);
        sample().project(&mut state);
        assert_eq!(state.get("name"), Some(&Value::from("edge-1")));
        assert_eq!(state.get("port"), Some(&Value::Int(161)));
    }

    #[test]
    fn test_absent_keys_yield_zero_values() {
        let state = DeclaredState::new();
        assert_eq!(Sample::materialize(&state).unwrap(), Sample::default());
    }

    #[test]
    fn test_sequence_where_scalar_expected() {
        let state = DeclaredState::new().with("name", vec!["a", "b"]);
        let err = Sample::materialize(&state).unwrap_err();
        assert_eq!(err, Error::type_mismatch("name", "string", "list"));
    }

    #[test]
    fn test_scalar_where_sequence_expected() {
        let state = DeclaredState::new().with("tags", "solo");
        let err = Sample::materialize(&state).unwrap_err();
        assert_eq!(err, Error::type_mismatch("tags", "list", "string"));
    }

    #[test]
    fn test_out_of_range_int_is_mismatch() {
        let state = DeclaredState::new().with("port", -1i64);
        let err = Sample::materialize(&state).unwrap_err();
        assert_eq!(err.key(), "port");
    }

    #[test]
    fn test_blocks_reader() {
        let mut first = Block::new();
        first.insert("host".to_string(), Value::from("10.0.0.1"));
        first.insert("port".to_string(), Value::Int(162));
        let mut second = Block::new();
        second.insert("host".to_string(), Value::from("10.0.0.2"));

        let state = DeclaredState::new().with("targets", vec![first, second]);
        let reader = FieldReader::new(&state);
        let targets: Vec<(String, u32)> = reader
            .blocks("targets", |b| Ok((b.get("host")?, b.get("port")?)))
            .unwrap();

        assert_eq!(
            targets,
            vec![("10.0.0.1".to_string(), 162), ("10.0.0.2".to_string(), 0)]
        );
    }

    #[test]
    fn test_blocks_error_key_is_qualified() {
        let mut block = Block::new();
        block.insert("port".to_string(), Value::from("not a number"));
        let state = DeclaredState::new().with("targets", vec![block]);

        let reader = FieldReader::new(&state);
        let err = reader
            .blocks("targets", |b| b.get::<u32>("port"))
            .unwrap_err();
        assert_eq!(err.key(), "targets.0.port");
    }

    #[test]
    fn test_blocks_rejects_non_map_items() {
        let state = DeclaredState::new().with("targets", vec!["x"]);
        let reader = FieldReader::new(&state);
        let err = reader.blocks("targets", |b| b.get::<String>("host")).unwrap_err();
        assert_eq!(err, Error::type_mismatch("targets.0", "map", "string"));
    }

    #[test]
    fn test_blocks_absent_is_empty() {
        let state = DeclaredState::new();
        let reader = FieldReader::new(&state);
        let out: Vec<String> = reader.blocks("targets", |b| b.get("host")).unwrap();
        assert!(out.is_empty());
    }
}
