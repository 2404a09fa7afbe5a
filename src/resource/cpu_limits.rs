//! CPU execution limits of a node

use super::{DeletePolicy, RemoteResource};
use serde::{Deserialize, Serialize};
use statemap::{FieldReader, FieldWriter, Record, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CpuLimits {
    pub node_id: String,
    pub max_percent: u32,
    pub shares: u32,
    pub pinned_cores: Vec<u32>,
}

/// `{"cpu": {...}}`; the reset document omits `cpu` entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CpuLimitsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<CpuSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CpuSection {
    pub max_percent: u32,
    pub shares: u32,
    pub pinned_cores: Vec<u32>,
}

impl Record for CpuLimits {
    fn materialize(state: &dyn StateStore) -> statemap::Result<Self> {
        let r = FieldReader::new(state);
        Ok(Self {
            node_id: r.get("node_id")?,
            max_percent: r.get("max_percent")?,
            shares: r.get("shares")?,
            pinned_cores: r.get("pinned_cores")?,
        })
    }

    fn project(&self, state: &mut dyn StateStore) {
        let mut w = FieldWriter::new(state);
        w.set("node_id", &self.node_id);
        w.set("max_percent", self.max_percent);
        w.set("shares", self.shares);
        w.set("pinned_cores", self.pinned_cores.clone());
    }
}

impl RemoteResource for CpuLimits {
    const KIND: &'static str = "cpu_limits";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reset;
    type Document = CpuLimitsDocument;

    fn natural_key(&self) -> &str {
        &self.node_id
    }

    fn path(natural_key: &str) -> String {
        format!("/v2/node/{natural_key}/exec/limit")
    }

    fn to_document(&self) -> CpuLimitsDocument {
        CpuLimitsDocument {
            cpu: Some(CpuSection {
                max_percent: self.max_percent,
                shares: self.shares,
                pinned_cores: self.pinned_cores.clone(),
            }),
        }
    }

    fn from_document(natural_key: &str, document: CpuLimitsDocument) -> Self {
        let cpu = document.cpu.unwrap_or_default();
        Self {
            node_id: natural_key.to_string(),
            max_percent: cpu.max_percent,
            shares: cpu.shares,
            pinned_cores: cpu.pinned_cores,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statemap::{DeclaredState, Value};

    #[test]
    fn test_document_shape() {
        let limits = CpuLimits {
            node_id: "abc123".into(),
            max_percent: 75,
            shares: 512,
            pinned_cores: vec![0, 2],
        };

        let json = serde_json::to_value(limits.to_document()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "cpu": { "maxPercent": 75, "shares": 512, "pinnedCores": [0, 2] } })
        );
    }

    #[test]
    fn test_reset_document_is_empty_object() {
        let json = serde_json::to_string(&CpuLimits::reset_document()).unwrap();
        assert_eq!(json, "{}");
    }

    #[test]
    fn test_from_document_without_section_is_zero() {
        let document: CpuLimitsDocument = serde_json::from_str("{}").unwrap();
        let limits = CpuLimits::from_document("abc123", document);
        assert_eq!(
            limits,
            CpuLimits {
                node_id: "abc123".into(),
                ..CpuLimits::default()
            }
        );
    }

    #[test]
    fn test_state_round_trip() {
        let state = DeclaredState::new()
            .with("node_id", "abc123")
            .with("max_percent", 90u32)
            .with("pinned_cores", vec![1u32, 3]);

        let limits = CpuLimits::materialize(&state).unwrap();
        assert_eq!(limits.pinned_cores, vec![1, 3]);

        let mut projected = DeclaredState::new();
        limits.project(&mut projected);
        assert_eq!(CpuLimits::materialize(&projected).unwrap(), limits);
        assert_eq!(projected.get("shares"), Some(&Value::Int(0)));
    }

    #[test]
    fn test_negative_percent_is_mismatch() {
        let state = DeclaredState::new().with("node_id", "abc123").with("max_percent", -1i64);
        let err = CpuLimits::materialize(&state).unwrap_err();
        assert_eq!(err.key(), "max_percent");
    }
}
