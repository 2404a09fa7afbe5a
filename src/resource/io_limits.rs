//! Disk IO throttling of a node
//!
//! Bandwidth is `i64` end to end: a server value outside that range fails
//! decoding rather than being stored as some other number.

use super::{DeletePolicy, RemoteResource};
use serde::{Deserialize, Serialize};
use statemap::{FieldReader, FieldWriter, Record, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IoLimits {
    pub node_id: String,
    /// Bytes per second, 0 for unlimited
    pub read_bps: i64,
    pub write_bps: i64,
    pub read_iops: u32,
    pub write_iops: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IoLimitsDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub io: Option<IoSection>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IoSection {
    pub read_bps: i64,
    pub write_bps: i64,
    pub read_iops: u32,
    pub write_iops: u32,
}

impl Record for IoLimits {
    fn materialize(state: &dyn StateStore) -> statemap::Result<Self> {
        let r = FieldReader::new(state);
        Ok(Self {
            node_id: r.get("node_id")?,
            read_bps: r.get("read_bps")?,
            write_bps: r.get("write_bps")?,
            read_iops: r.get("read_iops")?,
            write_iops: r.get("write_iops")?,
        })
    }

    fn project(&self, state: &mut dyn StateStore) {
        let mut w = FieldWriter::new(state);
        w.set("node_id", &self.node_id);
        w.set("read_bps", self.read_bps);
        w.set("write_bps", self.write_bps);
        w.set("read_iops", self.read_iops);
        w.set("write_iops", self.write_iops);
    }
}

impl RemoteResource for IoLimits {
    const KIND: &'static str = "io_limits";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reset;
    type Document = IoLimitsDocument;

    fn natural_key(&self) -> &str {
        &self.node_id
    }

    fn path(natural_key: &str) -> String {
        format!("/v2/node/{natural_key}/exec/io")
    }

    fn to_document(&self) -> IoLimitsDocument {
        IoLimitsDocument {
            io: Some(IoSection {
                read_bps: self.read_bps,
                write_bps: self.write_bps,
                read_iops: self.read_iops,
                write_iops: self.write_iops,
            }),
        }
    }

    fn from_document(natural_key: &str, document: IoLimitsDocument) -> Self {
        let io = document.io.unwrap_or_default();
        Self {
            node_id: natural_key.to_string(),
            read_bps: io.read_bps,
            write_bps: io.write_bps,
            read_iops: io.read_iops,
            write_iops: io.write_iops,
        }
    }
}
