//! License bound to a node
//!
//! The key is write-only: the API answers with the license details and an
//! empty `key`.

use super::{DeletePolicy, RemoteResource};
use serde::{Deserialize, Serialize};
use statemap::{FieldReader, FieldWriter, Record, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct License {
    pub node_id: String,
    pub license_key: String,
    // computed
    pub product: String,
    pub seats: u32,
    pub expires_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LicenseDocument {
    pub key: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub product: String,
    #[serde(skip_serializing_if = "is_zero")]
    pub seats: u32,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub expires_at: String,
}

fn is_zero(n: &u32) -> bool {
    *n == 0
}

impl Record for License {
    fn materialize(state: &dyn StateStore) -> statemap::Result<Self> {
        let r = FieldReader::new(state);
        Ok(Self {
            node_id: r.get("node_id")?,
            license_key: r.get("license_key")?,
            product: r.get("product")?,
            seats: r.get("seats")?,
            expires_at: r.get("expires_at")?,
        })
    }

    fn project(&self, state: &mut dyn StateStore) {
        let mut w = FieldWriter::new(state);
        w.set("node_id", &self.node_id);
        w.set("license_key", &self.license_key);
        w.set("product", &self.product);
        w.set("seats", self.seats);
        w.set("expires_at", &self.expires_at);
    }
}

impl RemoteResource for License {
    const KIND: &'static str = "license";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Remote;
    const SECRET_KEYS: &'static [&'static str] = &["license_key"];
    type Document = LicenseDocument;

    fn natural_key(&self) -> &str {
        &self.node_id
    }

    fn path(natural_key: &str) -> String {
        format!("/v2/node/{natural_key}/license")
    }

    fn to_document(&self) -> LicenseDocument {
        LicenseDocument {
            key: self.license_key.clone(),
            ..LicenseDocument::default()
        }
    }

    fn from_document(natural_key: &str, document: LicenseDocument) -> Self {
        Self {
            node_id: natural_key.to_string(),
            license_key: document.key,
            product: document.product,
            seats: document.seats,
            expires_at: document.expires_at,
        }
    }
}
