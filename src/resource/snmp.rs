//! SNMP agent settings of a node
//!
//! The API has no delete for this document; removal resets it. v3
//! credentials live under a nested `v3` object on the wire but are flat keys
//! in declared state, and trap targets are a list of nested blocks.

use super::{DeletePolicy, RemoteResource};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use statemap::{Block, FieldReader, FieldWriter, Record, StateStore, Value};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrapTarget {
    pub host: String,
    pub port: u16,
    pub community: String,
}

impl TrapTarget {
    fn read(r: &FieldReader<'_>) -> statemap::Result<Self> {
        Ok(Self {
            host: r.get("host")?,
            port: r.get("port")?,
            community: r.get("community")?,
        })
    }

    fn to_block(&self) -> Block {
        Block::from([
            ("host".to_string(), Value::from(&self.host)),
            ("port".to_string(), Value::from(self.port)),
            ("community".to_string(), Value::from(&self.community)),
        ])
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snmp {
    pub node_id: String,
    pub enabled: bool,
    pub version: String,
    pub community: String,
    pub location: String,
    pub contact: String,
    pub username: String,
    pub auth_protocol: String,
    pub auth_passphrase: String,
    pub priv_protocol: String,
    pub priv_passphrase: String,
    pub trap_targets: Vec<TrapTarget>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnmpDocument {
    pub enabled: bool,
    pub version: String,
    pub community: String,
    pub location: String,
    pub contact: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub v3: Option<SnmpV3Document>,
    pub traps: Vec<TrapDocument>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SnmpV3Document {
    pub username: String,
    pub auth_protocol: String,
    pub auth_passphrase: String,
    pub priv_protocol: String,
    pub priv_passphrase: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrapDocument {
    pub host: String,
    pub port: u16,
    pub community: String,
}

impl Record for Snmp {
    fn materialize(state: &dyn StateStore) -> statemap::Result<Self> {
        let r = FieldReader::new(state);
        Ok(Self {
            node_id: r.get("node_id")?,
            enabled: r.get("enabled")?,
            version: r.get("version")?,
            community: r.get("community")?,
            location: r.get("location")?,
            contact: r.get("contact")?,
            username: r.get("username")?,
            auth_protocol: r.get("auth_protocol")?,
            auth_passphrase: r.get("auth_passphrase")?,
            priv_protocol: r.get("priv_protocol")?,
            priv_passphrase: r.get("priv_passphrase")?,
            trap_targets: r.blocks("trap_target", TrapTarget::read)?,
        })
    }

    fn project(&self, state: &mut dyn StateStore) {
        let mut w = FieldWriter::new(state);
        w.set("node_id", &self.node_id);
        w.set("enabled", self.enabled);
        w.set("version", &self.version);
        w.set("community", &self.community);
        w.set("location", &self.location);
        w.set("contact", &self.contact);
        w.set("username", &self.username);
        w.set("auth_protocol", &self.auth_protocol);
        w.set("auth_passphrase", &self.auth_passphrase);
        w.set("priv_protocol", &self.priv_protocol);
        w.set("priv_passphrase", &self.priv_passphrase);
        w.set_blocks(
            "trap_target",
            self.trap_targets.iter().map(TrapTarget::to_block).collect(),
        );
    }
}

impl RemoteResource for Snmp {
    const KIND: &'static str = "snmp";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Reset;
    const SECRET_KEYS: &'static [&'static str] = &["auth_passphrase", "priv_passphrase"];
    type Document = SnmpDocument;

    fn natural_key(&self) -> &str {
        &self.node_id
    }

    fn path(natural_key: &str) -> String {
        format!("/node/{natural_key}/config/snmp")
    }

    /// v3 passphrases only travel inside the `v3` section, which needs a user
    fn validate(&self) -> Result<()> {
        let has_secret = !self.auth_passphrase.is_empty() || !self.priv_passphrase.is_empty();
        if has_secret && self.username.is_empty() {
            return Err(Error::MissingKey {
                kind: Self::KIND,
                field: "username",
            });
        }
        Ok(())
    }

    fn to_document(&self) -> SnmpDocument {
        let v3 = (!self.username.is_empty()).then(|| SnmpV3Document {
            username: self.username.clone(),
            auth_protocol: self.auth_protocol.clone(),
            auth_passphrase: self.auth_passphrase.clone(),
            priv_protocol: self.priv_protocol.clone(),
            priv_passphrase: self.priv_passphrase.clone(),
        });

        SnmpDocument {
            enabled: self.enabled,
            version: self.version.clone(),
            community: self.community.clone(),
            location: self.location.clone(),
            contact: self.contact.clone(),
            v3,
            traps: self
                .trap_targets
                .iter()
                .map(|t| TrapDocument {
                    host: t.host.clone(),
                    port: t.port,
                    community: t.community.clone(),
                })
                .collect(),
        }
    }

    fn from_document(natural_key: &str, document: SnmpDocument) -> Self {
        let v3 = document.v3.unwrap_or_default();
        Self {
            node_id: natural_key.to_string(),
            enabled: document.enabled,
            version: document.version,
            community: document.community,
            location: document.location,
            contact: document.contact,
            username: v3.username,
            auth_protocol: v3.auth_protocol,
            auth_passphrase: v3.auth_passphrase,
            priv_protocol: v3.priv_protocol,
            priv_passphrase: v3.priv_passphrase,
            trap_targets: document
                .traps
                .into_iter()
                .map(|t| TrapTarget {
                    host: t.host,
                    port: t.port,
                    community: t.community,
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use statemap::DeclaredState;

    fn trap(host: &str, port: u16) -> Block {
        TrapTarget {
            host: host.to_string(),
            port,
            community: "public".to_string(),
        }
        .to_block()
    }

    #[test]
    fn test_trap_targets_from_blocks() {
        let state = DeclaredState::new()
            .with("node_id", "abc123")
            .with("trap_target", vec![trap("10.0.0.1", 162), trap("10.0.0.2", 1162)]);

        let snmp = Snmp::materialize(&state).unwrap();

        assert_eq!(snmp.trap_targets.len(), 2);
        assert_eq!(snmp.trap_targets[1].host, "10.0.0.2");
        assert_eq!(snmp.trap_targets[1].port, 1162);
    }

    #[test]
    fn test_trap_target_error_names_nested_key() {
        let mut bad = trap("10.0.0.1", 162);
        bad.insert("port".to_string(), Value::from("162"));
        let state = DeclaredState::new()
            .with("node_id", "abc123")
            .with("trap_target", vec![trap("10.0.0.1", 162), bad]);

        let err = Snmp::materialize(&state).unwrap_err();

        assert_eq!(err.key(), "trap_target.1.port");
    }

    #[test]
    fn test_v1_document_has_no_v3_section() {
        let snmp = Snmp {
            node_id: "abc123".into(),
            enabled: true,
            version: "v2c".into(),
            community: "public".into(),
            ..Snmp::default()
        };

        let json = serde_json::to_value(snmp.to_document()).unwrap();
        assert!(json.get("v3").is_none());
        assert_eq!(json["community"], "public");
        assert_eq!(json["traps"], serde_json::json!([]));
    }

    #[test]
    fn test_v3_credentials_nest_on_the_wire() {
        let snmp = Snmp {
            node_id: "abc123".into(),
            username: "monitor".into(),
            auth_protocol: "SHA".into(),
            auth_passphrase: "secret1".into(),
            ..Snmp::default()
        };

        let json = serde_json::to_value(snmp.to_document()).unwrap();
        assert_eq!(json["v3"]["username"], "monitor");
        assert_eq!(json["v3"]["authPassphrase"], "secret1");
    }

    #[test]
    fn test_v3_passphrase_without_username_is_refused() {
        let snmp = Snmp {
            node_id: "abc123".into(),
            priv_passphrase: "secret2".into(),
            ..Snmp::default()
        };

        let err = snmp.validate().unwrap_err();
        assert!(matches!(
            err,
            Error::MissingKey {
                kind: "snmp",
                field: "username"
            }
        ));

        let with_user = Snmp {
            username: "monitor".into(),
            ..snmp
        };
        assert!(with_user.validate().is_ok());
    }

    #[test]
    fn test_reset_document_disables_agent() {
        let json = serde_json::to_value(Snmp::reset_document()).unwrap();
        assert_eq!(json["enabled"], false);
        assert!(json.get("v3").is_none());
    }

    #[test]
    fn test_project_round_trip() {
        let snmp = Snmp {
            node_id: "abc123".into(),
            enabled: true,
            version: "v3".into(),
            username: "monitor".into(),
            trap_targets: vec![TrapTarget {
                host: "10.0.0.1".into(),
                port: 162,
                community: "traps".into(),
            }],
            ..Snmp::default()
        };

        let mut state = DeclaredState::new();
        snmp.project(&mut state);

        assert_eq!(Snmp::materialize(&state).unwrap(), snmp);
    }
}
