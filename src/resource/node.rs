//! Managed node

use super::{DeletePolicy, RemoteResource};
use serde::{Deserialize, Serialize};
use statemap::{FieldReader, FieldWriter, Record, StateStore};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub node_id: String,
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    pub site: String,
    /// Reported by the server, never sent
    pub status: String,
    pub public_ip: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NodeDocument {
    pub name: String,
    pub description: String,
    pub tags: Vec<String>,
    #[serde(rename = "siteName")]
    pub site: String,
    #[serde(skip_serializing_if = "String::is_empty")]
    pub status: String,
    #[serde(rename = "publicIP", skip_serializing_if = "String::is_empty")]
    pub public_ip: String,
}

impl Record for Node {
    fn materialize(state: &dyn StateStore) -> statemap::Result<Self> {
        let r = FieldReader::new(state);
        Ok(Self {
            node_id: r.get("node_id")?,
            name: r.get("name")?,
            description: r.get("description")?,
            tags: r.get("tags")?,
            site: r.get("site")?,
            status: r.get("status")?,
            public_ip: r.get("public_ip")?,
        })
    }

    fn project(&self, state: &mut dyn StateStore) {
        let mut w = FieldWriter::new(state);
        w.set("node_id", &self.node_id);
        w.set("name", &self.name);
        w.set("description", &self.description);
        w.set("tags", self.tags.clone());
        w.set("site", &self.site);
        w.set("status", &self.status);
        w.set("public_ip", &self.public_ip);
    }
}

impl RemoteResource for Node {
    const KIND: &'static str = "node";
    const DELETE_POLICY: DeletePolicy = DeletePolicy::Remote;
    type Document = NodeDocument;

    fn natural_key(&self) -> &str {
        &self.node_id
    }

    fn path(natural_key: &str) -> String {
        format!("/v2/node/{natural_key}")
    }

    fn to_document(&self) -> NodeDocument {
        NodeDocument {
            name: self.name.clone(),
            description: self.description.clone(),
            tags: self.tags.clone(),
            site: self.site.clone(),
            status: String::new(),
            public_ip: String::new(),
        }
    }

    fn from_document(natural_key: &str, document: NodeDocument) -> Self {
        Self {
            node_id: natural_key.to_string(),
            name: document.name,
            description: document.description,
            tags: document.tags,
            site: document.site,
            status: document.status,
            public_ip: document.public_ip,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resource::{mock_client, read};
    use statemap::{DeclaredState, Value};

    #[test]
    fn test_computed_fields_not_sent() {
        let node = Node {
            node_id: "abc123".into(),
            name: "edge-1".into(),
            tags: vec!["lab".into()],
            status: "online".into(),
            public_ip: "203.0.113.7".into(),
            ..Node::default()
        };

        let json = serde_json::to_value(node.to_document()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({ "name": "edge-1", "description": "", "tags": ["lab"], "siteName": "" })
        );
    }

    #[test]
    fn test_read_writes_back_computed_fields() {
        let (client, mock) = mock_client();
        mock.put_document(
            "/v2/node/abc123",
            &serde_json::json!({
                "name": "edge-1",
                "tags": ["lab", "rack-4"],
                "siteName": "ams",
                "status": "online",
                "publicIP": "203.0.113.7",
                "firmware": "ignored"
            }),
        );
        let mut state = DeclaredState::new()
            .with("node_id", "abc123")
            .with("name", "old-name")
            .with("owner", "ops");

        read::<Node>(&client, &mut state).unwrap();

        assert_eq!(state.get("name"), Some(&Value::from("edge-1")));
        assert_eq!(state.get("site"), Some(&Value::from("ams")));
        assert_eq!(state.get("status"), Some(&Value::from("online")));
        assert_eq!(state.get("public_ip"), Some(&Value::from("203.0.113.7")));
        assert_eq!(state.get("tags"), Some(&Value::from(vec!["lab", "rack-4"])));
        // keys the record does not model survive
        assert_eq!(state.get("owner"), Some(&Value::from("ops")));
    }

    #[test]
    fn test_url() {
        assert_eq!(Node::path("abc123"), "/v2/node/abc123");
    }
}
