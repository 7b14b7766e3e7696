//! Domain types shared by the publisher engine and the remote API client.
//!
//! Remote entities (stacks, folders, datasources) are read from or created in
//! the remote platform for the duration of one run and never persisted.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// ---------------------------------------------------------------------------
// Newtypes
// ---------------------------------------------------------------------------

/// The unique slug of a stack (e.g. `acme-prod`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StackSlug(pub String);

impl StackSlug {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StackSlug {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl From<String> for StackSlug {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for StackSlug {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

// ---------------------------------------------------------------------------
// Remote entities
// ---------------------------------------------------------------------------

/// A stack: one independently addressable tenant instance of the hosted
/// visualization platform. Enumerated once at run start.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Stack {
    /// Numeric instance identifier used by the account API.
    pub id: u64,
    pub slug: StackSlug,
    /// Base URL of the stack, e.g. `https://acme-prod.grafana.net`.
    pub url: String,
    #[serde(rename = "hlInstanceId", default, skip_serializing_if = "Option::is_none")]
    pub logs_instance_id: Option<u64>,
    #[serde(rename = "hmInstancePromId", default, skip_serializing_if = "Option::is_none")]
    pub metrics_instance_id: Option<u64>,
}

impl Stack {
    pub fn new(id: u64, slug: impl Into<StackSlug>, url: impl Into<String>) -> Self {
        Self {
            id,
            slug: slug.into(),
            url: url.into(),
            logs_instance_id: None,
            metrics_instance_id: None,
        }
    }
}

/// Ordered collection of stacks as returned by enumeration.
pub type Stacks = Vec<Stack>;

/// A remote folder identity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub uid: String,
    pub title: String,
}

impl Folder {
    pub fn new(uid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            title: title.into(),
        }
    }
}

/// A datasource record as returned by the stack's datasource API.
///
/// Only the fields the publisher reads are typed; `user` carries the opaque
/// owner identifier (for hosted logs datasources, the numeric tenant id).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Datasource {
    #[serde(default)]
    pub uid: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub user: String,
}

/// A ready-to-upload dashboard: destination folder, identifier and the
/// transformed inner `dashboard` object.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardUpload {
    pub folder_uid: String,
    pub uid: String,
    pub dashboard: Map<String, Value>,
}

impl DashboardUpload {
    /// The dashboard title, if the document carries one.
    pub fn title(&self) -> Option<&str> {
        self.dashboard.get("title").and_then(Value::as_str)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_display() {
        assert_eq!(StackSlug::from("acme-prod").to_string(), "acme-prod");
    }

    #[test]
    fn stack_deserializes_from_instance_payload() {
        let stack: Stack = serde_json::from_str(
            r#"{"id": 42, "slug": "acme", "url": "https://acme.grafana.net", "hlInstanceId": 7, "status": "active"}"#,
        )
        .unwrap();
        assert_eq!(stack.id, 42);
        assert_eq!(stack.slug, StackSlug::from("acme"));
        assert_eq!(stack.logs_instance_id, Some(7));
        assert_eq!(stack.metrics_instance_id, None);
    }

    #[test]
    fn datasource_owner_defaults_to_empty() {
        let ds: Datasource =
            serde_json::from_str(r#"{"uid": "abc", "name": "logs", "type": "loki"}"#).unwrap();
        assert_eq!(ds.kind, "loki");
        assert!(ds.user.is_empty());
    }

    #[test]
    fn upload_title_reads_inner_document() {
        let mut dashboard = Map::new();
        dashboard.insert("title".into(), Value::from("Overview"));
        let upload = DashboardUpload {
            folder_uid: "f".into(),
            uid: "u".into(),
            dashboard,
        };
        assert_eq!(upload.title(), Some("Overview"));
    }
}
