//! Dashboard document model.
//!
//! Documents are kept as a [`serde_json::Value`] tree (with `preserve_order`,
//! so unknown fields and their order survive the rewrite). Access goes through
//! the helpers below, which report a typed [`DocumentError`] instead of
//! assuming a shape.
//!
//! Optional sections that are absent or `null` are treated the same way;
//! a present section with the wrong JSON type is a shape mismatch.

use serde_json::{Map, Value};
use thiserror::Error;

pub type Object = Map<String, Value>;

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("missing required field `{field}`")]
    MissingField { field: String },

    #[error("field `{field}` must be {expected}, found {found}")]
    ShapeMismatch {
        field: String,
        expected: &'static str,
        found: &'static str,
    },
}

/// JSON type name of `value`, for error messages.
pub fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

pub(crate) fn mismatch(field: &str, expected: &'static str, found: &Value) -> DocumentError {
    DocumentError::ShapeMismatch {
        field: field.to_string(),
        expected,
        found: kind_of(found),
    }
}

fn missing(field: &str) -> DocumentError {
    DocumentError::MissingField {
        field: field.to_string(),
    }
}

/// A dashboard file: a top-level object wrapping the inner `dashboard` object.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardDocument {
    root: Object,
}

impl DashboardDocument {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, DocumentError> {
        Self::from_value(serde_json::from_slice(bytes)?)
    }

    pub fn from_value(value: Value) -> Result<Self, DocumentError> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(mismatch("<root>", "an object", &other)),
        }
    }

    /// The inner `dashboard` object.
    pub fn dashboard(&self) -> Result<&Object, DocumentError> {
        match self.root.get("dashboard") {
            None | Some(Value::Null) => Err(missing("dashboard")),
            Some(Value::Object(dash)) => Ok(dash),
            Some(other) => Err(mismatch("dashboard", "an object", other)),
        }
    }

    /// Consume the document, keeping only the inner `dashboard` object.
    pub fn into_dashboard(mut self) -> Result<Object, DocumentError> {
        self.dashboard()?;
        match self.root.remove("dashboard") {
            Some(Value::Object(dash)) => Ok(dash),
            _ => Err(missing("dashboard")),
        }
    }

    /// The required, non-empty `dashboard.uid` string.
    pub fn uid(&self) -> Result<&str, DocumentError> {
        match optional_str(self.dashboard()?, "uid", "dashboard.uid")? {
            Some(uid) if !uid.is_empty() => Ok(uid),
            _ => Err(missing("dashboard.uid")),
        }
    }
}

/// `map[key]`, treating `null` as absent.
pub fn optional<'a>(map: &'a Object, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

/// `map[key]` as a string. `path` names the field in errors.
pub fn optional_str<'a>(
    map: &'a Object,
    key: &str,
    path: &str,
) -> Result<Option<&'a str>, DocumentError> {
    match optional(map, key) {
        None => Ok(None),
        Some(Value::String(s)) => Ok(Some(s)),
        Some(other) => Err(mismatch(path, "a string", other)),
    }
}

pub fn optional_object_mut<'a>(
    map: &'a mut Object,
    key: &str,
    path: &str,
) -> Result<Option<&'a mut Object>, DocumentError> {
    match map.get_mut(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Object(obj)) => Ok(Some(obj)),
        Some(other) => Err(mismatch(path, "an object", other)),
    }
}

pub fn optional_array_mut<'a>(
    map: &'a mut Object,
    key: &str,
    path: &str,
) -> Result<Option<&'a mut Vec<Value>>, DocumentError> {
    match map.get_mut(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(other) => Err(mismatch(path, "an array", other)),
    }
}

pub fn expect_object_mut<'a>(value: &'a mut Value, path: &str) -> Result<&'a mut Object, DocumentError> {
    match value {
        Value::Object(obj) => Ok(obj),
        other => Err(mismatch(path, "an object", other)),
    }
}

/// Remove `key` while keeping the order of the remaining fields.
pub fn remove_field(map: &mut Object, key: &str) {
    map.retain(|k, _| k != key);
}
