//! Records returned by the Self Service.
//!
//! The `query` catalogue itself stays untyped JSON; only the versions of the
//! app a command works on are decoded into [`AppVersion`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One version of an app as stored on the portal.
///
/// Only the fields this client reasons about are typed; everything else the
/// server sends is kept in `extra` so it can be passed back verbatim.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppVersion {
    pub id: String,
    pub version: String,
    pub ucs_version: String,
    pub component_id: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppVersion {
    /// Whether this version is live in the App Center (as opposed to a draft)
    pub fn is_published(&self) -> bool {
        self.extra.get("in_appcenter").is_some_and(is_truthy)
    }

    /// `ucs/id=version`
    pub fn display_name(&self) -> String {
        format!("{}/{}={}", self.ucs_version, self.id, self.version)
    }

    /// All fields of the record, typed and untyped, as one JSON object
    pub fn to_fields(&self) -> Map<String, Value> {
        let mut fields = self.extra.clone();
        fields.insert("id".into(), Value::String(self.id.clone()));
        fields.insert("version".into(), Value::String(self.version.clone()));
        fields.insert("ucs_version".into(), Value::String(self.ucs_version.clone()));
        fields.insert(
            "component_id".into(),
            Value::String(self.component_id.clone()),
        );
        fields
    }
}

/// An app as the portal reports it after a copy.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AppRecord {
    pub id: String,
    pub ucs_version: String,
    pub version: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AppRecord {
    pub fn display_name(&self) -> String {
        format!("{}/{}={}", self.ucs_version, self.id, self.version)
    }
}

/// Truthiness the way the portal's Python backend sees it.
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
