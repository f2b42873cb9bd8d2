//! In-memory document records
//!
//! A document is a JSON object carrying at least `doctype` and `name`.
//! Child-table rows additionally carry `parent`, `parenttype` and
//! `parentfield`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document(Map<String, Value>);

impl Document {
    pub fn new(doctype: &str, name: &str) -> Self {
        let mut fields = Map::new();
        fields.insert("doctype".to_string(), Value::String(doctype.to_string()));
        fields.insert("name".to_string(), Value::String(name.to_string()));
        Self(fields)
    }

    /// Builds a document from a JSON object; anything else yields `None`.
    pub fn from_value(value: Value) -> Option<Self> {
        match value {
            Value::Object(map) => Some(Self(map)),
            _ => None,
        }
    }

    fn str_field(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    pub fn doctype(&self) -> &str {
        self.str_field("doctype").unwrap_or_default()
    }

    pub fn name(&self) -> &str {
        self.str_field("name").unwrap_or_default()
    }

    pub fn parent(&self) -> Option<&str> {
        self.str_field("parent").filter(|s| !s.is_empty())
    }

    pub fn parenttype(&self) -> Option<&str> {
        self.str_field("parenttype").filter(|s| !s.is_empty())
    }

    pub fn parentfield(&self) -> Option<&str> {
        self.str_field("parentfield").filter(|s| !s.is_empty())
    }

    /// Rows of a child table carry both `parent` and `parentfield`.
    pub fn is_child_row(&self) -> bool {
        self.parent().is_some() && self.parentfield().is_some()
    }

    pub fn is_new(&self) -> bool {
        self.0
            .get("__islocal")
            .map(|v| v.as_bool().unwrap_or(false) || v.as_i64().unwrap_or(0) != 0)
            .unwrap_or(false)
    }

    pub fn docstatus(&self) -> i64 {
        self.0.get("docstatus").and_then(Value::as_i64).unwrap_or(0)
    }

    pub fn get(&self, fieldname: &str) -> Option<&Value> {
        self.0.get(fieldname)
    }

    pub fn set(&mut self, fieldname: &str, value: Value) {
        self.0.insert(fieldname.to_string(), value);
    }

    pub fn remove(&mut self, fieldname: &str) -> Option<Value> {
        self.0.remove(fieldname)
    }

    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Child rows stored under a table field.
    pub fn rows(&self, table_field: &str) -> Vec<Document> {
        match self.0.get(table_field) {
            Some(Value::Array(items)) => items
                .iter()
                .cloned()
                .filter_map(Document::from_value)
                .collect(),
            _ => Vec::new(),
        }
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.0.clone())
    }
}

/// Prefix shared by the names of unsaved documents of `doctype`.
pub fn new_doc_prefix(doctype: &str) -> String {
    format!("new-{}-", doctype.trim().to_lowercase().replace(' ', "-"))
}

/// Name given to a freshly created, unsaved document:
/// `new-<doctype-slug>-<8 hex chars>`.
pub fn new_doc_name(doctype: &str) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    format!("{}{}", new_doc_prefix(doctype), &id[..8])
}
