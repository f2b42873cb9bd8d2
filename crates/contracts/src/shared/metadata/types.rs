//! Core metadata types: docfields and doctypes

use super::depends::DependsOn;
use super::field_type::FieldType;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Metadata flags arrive as `0`/`1`, booleans or `null`.
fn int_bool<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Bool(b) => b,
        Value::Number(n) => n.as_f64().map(|f| f != 0.0).unwrap_or(false),
        Value::String(s) => !s.is_empty() && s != "0",
        _ => false,
    })
}

// ============================================================================
// Field-level metadata
// ============================================================================

/// Flat description of one form field (a "df").
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocField {
    #[serde(default)]
    pub fieldname: String,
    #[serde(default)]
    pub fieldtype: FieldType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Child doctype for tables, choices for selects, target for links.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    #[serde(default)]
    pub idx: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub depends_on: Option<DependsOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory_depends_on: Option<DependsOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read_only_depends_on: Option<DependsOn>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible_depends_on: Option<DependsOn>,

    #[serde(default, deserialize_with = "int_bool")]
    pub reqd: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub read_only: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub hidden: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub collapsible: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub allow_on_submit: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub css_class: Option<String>,
}

/// Boolean docfield properties that dependency expressions can drive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocFieldProperty {
    Reqd,
    ReadOnly,
    Hidden,
}

impl DocFieldProperty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reqd => "reqd",
            Self::ReadOnly => "read_only",
            Self::Hidden => "hidden",
        }
    }
}

impl DocField {
    pub fn new(fieldname: impl Into<String>, fieldtype: FieldType) -> Self {
        Self {
            fieldname: fieldname.into(),
            fieldtype,
            ..Default::default()
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_depends_on(mut self, expr: impl Into<DependsOn>) -> Self {
        self.depends_on = Some(expr.into());
        self
    }

    pub fn with_options(mut self, options: impl Into<String>) -> Self {
        self.options = Some(options.into());
        self
    }

    pub fn required(mut self) -> Self {
        self.reqd = true;
        self
    }

    pub fn is_structural(&self) -> bool {
        self.fieldtype.is_structural()
    }

    /// True when any of the visibility/required/read-only expressions is set.
    pub fn has_dependency(&self) -> bool {
        [
            &self.depends_on,
            &self.mandatory_depends_on,
            &self.read_only_depends_on,
        ]
        .iter()
        .any(|expr| expr.as_ref().is_some_and(|e| !e.is_blank()))
    }

    pub fn label_or_fieldname(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.fieldname)
    }

    pub fn property(&self, property: DocFieldProperty) -> bool {
        match property {
            DocFieldProperty::Reqd => self.reqd,
            DocFieldProperty::ReadOnly => self.read_only,
            DocFieldProperty::Hidden => self.hidden,
        }
    }

    pub fn set_property(&mut self, property: DocFieldProperty, value: bool) {
        match property {
            DocFieldProperty::Reqd => self.reqd = value,
            DocFieldProperty::ReadOnly => self.read_only = value,
            DocFieldProperty::Hidden => self.hidden = value,
        }
    }
}

// ============================================================================
// Doctype-level metadata
// ============================================================================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct DocTypeMeta {
    pub name: String,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default, deserialize_with = "int_bool")]
    pub istable: bool,
    #[serde(default, deserialize_with = "int_bool")]
    pub is_submittable: bool,
    #[serde(default)]
    pub autoname: Option<String>,
    #[serde(default)]
    pub fields: Vec<DocField>,
}

impl DocTypeMeta {
    pub fn new(name: impl Into<String>, fields: Vec<DocField>) -> Self {
        Self {
            name: name.into(),
            fields,
            ..Default::default()
        }
    }

    /// Canonical field order: by `idx`, declaration order breaking ties.
    pub fn sort_docfields(&self) -> Vec<DocField> {
        let mut fields = self.fields.clone();
        fields.sort_by_key(|df| df.idx);
        fields
    }

    pub fn docfield_map(&self) -> HashMap<String, DocField> {
        self.fields
            .iter()
            .filter(|df| !df.fieldname.is_empty())
            .map(|df| (df.fieldname.clone(), df.clone()))
            .collect()
    }

    pub fn get_field(&self, fieldname: &str) -> Option<&DocField> {
        self.fields.iter().find(|df| df.fieldname == fieldname)
    }

    pub fn table_fields(&self) -> impl Iterator<Item = &DocField> {
        self.fields.iter().filter(|df| df.fieldtype.is_table())
    }

    /// Whether new documents of this doctype are named by the user.
    pub fn prompts_for_name(&self) -> bool {
        self.autoname
            .as_deref()
            .map(|a| matches!(a.to_lowercase().as_str(), "prompt" | "name"))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_docfield_accepts_int_flags() {
        let df: DocField = serde_json::from_value(json!({
            "fieldname": "qty",
            "fieldtype": "Float",
            "reqd": 1,
            "hidden": 0,
            "read_only": null,
            "depends_on": "eval:doc.item_code"
        }))
        .unwrap();
        assert!(df.reqd);
        assert!(!df.hidden);
        assert!(!df.read_only);
        assert!(df.has_dependency());
    }

    #[test]
    fn test_sort_docfields_is_stable() {
        let mut a = DocField::new("a", FieldType::Data);
        a.idx = 2;
        let mut b = DocField::new("b", FieldType::Data);
        b.idx = 1;
        let mut c = DocField::new("c", FieldType::Data);
        c.idx = 2;
        let meta = DocTypeMeta::new("Task", vec![a, b, c]);
        let order: Vec<_> = meta
            .sort_docfields()
            .into_iter()
            .map(|df| df.fieldname)
            .collect();
        assert_eq!(order, vec!["b", "a", "c"]);
    }

    #[test]
    fn test_prompts_for_name() {
        let mut meta = DocTypeMeta::new("Task", vec![]);
        assert!(!meta.prompts_for_name());
        meta.autoname = Some("Prompt".to_string());
        assert!(meta.prompts_for_name());
    }
}
