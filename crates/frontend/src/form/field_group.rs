//! Field groups: a layout over explicit descriptors with no document behind
//! it. Values live in the controls themselves.

use super::control::DisplayStatus;
use super::layout::{Layout, LayoutError, LayoutOptions};
use crate::model::MetaStore;
use crate::shared::value::is_null;
use chrono::{NaiveDateTime, Utc};
use contracts::shared::metadata::{DocField, DocFieldProperty, FieldType};
use serde_json::{Map, Value};

/// Fieldname derived from a label: lowercased, spaces to underscores.
pub fn scrub(label: &str) -> String {
    label.trim().to_lowercase().replace(' ', "_")
}

/// Default value of a descriptor, with `Today` / `Now` resolved against `now`.
fn resolve_default(df: &DocField, now: NaiveDateTime) -> Option<Value> {
    let default = df.default.as_ref().filter(|v| !is_null(v))?;
    let resolved = match (&df.fieldtype, default.as_str()) {
        (FieldType::Date, Some(d)) if d.eq_ignore_ascii_case("today") => {
            Value::String(now.date().format("%Y-%m-%d").to_string())
        }
        (FieldType::Datetime, Some(d)) if d.eq_ignore_ascii_case("now") => {
            Value::String(now.format("%Y-%m-%d %H:%M:%S").to_string())
        }
        _ => default.clone(),
    };
    Some(resolved)
}

pub struct FieldGroup {
    layout: Layout,
}

impl FieldGroup {
    pub fn new(fields: Vec<DocField>) -> Self {
        Self::with_options(fields, LayoutOptions::new("", MetaStore::new()))
    }

    /// `opts.fields` is replaced by `fields`.
    pub fn with_options(fields: Vec<DocField>, opts: LayoutOptions) -> Self {
        let fields = fields
            .into_iter()
            .map(|mut df| {
                if df.fieldname.is_empty() && !df.is_structural() {
                    if let Some(label) = df.label.as_deref() {
                        df.fieldname = scrub(label);
                    }
                }
                df
            })
            .collect();
        Self {
            layout: Layout::new(opts.with_fields(fields)),
        }
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn layout_mut(&mut self) -> &mut Layout {
        &mut self.layout
    }

    /// Build the layout, apply defaults and run the first refresh.
    pub fn make(&mut self) -> Result<(), LayoutError> {
        if self.layout.is_built() {
            return Ok(());
        }
        self.layout.make();
        self.apply_defaults();
        self.layout.refresh(None)
    }

    fn apply_defaults(&mut self) {
        let now = Utc::now().naive_utc();
        let defaults: Vec<(String, Value)> = self
            .layout
            .fields()
            .filter_map(|f| Some((f.fieldname().to_string(), resolve_default(f.df(), now)?)))
            .collect();
        for (fieldname, value) in defaults {
            if let Some(field) = self.layout.get_field_mut(&fieldname) {
                field.control.set_input(value);
            }
        }
    }

    pub fn get_value(&self, fieldname: &str) -> Value {
        self.layout.get_value(fieldname)
    }

    /// Non-empty values keyed by fieldname.
    ///
    /// Required fields left empty are reported by label unless
    /// `ignore_errors` is set; hidden fields are never required.
    pub fn get_values(&self, ignore_errors: bool) -> Result<Map<String, Value>, LayoutError> {
        let mut values = Map::new();
        let mut missing = Vec::new();
        for field in self.layout.fields() {
            let df = field.df();
            if df.fieldname.is_empty() || df.fieldtype.is_no_value() {
                continue;
            }
            let value = field.get_value();
            if is_null(&value) {
                if df.reqd && field.status() != DisplayStatus::None {
                    missing.push(df.label_or_fieldname().to_string());
                }
                continue;
            }
            values.insert(df.fieldname.clone(), value);
        }
        if !missing.is_empty() && !ignore_errors {
            return Err(LayoutError::MissingValues(missing));
        }
        Ok(values)
    }

    pub fn set_value(&mut self, fieldname: &str, value: Value) -> Result<(), LayoutError> {
        self.layout.set_value(fieldname, value)
    }

    /// Set several values, refreshing once.
    pub fn set_values(&mut self, values: &Map<String, Value>) -> Result<(), LayoutError> {
        for (fieldname, value) in values {
            if let Some(field) = self.layout.get_field_mut(fieldname) {
                field.control.set_input(value.clone());
            }
        }
        self.layout.refresh(None)
    }

    /// Reset every field to its default (or empty).
    pub fn clear(&mut self) -> Result<(), LayoutError> {
        let now = Utc::now().naive_utc();
        let names: Vec<String> = self
            .layout
            .fields()
            .map(|f| f.fieldname().to_string())
            .collect();
        for fieldname in names {
            if let Some(field) = self.layout.get_field_mut(&fieldname) {
                let value = resolve_default(field.df(), now).unwrap_or(Value::Null);
                field.control.set_input(value);
            }
        }
        self.layout.refresh(None)
    }

    pub fn set_df_property(
        &mut self,
        fieldname: &str,
        property: DocFieldProperty,
        value: bool,
    ) -> bool {
        let Some(field) = self.layout.get_field(fieldname) else {
            return false;
        };
        let mut df = field.df().clone();
        df.set_property(property, value);
        self.layout.refresh_fields(&[df]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use serde_json::json;

    fn fields() -> Vec<DocField> {
        vec![
            DocField::new("", FieldType::Data).with_label("Customer Name").required(),
            DocField::new("notify", FieldType::Check),
            DocField::new("email", FieldType::Data)
                .with_label("Email")
                .with_depends_on("notify"),
        ]
    }

    #[test]
    fn test_label_only_fields_get_scrubbed_names() {
        let mut group = FieldGroup::new(fields());
        group.make().unwrap();
        assert!(group.layout().get_field("customer_name").is_some());
    }

    #[test]
    fn test_today_default() {
        let mut df = DocField::new("posting_date", FieldType::Date);
        df.default = Some(json!("Today"));
        let now = NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap();
        assert_eq!(resolve_default(&df, now), Some(json!("2024-03-09")));

        df.fieldtype = FieldType::Data;
        assert_eq!(resolve_default(&df, now), Some(json!("Today")));
    }

    #[test]
    fn test_defaults_applied_on_make_and_clear() {
        let mut qty = DocField::new("qty", FieldType::Int);
        qty.default = Some(json!(1));
        let mut group = FieldGroup::new(vec![qty]);
        group.make().unwrap();
        assert_eq!(group.get_value("qty"), json!(1));

        group.set_value("qty", json!(7)).unwrap();
        assert_eq!(group.get_value("qty"), json!(7));
        group.clear().unwrap();
        assert_eq!(group.get_value("qty"), json!(1));
    }

    #[test]
    fn test_get_values_reports_missing_labels() {
        let mut group = FieldGroup::new(fields());
        group.make().unwrap();
        assert_eq!(
            group.get_values(false),
            Err(LayoutError::MissingValues(vec!["Customer Name".into()]))
        );
        assert!(group.get_values(true).unwrap().is_empty());

        group.set_value("customer_name", json!("ACME")).unwrap();
        let values = group.get_values(false).unwrap();
        assert_eq!(values.get("customer_name"), Some(&json!("ACME")));
    }

    #[test]
    fn test_dependencies_follow_own_values() {
        let mut group = FieldGroup::new(fields());
        group.make().unwrap();
        assert!(!group.layout().get_field("email").unwrap().is_visible());

        let mut values = Map::new();
        values.insert("notify".into(), json!(1));
        values.insert("email".into(), json!("a@b.c"));
        group.set_values(&values).unwrap();
        assert!(group.layout().get_field("email").unwrap().is_visible());
        assert_eq!(group.get_value("email"), json!("a@b.c"));
    }

    #[test]
    fn test_hidden_required_field_is_not_missing() {
        let mut group = FieldGroup::new(vec![DocField::new("code", FieldType::Data)
            .required()
            .with_depends_on("eval:false")]);
        group.make().unwrap();
        assert!(group.get_values(false).is_ok());
    }

    #[test]
    fn test_set_df_property() {
        let mut group = FieldGroup::new(fields());
        group.make().unwrap();
        assert!(group.set_df_property("notify", DocFieldProperty::Hidden, true));
        assert!(!group.layout().get_field("notify").unwrap().is_visible());
        assert!(!group.set_df_property("missing", DocFieldProperty::Hidden, true));
    }
}
