//! Controls: the per-field widgets a layout owns
//!
//! The layout only talks to the [`Control`] trait. Concrete widgets are
//! produced by a [`ControlRegistry`] keyed by fieldtype; the defaults here
//! keep their state in memory and are painted by the Leptos layer.

use super::layout::{ColumnId, SectionId};
use crate::model::{DocRef, MetaStore};
use contracts::shared::document::new_doc_name;
use contracts::shared::metadata::{DocField, FieldType};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::rc::Rc;

/// How a field is shown: editable, read-only, or not at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DisplayStatus {
    #[default]
    Write,
    Read,
    None,
}

/// One focusable slot considered by tab-order navigation.
#[derive(Debug, Clone, PartialEq)]
pub struct TabStop {
    pub fieldname: String,
    pub fieldtype: FieldType,
    pub visible: bool,
}

pub trait Control {
    fn df(&self) -> &DocField;
    fn set_df(&mut self, df: DocField);
    fn bind(&mut self, doc: Option<DocRef>);
    /// Repaint for the given status.
    fn refresh(&mut self, status: DisplayStatus);
    fn status(&self) -> DisplayStatus;
    fn get_value(&self) -> Value;
    fn set_input(&mut self, value: Value);
    fn select_text(&mut self) {}
    /// Text selected by the last refresh, to be selected again on screen.
    fn is_text_selected(&self) -> bool {
        false
    }
    fn grid(&self) -> Option<&dyn Grid> {
        None
    }
    fn grid_mut(&mut self) -> Option<&mut dyn Grid> {
        None
    }
}

/// Line-item editor behind Table fields.
pub trait Grid {
    fn row_count(&self) -> usize;
    fn add_new_row(&mut self);
    /// Row currently opened for editing.
    fn open_row(&self) -> Option<usize>;
    fn show_row(&mut self, idx: usize);
    fn close_row(&mut self);
    fn row_tab_stops(&self, idx: usize) -> Vec<TabStop>;
}

/// Where a control is mounted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlParent {
    pub section: SectionId,
    pub column: ColumnId,
}

pub struct ControlSpec {
    pub df: DocField,
    /// Doctype owning the layout.
    pub doctype: String,
    pub parent: ControlParent,
    pub doc: Option<DocRef>,
    pub render_input: bool,
}

pub type ControlConstructor = Rc<dyn Fn(ControlSpec) -> Box<dyn Control>>;

#[derive(Clone)]
pub struct ControlRegistry {
    by_type: HashMap<FieldType, ControlConstructor>,
    fallback: ControlConstructor,
}

impl ControlRegistry {
    /// Input controls everywhere, grids for table fields.
    pub fn new(meta: MetaStore) -> Self {
        let mut registry = Self {
            by_type: HashMap::new(),
            fallback: Rc::new(|spec: ControlSpec| Box::new(InputControl::new(spec)) as Box<dyn Control>),
        };
        for fieldtype in [FieldType::Table, FieldType::TableMultiSelect] {
            let meta = meta.clone();
            registry.register(fieldtype, move |spec| {
                Box::new(TableControl::new(spec, meta.clone())) as Box<dyn Control>
            });
        }
        registry
    }

    pub fn register(
        &mut self,
        fieldtype: FieldType,
        constructor: impl Fn(ControlSpec) -> Box<dyn Control> + 'static,
    ) {
        self.by_type.insert(fieldtype, Rc::new(constructor));
    }

    pub fn make_control(&self, spec: ControlSpec) -> Box<dyn Control> {
        let constructor = self
            .by_type
            .get(&spec.df.fieldtype)
            .unwrap_or(&self.fallback);
        constructor(spec)
    }
}

// ============================================================================
// Input control
// ============================================================================

pub struct InputControl {
    df: DocField,
    doc: Option<DocRef>,
    /// Value held when no document is bound (field groups).
    value: Value,
    status: DisplayStatus,
    selected: bool,
}

impl InputControl {
    pub fn new(spec: ControlSpec) -> Self {
        Self {
            df: spec.df,
            doc: spec.doc,
            value: Value::Null,
            status: DisplayStatus::Write,
            selected: false,
        }
    }
}

impl Control for InputControl {
    fn df(&self) -> &DocField {
        &self.df
    }

    fn set_df(&mut self, df: DocField) {
        self.df = df;
    }

    fn bind(&mut self, doc: Option<DocRef>) {
        self.doc = doc;
    }

    fn refresh(&mut self, status: DisplayStatus) {
        self.status = status;
        self.selected = false;
    }

    fn status(&self) -> DisplayStatus {
        self.status
    }

    fn get_value(&self) -> Value {
        match &self.doc {
            Some(doc) => doc
                .borrow()
                .get(&self.df.fieldname)
                .cloned()
                .unwrap_or(Value::Null),
            None => self.value.clone(),
        }
    }

    fn set_input(&mut self, value: Value) {
        self.value = value;
    }

    fn select_text(&mut self) {
        self.selected = true;
    }

    fn is_text_selected(&self) -> bool {
        self.selected
    }
}

// ============================================================================
// Table control
// ============================================================================

pub struct TableControl {
    df: DocField,
    doc: Option<DocRef>,
    meta: MetaStore,
    status: DisplayStatus,
    open: Option<usize>,
}

impl TableControl {
    pub fn new(spec: ControlSpec, meta: MetaStore) -> Self {
        Self {
            df: spec.df,
            doc: spec.doc,
            meta,
            status: DisplayStatus::Write,
            open: None,
        }
    }

    fn child_doctype(&self) -> &str {
        self.df.options.as_deref().unwrap_or_default()
    }

    fn rows(&self) -> Vec<Value> {
        self.doc
            .as_ref()
            .and_then(|doc| doc.borrow().get(&self.df.fieldname).cloned())
            .and_then(|v| match v {
                Value::Array(rows) => Some(rows),
                _ => None,
            })
            .unwrap_or_default()
    }
}

impl Control for TableControl {
    fn df(&self) -> &DocField {
        &self.df
    }

    fn set_df(&mut self, df: DocField) {
        self.df = df;
    }

    fn bind(&mut self, doc: Option<DocRef>) {
        self.doc = doc;
        if self.open.is_some_and(|i| i >= self.row_count()) {
            self.open = None;
        }
    }

    fn refresh(&mut self, status: DisplayStatus) {
        self.status = status;
    }

    fn status(&self) -> DisplayStatus {
        self.status
    }

    fn get_value(&self) -> Value {
        Value::Array(self.rows())
    }

    fn set_input(&mut self, _value: Value) {}

    fn grid(&self) -> Option<&dyn Grid> {
        Some(self)
    }

    fn grid_mut(&mut self) -> Option<&mut dyn Grid> {
        Some(self)
    }
}

impl Grid for TableControl {
    fn row_count(&self) -> usize {
        self.rows().len()
    }

    fn add_new_row(&mut self) {
        let Some(doc) = &self.doc else { return };
        let child = self.child_doctype().to_string();
        let mut doc = doc.borrow_mut();
        let mut rows = match doc.get(&self.df.fieldname) {
            Some(Value::Array(rows)) => rows.clone(),
            _ => Vec::new(),
        };

        let mut row = Map::new();
        row.insert("doctype".into(), Value::String(child.clone()));
        row.insert("name".into(), Value::String(new_doc_name(&child)));
        row.insert("parent".into(), Value::String(doc.name().to_string()));
        row.insert("parenttype".into(), Value::String(doc.doctype().to_string()));
        row.insert("parentfield".into(), Value::String(self.df.fieldname.clone()));
        row.insert("idx".into(), Value::from(rows.len() + 1));
        row.insert("docstatus".into(), Value::from(0));
        row.insert("__islocal".into(), Value::from(1));
        rows.push(Value::Object(row));

        doc.set(&self.df.fieldname, Value::Array(rows));
    }

    fn open_row(&self) -> Option<usize> {
        self.open
    }

    fn show_row(&mut self, idx: usize) {
        self.open = Some(idx);
    }

    fn close_row(&mut self) {
        self.open = None;
    }

    fn row_tab_stops(&self, idx: usize) -> Vec<TabStop> {
        let parent = self
            .doc
            .as_ref()
            .map(|d| d.borrow().name().to_string())
            .unwrap_or_default();
        if idx >= self.row_count() {
            return Vec::new();
        }
        self.meta
            .sort_docfields(self.child_doctype())
            .into_iter()
            .map(|base| {
                let df = self
                    .meta
                    .get_row_docfield(self.child_doctype(), &base.fieldname, &parent)
                    .unwrap_or(base);
                TabStop {
                    visible: !df.hidden && !df.read_only && !df.fieldtype.is_structural(),
                    fieldname: df.fieldname,
                    fieldtype: df.fieldtype,
                }
            })
            .collect()
    }
}

// ============================================================================
// Test doubles
// ============================================================================


#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::document::Document;
    use serde_json::json;
    use std::cell::RefCell;

    fn spec(df: DocField, doc: Option<DocRef>) -> ControlSpec {
        ControlSpec {
            df,
            doctype: "Invoice".into(),
            parent: ControlParent {
                section: SectionId(0),
                column: ColumnId(0),
            },
            doc,
            render_input: true,
        }
    }

    #[test]
    fn test_input_control_reads_bound_document() {
        let doc = Rc::new(RefCell::new(Document::new("Invoice", "INV-1")));
        doc.borrow_mut().set("po_no", json!("PO-7"));
        let mut control = InputControl::new(spec(DocField::new("po_no", FieldType::Data), Some(doc)));
        assert_eq!(control.get_value(), json!("PO-7"));
        control.bind(None);
        control.set_input(json!("local"));
        assert_eq!(control.get_value(), json!("local"));
    }

    #[test]
    fn test_table_control_adds_rows() {
        let meta = MetaStore::new();
        meta.insert(contracts::shared::metadata::DocTypeMeta::new(
            "Invoice Item",
            vec![DocField::new("item_code", FieldType::Link)],
        ));
        let doc = Rc::new(RefCell::new(Document::new("Invoice", "INV-1")));
        let df = DocField::new("items", FieldType::Table).with_options("Invoice Item");
        let mut table = TableControl::new(spec(df, Some(doc.clone())), meta);

        assert_eq!(table.row_count(), 0);
        table.add_new_row();
        assert_eq!(table.row_count(), 1);
        let rows = doc.borrow().rows("items");
        assert_eq!(rows[0].parent(), Some("INV-1"));
        assert_eq!(rows[0].parentfield(), Some("items"));

        table.show_row(0);
        assert_eq!(table.open_row(), Some(0));
        let stops = table.row_tab_stops(0);
        assert_eq!(stops.len(), 1);
        assert!(stops[0].visible);
    }

    #[test]
    fn test_registry_picks_table_control() {
        let registry = ControlRegistry::new(MetaStore::new());
        let control = registry.make_control(spec(DocField::new("items", FieldType::Table), None));
        assert!(control.grid().is_some());
        let control = registry.make_control(spec(DocField::new("qty", FieldType::Int), None));
        assert!(control.grid().is_none());
    }
}
