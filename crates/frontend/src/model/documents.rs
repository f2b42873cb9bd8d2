//! Local document cache (`locals`)

use contracts::shared::document::{new_doc_name, Document};
use contracts::shared::metadata::DocTypeMeta;
use serde_json::{Map, Value};
use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;

/// Documents are shared between the cache, layouts and controls.
pub type DocRef = Rc<RefCell<Document>>;

#[derive(Clone, Default)]
pub struct DocumentStore {
    locals: Rc<RefCell<HashMap<String, BTreeMap<String, DocRef>>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, doc: Document) -> DocRef {
        let doctype = doc.doctype().to_string();
        let name = doc.name().to_string();
        let doc = Rc::new(RefCell::new(doc));
        self.locals
            .borrow_mut()
            .entry(doctype)
            .or_default()
            .insert(name, doc.clone());
        doc
    }

    pub fn get(&self, doctype: &str, name: &str) -> Option<DocRef> {
        self.locals.borrow().get(doctype)?.get(name).cloned()
    }

    pub fn list(&self, doctype: &str) -> Vec<DocRef> {
        self.locals
            .borrow()
            .get(doctype)
            .map(|docs| docs.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Parent document of a child-table row.
    pub fn parent_of(&self, row: &Document) -> Option<DocRef> {
        self.get(row.parenttype()?, row.parent()?)
    }

    /// Create an unsaved document, seeding docfield defaults and then
    /// `values` (route options) on top.
    pub fn new_doc(&self, meta: &DocTypeMeta, values: &Map<String, Value>) -> DocRef {
        let mut doc = Document::new(&meta.name, &new_doc_name(&meta.name));
        doc.set("__islocal", Value::from(1));
        doc.set("docstatus", Value::from(0));
        for df in &meta.fields {
            if df.fieldtype.is_no_value() || df.fieldname.is_empty() {
                continue;
            }
            if let Some(default) = &df.default {
                doc.set(&df.fieldname, default.clone());
            }
        }
        for (key, value) in values {
            doc.set(key, value.clone());
        }
        self.insert(doc)
    }

    /// Move a document to a new name, updating child rows' `parent`.
    pub fn rename(&self, doctype: &str, old: &str, new: &str) -> Option<DocRef> {
        let mut locals = self.locals.borrow_mut();
        let docs = locals.get_mut(doctype)?;
        let doc = docs.remove(old)?;
        {
            let mut d = doc.borrow_mut();
            d.set("name", Value::String(new.to_string()));
            rename_row_parents(&mut d, new);
        }
        log::debug!("renamed {} {} -> {}", doctype, old, new);
        docs.insert(new.to_string(), doc.clone());
        Some(doc)
    }
}

fn rename_row_parents(doc: &mut Document, new_parent: &str) {
    let table_fields: Vec<String> = doc
        .fields()
        .iter()
        .filter(|(_, v)| v.is_array())
        .map(|(k, _)| k.clone())
        .collect();
    for field in table_fields {
        if let Some(Value::Array(mut rows)) = doc.remove(&field) {
            for row in rows.iter_mut() {
                if let Some(obj) = row.as_object_mut() {
                    if obj.contains_key("parent") {
                        obj.insert("parent".into(), Value::String(new_parent.to_string()));
                    }
                }
            }
            doc.set(&field, Value::Array(rows));
        }
    }
}
