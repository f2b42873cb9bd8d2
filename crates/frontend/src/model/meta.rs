//! Doctype metadata cache with per-document and per-column overrides
//!
//! Property changes driven by dependency expressions never touch the shared
//! doctype definition. A top-level document gets its own copy of the
//! docfield; rows of a child table share one copy per (child doctype,
//! parent document) so the change applies to the whole column.

use contracts::shared::metadata::{DocField, DocFieldProperty, DocTypeMeta};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

type FieldOverrides = HashMap<String, DocField>;

#[derive(Default)]
struct MetaInner {
    doctypes: HashMap<String, DocTypeMeta>,
    /// (doctype, docname) -> fieldname -> docfield copy
    doc_overrides: HashMap<(String, String), FieldOverrides>,
    /// (child doctype, parent docname) -> fieldname -> docfield copy
    column_overrides: HashMap<(String, String), FieldOverrides>,
}

#[derive(Clone, Default)]
pub struct MetaStore {
    inner: Rc<RefCell<MetaInner>>,
}

impl MetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, meta: DocTypeMeta) {
        log::debug!("meta loaded: {}", meta.name);
        self.inner
            .borrow_mut()
            .doctypes
            .insert(meta.name.clone(), meta);
    }

    pub fn has(&self, doctype: &str) -> bool {
        self.inner.borrow().doctypes.contains_key(doctype)
    }

    pub fn get(&self, doctype: &str) -> Option<DocTypeMeta> {
        self.inner.borrow().doctypes.get(doctype).cloned()
    }

    pub fn sort_docfields(&self, doctype: &str) -> Vec<DocField> {
        self.inner
            .borrow()
            .doctypes
            .get(doctype)
            .map(DocTypeMeta::sort_docfields)
            .unwrap_or_default()
    }

    fn base_docfield(inner: &MetaInner, doctype: &str, fieldname: &str) -> Option<DocField> {
        inner.doctypes.get(doctype)?.get_field(fieldname).cloned()
    }

    /// Docfield as seen by one top-level document.
    pub fn get_docfield(
        &self,
        doctype: &str,
        fieldname: &str,
        docname: Option<&str>,
    ) -> Option<DocField> {
        let inner = self.inner.borrow();
        if let Some(docname) = docname {
            let key = (doctype.to_string(), docname.to_string());
            if let Some(df) = inner.doc_overrides.get(&key).and_then(|o| o.get(fieldname)) {
                return Some(df.clone());
            }
        }
        Self::base_docfield(&inner, doctype, fieldname)
    }

    /// Docfield as seen by every row of a child table under `parent`.
    pub fn get_row_docfield(
        &self,
        child_doctype: &str,
        fieldname: &str,
        parent: &str,
    ) -> Option<DocField> {
        let inner = self.inner.borrow();
        let key = (child_doctype.to_string(), parent.to_string());
        if let Some(df) = inner
            .column_overrides
            .get(&key)
            .and_then(|o| o.get(fieldname))
        {
            return Some(df.clone());
        }
        Self::base_docfield(&inner, child_doctype, fieldname)
    }

    fn set_override(
        overrides: &mut HashMap<(String, String), FieldOverrides>,
        base: Option<DocField>,
        key: (String, String),
        fieldname: &str,
        property: DocFieldProperty,
        value: bool,
    ) -> bool {
        let fields = overrides.entry(key).or_default();
        if !fields.contains_key(fieldname) {
            let Some(base) = base else { return false };
            fields.insert(fieldname.to_string(), base);
        }
        if let Some(df) = fields.get_mut(fieldname) {
            df.set_property(property, value);
        }
        true
    }

    /// Set a property on one document's copy of a docfield.
    pub fn set_df_property(
        &self,
        doctype: &str,
        docname: &str,
        fieldname: &str,
        property: DocFieldProperty,
        value: bool,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let base = Self::base_docfield(&inner, doctype, fieldname);
        Self::set_override(
            &mut inner.doc_overrides,
            base,
            (doctype.to_string(), docname.to_string()),
            fieldname,
            property,
            value,
        )
    }

    /// Set a property for a whole child-table column under `parent`.
    pub fn set_column_property(
        &self,
        child_doctype: &str,
        parent: &str,
        fieldname: &str,
        property: DocFieldProperty,
        value: bool,
    ) -> bool {
        let mut inner = self.inner.borrow_mut();
        let base = Self::base_docfield(&inner, child_doctype, fieldname);
        Self::set_override(
            &mut inner.column_overrides,
            base,
            (child_doctype.to_string(), parent.to_string()),
            fieldname,
            property,
            value,
        )
    }

    /// Carry overrides over when a document is renamed.
    pub fn rename_doc(&self, doctype: &str, old: &str, new: &str) {
        let mut inner = self.inner.borrow_mut();
        if let Some(o) = inner
            .doc_overrides
            .remove(&(doctype.to_string(), old.to_string()))
        {
            inner
                .doc_overrides
                .insert((doctype.to_string(), new.to_string()), o);
        }
        let moved: Vec<_> = inner
            .column_overrides
            .keys()
            .filter(|(_, parent)| parent == old)
            .cloned()
            .collect();
        for key in moved {
            if let Some(o) = inner.column_overrides.remove(&key) {
                inner.column_overrides.insert((key.0, new.to_string()), o);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::metadata::FieldType;

    fn store() -> MetaStore {
        let store = MetaStore::new();
        store.insert(DocTypeMeta::new(
            "Invoice",
            vec![DocField::new("po_no", FieldType::Data)],
        ));
        let mut child = DocTypeMeta::new(
            "Invoice Item",
            vec![DocField::new("batch_no", FieldType::Data)],
        );
        child.istable = true;
        store.insert(child);
        store
    }

    #[test]
    fn test_document_override_is_private_to_the_document() {
        let meta = store();
        assert!(meta.set_df_property("Invoice", "INV-1", "po_no", DocFieldProperty::Reqd, true));
        assert!(meta.get_docfield("Invoice", "po_no", Some("INV-1")).unwrap().reqd);
        assert!(!meta.get_docfield("Invoice", "po_no", Some("INV-2")).unwrap().reqd);
        assert!(!meta.get_docfield("Invoice", "po_no", None).unwrap().reqd);
    }

    #[test]
    fn test_column_override_applies_to_every_row_of_the_parent() {
        let meta = store();
        meta.set_column_property("Invoice Item", "INV-1", "batch_no", DocFieldProperty::ReadOnly, true);
        assert!(meta.get_row_docfield("Invoice Item", "batch_no", "INV-1").unwrap().read_only);
        assert!(!meta.get_row_docfield("Invoice Item", "batch_no", "INV-2").unwrap().read_only);
        assert!(!meta.get_docfield("Invoice Item", "batch_no", None).unwrap().read_only);
    }

    #[test]
    fn test_unknown_field_is_not_overridden() {
        let meta = store();
        assert!(!meta.set_df_property("Invoice", "INV-1", "nope", DocFieldProperty::Hidden, true));
    }

    #[test]
    fn test_rename_carries_overrides() {
        let meta = store();
        meta.set_df_property("Invoice", "new-1", "po_no", DocFieldProperty::Reqd, true);
        meta.set_column_property("Invoice Item", "new-1", "batch_no", DocFieldProperty::Reqd, true);
        meta.rename_doc("Invoice", "new-1", "INV-9");
        assert!(meta.get_docfield("Invoice", "po_no", Some("INV-9")).unwrap().reqd);
        assert!(meta.get_row_docfield("Invoice Item", "batch_no", "INV-9").unwrap().reqd);
    }
}
