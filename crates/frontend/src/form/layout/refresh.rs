use super::{Layout, LayoutError, NodeRef, SectionId, NEW_NAME_FIELD};
use crate::form::depends::{evaluate_depends_on_value, DependsContext, DependsError, ScriptHook};
use crate::model::scripts::DocScripts;
use crate::model::DocRef;
use crate::shared::value::is_truthy;
use contracts::shared::metadata::{DependsOn, DocField, DocFieldProperty};
use serde_json::{Map, Value};

/// Where a dependency-driven property change is written.
#[derive(Debug, Clone, PartialEq, Eq)]
enum PropertyScope {
    /// Field group without a document: the descriptor itself.
    Local,
    /// This document's private copy of the docfield.
    Document { doctype: String, docname: String },
    /// Every row of the child table under `parent`.
    Column { child_doctype: String, parent: String },
}

/// Inputs shared by every evaluation within one pass.
struct EvalInputs {
    doc: Value,
    parent: Option<Value>,
    scripts: Option<DocScripts>,
}

impl EvalInputs {
    fn evaluate(&self, expression: &DependsOn) -> Result<Option<bool>, DependsError> {
        let cx = DependsContext::new(&self.doc)
            .with_parent(self.parent.as_ref())
            .with_scripts(self.scripts.as_ref().map(|s| s as &dyn ScriptHook));
        evaluate_depends_on_value(expression, &cx)
    }
}

fn active_expr(expr: &Option<DependsOn>) -> Option<DependsOn> {
    expr.as_ref().filter(|e| !e.is_blank()).cloned()
}

impl Layout {
    /// Re-derive every visibility flag for the bound document, optionally
    /// binding a new one first.
    pub fn refresh(&mut self, doc: Option<DocRef>) -> Result<(), LayoutError> {
        self.refresh_with(doc, true)
    }

    /// Like [`Layout::refresh`]; `rebind = false` skips re-attaching the
    /// document and docfields to every control.
    pub fn refresh_with(&mut self, doc: Option<DocRef>, rebind: bool) -> Result<(), LayoutError> {
        if !self.built {
            self.make();
        }
        if doc.is_some() {
            self.doc = doc;
        }
        if rebind {
            self.attach_doc_and_docfields();
        }
        self.refresh_dependency()?;
        self.refresh_sections();
        self.refresh_section_collapse()?;
        self.reselect_focused();
        Ok(())
    }

    fn docstatus(&self) -> i64 {
        self.doc
            .as_ref()
            .map(|d| d.borrow().docstatus())
            .unwrap_or(0)
    }

    /// Fresh docfield for `fieldname` as the bound document sees it.
    fn lookup_docfield(&self, fieldname: &str) -> Option<DocField> {
        if !self.from_meta {
            return None;
        }
        let doc = self.doc.as_ref()?.borrow();
        match (doc.is_child_row(), doc.parent()) {
            (true, Some(parent)) => self
                .meta
                .get_row_docfield(doc.doctype(), fieldname, parent),
            _ => self
                .meta
                .get_docfield(&self.doctype, fieldname, Some(doc.name())),
        }
    }

    fn attach_doc_and_docfields(&mut self) {
        let docstatus = self.docstatus();
        let prompts_for_name = self.doc.as_ref().is_some_and(|d| d.borrow().is_new())
            && self
                .meta
                .get(&self.doctype)
                .is_some_and(|m| m.prompts_for_name());

        for i in 0..self.field_objs.len() {
            let fieldname = self.field_objs[i].fieldname().to_string();
            if let Some(df) = self.lookup_docfield(&fieldname) {
                self.field_objs[i].control.set_df(df);
            }
            if fieldname == NEW_NAME_FIELD {
                let mut df = self.field_objs[i].df().clone();
                df.hidden = !prompts_for_name;
                self.field_objs[i].control.set_df(df);
            }
            let doc = self.doc.clone();
            let field = &mut self.field_objs[i];
            field.control.bind(doc);
            field.refresh(docstatus);
        }

        for i in 0..self.sections.len() {
            let fieldname = self.sections[i].df.fieldname.clone();
            if let Some(df) = self.lookup_docfield(&fieldname) {
                self.sections[i].df = df;
            }
            self.sections[i].refresh();
        }
        for i in 0..self.columns.len() {
            let fieldname = self.columns[i].df.fieldname.clone();
            if let Some(df) = self.lookup_docfield(&fieldname) {
                self.columns[i].df = df;
            }
            self.columns[i].refresh();
        }
        for i in 0..self.tabs.len() {
            let fieldname = self.tabs[i].df.fieldname.clone();
            if let Some(df) = self.lookup_docfield(&fieldname) {
                self.tabs[i].df = df;
            }
        }
    }

    /// Values of a document-less layout, keyed by fieldname.
    pub(crate) fn values_snapshot(&self) -> Map<String, Value> {
        self.field_objs
            .iter()
            .filter(|f| !f.fieldname().is_empty() && !f.df().fieldtype.is_no_value())
            .map(|f| (f.fieldname().to_string(), f.get_value()))
            .collect()
    }

    fn eval_inputs(&self) -> EvalInputs {
        let doc = match &self.doc {
            Some(doc) => doc.borrow().to_value(),
            None => Value::Object(self.values_snapshot()),
        };
        let parent = self.parent_doc.as_ref().map(|p| p.borrow().to_value());
        let scripts = match (&self.scripts, &self.doc) {
            (Some(scripts), Some(doc)) => {
                let doc = doc.borrow();
                Some(scripts.for_doc(doc.doctype(), doc.name()))
            }
            _ => None,
        };
        EvalInputs {
            doc,
            parent,
            scripts,
        }
    }

    // ------------------------------------------------------------------
    // Per-node accessors over the four arenas
    // ------------------------------------------------------------------

    fn node_df(&self, node: NodeRef) -> &DocField {
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].df(),
            NodeRef::Section(id) => &self.sections[id.0].df,
            NodeRef::Column(id) => &self.columns[id.0].df,
            NodeRef::Tab(id) => &self.tabs[id.0].df,
        }
    }

    fn guardian(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].guardian_has_value,
            NodeRef::Section(id) => self.sections[id.0].guardian_has_value,
            NodeRef::Column(id) => self.columns[id.0].guardian_has_value,
            NodeRef::Tab(id) => self.tabs[id.0].guardian_has_value,
        }
    }

    fn set_guardian(&mut self, node: NodeRef, value: bool) {
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].guardian_has_value = value,
            NodeRef::Section(id) => self.sections[id.0].guardian_has_value = value,
            NodeRef::Column(id) => self.columns[id.0].guardian_has_value = value,
            NodeRef::Tab(id) => self.tabs[id.0].guardian_has_value = value,
        }
    }

    fn hidden_by_dependency(&self, node: NodeRef) -> bool {
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].hidden_due_to_dependency,
            NodeRef::Section(id) => self.sections[id.0].hidden_due_to_dependency,
            NodeRef::Column(id) => self.columns[id.0].hidden_due_to_dependency,
            NodeRef::Tab(id) => self.tabs[id.0].hidden_due_to_dependency,
        }
    }

    fn set_hidden_by_dependency(&mut self, node: NodeRef, hidden: bool) {
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].hidden_due_to_dependency = hidden,
            NodeRef::Section(id) => self.sections[id.0].hidden_due_to_dependency = hidden,
            NodeRef::Column(id) => self.columns[id.0].hidden_due_to_dependency = hidden,
            NodeRef::Tab(id) => self.tabs[id.0].hidden_due_to_dependency = hidden,
        }
    }

    fn refresh_node(&mut self, node: NodeRef) {
        let docstatus = self.docstatus();
        match node {
            NodeRef::Field(id) => self.field_objs[id.0].refresh(docstatus),
            NodeRef::Section(id) => self.sections[id.0].refresh(),
            NodeRef::Column(id) => self.columns[id.0].refresh(),
            NodeRef::Tab(id) => self.tabs[id.0].refresh(),
        }
    }

    // ------------------------------------------------------------------
    // Dependencies
    // ------------------------------------------------------------------

    /// Walk the tree back to front, re-evaluating every dependency.
    ///
    /// A node is repainted only when its dependency result flips, so each
    /// hide/show edge causes exactly one refresh. Script-backed results that
    /// are still pending keep the last known value.
    pub fn refresh_dependency(&mut self) -> Result<(), LayoutError> {
        // A node hidden by an earlier pass must be re-shown even when its
        // expression has since been removed.
        let has_dependency = self.fields_list.iter().any(|node| {
            self.node_df(*node).has_dependency() || self.hidden_by_dependency(*node)
        });
        if !has_dependency {
            return Ok(());
        }

        let inputs = self.eval_inputs();
        let nodes = self.fields_list.clone();
        for node in nodes.into_iter().rev() {
            let (depends_on, mandatory, read_only) = {
                let df = self.node_df(node);
                (
                    active_expr(&df.depends_on),
                    active_expr(&df.mandatory_depends_on),
                    active_expr(&df.read_only_depends_on),
                )
            };

            let previous = self.guardian(node);
            let guardian = match &depends_on {
                Some(expr) => inputs.evaluate(expr)?.unwrap_or(previous),
                None => true,
            };
            self.set_guardian(node, guardian);

            let hidden = self.hidden_by_dependency(node);
            if guardian == hidden {
                self.set_hidden_by_dependency(node, !guardian);
                self.refresh_node(node);
            }

            if let Some(expr) = mandatory {
                self.set_dependant_property(&inputs, &expr, node, DocFieldProperty::Reqd)?;
            }
            if let Some(expr) = read_only {
                self.set_dependant_property(&inputs, &expr, node, DocFieldProperty::ReadOnly)?;
            }
        }
        Ok(())
    }

    fn property_scope(&self) -> PropertyScope {
        let Some(doc) = self.doc.as_ref().filter(|_| self.from_meta) else {
            return PropertyScope::Local;
        };
        let doc = doc.borrow();
        match (doc.is_child_row(), doc.parent()) {
            (true, Some(parent)) => PropertyScope::Column {
                child_doctype: doc.doctype().to_string(),
                parent: parent.to_string(),
            },
            _ => PropertyScope::Document {
                doctype: self.doctype.clone(),
                docname: doc.name().to_string(),
            },
        }
    }

    fn set_dependant_property(
        &mut self,
        inputs: &EvalInputs,
        expr: &DependsOn,
        node: NodeRef,
        property: DocFieldProperty,
    ) -> Result<(), LayoutError> {
        let Some(value) = inputs.evaluate(expr)? else {
            return Ok(());
        };
        let NodeRef::Field(id) = node else {
            return Ok(());
        };
        if self.field_objs[id.0].df().property(property) == value {
            return Ok(());
        }

        let fieldname = self.field_objs[id.0].fieldname().to_string();
        match self.property_scope() {
            PropertyScope::Local => {}
            PropertyScope::Document { doctype, docname } => {
                self.meta
                    .set_df_property(&doctype, &docname, &fieldname, property, value);
            }
            PropertyScope::Column {
                child_doctype,
                parent,
            } => {
                self.meta
                    .set_column_property(&child_doctype, &parent, &fieldname, property, value);
            }
        }
        let mut df = self.field_objs[id.0].df().clone();
        df.set_property(property, value);
        self.field_objs[id.0].control.set_df(df);
        self.refresh_node(node);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Sections and tabs
    // ------------------------------------------------------------------

    pub fn refresh_sections(&mut self) {
        for i in 0..self.sections.len() {
            let empty = !self.sections[i]
                .fields
                .iter()
                .any(|id| self.field_objs[id.0].is_visible());
            self.sections[i].is_empty = empty;
        }
        if self.is_tabbed() {
            self.refresh_tabs();
        }
    }

    fn refresh_tabs(&mut self) {
        for i in 0..self.tabs.len() {
            if self.tabs[i].is_hidden_by_df() {
                self.tabs[i].toggle(false);
                continue;
            }
            let shown = self.tabs[i]
                .sections
                .iter()
                .any(|id| self.sections[id.0].is_shown());
            self.tabs[i].toggle(shown);
        }

        let visible: Vec<usize> = (0..self.tabs.len())
            .filter(|i| !self.tabs[*i].is_hidden)
            .collect();
        if let [only] = visible.as_slice() {
            let tab = &mut self.tabs[*only];
            tab.set_active(true);
            tab.link_hidden = true;
        }
        self.set_tab_as_active(&visible);
    }

    fn set_tab_as_active(&mut self, visible: &[usize]) {
        let Some(&first) = visible.first() else {
            return;
        };
        let chosen = visible
            .iter()
            .copied()
            .find(|i| self.tabs[*i].active)
            .or_else(|| {
                let remembered = self
                    .tab_memory_key
                    .as_ref()
                    .and_then(|key| self.storage.get(key))?;
                visible
                    .iter()
                    .copied()
                    .find(|i| self.tabs[*i].fieldname() == remembered)
            })
            .unwrap_or(first);
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.set_active(i == chosen);
        }
    }

    fn has_missing_mandatory(&self, section: SectionId) -> bool {
        self.sections[section.0].fields.iter().any(|id| {
            let field = &self.field_objs[id.0];
            field.df().reqd && !is_truthy(&field.get_value())
        })
    }

    /// Apply `collapsible_depends_on`; sections holding an empty required
    /// field are always expanded.
    pub fn refresh_section_collapse(&mut self) -> Result<(), LayoutError> {
        if !self.sections.iter().any(|s| s.df.collapsible) {
            return Ok(());
        }
        let inputs = self.eval_inputs();
        for i in 0..self.sections.len() {
            if !self.sections[i].df.collapsible {
                continue;
            }
            let mut collapse = self.sections[i].is_collapsed;
            if let Some(expr) = active_expr(&self.sections[i].df.collapsible_depends_on) {
                if let Some(value) = inputs.evaluate(&expr)? {
                    collapse = value;
                }
            }
            if collapse && self.has_missing_mandatory(SectionId(i)) {
                collapse = false;
            }
            if collapse != self.sections[i].is_collapsed {
                self.sections[i].collapse(collapse, self.storage.as_ref());
            }
        }
        Ok(())
    }

    fn reselect_focused(&mut self) {
        let Some(id) = self.focused.as_deref().and_then(|f| self.field_id(f)) else {
            return;
        };
        let field = &mut self.field_objs[id.0];
        if field.df().fieldtype.is_numeric() && field.is_visible() {
            field.control.select_text();
        }
    }

    // ------------------------------------------------------------------
    // Values
    // ------------------------------------------------------------------

    /// Re-apply descriptors to already-built fields and repaint them.
    pub fn refresh_fields(&mut self, fields: &[DocField]) {
        let docstatus = self.docstatus();
        for df in fields {
            let Some(id) = self.field_id(&df.fieldname) else {
                continue;
            };
            let field = &mut self.field_objs[id.0];
            field.control.set_df(df.clone());
            field.refresh(docstatus);
        }
        self.refresh_sections();
    }

    /// Write a value to the document (or the control when unbound) and
    /// re-derive the layout.
    pub fn set_value(&mut self, fieldname: &str, value: Value) -> Result<(), LayoutError> {
        let Some(id) = self.field_id(fieldname) else {
            return Ok(());
        };
        if let Some(doc) = &self.doc {
            let mut doc = doc.borrow_mut();
            doc.set(fieldname, value.clone());
            if let Some(scripts) = &self.scripts {
                scripts.invalidate(doc.doctype(), doc.name());
            }
        }
        self.field_objs[id.0].control.set_input(value);
        self.refresh(None)
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{data, marker, recording_layout};
    use super::super::LayoutOptions;
    use super::*;
    use crate::form::control::testing::FakeGrid;
    use crate::form::control::DisplayStatus;
    use crate::model::{DocumentStore, MetaStore, ScriptManager};
    use crate::shared::storage::{KeyValueStore, MemoryStorage};
    use contracts::shared::document::Document;
    use contracts::shared::metadata::{DocTypeMeta, FieldType};
    use serde_json::json;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn doc_layout(meta: &MetaStore, doc: DocRef) -> Layout {
        let doctype = doc.borrow().doctype().to_string();
        Layout::new(LayoutOptions::new(doctype, meta.clone()).with_doc(Some(doc)))
    }

    #[test]
    fn test_dependency_flip_repaints_exactly_once() {
        let (mut layout, log) = recording_layout(
            vec![data("qty"), data("rate").with_depends_on("eval:doc.qty > 0")],
            FakeGrid::default(),
        );
        layout.refresh(None).unwrap();
        assert_eq!(layout.get_field("rate").unwrap().status(), DisplayStatus::None);

        let count = |log: &Rc<RefCell<Vec<(String, DisplayStatus)>>>| {
            log.borrow().iter().filter(|(f, _)| f == "rate").count()
        };

        log.borrow_mut().clear();
        layout.set_value("qty", json!(5)).unwrap();
        assert!(layout.get_field("rate").unwrap().is_visible());
        // One repaint from rebinding, one from the dependency edge.
        assert_eq!(count(&log), 2);

        log.borrow_mut().clear();
        layout.refresh_dependency().unwrap();
        assert_eq!(count(&log), 0);

        layout.get_field_mut("qty").unwrap().control.set_input(json!(0));
        layout.refresh_dependency().unwrap();
        assert_eq!(count(&log), 1);
        assert!(!layout.get_field("rate").unwrap().is_visible());
    }

    #[test]
    fn test_no_dependencies_skips_walk() {
        let (mut layout, log) = recording_layout(vec![data("a"), data("b")], FakeGrid::default());
        layout.make();
        layout.refresh_dependency().unwrap();
        assert!(log.borrow().is_empty());
    }

    #[test]
    fn test_invalid_expression_aborts_refresh() {
        let (mut layout, _) = recording_layout(
            vec![data("a").with_depends_on("eval:doc.a >")],
            FakeGrid::default(),
        );
        let err = layout.refresh(None).unwrap_err();
        assert!(matches!(err, LayoutError::Depends(_)));
        assert!(err.to_string().starts_with("Invalid depends_on expression"));
    }

    #[test]
    fn test_section_empty_only_when_every_field_hidden() {
        let (mut layout, _) = recording_layout(
            vec![
                marker("s1", FieldType::SectionBreak),
                data("only").with_depends_on("eval:0"),
                marker("s2", FieldType::SectionBreak),
                data("hidden").with_depends_on("eval:false"),
                data("shown"),
            ],
            FakeGrid::default(),
        );
        layout.refresh(None).unwrap();
        assert!(layout.section_by_name("s1").unwrap().is_empty);
        assert!(!layout.section_by_name("s2").unwrap().is_empty);
    }

    #[test]
    fn test_single_visible_tab_is_forced_active() {
        let (mut layout, _) = recording_layout(
            vec![
                marker("t1", FieldType::TabBreak),
                data("a").with_depends_on("eval:false"),
                marker("t2", FieldType::TabBreak),
                data("b"),
                marker("t3", FieldType::TabBreak),
                data("c").with_depends_on("flag"),
            ],
            FakeGrid::default(),
        );
        layout.make();
        // Details tab was synthesized in front; hide it by descriptor.
        layout.tabs[0].df.hidden = true;
        layout.refresh(None).unwrap();

        let shown: Vec<_> = layout.tabs().iter().filter(|t| !t.is_hidden).collect();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].fieldname(), "t2");
        assert!(shown[0].active);
        assert!(shown[0].link_hidden);
    }

    #[test]
    fn test_remembered_tab_wins_over_first_visible() {
        let storage = MemoryStorage::new();
        storage.set("Form/Task/T-1", "t2");
        let meta = MetaStore::new();
        meta.insert(DocTypeMeta::new(
            "Task",
            vec![
                marker("t1", FieldType::TabBreak),
                data("a"),
                marker("t2", FieldType::TabBreak),
                data("b"),
            ],
        ));
        let doc = Rc::new(RefCell::new(Document::new("Task", "T-1")));
        let mut layout = Layout::new(
            LayoutOptions::new("Task", meta)
                .with_doc(Some(doc))
                .with_storage(Rc::new(storage.clone()))
                .with_tab_memory_key(Some("Form/Task/T-1".into())),
        );
        layout.refresh(None).unwrap();
        assert_eq!(layout.active_tab().unwrap().fieldname(), "t2");

        assert!(layout.select_tab("t1"));
        assert_eq!(storage.get("Form/Task/T-1").as_deref(), Some("t1"));
        layout.refresh(None).unwrap();
        assert_eq!(layout.active_tab().unwrap().fieldname(), "t1");
    }

    #[test]
    fn test_mandatory_field_keeps_section_expanded() {
        let mut section = marker("more", FieldType::SectionBreak);
        section.collapsible = true;
        section.collapsible_depends_on = Some("eval:1".into());
        let (mut layout, _) = recording_layout(
            vec![section, data("po_no").required(), data("note")],
            FakeGrid::default(),
        );
        layout.refresh(None).unwrap();
        assert!(!layout.section_by_name("more").unwrap().is_collapsed);

        layout.set_value("po_no", json!("PO-1")).unwrap();
        assert!(layout.section_by_name("more").unwrap().is_collapsed);
    }

    #[test]
    fn test_collapsible_condition_false_expands() {
        let mut section = marker("more", FieldType::SectionBreak);
        section.collapsible = true;
        section.collapsible_depends_on = Some("eval:doc.note".into());
        let (mut layout, _) = recording_layout(vec![section, data("note")], FakeGrid::default());
        layout.refresh(None).unwrap();
        assert!(!layout.section_by_name("more").unwrap().is_collapsed);
        layout.set_value("note", json!("x")).unwrap();
        assert!(layout.section_by_name("more").unwrap().is_collapsed);
    }

    #[test]
    fn test_mandatory_depends_on_writes_document_copy() {
        let meta = MetaStore::new();
        let mut po = data("po_no");
        po.mandatory_depends_on = Some("eval:doc.grand_total > 1000".into());
        meta.insert(DocTypeMeta::new("Invoice", vec![data("grand_total"), po]));
        let docs = DocumentStore::new();
        let doc = docs.insert(
            Document::from_value(json!({"doctype": "Invoice", "name": "INV-1", "grand_total": 5000}))
                .unwrap(),
        );

        let mut layout = doc_layout(&meta, doc);
        layout.refresh(None).unwrap();
        assert!(layout.get_field("po_no").unwrap().df().reqd);
        assert!(meta.get_docfield("Invoice", "po_no", Some("INV-1")).unwrap().reqd);
        assert!(!meta.get_docfield("Invoice", "po_no", Some("INV-2")).unwrap().reqd);
        assert!(!meta.get_docfield("Invoice", "po_no", None).unwrap().reqd);
    }

    #[test]
    fn test_read_only_depends_on_in_child_row_applies_to_column() {
        let meta = MetaStore::new();
        let mut batch = data("batch_no");
        batch.read_only_depends_on = Some("eval:doc.qty > 10".into());
        let mut child = DocTypeMeta::new("Invoice Item", vec![data("qty"), batch]);
        child.istable = true;
        meta.insert(child);

        let row = Rc::new(RefCell::new(
            Document::from_value(json!({
                "doctype": "Invoice Item", "name": "row-1", "qty": 20,
                "parent": "INV-1", "parenttype": "Invoice", "parentfield": "items"
            }))
            .unwrap(),
        ));
        let mut layout = doc_layout(&meta, row);
        layout.refresh(None).unwrap();

        assert!(layout.get_field("batch_no").unwrap().df().read_only);
        assert!(meta.get_row_docfield("Invoice Item", "batch_no", "INV-1").unwrap().read_only);
        assert!(!meta.get_row_docfield("Invoice Item", "batch_no", "INV-2").unwrap().read_only);
        assert!(meta.get_docfield("Invoice Item", "batch_no", Some("row-1")).is_some_and(|df| !df.read_only));
    }

    #[test]
    fn test_pending_script_keeps_last_visibility() {
        let meta = MetaStore::new();
        meta.insert(DocTypeMeta::new(
            "Task",
            vec![data("notes").with_depends_on("fn:show_notes")],
        ));
        let scripts = ScriptManager::new();
        let doc = Rc::new(RefCell::new(Document::new("Task", "T-1")));
        let mut layout = Layout::new(
            LayoutOptions::new("Task", meta)
                .with_doc(Some(doc))
                .with_scripts(Some(scripts.clone())),
        );
        layout.refresh(None).unwrap();
        assert!(layout.get_field("notes").unwrap().is_visible());

        let pending = scripts.take_pending();
        assert_eq!(pending.len(), 1);
        scripts.resolve(&pending[0], json!(false));
        layout.refresh(None).unwrap();
        assert!(!layout.get_field("notes").unwrap().is_visible());
    }

    #[test]
    fn test_new_name_field_shown_only_when_prompted() {
        let meta = MetaStore::new();
        let mut task = DocTypeMeta::new("Task", vec![data("subject")]);
        task.autoname = Some("Prompt".into());
        meta.insert(task);
        let doc = Rc::new(RefCell::new(Document::new("Task", "new-task-1")));
        doc.borrow_mut().set("__islocal", json!(1));
        let mut layout = doc_layout(&meta, doc.clone());
        layout.refresh(None).unwrap();
        assert!(layout.get_field(NEW_NAME_FIELD).unwrap().is_visible());

        doc.borrow_mut().remove("__islocal");
        layout.refresh(None).unwrap();
        assert!(!layout.get_field(NEW_NAME_FIELD).unwrap().is_visible());
    }

    #[test]
    fn test_focused_numeric_field_is_reselected() {
        let (mut layout, _) = recording_layout(
            vec![DocField::new("qty", FieldType::Float), data("a")],
            FakeGrid::default(),
        );
        layout.refresh(None).unwrap();
        let selected = |layout: &Layout, f: &str| layout.get_field(f).unwrap().control.is_text_selected();

        layout.set_focus(Some("qty"));
        layout.refresh(None).unwrap();
        assert_eq!(layout.focused(), Some("qty"));
        assert!(selected(&layout, "qty"));

        layout.set_focus(Some("a"));
        layout.refresh(None).unwrap();
        assert!(!selected(&layout, "a"));
        assert!(!selected(&layout, "qty"));
    }

    #[test]
    fn test_removed_dependency_shows_field_again() {
        let (mut layout, _) = recording_layout(
            vec![data("a").with_depends_on("eval:false"), data("b")],
            FakeGrid::default(),
        );
        layout.refresh(None).unwrap();
        assert!(!layout.get_field("a").unwrap().is_visible());

        assert!(layout.replace_field("a", data("a")));
        layout.refresh(None).unwrap();
        let field = layout.get_field("a").unwrap();
        assert!(field.is_visible());
        assert!(!field.hidden_due_to_dependency);
    }
}
