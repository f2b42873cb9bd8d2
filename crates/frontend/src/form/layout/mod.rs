//! Form layout engine
//!
//! Turns an ordered list of field descriptors into a tree of
//! Tabs > Sections > Columns > Fields and keeps the tree's visibility flags
//! in step with the bound document: dependency expressions, empty sections,
//! tab visibility and collapsible sections. Nothing here touches the DOM;
//! the rendering layer paints from the flags (`is_hidden`, `is_empty`,
//! `is_collapsed`, tab `active` / `link_hidden`).
//!
//! ## Usage
//!
//! ```rust,ignore
//! let mut layout = Layout::new(
//!     LayoutOptions::new("Sales Invoice", meta.clone()).with_doc(Some(doc.clone())),
//! );
//! layout.make();
//! layout.refresh(None)?;
//! let shown = layout.field("po_no").map(Field::is_visible);
//! ```

mod build;
mod refresh;
mod tab_order;

pub use tab_order::{FocusScope, TabMove};

use super::column::Column;
use super::control::ControlRegistry;
use super::depends::DependsError;
use super::field::Field;
use super::section::Section;
use super::tab::Tab;
use crate::config::LayoutConfig;
use crate::model::{DocRef, MetaStore, ScriptManager};
use crate::shared::storage::{MemoryStorage, SharedStore};
use crate::shared::translate::{SharedTranslator, Untranslated};
use contracts::shared::metadata::DocField;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// Name of the synthetic field prompting for a new document's name.
pub const NEW_NAME_FIELD: &str = "__newname";
/// Name of the synthesized default tab.
pub const DEFAULT_TAB_FIELD: &str = "__details";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FieldId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SectionId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ColumnId(pub usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TabId(pub usize);

/// Entry of the flat, order-preserving node list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeRef {
    Field(FieldId),
    Section(SectionId),
    Column(ColumnId),
    Tab(TabId),
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LayoutError {
    #[error(transparent)]
    Depends(#[from] DependsError),
    #[error("Following fields have missing values: {}", .0.join(", "))]
    MissingValues(Vec<String>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct LayoutLabels {
    pub default_tab: String,
    pub show_more: String,
    pub hide_details: String,
}

impl Default for LayoutLabels {
    fn default() -> Self {
        Self {
            default_tab: "Details".into(),
            show_more: "Show more details".into(),
            hide_details: "Hide details".into(),
        }
    }
}

impl From<&LayoutConfig> for LayoutLabels {
    fn from(config: &LayoutConfig) -> Self {
        Self {
            default_tab: config.default_tab_label.clone(),
            show_more: config.show_more_label.clone(),
            hide_details: config.hide_details_label.clone(),
        }
    }
}

/// A secondary page opened by a Fold marker.
#[derive(Debug, Clone, PartialEq)]
pub struct FoldPage {
    pub folded: bool,
    /// Label of the toggle link.
    pub toggle_label: String,
}

pub struct LayoutOptions {
    pub doctype: String,
    /// Explicit descriptors; the doctype's metadata is used when absent.
    pub fields: Option<Vec<DocField>>,
    pub doc: Option<DocRef>,
    pub parent_doc: Option<DocRef>,
    pub meta: MetaStore,
    pub controls: Option<ControlRegistry>,
    pub scripts: Option<ScriptManager>,
    pub storage: SharedStore,
    pub translator: SharedTranslator,
    pub labels: LayoutLabels,
    /// Storage key remembering the last active tab.
    pub tab_memory_key: Option<String>,
}

impl LayoutOptions {
    pub fn new(doctype: impl Into<String>, meta: MetaStore) -> Self {
        Self {
            doctype: doctype.into(),
            fields: None,
            doc: None,
            parent_doc: None,
            meta,
            controls: None,
            scripts: None,
            storage: Rc::new(MemoryStorage::new()),
            translator: Rc::new(Untranslated),
            labels: LayoutLabels::default(),
            tab_memory_key: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<DocField>) -> Self {
        self.fields = Some(fields);
        self
    }

    pub fn with_doc(mut self, doc: Option<DocRef>) -> Self {
        self.doc = doc;
        self
    }

    pub fn with_parent_doc(mut self, parent: Option<DocRef>) -> Self {
        self.parent_doc = parent;
        self
    }

    pub fn with_controls(mut self, controls: ControlRegistry) -> Self {
        self.controls = Some(controls);
        self
    }

    pub fn with_scripts(mut self, scripts: Option<ScriptManager>) -> Self {
        self.scripts = scripts;
        self
    }

    pub fn with_storage(mut self, storage: SharedStore) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_translator(mut self, translator: SharedTranslator) -> Self {
        self.translator = translator;
        self
    }

    pub fn with_labels(mut self, labels: LayoutLabels) -> Self {
        self.labels = labels;
        self
    }

    pub fn with_tab_memory_key(mut self, key: Option<String>) -> Self {
        self.tab_memory_key = key;
        self
    }
}

pub struct Layout {
    doctype: String,
    meta: MetaStore,
    controls: ControlRegistry,
    scripts: Option<ScriptManager>,
    storage: SharedStore,
    translator: SharedTranslator,
    labels: LayoutLabels,
    tab_memory_key: Option<String>,
    /// Descriptors are taken from the doctype metadata.
    from_meta: bool,

    fields: Vec<DocField>,
    doc: Option<DocRef>,
    parent_doc: Option<DocRef>,
    built: bool,

    field_objs: Vec<Field>,
    sections: Vec<Section>,
    columns: Vec<Column>,
    tabs: Vec<Tab>,
    pages: Vec<FoldPage>,
    fields_list: Vec<NodeRef>,
    fields_dict: HashMap<String, NodeRef>,

    current_section: Option<SectionId>,
    current_column: Option<ColumnId>,
    current_tab: Option<TabId>,
    current_page: Option<usize>,
    section_count: usize,
    column_count: usize,

    focused: Option<String>,
}

impl Layout {
    pub fn new(opts: LayoutOptions) -> Self {
        let controls = opts
            .controls
            .unwrap_or_else(|| ControlRegistry::new(opts.meta.clone()));
        Self {
            from_meta: opts.fields.is_none(),
            fields: opts.fields.unwrap_or_default(),
            doctype: opts.doctype,
            meta: opts.meta,
            controls,
            scripts: opts.scripts,
            storage: opts.storage,
            translator: opts.translator,
            labels: opts.labels,
            tab_memory_key: opts.tab_memory_key,
            doc: opts.doc,
            parent_doc: opts.parent_doc,
            built: false,
            field_objs: Vec::new(),
            sections: Vec::new(),
            columns: Vec::new(),
            tabs: Vec::new(),
            pages: Vec::new(),
            fields_list: Vec::new(),
            fields_dict: HashMap::new(),
            current_section: None,
            current_column: None,
            current_tab: None,
            current_page: None,
            section_count: 0,
            column_count: 0,
            focused: None,
        }
    }

    pub fn doctype(&self) -> &str {
        &self.doctype
    }

    pub fn is_built(&self) -> bool {
        self.built
    }

    pub fn doc(&self) -> Option<&DocRef> {
        self.doc.as_ref()
    }

    /// Descriptor list after synthesis.
    pub fn descriptors(&self) -> &[DocField] {
        &self.fields
    }

    pub fn is_tabbed(&self) -> bool {
        !self.tabs.is_empty()
    }

    pub fn fields_list(&self) -> &[NodeRef] {
        &self.fields_list
    }

    pub fn node(&self, fieldname: &str) -> Option<NodeRef> {
        self.fields_dict.get(fieldname).copied()
    }

    pub fn field_id(&self, fieldname: &str) -> Option<FieldId> {
        match self.node(fieldname)? {
            NodeRef::Field(id) => Some(id),
            _ => None,
        }
    }

    pub fn get_field(&self, fieldname: &str) -> Option<&Field> {
        self.field_id(fieldname).map(|id| &self.field_objs[id.0])
    }

    pub fn get_field_mut(&mut self, fieldname: &str) -> Option<&mut Field> {
        let id = self.field_id(fieldname)?;
        self.field_objs.get_mut(id.0)
    }

    pub fn field_by_id(&self, id: FieldId) -> &Field {
        &self.field_objs[id.0]
    }

    pub fn fields(&self) -> impl Iterator<Item = &Field> {
        self.field_objs.iter()
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, id: SectionId) -> &Section {
        &self.sections[id.0]
    }

    pub fn section_by_name(&self, fieldname: &str) -> Option<&Section> {
        match self.node(fieldname)? {
            NodeRef::Section(id) => Some(&self.sections[id.0]),
            _ => None,
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column(&self, id: ColumnId) -> &Column {
        &self.columns[id.0]
    }

    pub fn tabs(&self) -> &[Tab] {
        &self.tabs
    }

    pub fn tab(&self, id: TabId) -> &Tab {
        &self.tabs[id.0]
    }

    pub fn pages(&self) -> &[FoldPage] {
        &self.pages
    }

    pub fn get_value(&self, fieldname: &str) -> Value {
        self.get_field(fieldname)
            .map(Field::get_value)
            .unwrap_or(Value::Null)
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    /// Record which field holds keyboard focus.
    pub fn set_focus(&mut self, fieldname: Option<&str>) {
        self.focused = fieldname.map(str::to_string);
    }

    /// Show or hide a Fold page, swapping its toggle label.
    pub fn toggle_fold(&mut self, page: usize) {
        let labels = (
            self.translator.translate(&self.labels.show_more),
            self.translator.translate(&self.labels.hide_details),
        );
        if let Some(p) = self.pages.get_mut(page) {
            p.folded = !p.folded;
            p.toggle_label = if p.folded { labels.0 } else { labels.1 };
        }
    }

    /// Make a tab active by fieldname and remember the choice.
    pub fn select_tab(&mut self, fieldname: &str) -> bool {
        let Some(idx) = self.tabs.iter().position(|t| t.fieldname() == fieldname) else {
            return false;
        };
        if self.tabs[idx].is_hidden {
            return false;
        }
        for (i, tab) in self.tabs.iter_mut().enumerate() {
            tab.set_active(i == idx);
        }
        if let Some(key) = &self.tab_memory_key {
            self.storage.set(key, fieldname);
        }
        true
    }

    pub fn active_tab(&self) -> Option<&Tab> {
        self.tabs.iter().find(|t| t.active)
    }

    /// Expand or collapse a collapsible section by user action.
    pub fn toggle_section(&mut self, fieldname: &str) {
        if let Some(NodeRef::Section(id)) = self.node(fieldname) {
            let section = &mut self.sections[id.0];
            if section.df.collapsible {
                let hide = !section.is_collapsed;
                section.collapse(hide, self.storage.as_ref());
            }
        }
    }
}
