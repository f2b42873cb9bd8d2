use super::layout::{ColumnId, FieldId, TabId};
use crate::shared::storage::KeyValueStore;
use contracts::shared::metadata::DocField;
use std::collections::HashMap;

pub struct Section {
    pub df: DocField,
    pub tab: Option<TabId>,
    pub page: Option<usize>,
    pub columns: Vec<ColumnId>,
    pub fields: Vec<FieldId>,
    pub fields_dict: HashMap<String, FieldId>,
    pub guardian_has_value: bool,
    pub hidden_due_to_dependency: bool,
    pub is_hidden: bool,
    /// No visible control left after dependency resolution.
    pub is_empty: bool,
    pub is_collapsed: bool,
}

impl Section {
    pub fn new(df: DocField, tab: Option<TabId>, page: Option<usize>) -> Self {
        let is_hidden = df.hidden;
        Self {
            df,
            tab,
            page,
            columns: Vec::new(),
            fields: Vec::new(),
            fields_dict: HashMap::new(),
            guardian_has_value: true,
            hidden_due_to_dependency: false,
            is_hidden,
            is_empty: false,
            is_collapsed: false,
        }
    }

    pub fn label(&self) -> Option<&str> {
        self.df.label.as_deref().filter(|l| !l.is_empty())
    }

    pub fn add_field(&mut self, fieldname: &str, id: FieldId) {
        self.fields.push(id);
        if !fieldname.is_empty() {
            self.fields_dict.insert(fieldname.to_string(), id);
        }
    }

    pub fn refresh(&mut self) {
        self.is_hidden = self.df.hidden || self.hidden_due_to_dependency;
    }

    /// Visible and holding at least one visible control.
    pub fn is_shown(&self) -> bool {
        !self.is_hidden && !self.is_empty
    }

    /// Storage key for the collapsed flag; sections without a CSS class
    /// do not persist it.
    pub fn collapse_key(&self) -> Option<String> {
        self.df
            .css_class
            .as_deref()
            .filter(|c| !c.is_empty())
            .map(|c| format!("{}-closed", c))
    }

    /// Initial state of a collapsible section: collapsed unless the stored
    /// flag says otherwise.
    pub fn restore_collapse(&mut self, storage: &dyn KeyValueStore) {
        if !self.df.collapsible {
            return;
        }
        self.is_collapsed = match self.collapse_key().and_then(|k| storage.get(&k)) {
            Some(flag) => flag == "1",
            None => true,
        };
    }

    pub fn collapse(&mut self, hide: bool, storage: &dyn KeyValueStore) {
        self.is_collapsed = hide;
        if let Some(key) = self.collapse_key() {
            storage.set(&key, if hide { "1" } else { "0" });
        }
    }
}
