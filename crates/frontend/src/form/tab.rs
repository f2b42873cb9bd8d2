use super::layout::{FieldId, SectionId};
use contracts::shared::metadata::DocField;
use std::collections::HashMap;

pub struct Tab {
    pub df: DocField,
    pub sections: Vec<SectionId>,
    pub fields: Vec<FieldId>,
    pub fields_dict: HashMap<String, FieldId>,
    pub guardian_has_value: bool,
    pub hidden_due_to_dependency: bool,
    pub is_hidden: bool,
    pub active: bool,
    /// Tab strip entry not shown (single visible tab, or hidden tab).
    pub link_hidden: bool,
}

impl Tab {
    pub fn new(df: DocField) -> Self {
        let is_hidden = df.hidden;
        Self {
            df,
            sections: Vec::new(),
            fields: Vec::new(),
            fields_dict: HashMap::new(),
            guardian_has_value: true,
            hidden_due_to_dependency: false,
            is_hidden,
            active: false,
            link_hidden: is_hidden,
        }
    }

    pub fn label(&self) -> &str {
        self.df.label_or_fieldname()
    }

    pub fn fieldname(&self) -> &str {
        &self.df.fieldname
    }

    pub fn add_field(&mut self, fieldname: &str, id: FieldId) {
        self.fields.push(id);
        if !fieldname.is_empty() {
            self.fields_dict.insert(fieldname.to_string(), id);
        }
    }

    /// Hidden by its own descriptor or by a falsy dependency.
    pub fn is_hidden_by_df(&self) -> bool {
        self.df.hidden || self.hidden_due_to_dependency
    }

    pub fn refresh(&mut self) {
        let show = !self.is_hidden_by_df();
        self.toggle(show);
    }

    pub fn toggle(&mut self, show: bool) {
        self.is_hidden = !show;
        self.link_hidden = !show;
        if !show {
            self.active = false;
        }
    }

    pub fn set_active(&mut self, active: bool) {
        self.active = active;
    }
}
