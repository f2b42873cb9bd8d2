use super::layout::{FieldId, SectionId};
use contracts::shared::metadata::DocField;

pub struct Column {
    pub df: DocField,
    pub section: SectionId,
    pub fields: Vec<FieldId>,
    pub guardian_has_value: bool,
    pub hidden_due_to_dependency: bool,
    pub is_hidden: bool,
}

impl Column {
    pub fn new(df: DocField, section: SectionId) -> Self {
        let is_hidden = df.hidden;
        Self {
            df,
            section,
            fields: Vec::new(),
            guardian_has_value: true,
            hidden_due_to_dependency: false,
            is_hidden,
        }
    }

    pub fn refresh(&mut self) {
        self.is_hidden = self.df.hidden || self.hidden_due_to_dependency;
    }
}
