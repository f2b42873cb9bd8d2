use super::control::{Control, DisplayStatus};
use super::layout::{ColumnId, SectionId, TabId};
use crate::shared::value::is_null;
use contracts::shared::metadata::DocField;
use serde_json::Value;

/// A data field placed in the layout tree.
pub struct Field {
    pub control: Box<dyn Control>,
    pub section: SectionId,
    pub column: ColumnId,
    pub tab: Option<TabId>,
    /// Fold page the field sits on, if any.
    pub page: Option<usize>,
    pub guardian_has_value: bool,
    pub hidden_due_to_dependency: bool,
}

impl Field {
    pub fn df(&self) -> &DocField {
        self.control.df()
    }

    pub fn fieldname(&self) -> &str {
        &self.control.df().fieldname
    }

    pub fn status(&self) -> DisplayStatus {
        self.control.status()
    }

    pub fn is_visible(&self) -> bool {
        self.status() != DisplayStatus::None
    }

    /// Focusable by keyboard navigation.
    pub fn is_tab_stop(&self) -> bool {
        self.status() == DisplayStatus::Write && !self.df().hidden
    }

    pub fn get_value(&self) -> Value {
        self.control.get_value()
    }

    pub fn refresh(&mut self, docstatus: i64) {
        let status = display_status(
            self.df(),
            self.hidden_due_to_dependency,
            &self.control.get_value(),
            docstatus,
        );
        self.control.refresh(status);
    }
}

pub fn display_status(
    df: &DocField,
    hidden_due_to_dependency: bool,
    value: &Value,
    docstatus: i64,
) -> DisplayStatus {
    if df.hidden || hidden_due_to_dependency {
        return DisplayStatus::None;
    }

    let locked = match docstatus {
        1 => !df.allow_on_submit,
        2 => true,
        _ => false,
    };
    if !df.read_only && !locked {
        return DisplayStatus::Write;
    }

    if is_null(value) && !df.fieldtype.is_display_only() {
        DisplayStatus::None
    } else {
        DisplayStatus::Read
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::shared::metadata::FieldType;
    use serde_json::json;

    #[test]
    fn test_display_status_rules() {
        let mut df = DocField::new("po_no", FieldType::Data);
        assert_eq!(display_status(&df, false, &json!(""), 0), DisplayStatus::Write);
        assert_eq!(display_status(&df, true, &json!("x"), 0), DisplayStatus::None);
        assert_eq!(display_status(&df, false, &json!("x"), 1), DisplayStatus::Read);
        assert_eq!(display_status(&df, false, &json!(""), 2), DisplayStatus::None);

        df.allow_on_submit = true;
        assert_eq!(display_status(&df, false, &json!("x"), 1), DisplayStatus::Write);

        df.read_only = true;
        assert_eq!(display_status(&df, false, &json!(null), 0), DisplayStatus::None);

        let html = DocField {
            read_only: true,
            ..DocField::new("intro", FieldType::Html)
        };
        assert_eq!(display_status(&html, false, &json!(null), 0), DisplayStatus::Read);
    }
}
