use super::{
    ColumnId, FieldId, FoldPage, Layout, NodeRef, SectionId, TabId, DEFAULT_TAB_FIELD,
    NEW_NAME_FIELD,
};
use crate::form::column::Column;
use crate::form::control::{ControlParent, ControlSpec};
use crate::form::field::Field;
use crate::form::section::Section;
use crate::form::tab::Tab;
use contracts::shared::metadata::{DocField, FieldType};

impl Layout {
    /// Build the tree once. Later calls are no-ops.
    pub fn make(&mut self) {
        if self.built {
            return;
        }
        if self.from_meta {
            self.fields = self.get_doctype_fields();
        }
        self.synthesize_containers();
        let fields = self.fields.clone();
        self.render(&fields);
        self.built = true;
        log::debug!(
            "layout {} built: {} tabs, {} sections, {} fields",
            self.doctype,
            self.tabs.len(),
            self.sections.len(),
            self.field_objs.len()
        );
    }

    fn new_name_field(&self) -> DocField {
        let mut df = DocField::new(NEW_NAME_FIELD, FieldType::Data)
            .with_label(self.translator.translate("Name"))
            .required();
        df.hidden = true;
        df.parent = Some(self.doctype.clone());
        df
    }

    fn get_doctype_fields(&self) -> Vec<DocField> {
        let mut fields = vec![self.new_name_field()];
        fields.extend(self.meta.sort_docfields(&self.doctype));
        fields
    }

    fn synthesize_containers(&mut self) {
        let tabbed = self
            .fields
            .iter()
            .any(|df| df.fieldtype == FieldType::TabBreak);

        if tabbed {
            let has_first_tab = self
                .fields
                .get(1)
                .is_some_and(|df| df.fieldtype == FieldType::TabBreak);
            if !has_first_tab {
                let tab = DocField::new(DEFAULT_TAB_FIELD, FieldType::TabBreak)
                    .with_label(self.translator.translate(&self.labels.default_tab));
                // Goes right after the name field; lists without one get it
                // in front, ahead of their own first tab.
                let at = match self.fields.first() {
                    Some(df) if df.fieldname == NEW_NAME_FIELD => 1,
                    _ => 0,
                };
                self.fields.insert(at, tab);
            }
        } else if self
            .fields
            .first()
            .is_some_and(|df| df.fieldtype != FieldType::SectionBreak)
        {
            self.fields
                .insert(0, DocField::new("", FieldType::SectionBreak));
        }
    }

    /// Scan descriptors into the tree, appending to the open containers.
    pub(super) fn render(&mut self, fields: &[DocField]) {
        for df in fields {
            match df.fieldtype {
                FieldType::Fold => self.make_page(),
                FieldType::SectionBreak => {
                    self.make_section(Some(df.clone()));
                }
                FieldType::ColumnBreak => {
                    self.make_column(Some(df.clone()));
                }
                FieldType::TabBreak => self.make_tab(df.clone()),
                _ => {
                    self.make_field(df.clone());
                }
            }
        }
    }

    fn make_page(&mut self) {
        self.pages.push(FoldPage {
            folded: true,
            toggle_label: self.translator.translate(&self.labels.show_more),
        });
        self.current_page = Some(self.pages.len() - 1);
        self.current_section = None;
        self.current_column = None;
    }

    fn make_tab(&mut self, df: DocField) {
        let id = TabId(self.tabs.len());
        let fieldname = df.fieldname.clone();
        self.tabs.push(Tab::new(df));
        self.fields_list.push(NodeRef::Tab(id));
        if !fieldname.is_empty() {
            self.fields_dict.insert(fieldname, NodeRef::Tab(id));
        }
        self.current_tab = Some(id);
        self.current_section = None;
        self.current_column = None;
        self.make_section(None);
    }

    pub(super) fn make_section(&mut self, df: Option<DocField>) -> SectionId {
        self.section_count += 1;
        let mut df = df.unwrap_or_else(|| DocField::new("", FieldType::SectionBreak));
        if df.fieldname.is_empty() {
            df.fieldname = format!("__section_{}", self.section_count);
        }

        let id = SectionId(self.sections.len());
        let fieldname = df.fieldname.clone();
        let mut section = Section::new(df, self.current_tab, self.current_page);
        section.restore_collapse(self.storage.as_ref());
        self.sections.push(section);

        self.fields_list.push(NodeRef::Section(id));
        self.fields_dict.insert(fieldname, NodeRef::Section(id));
        if let Some(tab) = self.current_tab {
            self.tabs[tab.0].sections.push(id);
        }
        self.current_section = Some(id);
        self.current_column = None;
        id
    }

    pub(super) fn make_column(&mut self, df: Option<DocField>) -> ColumnId {
        let section = match self.current_section {
            Some(section) => section,
            None => self.make_section(None),
        };
        self.column_count += 1;
        let mut df = df.unwrap_or_else(|| DocField::new("", FieldType::ColumnBreak));
        if df.fieldname.is_empty() {
            df.fieldname = format!("__column_{}", self.column_count);
        }

        let id = ColumnId(self.columns.len());
        let fieldname = df.fieldname.clone();
        self.columns.push(Column::new(df, section));
        self.sections[section.0].columns.push(id);
        self.fields_list.push(NodeRef::Column(id));
        self.fields_dict.insert(fieldname, NodeRef::Column(id));
        self.current_column = Some(id);
        id
    }

    fn make_field(&mut self, df: DocField) -> FieldId {
        let column = match self.current_column {
            Some(column) => column,
            None => self.make_column(None),
        };
        let section = self.columns[column.0].section;
        let id = FieldId(self.field_objs.len());
        let fieldname = df.fieldname.clone();

        let control = self.controls.make_control(ControlSpec {
            df,
            doctype: self.doctype.clone(),
            parent: ControlParent { section, column },
            doc: self.doc.clone(),
            render_input: true,
        });
        self.field_objs.push(Field {
            control,
            section,
            column,
            tab: self.current_tab,
            page: self.current_page,
            guardian_has_value: true,
            hidden_due_to_dependency: false,
        });

        self.fields_list.push(NodeRef::Field(id));
        if !fieldname.is_empty() {
            self.fields_dict.insert(fieldname.clone(), NodeRef::Field(id));
        }
        self.sections[section.0].add_field(&fieldname, id);
        self.columns[column.0].fields.push(id);
        if let Some(tab) = self.current_tab {
            self.tabs[tab.0].add_field(&fieldname, id);
        }
        id
    }

    /// Append descriptors after the existing tree and refresh them.
    pub fn add_fields(&mut self, fields: Vec<DocField>) {
        self.fields.extend(fields.iter().cloned());
        self.render(&fields);
        self.refresh_fields(&fields);
    }

    /// Swap the control behind `fieldname` for one built from `df`,
    /// keeping its place in the tree.
    pub fn replace_field(&mut self, fieldname: &str, mut df: DocField) -> bool {
        let Some(id) = self.field_id(fieldname) else {
            return false;
        };
        df.fieldname = fieldname.to_string();
        if let Some(slot) = self.fields.iter_mut().find(|f| f.fieldname == fieldname) {
            *slot = df.clone();
        }

        let (section, column) = {
            let old = &self.field_objs[id.0];
            (old.section, old.column)
        };
        let control = self.controls.make_control(ControlSpec {
            df: df.clone(),
            doctype: self.doctype.clone(),
            parent: ControlParent { section, column },
            doc: self.doc.clone(),
            render_input: true,
        });
        self.field_objs[id.0].control = control;
        self.refresh_fields(&[df]);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::super::test_support::{data, marker, recording_layout};
    use super::super::{LayoutOptions, NodeRef};
    use super::*;
    use crate::form::control::testing::FakeGrid;
    use crate::model::MetaStore;
    use contracts::shared::metadata::DocTypeMeta;

    #[test]
    fn test_untabbed_list_gets_one_section_and_column() {
        let (mut layout, _) = recording_layout(vec![data("a")], FakeGrid::default());
        layout.make();
        assert_eq!(layout.sections().len(), 1);
        assert_eq!(layout.columns().len(), 1);
        assert_eq!(layout.sections()[0].fields.len(), 1);
        assert_eq!(layout.columns()[0].fields.len(), 1);
        assert_eq!(layout.get_field("a").unwrap().section, SectionId(0));
        assert!(!layout.is_tabbed());
    }

    // Pins the synthesized empty "Details" tab in front of the first
    // declared tab when it is not the second descriptor.
    #[test]
    fn test_tabbed_list_gets_leading_details_tab() {
        let (mut layout, _) = recording_layout(
            vec![marker("t1", FieldType::TabBreak), data("a")],
            FakeGrid::default(),
        );
        layout.make();
        assert_eq!(layout.tabs().len(), 2);
        let details = &layout.tabs()[0];
        assert_eq!(details.fieldname(), DEFAULT_TAB_FIELD);
        assert_eq!(details.label(), "Details");
        assert!(details.fields.is_empty());
        let t1 = &layout.tabs()[1];
        assert_eq!(t1.fieldname(), "t1");
        assert_eq!(t1.fields.len(), 1);
        assert!(t1.fields_dict.contains_key("a"));
    }

    #[test]
    fn test_doctype_layout_skips_details_when_first_tab_follows_name() {
        let meta = MetaStore::new();
        meta.insert(DocTypeMeta::new(
            "Task",
            vec![marker("main", FieldType::TabBreak), data("subject")],
        ));
        let mut layout = Layout::new(LayoutOptions::new("Task", meta));
        layout.make();
        assert_eq!(layout.descriptors()[0].fieldname, NEW_NAME_FIELD);
        assert_eq!(layout.tabs().len(), 1);
        assert_eq!(layout.tabs()[0].fieldname(), "main");
    }

    #[test]
    fn test_sections_and_columns_are_named_and_ordered() {
        let (mut layout, _) = recording_layout(
            vec![
                data("a"),
                marker("", FieldType::ColumnBreak),
                data("b"),
                marker("details", FieldType::SectionBreak),
                data("c"),
            ],
            FakeGrid::default(),
        );
        layout.make();
        assert_eq!(layout.sections().len(), 2);
        assert_eq!(layout.sections()[0].df.fieldname, "__section_1");
        assert_eq!(layout.sections()[0].columns.len(), 2);
        assert_eq!(layout.sections()[1].df.fieldname, "details");
        assert!(matches!(layout.node("details"), Some(NodeRef::Section(_))));
        let names: Vec<_> = layout.fields().map(|f| f.fieldname().to_string()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
    }

    #[test]
    fn test_make_is_idempotent() {
        let (mut layout, _) = recording_layout(vec![data("a")], FakeGrid::default());
        layout.make();
        layout.make();
        assert_eq!(layout.fields().count(), 1);
    }

    #[test]
    fn test_fold_opens_folded_page() {
        let (mut layout, _) = recording_layout(
            vec![data("a"), marker("", FieldType::Fold), data("b")],
            FakeGrid::default(),
        );
        layout.make();
        assert_eq!(layout.pages().len(), 1);
        assert!(layout.pages()[0].folded);
        assert_eq!(layout.get_field("b").unwrap().page, Some(0));
        assert_eq!(layout.get_field("a").unwrap().page, None);

        layout.toggle_fold(0);
        assert!(!layout.pages()[0].folded);
        assert_eq!(layout.pages()[0].toggle_label, "Hide details");
        layout.toggle_fold(0);
        assert_eq!(layout.pages()[0].toggle_label, "Show more details");
    }

    #[test]
    fn test_add_and_replace_field() {
        let (mut layout, _) = recording_layout(vec![data("a")], FakeGrid::default());
        layout.make();
        layout.add_fields(vec![data("b")]);
        assert_eq!(layout.get_field("b").unwrap().column, ColumnId(0));

        let replacement = DocField::new("ignored", FieldType::Int).with_label("A number");
        assert!(layout.replace_field("a", replacement));
        let a = layout.get_field("a").unwrap();
        assert_eq!(a.df().fieldtype, FieldType::Int);
        assert_eq!(a.fieldname(), "a");
        assert!(!layout.replace_field("missing", data("x")));
    }
}
