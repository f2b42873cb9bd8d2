use super::{FieldId, Layout, NodeRef};
use crate::form::control::TabStop;

/// Where a focus target lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FocusScope {
    Layout,
    /// Inside the open row editor of a table field.
    Row { table: String, row: usize },
}

/// Outcome of a Tab / Shift-Tab keypress.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TabMove {
    Focus { scope: FocusScope, fieldname: String },
    OpenRow { table: String, row: usize },
    PrimaryButton,
    None,
}

impl Layout {
    fn layout_tab_stops(&self) -> Vec<TabStop> {
        self.fields_list
            .iter()
            .filter_map(|node| match node {
                NodeRef::Field(id) => {
                    let field = &self.field_objs[id.0];
                    Some(TabStop {
                        fieldname: field.fieldname().to_string(),
                        fieldtype: field.df().fieldtype.clone(),
                        visible: field.is_tab_stop(),
                    })
                }
                _ => None,
            })
            .collect()
    }

    /// Table field whose grid currently has a row open.
    fn open_grid_row(&self) -> Option<(FieldId, usize)> {
        self.field_objs.iter().enumerate().find_map(|(i, field)| {
            let row = field.control.grid()?.open_row()?;
            Some((FieldId(i), row))
        })
    }

    fn focus_on_next_field(
        &mut self,
        start: usize,
        stops: &[TabStop],
        scope: &FocusScope,
    ) -> Option<TabMove> {
        for stop in stops.iter().skip(start + 1).filter(|s| s.visible) {
            if stop.fieldtype.is_table() && *scope == FocusScope::Layout {
                let id = self.field_id(&stop.fieldname)?;
                let grid = self.field_objs[id.0].control.grid_mut()?;
                if grid.row_count() == 0 {
                    grid.add_new_row();
                }
                grid.show_row(0);
                return Some(TabMove::OpenRow {
                    table: stop.fieldname.clone(),
                    row: 0,
                });
            }
            if !stop.fieldtype.is_no_value() {
                return Some(self.focus(scope, &stop.fieldname));
            }
        }
        None
    }

    fn focus(&mut self, scope: &FocusScope, fieldname: &str) -> TabMove {
        if *scope == FocusScope::Layout {
            self.set_focus(Some(fieldname));
        }
        TabMove::Focus {
            scope: scope.clone(),
            fieldname: fieldname.to_string(),
        }
    }

    /// Move keyboard focus away from `fieldname` of `doctype`.
    ///
    /// A `doctype` other than the layout's own means the key was pressed in
    /// the open row of a child table. Running off the last field of the last
    /// row closes it and continues after the table.
    pub fn handle_tab(&mut self, doctype: &str, fieldname: &str, shift: bool) -> TabMove {
        let open_row = if doctype != self.doctype {
            match self.open_grid_row() {
                Some(open) => Some(open),
                None => return TabMove::None,
            }
        } else {
            None
        };

        let (stops, scope) = match open_row {
            Some((table, row)) => {
                let field = &self.field_objs[table.0];
                let stops = field
                    .control
                    .grid()
                    .map(|grid| grid.row_tab_stops(row))
                    .unwrap_or_default();
                let scope = FocusScope::Row {
                    table: field.fieldname().to_string(),
                    row,
                };
                (stops, scope)
            }
            None => (self.layout_tab_stops(), FocusScope::Layout),
        };

        let mut prev: Option<usize> = None;
        for (i, stop) in stops.iter().enumerate() {
            if stop.fieldname == fieldname {
                if shift {
                    return match prev {
                        Some(p) => self.focus(&scope, &stops[p].fieldname),
                        None => TabMove::PrimaryButton,
                    };
                }
                if let Some(next) = self.focus_on_next_field(i, &stops, &scope) {
                    return next;
                }
            }
            if stop.visible {
                prev = Some(i);
            }
        }

        match open_row {
            Some((table, row)) => {
                let table_name = self.field_objs[table.0].fieldname().to_string();
                let Some(grid) = self.field_objs[table.0].control.grid_mut() else {
                    return TabMove::None;
                };
                if row + 1 >= grid.row_count() {
                    grid.close_row();
                    let doctype = self.doctype.clone();
                    self.handle_tab(&doctype, &table_name, false)
                } else {
                    grid.show_row(row + 1);
                    TabMove::OpenRow {
                        table: table_name,
                        row: row + 1,
                    }
                }
            }
            None if !shift => TabMove::PrimaryButton,
            None => TabMove::None,
        }
    }
}
