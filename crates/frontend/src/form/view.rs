//! Leptos rendering of a form layout
//!
//! `LayoutSnapshot` copies the flags the layout engine computed into plain
//! data; `FormLayoutView` paints it. All decisions about what is hidden,
//! empty or collapsed are taken by the engine, never here.

use super::control::DisplayStatus;
use super::layout::{FoldPage, Layout, SectionId};
use crate::shared::value::{is_truthy, number, to_display_string};
use contracts::shared::metadata::FieldType;
use leptos::prelude::*;
use serde_json::{json, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct FieldView {
    pub fieldname: String,
    pub label: String,
    pub fieldtype: FieldType,
    pub value: Value,
    pub status: DisplayStatus,
    pub reqd: bool,
    /// Input text is to be selected once painted.
    pub selected: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnView {
    pub hidden: bool,
    pub fields: Vec<FieldView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SectionView {
    pub fieldname: String,
    pub label: Option<String>,
    /// Hidden by descriptor or dependency, or left without visible fields.
    pub hidden: bool,
    pub collapsible: bool,
    pub collapsed: bool,
    pub page: Option<usize>,
    pub columns: Vec<ColumnView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TabView {
    pub fieldname: String,
    pub label: String,
    pub hidden: bool,
    pub active: bool,
    pub link_hidden: bool,
    pub sections: Vec<SectionView>,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct LayoutSnapshot {
    pub tabs: Vec<TabView>,
    /// Sections outside any tab (untabbed layouts, the name field).
    pub sections: Vec<SectionView>,
    pub pages: Vec<FoldPage>,
}

impl LayoutSnapshot {
    pub fn capture(layout: &Layout) -> Self {
        let section_view = |id: SectionId| -> SectionView {
            let section = layout.section(id);
            let columns = section
                .columns
                .iter()
                .map(|cid| {
                    let column = layout.column(*cid);
                    ColumnView {
                        hidden: column.is_hidden,
                        fields: column
                            .fields
                            .iter()
                            .map(|fid| {
                                let field = layout.field_by_id(*fid);
                                let df = field.df();
                                FieldView {
                                    fieldname: df.fieldname.clone(),
                                    label: df.label_or_fieldname().to_string(),
                                    fieldtype: df.fieldtype.clone(),
                                    value: field.get_value(),
                                    status: field.status(),
                                    reqd: df.reqd,
                                    selected: field.control.is_text_selected(),
                                }
                            })
                            .collect(),
                    }
                })
                .collect();
            SectionView {
                fieldname: section.df.fieldname.clone(),
                label: section.label().map(str::to_string),
                hidden: !section.is_shown(),
                collapsible: section.df.collapsible,
                collapsed: section.is_collapsed,
                page: section.page,
                columns,
            }
        };

        let tabs = layout
            .tabs()
            .iter()
            .map(|tab| TabView {
                fieldname: tab.fieldname().to_string(),
                label: tab.label().to_string(),
                hidden: tab.is_hidden,
                active: tab.active,
                link_hidden: tab.link_hidden,
                sections: tab.sections.iter().map(|id| section_view(*id)).collect(),
            })
            .collect();
        let sections = layout
            .sections()
            .iter()
            .enumerate()
            .filter(|(_, s)| s.tab.is_none())
            .map(|(i, _)| section_view(SectionId(i)))
            .collect();

        Self {
            tabs,
            sections,
            pages: layout.pages().to_vec(),
        }
    }
}

// ============================================================================
// Components
// ============================================================================

fn field_input(field: FieldView, on_change: Callback<(String, Value)>) -> AnyView {
    let FieldView {
        fieldname,
        fieldtype,
        value,
        status,
        selected,
        ..
    } = field;

    if status == DisplayStatus::Read {
        return view! { <div class="control-value like-disabled-input">{to_display_string(&value)}</div> }
            .into_any();
    }

    match fieldtype {
        FieldType::Check => {
            let checked = is_truthy(&value);
            view! {
                <input
                    type="checkbox"
                    prop:checked=checked
                    on:change=move |ev| {
                        let v = if event_target_checked(&ev) { 1 } else { 0 };
                        on_change.run((fieldname.clone(), json!(v)));
                    }
                />
            }
            .into_any()
        }
        FieldType::Table | FieldType::TableMultiSelect => {
            let rows = value.as_array().map(Vec::len).unwrap_or(0);
            view! { <div class="form-grid">{format!("{} rows", rows)}</div> }.into_any()
        }
        FieldType::Text
        | FieldType::SmallText
        | FieldType::LongText
        | FieldType::TextEditor
        | FieldType::Code => view! {
            <textarea
                class="form-control"
                prop:value=to_display_string(&value)
                on:change=move |ev| {
                    on_change.run((fieldname.clone(), Value::String(event_target_value(&ev))));
                }
            />
        }
        .into_any(),
        t if t.is_numeric() => {
            let input_ref = NodeRef::<leptos::html::Input>::new();
            if selected {
                Effect::new(move |_| {
                    if let Some(input) = input_ref.get() {
                        input.select();
                    }
                });
            }
            view! {
                <input
                    type="number"
                    class="form-control"
                    node_ref=input_ref
                    prop:value=to_display_string(&value)
                    on:change=move |ev| {
                        let raw = event_target_value(&ev);
                        let v = raw.trim().parse::<f64>().map(number).unwrap_or(Value::Null);
                        on_change.run((fieldname.clone(), v));
                    }
                />
            }
            .into_any()
        }
        _ => view! {
            <input
                type="text"
                class="form-control"
                prop:value=to_display_string(&value)
                on:change=move |ev| {
                    on_change.run((fieldname.clone(), Value::String(event_target_value(&ev))));
                }
            />
        }
        .into_any(),
    }
}

fn section_block(
    section: SectionView,
    on_change: Callback<(String, Value)>,
    on_toggle_section: Callback<String>,
) -> impl IntoView {
    let fieldname = section.fieldname.clone();
    let collapsed = section.collapsible && section.collapsed;
    let head = section.label.clone().map(|label| {
        let name = fieldname.clone();
        view! {
            <div
                class="section-head"
                class:collapsible=section.collapsible
                on:click=move |_| on_toggle_section.run(name.clone())
            >
                {label}
            </div>
        }
    });
    let columns = section
        .columns
        .into_iter()
        .map(|column| {
            let fields = column
                .fields
                .into_iter()
                .map(|field| {
                    let hidden = field.status == DisplayStatus::None;
                    let label = field.label.clone();
                    let reqd = field.reqd;
                    let input = field_input(field, on_change);
                    view! {
                        <div class="frappe-control" class:hide-control=hidden>
                            <label class="control-label" class:reqd=reqd>{label}</label>
                            {input}
                        </div>
                    }
                })
                .collect_view();
            view! {
                <div class="form-column" class:hide-control=column.hidden>{fields}</div>
            }
        })
        .collect_view();

    view! {
        <div
            class="form-section"
            class:empty-section=section.hidden
            data-fieldname=fieldname
        >
            {head}
            <div class="section-body" class:hide=collapsed>{columns}</div>
        </div>
    }
}

#[component]
pub fn FormLayoutView(
    #[prop(into)] snapshot: Signal<LayoutSnapshot>,
    #[prop(into)] on_change: Callback<(String, Value)>,
    #[prop(into)] on_select_tab: Callback<String>,
    #[prop(into)] on_toggle_section: Callback<String>,
    #[prop(into)] on_toggle_fold: Callback<usize>,
) -> impl IntoView {
    move || {
        let snap = snapshot.get();
        let render_sections = move |sections: Vec<SectionView>, page: Option<usize>| {
            sections
                .into_iter()
                .filter(|s| s.page == page)
                .map(|s| section_block(s, on_change, on_toggle_section))
                .collect_view()
        };

        let loose = render_sections(snap.sections.clone(), None);
        let tab_links = snap
            .tabs
            .iter()
            .map(|tab| {
                let name = tab.fieldname.clone();
                view! {
                    <li
                        class="nav-item"
                        class:hide=tab.link_hidden
                        class:active=tab.active
                        on:click=move |_| on_select_tab.run(name.clone())
                    >
                        {tab.label.clone()}
                    </li>
                }
            })
            .collect_view();
        let tab_panes = snap
            .tabs
            .iter()
            .map(|tab| {
                let body = render_sections(tab.sections.clone(), None);
                view! {
                    <div class="tab-pane" class:hide=tab.hidden || !tab.active>{body}</div>
                }
            })
            .collect_view();

        let pages = snap
            .pages
            .iter()
            .enumerate()
            .map(|(i, page)| {
                let mut sections = snap.sections.clone();
                for tab in &snap.tabs {
                    sections.extend(tab.sections.iter().cloned());
                }
                let body = render_sections(sections, Some(i));
                let label = page.toggle_label.clone();
                view! {
                    <div class="form-page">
                        <thaw::Button
                            appearance=thaw::ButtonAppearance::Subtle
                            on_click=move |_| on_toggle_fold.run(i)
                        >
                            {label}
                        </thaw::Button>
                        <div class:hide=page.folded>{body}</div>
                    </div>
                }
            })
            .collect_view();

        view! {
            <div class="form-layout">
                {loose}
                <ul class="form-tabs" class:hide=snap.tabs.is_empty()>{tab_links}</ul>
                <div class="form-tab-content">{tab_panes}</div>
                {pages}
            </div>
        }
    }
}
