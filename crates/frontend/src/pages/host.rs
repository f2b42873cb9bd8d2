//! Renders the page container: breadcrumbs, messages and one block per
//! cached page, only the current one visible.

use super::container::{Page, PageContent};
use crate::app::DeskHandle;
use crate::form::view::{FormLayoutView, LayoutSnapshot};
use crate::shared::messages::Indicator;
use leptos::prelude::*;
use leptos::task::spawn_local;
use serde_json::Value;
use thaw::*;

fn content_kind(content: &PageContent) -> &'static str {
    match content {
        PageContent::Blank => "blank",
        PageContent::Loading { .. } => "loading",
        PageContent::NotFound => "not-found",
        PageContent::Standard { .. } => "standard",
        PageContent::Form(_) => "form",
        PageContent::List(_) => "list",
    }
}

fn with_page<R>(desk: DeskHandle, label: &str, f: impl FnOnce(&Page) -> R) -> Option<R> {
    desk.with(|d| {
        let container = d.container();
        container.get(label).map(|id| f(container.page(id)))
    })
    .flatten()
}

#[component]
fn Breadcrumbs() -> impl IntoView {
    let desk = use_context::<DeskHandle>().expect("DeskHandle context not found");
    move || {
        desk.with(|d| d.breadcrumbs().to_vec())
            .unwrap_or_default()
            .into_iter()
            .map(|crumb| {
                view! {
                    <li><a href=format!("#{}", crumb.route)>{crumb.label}</a></li>
                }
            })
            .collect_view()
    }
}

#[component]
fn Messages() -> impl IntoView {
    let desk = use_context::<DeskHandle>().expect("DeskHandle context not found");
    move || {
        desk.with(|d| d.app().messages.entries())
            .unwrap_or_default()
            .into_iter()
            .enumerate()
            .map(|(index, message)| {
                let intent = match message.indicator {
                    Indicator::Blue => MessageBarIntent::Info,
                    Indicator::Orange => MessageBarIntent::Warning,
                    Indicator::Red => MessageBarIntent::Error,
                };
                view! {
                    <MessageBar intent=intent>
                        <MessageBarBody>
                            <MessageBarTitle>{message.title}</MessageBarTitle>
                            {message.message}
                        </MessageBarBody>
                        <Button
                            appearance=ButtonAppearance::Transparent
                            on_click=move |_| {
                                desk.update(|d| d.app().messages.dismiss(index));
                            }
                        >
                            "×"
                        </Button>
                    </MessageBar>
                }
            })
            .collect_view()
    }
}

fn form_body(desk: DeskHandle, label: String) -> AnyView {
    let snapshot = {
        let label = label.clone();
        Signal::derive(move || {
            desk.with(|d| d.form(&label).map(|form| LayoutSnapshot::capture(&form.layout)))
                .flatten()
                .unwrap_or_default()
        })
    };
    let on_change = {
        let label = label.clone();
        Callback::new(move |(fieldname, value): (String, Value)| {
            if let Some(Err(e)) = desk.update(|d| d.set_value(&label, &fieldname, value)) {
                log::error!("set_value {}: {}", fieldname, e);
            }
        })
    };
    let on_select_tab = {
        let label = label.clone();
        Callback::new(move |fieldname: String| {
            desk.update(|d| d.form_mut(&label).map(|f| f.layout.select_tab(&fieldname)));
        })
    };
    let on_toggle_section = {
        let label = label.clone();
        Callback::new(move |fieldname: String| {
            desk.update(|d| d.form_mut(&label).map(|f| f.layout.toggle_section(&fieldname)));
        })
    };
    let on_toggle_fold = Callback::new(move |page: usize| {
        desk.update(|d| d.form_mut(&label).map(|f| f.layout.toggle_fold(page)));
    });

    view! {
        <FormLayoutView
            snapshot=snapshot
            on_change=on_change
            on_select_tab=on_select_tab
            on_toggle_section=on_toggle_section
            on_toggle_fold=on_toggle_fold
        />
    }
    .into_any()
}

fn form_href(doctype: &str, name: &str) -> String {
    format!("#Form/{}/{}", urlencoding::encode(doctype), urlencoding::encode(name))
}

fn list_body(desk: DeskHandle, label: String) -> AnyView {
    let rows = move || {
        with_page(desk, &label, |page| match &page.content {
            PageContent::List(list) => list
                .names
                .iter()
                .map(|name| (list.doctype.clone(), name.clone()))
                .collect::<Vec<_>>(),
            _ => Vec::new(),
        })
        .unwrap_or_default()
        .into_iter()
        .map(|(doctype, name)| {
            let href = form_href(&doctype, &name);
            view! {
                <li class="list-row">
                    <a href=href>{name}</a>
                </li>
            }
        })
        .collect_view()
    };
    view! {
        <ul class="result-list">{rows}</ul>
    }
    .into_any()
}

fn new_doc_button(desk: DeskHandle, doctype: String) -> impl IntoView {
    view! {
        <Button
            appearance=ButtonAppearance::Primary
            on_click=move |_| {
                let doctype = doctype.clone();
                let settled = desk.set_route(["Form", doctype.as_str(), "new"]);
                spawn_local(async move {
                    settled.await;
                    log::debug!("new {} ready", doctype);
                });
            }
        >
            "New"
        </Button>
    }
}

#[component]
fn PageBlock(label: String, kind: &'static str) -> impl IntoView {
    let desk = use_context::<DeskHandle>().expect("DeskHandle context not found");
    let visible = {
        let label = label.clone();
        move || with_page(desk, &label, |page| page.visible).unwrap_or(false)
    };
    let title = {
        let label = label.clone();
        move || with_page(desk, &label, |page| page.title.clone()).unwrap_or_default()
    };
    let doctype = desk
        .with_untracked(|d| {
            let id = d.container().get(&label)?;
            match &d.container().page(id).content {
                PageContent::List(list) => Some(list.doctype.clone()),
                _ => None,
            }
        })
        .flatten();

    let body = match kind {
        "loading" => view! { <div class="text-muted">"Loading..."</div> }.into_any(),
        "not-found" => view! {
            <div class="page-not-found">"Sorry! I could not find what you were looking for."</div>
        }
        .into_any(),
        "form" => form_body(desk, label.clone()),
        "list" => list_body(desk, label.clone()),
        _ => ().into_any(),
    };

    view! {
        <div class="page-container" class:hide=move || !visible() data-page-route=label>
            <div class="page-head">
                <h3 class="title-text">{title}</h3>
                {doctype.map(|doctype| new_doc_button(desk, doctype))}
            </div>
            <div class="page-body">{body}</div>
        </div>
    }
}

#[component]
pub fn PageHost() -> impl IntoView {
    let desk = use_context::<DeskHandle>().expect("DeskHandle context not found");
    let pages = move || {
        desk.with(|d| {
            d.container()
                .pages()
                .iter()
                .map(|page| (page.label.clone(), content_kind(&page.content)))
                .collect::<Vec<_>>()
        })
        .unwrap_or_default()
    };

    view! {
        <div class="desk">
            <ul class="breadcrumb"><Breadcrumbs /></ul>
            <div class="desk-messages"><Messages /></div>
            <div class="content">
                <For
                    each=pages
                    key=|(label, kind)| (label.clone(), *kind)
                    children=|(label, kind)| view! { <PageBlock label=label kind=kind /> }
                />
            </div>
        </div>
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_form_href_encodes_both_parts() {
        assert_eq!(form_href("Task", "T-0001"), "#Form/Task/T-0001");
        assert_eq!(
            form_href("Sales Invoice", "SINV/1"),
            "#Form/Sales%20Invoice/SINV%2F1"
        );
    }
}
