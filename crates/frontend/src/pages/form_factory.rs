//! `Form/<doctype>/<name>`: one layout-backed page per document

use super::container::{PageContent, PageId};
use super::factory::{make_page, show_not_found, ViewCx, ViewError, ViewFactory};
use crate::context::AppContext;
use crate::form::Layout;
use crate::model::DocRef;
use contracts::shared::document::new_doc_prefix;

pub struct FormPage {
    pub doctype: String,
    pub name: String,
    pub layout: Layout,
}

impl FormPage {
    fn build(app: &AppContext, doc: DocRef, label: &str) -> Result<Self, ViewError> {
        let (doctype, name) = {
            let d = doc.borrow();
            (d.doctype().to_string(), d.name().to_string())
        };
        let mut layout = Layout::new(
            app.layout_options(&doctype)
                .with_doc(Some(doc))
                .with_tab_memory_key(Some(label.to_string())),
        );
        layout.refresh(None)?;
        Ok(Self {
            doctype,
            name,
            layout,
        })
    }
}

enum Lookup {
    Found(DocRef),
    /// A new document was created and navigation to it requested.
    Created,
    Missing,
}

pub struct FormFactory;

impl FormFactory {
    fn lookup(cx: &mut ViewCx<'_>, doctype: &str) -> Lookup {
        // Single doctypes have exactly one document, named after the doctype.
        let name = cx
            .route
            .get(2)
            .filter(|n| !n.is_empty())
            .unwrap_or(doctype);

        if let Some(doc) = cx.app.docs.get(doctype, name) {
            return Lookup::Found(doc);
        }
        if name != "new" && !name.starts_with(&new_doc_prefix(doctype)) {
            return Lookup::Missing;
        }
        let Some(meta) = cx.app.meta.get(doctype) else {
            return Lookup::Missing;
        };
        let defaults = cx.router.take_route_options();
        let doc = cx.app.docs.new_doc(&meta, &defaults);
        let new_name = doc.borrow().name().to_string();
        log::info!("new {} {}", doctype, new_name);
        cx.router.set_route(["Form", doctype, new_name.as_str()]);
        Lookup::Created
    }
}

impl ViewFactory for FormFactory {
    fn make(&mut self, cx: &mut ViewCx<'_>) -> Result<Option<PageId>, ViewError> {
        let doctype = cx.route.get(1).unwrap_or_default().to_string();
        if !cx.app.meta.has(&doctype) {
            return cx.show_loading(&doctype);
        }
        let label = cx.label();
        match Self::lookup(cx, &doctype) {
            Lookup::Found(doc) => {
                let form = FormPage::build(cx.app, doc, &label)?;
                let title = form.name.clone();
                let id = make_page(cx.container, false, &label, PageContent::Form(Box::new(form)));
                cx.container.page_mut(id).title = title;
                Ok(Some(id))
            }
            Lookup::Created => Ok(None),
            Lookup::Missing => Ok(Some(show_not_found(cx.container, &label))),
        }
    }

    fn on_show(&mut self, page: PageId, cx: &mut ViewCx<'_>) -> Result<(), ViewError> {
        let waiting_for = match &cx.container.page(page).content {
            PageContent::Form(_) => None,
            PageContent::Loading { doctype } => Some(doctype.clone()),
            _ => return Ok(()),
        };

        let Some(doctype) = waiting_for else {
            if let PageContent::Form(form) = &mut cx.container.page_mut(page).content {
                form.layout.refresh(None)?;
            }
            return Ok(());
        };
        if !cx.app.meta.has(&doctype) {
            return Ok(());
        }

        let label = cx.label();
        let content = match Self::lookup(cx, &doctype) {
            Lookup::Found(doc) => PageContent::Form(Box::new(FormPage::build(cx.app, doc, &label)?)),
            Lookup::Created => return Ok(()),
            Lookup::Missing => PageContent::NotFound,
        };
        let page = cx.container.page_mut(page);
        if let PageContent::Form(form) = &content {
            page.title = form.name.clone();
        }
        page.content = content;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::depends::DependsError;
    use crate::form::LayoutError;
    use crate::pages::factory::test_support::Harness;
    use crate::routing::{Location, Route};
    use contracts::shared::document::Document;
    use contracts::shared::metadata::{DocField, DocTypeMeta, FieldType};
    use serde_json::{json, Map};

    fn task_meta() -> DocTypeMeta {
        DocTypeMeta::new(
            "Task",
            vec![
                DocField::new("subject", FieldType::Data),
                DocField::new("status", FieldType::Select),
                DocField::new("closed_on", FieldType::Date)
                    .with_depends_on("eval:doc.status == 'Closed'"),
            ],
        )
    }

    fn form(h: &Harness, id: PageId) -> &FormPage {
        match &h.container.page(id).content {
            PageContent::Form(form) => form,
            _ => panic!("not a form page"),
        }
    }

    #[test]
    fn test_form_page_builds_layout_for_document() {
        let mut h = Harness::new();
        h.app.meta.insert(task_meta());
        let mut doc = Document::new("Task", "T-1");
        doc.set("status", json!("Open"));
        h.app.docs.insert(doc);

        let id = h
            .show(&mut FormFactory, &Route::from(["Form", "Task", "T-1"]))
            .unwrap()
            .unwrap();
        let page = form(&h, id);
        assert_eq!(page.name, "T-1");
        assert!(page.layout.get_field("subject").unwrap().is_visible());
        assert!(!page.layout.get_field("closed_on").unwrap().is_visible());
        assert_eq!(h.container.page(id).title, "T-1");
    }

    #[test]
    fn test_new_creates_document_from_route_options() {
        let mut h = Harness::new();
        h.app.meta.insert(task_meta());
        let mut options = Map::new();
        options.insert("subject".into(), json!("Call back"));
        h.router.set_route(vec![
            crate::routing::RouteArg::from("Form"),
            "Task".into(),
            "new".into(),
            options.into(),
        ]);

        let shown = h
            .show(&mut FormFactory, &Route::from(["Form", "Task", "new"]))
            .unwrap();
        assert_eq!(shown, None);

        let hash = h.location.hash();
        let name = hash.strip_prefix("Form/Task/").unwrap().to_string();
        assert!(name.starts_with("new-task-"));
        let doc = h.app.docs.get("Task", &name).unwrap();
        assert_eq!(doc.borrow().get("subject"), Some(&json!("Call back")));
        assert!(h.router.route_options().is_empty());

        let id = h
            .show(&mut FormFactory, &Route::from(["Form", "Task", name.as_str()]))
            .unwrap()
            .unwrap();
        assert_eq!(form(&h, id).name, name);
    }

    #[test]
    fn test_loading_page_replaced_when_meta_arrives() {
        let mut h = Harness::new();
        h.app.docs.insert(Document::new("Task", "T-1"));
        let route = Route::from(["Form", "Task", "T-1"]);

        let id = h.show(&mut FormFactory, &route).unwrap().unwrap();
        assert!(matches!(h.container.page(id).content, PageContent::Loading { .. }));

        h.app.meta.insert(task_meta());
        assert_eq!(h.show(&mut FormFactory, &route).unwrap(), Some(id));
        assert_eq!(form(&h, id).doctype, "Task");
    }

    #[test]
    fn test_unknown_document_is_not_found() {
        let mut h = Harness::new();
        h.app.meta.insert(task_meta());
        let id = h
            .show(&mut FormFactory, &Route::from(["Form", "Task", "T-404"]))
            .unwrap()
            .unwrap();
        assert!(matches!(h.container.page(id).content, PageContent::NotFound));
    }

    #[test]
    fn test_single_doctype_uses_doctype_as_name() {
        let mut h = Harness::new();
        h.app.meta.insert(DocTypeMeta::new("System Settings", vec![]));
        h.app.docs.insert(Document::new("System Settings", "System Settings"));
        let id = h
            .show(&mut FormFactory, &Route::from(["Form", "System Settings"]))
            .unwrap()
            .unwrap();
        assert_eq!(form(&h, id).name, "System Settings");
    }

    #[test]
    fn test_broken_dependency_fails_the_show() {
        let mut h = Harness::new();
        h.app.meta.insert(DocTypeMeta::new(
            "Task",
            vec![DocField::new("a", FieldType::Data).with_depends_on("eval:doc.(")],
        ));
        h.app.docs.insert(Document::new("Task", "T-1"));
        let err = h
            .show(&mut FormFactory, &Route::from(["Form", "Task", "T-1"]))
            .unwrap_err();
        assert!(matches!(
            err,
            ViewError::Layout(LayoutError::Depends(DependsError::InvalidExpression { .. }))
        ));
    }
}
