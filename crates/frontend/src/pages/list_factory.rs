//! `List/<doctype>`: the documents of a doctype held in the local cache

use super::container::{PageContent, PageId};
use super::factory::{make_page, ViewCx, ViewError, ViewFactory};
use crate::model::DocumentStore;
use crate::shared::value::to_display_string;
use serde_json::{Map, Value};

pub struct ListPage {
    pub doctype: String,
    /// Route options the list was opened with; values must match exactly.
    pub filters: Map<String, Value>,
    pub names: Vec<String>,
}

impl ListPage {
    pub fn new(doctype: &str, filters: Map<String, Value>) -> Self {
        Self {
            doctype: doctype.to_string(),
            filters,
            names: Vec::new(),
        }
    }

    pub fn load(&mut self, docs: &DocumentStore) {
        self.names = docs
            .list(&self.doctype)
            .iter()
            .filter(|doc| {
                let doc = doc.borrow();
                self.filters.iter().all(|(field, expected)| {
                    doc.get(field)
                        .is_some_and(|v| to_display_string(v) == to_display_string(expected))
                })
            })
            .map(|doc| doc.borrow().name().to_string())
            .collect();
    }
}

pub struct ListFactory;

impl ViewFactory for ListFactory {
    fn make(&mut self, cx: &mut ViewCx<'_>) -> Result<Option<PageId>, ViewError> {
        let doctype = cx.route.get(1).unwrap_or_default().to_string();
        if !cx.app.meta.has(&doctype) {
            return cx.show_loading(&doctype);
        }
        let mut list = ListPage::new(&doctype, cx.router.take_route_options());
        list.load(&cx.app.docs);
        log::debug!("list {} with {} rows", doctype, list.names.len());

        let label = cx.label();
        let id = make_page(cx.container, true, &label, PageContent::List(list));
        cx.container.page_mut(id).title = cx.app.translate(&doctype);
        Ok(Some(id))
    }

    fn on_show(&mut self, page: PageId, cx: &mut ViewCx<'_>) -> Result<(), ViewError> {
        let options = cx.router.take_route_options();
        let app = cx.app;
        let page = cx.container.page_mut(page);
        match &mut page.content {
            PageContent::Loading { doctype } if app.meta.has(doctype) => {
                let mut list = ListPage::new(doctype, options);
                list.load(&app.docs);
                page.title = app.translate(&list.doctype);
                page.double_column = Some(true);
                page.content = PageContent::List(list);
            }
            PageContent::List(list) => {
                if !options.is_empty() {
                    list.filters = options;
                }
                list.load(&app.docs);
            }
            _ => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::factory::test_support::Harness;
    use crate::routing::{Location, Route, RouteTarget, Router};
    use contracts::shared::document::Document;
    use contracts::shared::metadata::DocTypeMeta;
    use serde_json::json;

    fn task(name: &str, status: &str) -> Document {
        let mut doc = Document::new("Task", name);
        doc.set("status", json!(status));
        doc
    }

    fn names(h: &Harness, id: PageId) -> Vec<String> {
        match &h.container.page(id).content {
            PageContent::List(list) => list.names.clone(),
            _ => panic!("not a list page"),
        }
    }

    #[test]
    fn test_list_waits_for_meta_then_fills() {
        let mut h = Harness::new();
        h.app.docs.insert(task("T-1", "Open"));
        let route = Route::from(["List", "Task"]);

        let id = h.show(&mut ListFactory, &route).unwrap().unwrap();
        assert!(matches!(h.container.page(id).content, PageContent::Loading { .. }));
        assert_eq!(h.app.meta_requests.take_pending(), vec!["Task".to_string()]);

        h.app.meta.insert(DocTypeMeta::new("Task", vec![]));
        h.show(&mut ListFactory, &route).unwrap();
        assert_eq!(names(&h, id), vec!["T-1"]);
        assert!(h.container.has_sidebar());
    }

    #[test]
    fn test_route_options_filter_rows() {
        let mut h = Harness::new();
        h.app.meta.insert(DocTypeMeta::new("Task", vec![]));
        h.app.docs.insert(task("T-1", "Open"));
        h.app.docs.insert(task("T-2", "Closed"));
        h.location.set_hash("List/Task?status=Closed");
        h.router.route(&mut Noop).unwrap();

        let id = h
            .show(&mut ListFactory, &Route::from(["List", "Task"]))
            .unwrap()
            .unwrap();
        assert_eq!(names(&h, id), vec!["T-2"]);
        assert!(h.router.route_options().is_empty());
    }

    struct Noop;

    impl RouteTarget for Noop {
        type Error = ();

        fn show_route(&mut self, _: &Route, _: &mut Router) -> Result<(), ()> {
            Ok(())
        }
    }
}
