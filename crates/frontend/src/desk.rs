//! The desk: router, page container and views wired together
//!
//! [`Desk`] owns everything navigation touches. Browser bindings feed it
//! location changes (`route`), metadata and script answers from the server
//! (`on_meta_loaded`, `resolve_trigger`); the rendering layer reads the
//! page container back.

use crate::context::AppContext;
use crate::form::depends::DependsError;
use crate::form::LayoutError;
use crate::pages::{
    breadcrumbs_for, Breadcrumb, FactoryRegistry, FormPage, PageContainer, PageContent,
    PageView, ViewCx, ViewError, ViewFactory,
};
use crate::routing::{Dispatch, Route, RouteArg, RouteTarget, Router, SharedLocation};
use contracts::shared::metadata::DocTypeMeta;
use contracts::shared::rpc::RunTriggerRequest;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DeskError {
    #[error(transparent)]
    View(#[from] ViewError),
    #[error(transparent)]
    Layout(#[from] LayoutError),
    #[error("No form is open at {0}")]
    NoSuchForm(String),
}

impl DeskError {
    fn depends(&self) -> Option<&DependsError> {
        match self {
            DeskError::View(ViewError::Layout(LayoutError::Depends(e)))
            | DeskError::Layout(LayoutError::Depends(e)) => Some(e),
            _ => None,
        }
    }
}

/// The part of the desk a dispatch shows pages in.
pub struct Views {
    app: AppContext,
    container: PageContainer,
    factories: FactoryRegistry,
    pages: PageView,
    breadcrumbs: Vec<Breadcrumb>,
}

impl RouteTarget for Views {
    type Error = DeskError;

    fn show_route(&mut self, route: &Route, router: &mut Router) -> Result<(), DeskError> {
        let kind = route.kind().unwrap_or_default();
        match self.factories.get(kind) {
            Some(factory) => {
                let mut cx = ViewCx {
                    app: &self.app,
                    route,
                    router: &mut *router,
                    container: &mut self.container,
                };
                factory.show(&mut cx)?;
            }
            None => {
                self.pages.show(kind, &mut self.container);
            }
        }
        self.breadcrumbs = breadcrumbs_for(route, &self.app);
        if let Some(page) = self.container.current_page() {
            router.location().set_title(&page.title);
        }
        Ok(())
    }
}

pub struct Desk {
    router: Router,
    views: Views,
}

impl Desk {
    pub fn new(app: AppContext, location: SharedLocation) -> Self {
        let router = Router::new(&app.config, location, app.storage.clone());
        let views = Views {
            container: PageContainer::new(app.dialogs.clone()),
            factories: FactoryRegistry::with_defaults(),
            pages: PageView::with_defaults(&app.config.router),
            breadcrumbs: Vec::new(),
            app,
        };
        Self { router, views }
    }

    pub fn app(&self) -> &AppContext {
        &self.views.app
    }

    pub fn router(&self) -> &Router {
        &self.router
    }

    pub fn router_mut(&mut self) -> &mut Router {
        &mut self.router
    }

    pub fn container(&self) -> &PageContainer {
        &self.views.container
    }

    pub fn container_mut(&mut self) -> &mut PageContainer {
        &mut self.views.container
    }

    pub fn breadcrumbs(&self) -> &[Breadcrumb] {
        &self.views.breadcrumbs
    }

    pub fn register_factory(
        &mut self,
        kind: &str,
        constructor: impl Fn() -> Box<dyn ViewFactory> + 'static,
    ) {
        self.views.factories.register(kind, constructor);
    }

    pub fn register_page(&mut self, name: &str, builder: impl Fn(&str) -> PageContent + 'static) {
        self.views.pages.register(name, builder);
    }

    fn report(&self, err: &DeskError) {
        log::error!("{}", err);
        if let Some(e) = err.depends() {
            self.app().messages.throw("Error", &e.to_string());
        }
    }

    /// Dispatch the current location.
    pub fn route(&mut self) -> Result<Dispatch, DeskError> {
        let result = self.router.route(&mut self.views);
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    pub fn set_route<I, A>(&mut self, args: I) -> String
    where
        I: IntoIterator<Item = A>,
        A: Into<RouteArg>,
    {
        self.router.set_route(args)
    }

    pub fn set_re_route<I, A>(&mut self, args: I) -> String
    where
        I: IntoIterator<Item = A>,
        A: Into<RouteArg>,
    {
        self.router.set_re_route(args)
    }

    /// Doctypes whose metadata a view is waiting for.
    pub fn take_meta_requests(&self) -> Vec<String> {
        self.app().meta_requests.take_pending()
    }

    /// Cache fetched metadata; the current page is shown again when it was
    /// waiting for one of these doctypes.
    pub fn on_meta_loaded(&mut self, docs: Vec<DocTypeMeta>) -> Result<Option<Dispatch>, DeskError> {
        let names: Vec<String> = docs.iter().map(|m| m.name.clone()).collect();
        for meta in docs {
            self.app().meta_requests.loaded(&meta.name);
            self.app().meta.insert(meta);
        }
        let waiting = matches!(
            self.container().current_page().map(|p| &p.content),
            Some(PageContent::Loading { doctype }) if names.contains(doctype)
        );
        if !waiting {
            return Ok(None);
        }
        self.route().map(Some)
    }

    pub fn on_meta_failed(&mut self, doctype: &str, reason: &str) {
        log::warn!("metadata for {} not loaded: {}", doctype, reason);
        self.app().meta_requests.failed(doctype);
        self.app().messages.msgprint("Error", reason);
    }

    pub fn form(&self, label: &str) -> Option<&FormPage> {
        let id = self.container().get(label)?;
        match &self.container().page(id).content {
            PageContent::Form(form) => Some(&**form),
            _ => None,
        }
    }

    pub fn form_mut(&mut self, label: &str) -> Option<&mut FormPage> {
        let id = self.container().get(label)?;
        match &mut self.container_mut().page_mut(id).content {
            PageContent::Form(form) => Some(&mut **form),
            _ => None,
        }
    }

    /// A value typed into the form shown at `label`.
    pub fn set_value(&mut self, label: &str, fieldname: &str, value: Value) -> Result<(), DeskError> {
        let result = match self.form_mut(label) {
            Some(form) => form.layout.set_value(fieldname, value).map_err(DeskError::from),
            None => Err(DeskError::NoSuchForm(label.to_string())),
        };
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    /// Re-run dependency refresh on every form showing this document.
    pub fn refresh_doc(&mut self, doctype: &str, name: &str) -> Result<(), DeskError> {
        let mut result = Ok(());
        for page in self.views.container.pages_mut() {
            if let PageContent::Form(form) = &mut page.content {
                if form.doctype == doctype && form.name == name {
                    if let Err(err) = form.layout.refresh(None) {
                        result = Err(DeskError::from(err));
                    }
                }
            }
        }
        if let Err(err) = &result {
            self.report(err);
        }
        result
    }

    pub fn take_trigger_requests(&self) -> Vec<RunTriggerRequest> {
        self.app().scripts.take_pending()
    }

    pub fn resolve_trigger(&mut self, request: &RunTriggerRequest, value: Value) -> Result<(), DeskError> {
        self.app().scripts.resolve(request, value);
        self.refresh_doc(&request.doctype, &request.docname)
    }

    pub fn fail_trigger(&mut self, request: &RunTriggerRequest) {
        log::warn!("trigger {} failed for {}", request.trigger, request.docname);
        self.app().scripts.fail(request);
    }

    /// Rename a local document. An open form moves with it, and when it is
    /// the current route the location is re-routed to the new name.
    pub fn rename_doc(&mut self, doctype: &str, old: &str, new: &str) -> bool {
        if self.app().docs.rename(doctype, old, new).is_none() {
            log::warn!("cannot rename {} {}: not loaded", doctype, old);
            return false;
        }
        self.app().meta.rename_doc(doctype, old, new);

        let old_label = Route::from(["Form", doctype, old]).to_route_string();
        let new_label = Route::from(["Form", doctype, new]).to_route_string();
        if let Some(id) = self.container().get(&old_label) {
            self.container_mut().relabel(id, &new_label);
            let page = self.container_mut().page_mut(id);
            page.title = new.to_string();
            if let PageContent::Form(form) = &mut page.content {
                form.name = new.to_string();
            }
        }
        if self.router.current_route().to_route_string() == old_label {
            self.router.set_re_route(["Form", doctype, new]);
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DeskConfig;
    use crate::form::Dialog;
    use crate::routing::{Location, MemoryLocation};
    use crate::shared::storage::MemoryStorage;
    use contracts::shared::document::Document;
    use contracts::shared::metadata::{DocField, FieldType};
    use serde_json::json;
    use std::rc::Rc;

    fn desk_at(hash: &str) -> (Desk, MemoryLocation) {
        let app = AppContext::new(DeskConfig::default(), Rc::new(MemoryStorage::new()));
        let location = MemoryLocation::new(hash);
        (Desk::new(app, Rc::new(location.clone())), location)
    }

    fn task_meta() -> DocTypeMeta {
        DocTypeMeta::new(
            "Task",
            vec![
                DocField::new("status", FieldType::Select),
                DocField::new("closed_on", FieldType::Date)
                    .with_depends_on("eval:doc.status == 'Closed'"),
            ],
        )
    }

    fn current_label(desk: &Desk) -> String {
        desk.container().current_page().unwrap().label.clone()
    }

    #[test]
    fn test_standard_pages_and_not_found() {
        let (mut desk, location) = desk_at("");
        desk.route().unwrap();
        assert_eq!(current_label(&desk), "home");
        assert_eq!(location.title(), "Home");

        location.set_hash("setup-wizard");
        desk.route().unwrap();
        assert!(matches!(
            desk.container().current_page().unwrap().content,
            PageContent::NotFound
        ));
    }

    #[test]
    fn test_list_waits_for_metadata() {
        let (mut desk, _) = desk_at("#List/Task");
        desk.route().unwrap();
        assert_eq!(desk.take_meta_requests(), vec!["Task".to_string()]);
        let history = desk.router().history().len();

        let dispatch = desk.on_meta_loaded(vec![task_meta()]).unwrap();
        assert!(matches!(dispatch, Some(Dispatch::Routed { .. })));
        assert!(matches!(
            desk.container().current_page().unwrap().content,
            PageContent::List(_)
        ));
        assert_eq!(desk.router().history().len(), history);
        assert!(desk.on_meta_loaded(vec![]).unwrap().is_none());
    }

    #[test]
    fn test_new_document_then_rename() {
        let (mut desk, location) = desk_at("Form/Task/new");
        desk.app().meta.insert(task_meta());
        desk.route().unwrap();
        let draft = location.hash();
        assert!(draft.starts_with("Form/Task/new-task-"));

        desk.route().unwrap();
        assert_eq!(current_label(&desk), draft);
        let before = desk.router().history().len();

        let old_name = draft.trim_start_matches("Form/Task/").to_string();
        assert!(desk.rename_doc("Task", &old_name, "TASK-0001"));
        assert_eq!(location.hash(), "Form/Task/TASK-0001");
        desk.route().unwrap();
        assert_eq!(current_label(&desk), "Form/Task/TASK-0001");
        assert_eq!(desk.form("Form/Task/TASK-0001").unwrap().name, "TASK-0001");
        assert_eq!(desk.container().pages().len(), 1);

        // Back-button to the draft URL lands on the renamed document.
        location.set_hash(&draft);
        assert_eq!(desk.route().unwrap(), Dispatch::WentBack);
        desk.route().unwrap();
        assert_eq!(desk.router().history().len(), before + 1);
    }

    #[test]
    fn test_set_value_flips_dependency() {
        let (mut desk, _) = desk_at("Form/Task/T-1");
        desk.app().meta.insert(task_meta());
        desk.app().docs.insert(Document::new("Task", "T-1"));
        desk.route().unwrap();

        let label = "Form/Task/T-1";
        let visible = |desk: &Desk| {
            desk.form(label)
                .unwrap()
                .layout
                .get_field("closed_on")
                .unwrap()
                .is_visible()
        };
        assert!(!visible(&desk));
        desk.set_value(label, "status", json!("Closed")).unwrap();
        assert!(visible(&desk));
        assert_eq!(
            desk.set_value("List/Task", "status", json!("Open")),
            Err(DeskError::NoSuchForm("List/Task".into()))
        );
    }

    #[test]
    fn test_broken_dependency_is_loud() {
        let (mut desk, _) = desk_at("Form/Task/T-1");
        desk.app().meta.insert(DocTypeMeta::new(
            "Task",
            vec![DocField::new("a", FieldType::Data).with_depends_on("eval:doc.a >")],
        ));
        desk.app().docs.insert(Document::new("Task", "T-1"));
        assert!(matches!(desk.route(), Err(DeskError::View(_))));
        let message = desk.app().messages.last().unwrap();
        assert!(message.blocking);
        assert!(message.message.starts_with("Invalid depends_on expression"));
    }

    #[test]
    fn test_navigation_hides_open_dialog() {
        let (mut desk, location) = desk_at("home");
        desk.route().unwrap();
        let mut dialog = Dialog::new("Quick Entry", vec![]);
        dialog.show(&desk.app().dialogs).unwrap();

        location.set_hash("modules/Projects");
        desk.route().unwrap();
        assert!(!dialog.is_visible());
        assert_eq!(current_label(&desk), "modules");

        let mut sticky = Dialog::new("Upload", vec![]).keep_open(true);
        sticky.show(&desk.app().dialogs).unwrap();
        location.set_hash("home");
        desk.route().unwrap();
        assert!(sticky.is_visible());
    }
}
